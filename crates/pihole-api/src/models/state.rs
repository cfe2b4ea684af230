use serde::{Deserialize, Serialize};

/// Blocking state as reported by the appliance.
///
/// Any unrecognised value decodes as `Unknown` rather than failing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlockingState {
    Enabled,
    Disabled,
    Mixed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl BlockingState {
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Enabled)
    }
}
