use thiserror::Error;

/// Top-level error type for the `pihole-api` crate.
///
/// Every public operation surfaces exactly one of these. The variants are
/// deliberately coarse: callers act on *what kind* of failure happened
/// (re-authenticate, fix the host, retry later), not on HTTP details.
#[derive(Debug, Error)]
pub enum Error {
    /// The host/port pair could not be turned into a request URL.
    /// Raised locally, before any network activity.
    #[error("Invalid hostname: cannot build a request URL")]
    InvalidHostname(#[source] Option<url::ParseError>),

    /// The Pi-hole answered with its "authentication required" sentinel
    /// (HTTP 200 with an empty JSON array).
    #[error("Authentication required -- the Pi-hole rejected the supplied credentials")]
    AuthenticationRequired,

    /// A body arrived but was not of the expected shape. The cause is absent
    /// when the mismatch was detected structurally (e.g. a missing envelope key)
    /// rather than by the JSON decoder.
    #[error("Failed to decode Pi-hole response")]
    Decoding(#[source] Option<serde_json::Error>),

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Anything not classified above.
    #[error("Unexpected error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Returns `true` if re-authenticating (or a different password)
    /// might resolve this error.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Shorthand for a decode failure with no decoder diagnostics.
    pub(crate) fn unexpected_shape() -> Self {
        Self::Decoding(None)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decoding(Some(err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidHostname(Some(err))
    }
}
