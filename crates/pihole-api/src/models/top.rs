use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lenient;

/// Most frequently requested domains today (`topItems=N`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopQueries {
    /// Domain → count, for permitted queries.
    #[serde(rename = "top_queries", deserialize_with = "lenient::map")]
    pub top_passed: BTreeMap<String, u64>,
    /// Domain → count, for blocked queries.
    #[serde(rename = "top_ads", deserialize_with = "lenient::map")]
    pub top_blocked: BTreeMap<String, u64>,
}
