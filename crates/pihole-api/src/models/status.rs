// Dashboard counters: `api.php` (status) and `api.php?summaryRaw` (summary).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::state::BlockingState;

/// Legacy dashboard counters from the bare `api.php` endpoint.
///
/// Every field is optional on the wire; missing values default to zero and
/// the blocking state to [`BlockingState::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    #[serde(rename = "status")]
    pub state: BlockingState,
    #[serde(rename = "domains_being_blocked", deserialize_with = "lenient::count")]
    pub blocked_domain_count: u64,
    #[serde(rename = "dns_queries_today", deserialize_with = "lenient::count")]
    pub dns_queries_today: u64,
    #[serde(rename = "ads_blocked_today", deserialize_with = "lenient::count")]
    pub ads_blocked_today: u64,
    #[serde(rename = "unique_domains", deserialize_with = "lenient::count")]
    pub unique_domain_count: u64,
    #[serde(rename = "queries_forwarded", deserialize_with = "lenient::count")]
    pub forwarded_query_count: u64,
    #[serde(rename = "queries_cached", deserialize_with = "lenient::count")]
    pub cached_query_count: u64,
    #[serde(rename = "clients_ever_seen", deserialize_with = "lenient::count")]
    pub total_client_count: u64,
    #[serde(rename = "unique_clients", deserialize_with = "lenient::count")]
    pub unique_client_count: u64,
    #[serde(rename = "dns_queries_all_types", deserialize_with = "lenient::count")]
    pub total_dns_count: u64,
    #[serde(rename = "ads_percentage_today", deserialize_with = "lenient::ratio")]
    pub percent_ads_today: f32,
}

/// Raw counters from `summaryRaw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "status", default)]
    pub state: BlockingState,
    /// Number of domains on the blocklist.
    #[serde(rename = "domains_being_blocked", deserialize_with = "lenient::count")]
    pub blocklist_size: u64,
    /// DNS queries served today.
    #[serde(rename = "dns_queries_today", deserialize_with = "lenient::count")]
    pub query_count: u64,
    #[serde(rename = "ads_blocked_today", deserialize_with = "lenient::count")]
    pub blocked_query_count: u64,
    #[serde(rename = "unique_domains", deserialize_with = "lenient::count")]
    pub unique_domain_count: u64,
    #[serde(rename = "queries_forwarded", deserialize_with = "lenient::count")]
    pub forwarded_query_count: u64,
    #[serde(rename = "queries_cached", deserialize_with = "lenient::count")]
    pub cached_query_count: u64,
    /// All-time number of unique clients.
    #[serde(rename = "clients_ever_seen", deserialize_with = "lenient::count")]
    pub all_time_client_count: u64,
    #[serde(rename = "unique_clients", deserialize_with = "lenient::count")]
    pub unique_client_count: u64,
    /// Share of today's queries that were blocked, 0 to 100.
    #[serde(rename = "ads_percentage_today", deserialize_with = "lenient::ratio")]
    pub percent_ads: f32,
    /// Configured query-log privacy level.
    #[serde(deserialize_with = "lenient::count")]
    pub privacy_level: u64,
    #[serde(rename = "gravity_last_updated")]
    pub gravity: GravityInfo,
}

/// Blocklist ("gravity") database health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GravityInfo {
    /// Whether the gravity database file exists on the appliance.
    #[serde(rename = "file_exists")]
    pub exists: bool,
    /// When the blocklists were last rebuilt.
    #[serde(rename = "absolute", with = "chrono::serde::ts_seconds")]
    pub last_update: DateTime<Utc>,
}
