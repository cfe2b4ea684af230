// Activity timelines
//
// `overTimeData10mins` / `getGraphData` give blocked vs. permitted counts per
// interval; `overTimeDataClients` gives a dense per-client matrix that
// `SparseClientTimeline` flattens into per-client record lists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::client::{Client, ClientRecord};
use super::lenient;

/// Blocked and permitted request counts, keyed by interval start
/// (seconds since the epoch, as a string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRatioTimeline {
    #[serde(rename = "ads_over_time", deserialize_with = "lenient::map")]
    pub blocked: BTreeMap<String, u64>,
    #[serde(rename = "domains_over_time", deserialize_with = "lenient::map")]
    pub permitted: BTreeMap<String, u64>,
}

impl RequestRatioTimeline {
    /// `(timestamp, blocked, permitted)` rows in time order. Intervals
    /// missing from one series count as zero there; unparseable timestamps
    /// are dropped.
    pub fn rows(&self) -> Vec<(i64, u64, u64)> {
        let mut merged: BTreeMap<i64, (u64, u64)> = BTreeMap::new();
        for (key, count) in &self.blocked {
            if let Ok(ts) = key.parse() {
                merged.entry(ts).or_default().0 = *count;
            }
        }
        for (key, count) in &self.permitted {
            if let Ok(ts) = key.parse() {
                merged.entry(ts).or_default().1 = *count;
            }
        }
        merged.into_iter().map(|(ts, (b, p))| (ts, b, p)).collect()
    }
}

/// Per-client request counts over today's 10-minute intervals.
///
/// `over_time[ts][i]` is the count for `clients[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTimeline {
    pub clients: Vec<Client>,
    #[serde(deserialize_with = "lenient::map")]
    pub over_time: BTreeMap<String, Vec<u64>>,
}

/// Sparse view of a [`ClientTimeline`]: for each client, only the intervals
/// in which it made requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseClientTimeline {
    pub records: BTreeMap<Client, Vec<ClientRecord>>,
}

impl From<&ClientTimeline> for SparseClientTimeline {
    fn from(timeline: &ClientTimeline) -> Self {
        let mut records: BTreeMap<Client, Vec<ClientRecord>> = timeline
            .clients
            .iter()
            .map(|c| (c.clone(), Vec::new()))
            .collect();

        let mut intervals: Vec<(i64, &Vec<u64>)> = Vec::with_capacity(timeline.over_time.len());
        for (key, counts) in &timeline.over_time {
            match key.parse() {
                Ok(ts) => intervals.push((ts, counts)),
                Err(_) => trace!(key, "skipping non-numeric timeline key"),
            }
        }
        intervals.sort_by_key(|(ts, _)| *ts);

        for (timestamp, counts) in intervals {
            for (client, &count) in timeline.clients.iter().zip(counts) {
                if count == 0 {
                    continue;
                }
                if let Some(list) = records.get_mut(client) {
                    list.push(ClientRecord { timestamp, count });
                }
            }
        }

        Self { records }
    }
}

impl From<ClientTimeline> for SparseClientTimeline {
    fn from(timeline: ClientTimeline) -> Self {
        Self::from(&timeline)
    }
}
