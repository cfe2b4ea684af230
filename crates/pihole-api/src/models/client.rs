// DNS clients as reported in rankings and timelines.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::instance::ip_sort_key;

/// A client of the DNS resolver.
///
/// Identity is the IP address alone; the name is display metadata that the
/// appliance may or may not have resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub ip: String,
    /// Resolved hostname, usually suffixed with the search domain.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

impl Client {
    pub fn new(ip: impl Into<String>, name: Option<String>) -> Self {
        Self {
            ip: ip.into(),
            name: name.filter(|n| !n.is_empty()),
        }
    }

    /// The name when known, otherwise the IP.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.ip)
    }
}

/// Error for a ranking key that names no client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a client key: {0:?}")]
pub struct InvalidClientKey(String);

impl FromStr for Client {
    type Err = InvalidClientKey;

    /// Parses the `name|ip` keys used by client rankings. A key without a
    /// separator is a bare IP.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, ip) = match s.split_once('|') {
            Some((name, ip)) => (Some(name.to_owned()), ip),
            None => (None, s),
        };
        if ip.is_empty() || ip.contains('|') {
            return Err(InvalidClientKey(s.to_owned()));
        }
        Ok(Self::new(ip, name))
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.ip),
            None => f.write_str(&self.ip),
        }
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.ip == other.ip
    }
}

impl Eq for Client {}

impl Hash for Client {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ip.hash(state);
    }
}

/// Named clients first, alphabetically; then unnamed clients by address.
///
/// Total only over clients that carry one name per address, which holds for
/// any single appliance response. Mixing a named and an unnamed copy of the
/// same address into one ordered collection breaks transitivity, since the
/// two compare equal while sorting into different groups.
impl Ord for Client {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.ip == other.ip {
            return Ordering::Equal;
        }
        match (&self.name, &other.name) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => ip_sort_key(&self.ip).cmp(&ip_sort_key(&other.ip)),
        }
        .then_with(|| self.ip.cmp(&other.ip))
    }
}

impl PartialOrd for Client {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One point of a client's activity history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Seconds since the epoch.
    pub timestamp: i64,
    /// Requests made in the interval starting at `timestamp`.
    pub count: u64,
}
