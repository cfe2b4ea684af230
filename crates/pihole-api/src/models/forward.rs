use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Where a DNS query was answered from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ForwardDestination {
    /// Answered from the resolver cache.
    Cache,
    /// Answered by the blocklist.
    Blocklist,
    /// Forwarded to an upstream resolver.
    Remote { name: String, ip: String },
}

/// Error for an empty forward-destination key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("empty forward destination key")]
pub struct EmptyDestinationKey;

/// `abc#53` → `abc`
fn strip_port(part: &str) -> &str {
    part.split_once('#').map_or(part, |(host, _)| host)
}

impl FromStr for ForwardDestination {
    type Err = EmptyDestinationKey;

    /// Parses `name|ip` keys. Without a separator the single part stands for
    /// both name and ip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(EmptyDestinationKey);
        }
        let (name, ip) = s.split_once('|').unwrap_or((s, s));
        Ok(match (name, ip) {
            ("cache", "cache") => Self::Cache,
            ("blocklist", "blocklist") => Self::Blocklist,
            _ => Self::Remote {
                name: strip_port(name).to_owned(),
                ip: strip_port(ip).to_owned(),
            },
        })
    }
}

impl fmt::Display for ForwardDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => f.write_str("cache"),
            Self::Blocklist => f.write_str("blocklist"),
            Self::Remote { name, ip } if name == ip => f.write_str(ip),
            Self::Remote { name, ip } => write!(f, "{name}|{ip}"),
        }
    }
}

// Serialized as its display key so that maps keyed by destination stay valid JSON.
impl Serialize for ForwardDestination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
