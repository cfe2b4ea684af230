// Network inventory (`api_db.php?network`)
//
// Devices the appliance has tracked over time. The wire format carries
// parallel `ip`/`name` arrays and epoch-second dates; `NetworkClient` is the
// validated shape built from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::Client;

/// Hardware address identifying a network device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "address", rename_all = "lowercase")]
pub enum HardwareAddress {
    Mac(String),
    /// Devices seen only by IP are recorded as `ip-<address>`.
    Ip(String),
}

impl HardwareAddress {
    /// `None` for an empty string.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(ip) = raw.strip_prefix("ip-") {
            Some(Self::Ip(ip.to_owned()))
        } else if raw.is_empty() {
            None
        } else {
            Some(Self::Mac(raw.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Mac(s) | Self::Ip(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNetworkClient {
    hwaddr: String,
    interface: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    first_seen: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    last_query: DateTime<Utc>,
    num_queries: u64,
    #[serde(default)]
    mac_vendor: Option<String>,
    #[serde(default)]
    ip: Vec<String>,
    #[serde(default)]
    name: Vec<String>,
}

/// A device tracked by the appliance.
///
/// Equality and hashing use the hardware address only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawNetworkClient")]
pub struct NetworkClient {
    pub hardware_address: HardwareAddress,
    pub interface: String,
    pub first_seen: DateTime<Utc>,
    pub last_query: DateTime<Utc>,
    pub query_count: u64,
    /// Vendor from the MAC prefix lookup; empty when unknown.
    pub vendor: String,
    /// IP addresses used by this device, some with names.
    pub aliases: Vec<Client>,
}

impl TryFrom<RawNetworkClient> for NetworkClient {
    type Error = String;

    fn try_from(raw: RawNetworkClient) -> Result<Self, Self::Error> {
        let hardware_address = HardwareAddress::parse(&raw.hwaddr)
            .ok_or_else(|| format!("unable to parse hardware address from {:?}", raw.hwaddr))?;
        let aliases = raw
            .ip
            .into_iter()
            .zip(raw.name)
            .map(|(ip, name)| Client::new(ip, Some(name)))
            .collect();

        Ok(Self {
            hardware_address,
            interface: raw.interface,
            first_seen: raw.first_seen,
            last_query: raw.last_query,
            query_count: raw.num_queries,
            vendor: raw.mac_vendor.unwrap_or_default(),
            aliases,
        })
    }
}

impl PartialEq for NetworkClient {
    fn eq(&self, other: &Self) -> bool {
        self.hardware_address == other.hardware_address
    }
}

impl Eq for NetworkClient {}

impl std::hash::Hash for NetworkClient {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hardware_address.hash(state);
    }
}
