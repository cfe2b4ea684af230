// Appliance endpoint description
//
// An `Instance` names one Pi-hole: where it lives and (optionally) the web
// password used to log in and derive the API key. Immutable once handed to a
// `Handle`.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use secrecy::{ExposeSecret, SecretString};

use crate::credential::derive_api_key;

/// Default HTTP port of the Pi-hole admin interface.
pub const DEFAULT_PORT: u16 = 80;

/// A single Pi-hole appliance.
#[derive(Debug, Clone)]
pub struct Instance {
    host: String,
    port: u16,
    password: Option<SecretString>,
}

impl Instance {
    /// Create an instance without a password (anonymous access only).
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: None,
        }
    }

    /// Attach the web interface password.
    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn password(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// `host:port`, as used to build request URLs.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The derived API key. A missing password is treated as the empty string.
    pub fn api_key(&self) -> SecretString {
        derive_api_key(self.password.as_ref().map_or("", |p| p.expose_secret()))
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for Instance {}

impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
    }
}

impl Ord for Instance {
    fn cmp(&self, other: &Self) -> Ordering {
        ip_sort_key(&self.host)
            .cmp(&ip_sort_key(&other.host))
            .then_with(|| self.port.cmp(&other.port))
            .then_with(|| self.host.cmp(&other.host))
    }
}

impl PartialOrd for Instance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key that orders dotted IPv4 addresses numerically.
///
/// Each dot-separated component is left-padded with zeros to three
/// characters, so `192.8.1.11` sorts before `192.168.1.10`. Components that
/// are already longer (hostnames) are kept as-is.
pub(crate) fn ip_sort_key(address: &str) -> String {
    address
        .split('.')
        .map(|part| format!("{part:0>3}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn address_joins_host_and_port() {
        assert_eq!(Instance::new("pi.hole", 8080).address(), "pi.hole:8080");
    }

    #[test]
    fn api_key_without_password_hashes_empty_string() {
        let anonymous = Instance::new("1.2.3.4", DEFAULT_PORT);
        let empty = Instance::new("1.2.3.4", DEFAULT_PORT).with_password(SecretString::from(""));
        assert_eq!(
            anonymous.api_key().expose_secret(),
            empty.api_key().expose_secret()
        );
    }

    #[test]
    fn sorts_numerically_then_by_port() {
        let expected = vec![
            Instance::new("4.8.9.255", 80),
            Instance::new("192.8.1.11", 80),
            Instance::new("192.168.1.10", 80),
            Instance::new("192.168.1.10", 8080),
            Instance::new("192.168.1.11", 80),
            Instance::new("192.168.1.20", 80),
            Instance::new("192.168.2.10", 8080),
            Instance::new("192.168.2.10", 8088),
        ];

        let unique: HashSet<Instance> = expected.iter().cloned().collect();
        assert_eq!(unique.len(), expected.len());

        let mut sorted: Vec<Instance> = unique.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn identity_ignores_password() {
        let a = Instance::new("10.0.0.2", 80).with_password(SecretString::from("a"));
        let b = Instance::new("10.0.0.2", 80);
        assert_eq!(a, b);
        assert_ne!(a, Instance::new("10.0.0.2", 8));
    }
}
