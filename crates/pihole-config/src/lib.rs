//! Shared configuration for Pi-hole tools.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), and
//! translation to `pihole_api::Instance`. The CLI layers flag-aware
//! wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use pihole_api::{Instance, TransportConfig};

/// Keyring service name under which passwords are stored.
pub const KEYRING_SERVICE: &str = "phctl";

/// Environment variable consulted for the password when a profile names none.
pub const PASSWORD_ENV: &str = "PIHOLE_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named Pi-hole profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Pi-hole.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Hostname or IP address, without scheme.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Web interface password (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Override timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_port() -> u16 {
    pihole_api::instance::DEFAULT_PORT
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            password: None,
            password_env: None,
            timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "phctl", "phctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("phctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Environment overrides use a double underscore for nesting:
/// `PIHOLE_DEFAULT_PROFILE`, `PIHOLE_DEFAULTS__TIMEOUT`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PIHOLE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution (without CLI flags) ─────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve the password from the credential chain (no CLI flag step).
///
/// Order: the profile's `password_env` variable, `PIHOLE_PASSWORD`, the
/// system keyring, then plaintext in the profile. `None` means anonymous.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            debug!(profile = profile_name, source = "password_env", "password resolved");
            return Some(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        debug!(profile = profile_name, source = PASSWORD_ENV, "password resolved");
        return Some(SecretString::from(val));
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            debug!(profile = profile_name, source = "keyring", "password resolved");
            return Some(SecretString::from(secret));
        }
    }

    if let Some(ref pw) = profile.password {
        debug!(profile = profile_name, source = "plaintext", "password resolved");
        return Some(SecretString::from(pw.clone()));
    }

    None
}

// ── Translation ─────────────────────────────────────────────────────

/// Reject hosts that cannot stand in a `host:port` authority.
pub fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "host must not be empty".into(),
        });
    }
    if host.contains("://") {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("expected a bare hostname or IP, got '{host}'"),
        });
    }
    if host.contains(['/', ' ']) {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("'{host}' is not a hostname"),
        });
    }
    Ok(())
}

/// Build an `Instance` from a profile. No CLI flag overrides.
pub fn profile_to_instance(profile: &Profile, profile_name: &str) -> Result<Instance, ConfigError> {
    validate_host(&profile.host)?;
    let instance = Instance::new(profile.host.clone(), profile.port);
    Ok(match resolve_password(profile, profile_name) {
        Some(pw) => instance.with_password(pw),
        None => instance,
    })
}

/// Transport settings for a profile, falling back to the global defaults.
pub fn transport_config(profile: Option<&Profile>, defaults: &Defaults) -> TransportConfig {
    let secs = profile
        .and_then(|p| p.timeout)
        .unwrap_or(defaults.timeout);
    TransportConfig::default().with_timeout(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
host = "192.168.1.2"

[profiles.lab]
host = "pi.hole"
port = 8080
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("home"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.profile("home").unwrap().port, 80);
        assert_eq!(cfg.profile("lab").unwrap().port, 8080);
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut profile = Profile::new("10.0.0.53");
        profile.password_env = Some("LAB_PIHOLE_PW".into());
        cfg.profiles.insert("default".into(), profile);
        save_config_to(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("host = \"10.0.0.53\""));
        assert!(!written.contains("password ="));

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn host_validation() {
        assert!(validate_host("pi.hole").is_ok());
        assert!(validate_host("192.168.1.2").is_ok());
        assert!(validate_host("").is_err());
        assert!(validate_host("http://pi.hole").is_err());
        assert!(validate_host("pi.hole/admin").is_err());
    }

    #[test]
    fn profile_translates_to_instance() {
        let mut profile = Profile::new("pi.hole");
        profile.port = 8080;
        let instance = profile_to_instance(&profile, "phctl-test-no-such-profile").unwrap();
        assert_eq!(instance.address(), "pi.hole:8080");
    }

    #[test]
    fn timeout_prefers_profile_override() {
        let defaults = Defaults::default();
        let mut profile = Profile::new("pi.hole");
        assert_eq!(
            transport_config(Some(&profile), &defaults).timeout,
            Duration::from_secs(30)
        );
        profile.timeout = Some(5);
        assert_eq!(
            transport_config(Some(&profile), &defaults).timeout,
            Duration::from_secs(5)
        );
        assert_eq!(
            transport_config(None, &defaults).timeout,
            Duration::from_secs(30)
        );
    }
}
