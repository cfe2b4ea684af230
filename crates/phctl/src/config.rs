//! CLI configuration -- thin wrapper around `pihole_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--host, --port, --password, ...).

use std::time::Duration;

use secrecy::SecretString;

use pihole_api::{Instance, TransportConfig, instance::DEFAULT_PORT};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use pihole_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Everything needed to open a `Handle` for one command.
#[derive(Debug)]
pub struct Target {
    pub profile: String,
    pub instance: Instance,
    pub transport: TransportConfig,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names, `(none)` when empty.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build the target Pi-hole from the config file, profile, and CLI overrides.
///
/// CLI flag overrides take priority over profile values. Without a matching
/// profile, `--host` alone is enough for anonymous or `--password` access.
pub fn resolve_target(global: &GlobalOpts, config: &Config) -> Result<Target, CliError> {
    let profile_name = active_profile_name(global, config);

    let Some(profile) = config.profiles.get(&profile_name) else {
        return resolve_without_profile(global, config, profile_name);
    };

    // 1. Host and port (flag > env > profile)
    let host = global.host.clone().unwrap_or_else(|| profile.host.clone());
    pihole_config::validate_host(&host)?;
    let port = global.port.unwrap_or(profile.port);

    // 2. Password (flag > password_env > PIHOLE_PASSWORD > keyring > plaintext)
    let password = global
        .password
        .clone()
        .map(SecretString::from)
        .or_else(|| pihole_config::resolve_password(profile, &profile_name));

    // 3. Timeout (flag > profile > defaults)
    let transport = match global.timeout {
        Some(secs) => TransportConfig::default().with_timeout(Duration::from_secs(secs)),
        None => pihole_config::transport_config(Some(profile), &config.defaults),
    };

    Ok(Target {
        profile: profile_name,
        instance: with_password(Instance::new(host, port), password),
        transport,
    })
}

fn resolve_without_profile(
    global: &GlobalOpts,
    config: &Config,
    profile_name: String,
) -> Result<Target, CliError> {
    let Some(host) = global.host.clone() else {
        // An explicitly named profile that doesn't exist is the more useful error.
        if global.profile.is_some() {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };
    pihole_config::validate_host(&host)?;

    let secs = global.timeout.unwrap_or(config.defaults.timeout);
    let instance = Instance::new(host, global.port.unwrap_or(DEFAULT_PORT));

    Ok(Target {
        profile: profile_name,
        instance: with_password(instance, global.password.clone().map(SecretString::from)),
        transport: TransportConfig::default().with_timeout(Duration::from_secs(secs)),
    })
}

fn with_password(instance: Instance, password: Option<SecretString>) -> Instance {
    match password {
        Some(pw) => instance.with_password(pw),
        None => instance,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["phctl"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(name: &str, profile: Profile) -> Config {
        let mut cfg = Config::default();
        cfg.default_profile = Some(name.into());
        cfg.profiles.insert(name.into(), profile);
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let mut profile = Profile::new("pi.hole");
        profile.timeout = Some(5);
        let cfg = config_with("home", profile);

        let target =
            resolve_target(&global(&["--host", "10.0.0.2", "--port", "8080"]), &cfg).unwrap();
        assert_eq!(target.profile, "home");
        assert_eq!(target.instance.address(), "10.0.0.2:8080");
    }

    #[test]
    fn profile_supplies_host_and_port() {
        let mut profile = Profile::new("pi.hole");
        profile.port = 8081;
        let cfg = config_with("home", profile);

        let target = resolve_target(&global(&[]), &cfg).unwrap();
        assert_eq!(target.instance.address(), "pi.hole:8081");
    }

    #[test]
    fn host_flag_works_without_profile() {
        let target = resolve_target(&global(&["-H", "192.168.1.2"]), &Config::default()).unwrap();
        assert_eq!(target.instance.address(), "192.168.1.2:80");
    }

    #[test]
    fn missing_host_is_no_config() {
        let err = resolve_target(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn unknown_named_profile_lists_available() {
        let cfg = config_with("home", Profile::new("pi.hole"));
        let err = resolve_target(&global(&["--profile", "office"]), &cfg).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "office");
                assert_eq!(available, "home");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn url_shaped_host_is_rejected() {
        let err =
            resolve_target(&global(&["--host", "http://pi.hole"]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
