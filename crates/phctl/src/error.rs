//! CLI error types with miette diagnostics.
//!
//! Maps `pihole_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use pihole_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Pi-hole at {url}")]
    #[diagnostic(
        code(phctl::connection_failed),
        help(
            "Check that the Pi-hole is running and reachable.\n\
             Try a longer --timeout, or a different --host / --port."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Cannot build a request URL from host '{host}'")]
    #[diagnostic(
        code(phctl::invalid_host),
        help("Use a bare hostname or IP address, without scheme or path.")
    )]
    InvalidHost { host: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication required")]
    #[diagnostic(
        code(phctl::auth_failed),
        help(
            "The Pi-hole rejected the request. Verify the web interface password.\n\
             Run: phctl config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    // ── Appliance ────────────────────────────────────────────────────
    #[error("Unexpected response from Pi-hole")]
    #[diagnostic(
        code(phctl::decode),
        help("The appliance answered, but not in the expected format. Re-run with -vv for details.")
    )]
    Decode {
        #[source]
        source: pihole_api::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(phctl::api))]
    Api(pihole_api::Error),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(phctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(phctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: phctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No Pi-hole host configured")]
    #[diagnostic(
        code(phctl::no_config),
        help(
            "Pass --host, set PIHOLE_HOST, or create a profile with: phctl config init\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(phctl::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(phctl::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(phctl::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::InvalidHost { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach profile and host context to a core error.
    pub fn from_api(err: pihole_api::Error, profile: &str, host: &str) -> Self {
        match err {
            pihole_api::Error::AuthenticationRequired => Self::AuthFailed {
                profile: profile.into(),
            },
            pihole_api::Error::InvalidHostname(_) => Self::InvalidHost { host: host.into() },
            other => other.into(),
        }
    }
}

// ── pihole_api::Error → CliError mapping ─────────────────────────────

impl From<pihole_api::Error> for CliError {
    fn from(err: pihole_api::Error) -> Self {
        match err {
            pihole_api::Error::Transport(e) => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), |u| u.origin().ascii_serialization()),
                source: Box::new(e),
            },
            pihole_api::Error::AuthenticationRequired => Self::AuthFailed {
                profile: "current".into(),
            },
            pihole_api::Error::InvalidHostname(_) => Self::InvalidHost {
                host: "(unknown)".into(),
            },
            err @ pihole_api::Error::Decoding(_) => Self::Decode { source: err },
            other => Self::Api(other),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}
