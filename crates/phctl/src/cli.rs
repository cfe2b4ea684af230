//! Clap derive structures for the `phctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// phctl -- query and control Pi-hole from the command line
#[derive(Debug, Parser)]
#[command(
    name = "phctl",
    version,
    about = "Query and control Pi-hole DNS sinkholes from the command line",
    long_about = "A CLI for the Pi-hole admin API.\n\n\
        Reads dashboard counters, rankings, timelines and the network inventory,\n\
        and toggles blocking. Authenticates with the web interface password.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Pi-hole profile to use
    #[arg(long, short = 'p', env = "PIHOLE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Pi-hole hostname or IP (overrides profile)
    #[arg(long, short = 'H', env = "PIHOLE_HOST", global = true)]
    pub host: Option<String>,

    /// Admin interface port (overrides profile)
    #[arg(long, env = "PIHOLE_PORT", global = true)]
    pub port: Option<u16>,

    /// Web interface password
    #[arg(
        long,
        env = "PIHOLE_PASSWORD",
        global = true,
        hide_env_values = true,
        hide = true
    )]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PIHOLE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile and defaults)
    #[arg(long, env = "PIHOLE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard counters and blocking state
    #[command(alias = "st")]
    Status,

    /// Show raw summary counters and gravity database health
    Summary,

    /// Show host telemetry scraped from the dashboard
    #[command(alias = "hw")]
    Hardware,

    /// Most requested domains today, permitted and blocked
    TopQueries(TopArgs),

    /// Busiest clients today
    TopClients(TopClientsArgs),

    /// Query type breakdown today
    QueryTypes,

    /// Share of queries answered by each upstream
    #[command(alias = "forwards")]
    ForwardDestinations,

    /// Request timelines
    #[command(alias = "tl")]
    Timeline(TimelineArgs),

    /// Devices seen on the network
    #[command(alias = "net")]
    Network,

    /// Enable blocking
    Enable,

    /// Disable blocking, optionally for a limited time
    Disable(DisableArgs),

    /// Authenticate and show which credential forms were accepted
    Auth,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Rankings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TopArgs {
    /// Number of entries to request
    #[arg(long, short = 'n', default_value = "10")]
    pub count: u32,
}

#[derive(Debug, Args)]
pub struct TopClientsArgs {
    /// Number of entries to request
    #[arg(long, short = 'n', default_value = "10")]
    pub count: u32,

    /// Rank by blocked requests instead of all requests
    #[arg(long, short = 'b')]
    pub blocked: bool,
}

// ── Timelines ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TimelineArgs {
    #[command(subcommand)]
    pub command: TimelineCommand,
}

#[derive(Debug, Subcommand)]
pub enum TimelineCommand {
    /// Blocked vs. permitted requests over time
    Ratio {
        /// Start of the range (epoch seconds); reads the long-term database
        #[arg(long, requires = "until")]
        from: Option<i64>,

        /// End of the range (epoch seconds)
        #[arg(long, requires = "from")]
        until: Option<i64>,

        /// Bucket size in seconds for ranged queries
        #[arg(long, default_value = "600")]
        interval: u64,
    },

    /// Per-client requests over time
    Clients {
        /// Emit one record list per client, dropping empty intervals
        #[arg(long)]
        sparse: bool,
    },
}

// ── Blocking ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DisableArgs {
    /// Re-enable automatically after this many seconds
    #[arg(long, short = 'd')]
    pub duration: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Key (host, port, password-env, timeout)
        key: String,
        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store the web password in the system keyring
    SetPassword {
        /// Profile name (defaults to active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
