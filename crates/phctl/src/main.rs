mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pihole_api::Handle;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a Pi-hole connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "phctl", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to the appliance
        cmd => {
            let cfg = config::load_config_or_default();
            let target = config::resolve_target(&cli.global, &cfg)?;
            let handle = Handle::with_transport(target.instance, &target.transport)?;

            let ctx = commands::Context {
                handle,
                profile: target.profile,
            };

            tracing::debug!(command = ?cmd, host = ctx.handle.instance().host(), "dispatching command");
            commands::dispatch(cmd, &ctx, &cli.global).await
        }
    }
}
