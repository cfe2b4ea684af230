//! Command dispatch: bridges CLI args -> `Handle` operations -> output formatting.

pub mod blocking;
pub mod config_cmd;
pub mod dashboard;
pub mod network;
pub mod timeline;
pub mod top;

use tracing::{debug, warn};

use pihole_api::{Handle, SessionKind};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// A connected appliance plus the profile it was resolved from.
pub struct Context {
    pub handle: Handle,
    pub profile: String,
}

impl Context {
    /// Authenticate when a password is configured; otherwise stay anonymous.
    pub async fn login(&self) -> Result<(), CliError> {
        if self.handle.instance().password().is_none() {
            debug!("no password configured, continuing unauthenticated");
            return Ok(());
        }
        let kind = self.authenticate().await?;
        if kind == SessionKind::Unauthenticated {
            warn!(profile = %self.profile, "Pi-hole accepted neither the password nor the API key");
        }
        Ok(())
    }

    pub async fn authenticate(&self) -> Result<SessionKind, CliError> {
        self.handle.authenticate().await.map_err(|e| self.api_err(e))
    }

    /// Wrap a core error with this context's profile and host.
    pub fn api_err(&self, err: pihole_api::Error) -> CliError {
        CliError::from_api(err, &self.profile, self.handle.instance().host())
    }
}

/// Dispatch an appliance-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    // `auth` reports on authentication itself
    if !matches!(cmd, Command::Auth) {
        ctx.login().await?;
    }

    match cmd {
        Command::Status => dashboard::status(ctx, global).await,
        Command::Summary => dashboard::summary(ctx, global).await,
        Command::Hardware => dashboard::hardware(ctx, global).await,
        Command::TopQueries(args) => top::queries(ctx, &args, global).await,
        Command::TopClients(args) => top::clients(ctx, &args, global).await,
        Command::QueryTypes => top::query_types(ctx, global).await,
        Command::ForwardDestinations => top::forward_destinations(ctx, global).await,
        Command::Timeline(args) => timeline::handle(ctx, args, global).await,
        Command::Network => network::handle(ctx, global).await,
        Command::Enable => blocking::enable(ctx, global).await,
        Command::Disable(args) => blocking::disable(ctx, &args, global).await,
        Command::Auth => blocking::auth(ctx, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
