//! Blocking control and authentication handlers.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use pihole_api::{BlockingState, SessionKind};

use crate::cli::{DisableArgs, GlobalOpts};
use crate::commands::Context;
use crate::error::CliError;
use crate::output::{self, detail_lines, paint_state};

#[derive(Debug, Serialize)]
struct BlockingReport {
    state: BlockingState,
    #[serde(skip_serializing_if = "Option::is_none")]
    reenable_after_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
struct AuthReport {
    host: String,
    session: String,
    cookie: bool,
    api_key: bool,
}

impl AuthReport {
    fn new(host: &str, kind: SessionKind) -> Self {
        Self {
            host: host.into(),
            session: kind.to_string(),
            cookie: matches!(kind, SessionKind::CookieOnly | SessionKind::Both),
            api_key: matches!(kind, SessionKind::ApiKeyOnly | SessionKind::Both),
        }
    }
}

fn verdict(accepted: bool) -> String {
    if accepted { "accepted" } else { "rejected" }.into()
}

fn print_state(report: &BlockingReport, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        report,
        |r| {
            let mut lines = vec![("Blocking", paint_state(r.state, color))];
            if let Some(secs) = r.reenable_after_secs {
                lines.push(("Re-enables in", format!("{secs}s")));
            }
            detail_lines(&lines)
        },
        |r| r.state.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn enable(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let state = ctx.handle.enable().await.map_err(|e| ctx.api_err(e))?;
    info!(%state, "blocking enabled");
    print_state(
        &BlockingReport {
            state,
            reenable_after_secs: None,
        },
        global,
    )
}

pub async fn disable(
    ctx: &Context,
    args: &DisableArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let state = ctx
        .handle
        .disable(args.duration.map(Duration::from_secs))
        .await
        .map_err(|e| ctx.api_err(e))?;
    info!(%state, duration = ?args.duration, "blocking disabled");
    print_state(
        &BlockingReport {
            state,
            reenable_after_secs: args.duration,
        },
        global,
    )
}

pub async fn auth(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    // Probe even without a password: an appliance with no web password
    // accepts the key derived from the empty string.
    let kind = ctx.authenticate().await?;
    let report = AuthReport::new(ctx.handle.instance().host(), kind);

    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            detail_lines(&[
                ("Host", r.host.clone()),
                ("Session", r.session.clone()),
                ("Login cookie", verdict(r.cookie)),
                ("API key", verdict(r.api_key)),
            ])
        },
        |r| r.session.clone(),
    )?;
    output::print_output(&out, global.quiet);

    if kind == SessionKind::Unauthenticated {
        return Err(CliError::AuthFailed {
            profile: ctx.profile.clone(),
        });
    }
    Ok(())
}
