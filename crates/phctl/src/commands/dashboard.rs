//! Dashboard handlers: status, summary, hardware.

use pihole_api::{HardwareInfo, Status, Summary};

use crate::cli::GlobalOpts;
use crate::commands::Context;
use crate::error::CliError;
use crate::output::{self, detail_lines, opt, paint_state};

// ── Detail views ────────────────────────────────────────────────────

fn status_detail(s: &Status, color: bool) -> String {
    detail_lines(&[
        ("Blocking", paint_state(s.state, color)),
        ("Domains on blocklist", s.blocked_domain_count.to_string()),
        ("DNS queries today", s.dns_queries_today.to_string()),
        ("Ads blocked today", s.ads_blocked_today.to_string()),
        ("Blocked share", format!("{:.2}%", s.percent_ads_today)),
        ("Unique domains", s.unique_domain_count.to_string()),
        ("Forwarded", s.forwarded_query_count.to_string()),
        ("Cached", s.cached_query_count.to_string()),
        ("Clients ever seen", s.total_client_count.to_string()),
        ("Unique clients", s.unique_client_count.to_string()),
        ("Queries (all types)", s.total_dns_count.to_string()),
    ])
}

fn summary_detail(s: &Summary, color: bool) -> String {
    let gravity = if s.gravity.exists {
        s.gravity.last_update.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    } else {
        "missing".into()
    };
    detail_lines(&[
        ("Blocking", paint_state(s.state, color)),
        ("Blocklist size", s.blocklist_size.to_string()),
        ("Queries today", s.query_count.to_string()),
        ("Blocked today", s.blocked_query_count.to_string()),
        ("Blocked share", format!("{:.2}%", s.percent_ads)),
        ("Unique domains", s.unique_domain_count.to_string()),
        ("Forwarded", s.forwarded_query_count.to_string()),
        ("Cached", s.cached_query_count.to_string()),
        ("Clients (all time)", s.all_time_client_count.to_string()),
        ("Unique clients", s.unique_client_count.to_string()),
        ("Privacy level", s.privacy_level.to_string()),
        ("Gravity updated", gravity),
    ])
}

fn hardware_detail(h: &HardwareInfo) -> String {
    if h.is_empty() {
        return "No telemetry on the dashboard page (try authenticating)".into();
    }
    detail_lines(&[
        ("Cores", opt(h.core_count, "")),
        ("CPU temperature", opt(h.cpu_temp, "°")),
        ("Load (1m)", opt(h.load_1min, "")),
        ("Load (5m)", opt(h.load_5min, "")),
        ("Load (15m)", opt(h.load_15min, "")),
        ("Memory usage", opt(h.memory_usage, "%")),
    ])
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn status(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let status = ctx.handle.get_status().await.map_err(|e| ctx.api_err(e))?;
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &status,
        |s| status_detail(s, color),
        |s| s.state.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn summary(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let summary = ctx.handle.get_summary().await.map_err(|e| ctx.api_err(e))?;
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &summary,
        |s| summary_detail(s, color),
        |s| s.state.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn hardware(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let info = ctx
        .handle
        .get_hardware_info()
        .await
        .map_err(|e| ctx.api_err(e))?;
    let out = output::render_single(&global.output, &info, hardware_detail, |h| {
        opt(h.load_1min, "")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
