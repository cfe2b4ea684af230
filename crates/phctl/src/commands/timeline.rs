//! Timeline handlers: request ratio and per-client activity.

use std::time::Duration;

use chrono::DateTime;
use serde::Serialize;
use tabled::Tabled;

use pihole_api::{Client, ClientRecord, ClientTimeline, SparseClientTimeline};

use crate::cli::{GlobalOpts, OutputFormat, TimelineArgs, TimelineCommand};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

/// Interval start in UTC, or the raw number when out of range.
fn format_ts(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map_or_else(|| ts.to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

// ── Request ratio ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RatioPoint {
    timestamp: i64,
    blocked: u64,
    permitted: u64,
}

#[derive(Tabled)]
struct RatioRow {
    #[tabled(rename = "Interval (UTC)")]
    time: String,
    #[tabled(rename = "Blocked")]
    blocked: u64,
    #[tabled(rename = "Permitted")]
    permitted: u64,
}

impl From<&RatioPoint> for RatioRow {
    fn from(p: &RatioPoint) -> Self {
        Self {
            time: format_ts(p.timestamp),
            blocked: p.blocked,
            permitted: p.permitted,
        }
    }
}

async fn ratio(
    ctx: &Context,
    range: Option<(i64, i64)>,
    interval: u64,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let timeline = match range {
        Some((from, until)) => {
            if from >= until {
                return Err(CliError::Validation {
                    field: "from".into(),
                    reason: "must be earlier than --until".into(),
                });
            }
            if interval == 0 {
                return Err(CliError::Validation {
                    field: "interval".into(),
                    reason: "must be at least one second".into(),
                });
            }
            ctx.handle
                .get_request_ratio_timeline_between(from, until, Duration::from_secs(interval))
                .await
        }
        None => ctx.handle.get_request_ratio_timeline().await,
    }
    .map_err(|e| ctx.api_err(e))?;

    let points: Vec<RatioPoint> = timeline
        .rows()
        .into_iter()
        .map(|(timestamp, blocked, permitted)| RatioPoint {
            timestamp,
            blocked,
            permitted,
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &points,
        |p| RatioRow::from(p),
        |p| format!("{} {} {}", p.timestamp, p.blocked, p.permitted),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Client activity ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ClientSeries {
    client: Client,
    records: Vec<ClientRecord>,
}

impl ClientSeries {
    fn total(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }
}

#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "Client")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Active intervals")]
    intervals: usize,
    #[tabled(rename = "Requests")]
    total: u64,
    #[tabled(rename = "Last active (UTC)")]
    last: String,
}

impl From<&ClientSeries> for SeriesRow {
    fn from(s: &ClientSeries) -> Self {
        Self {
            name: s.client.name.clone().unwrap_or_default(),
            ip: s.client.ip.clone(),
            intervals: s.records.len(),
            total: s.total(),
            last: s
                .records
                .last()
                .map_or_else(|| "-".into(), |r| format_ts(r.timestamp)),
        }
    }
}

fn sparse_series(timeline: &ClientTimeline) -> Vec<ClientSeries> {
    SparseClientTimeline::from(timeline)
        .records
        .into_iter()
        .map(|(client, records)| ClientSeries { client, records })
        .collect()
}

/// One row per interval, one column per client.
fn client_grid(timeline: &ClientTimeline) -> String {
    let header = std::iter::once("Interval (UTC)".to_owned())
        .chain(timeline.clients.iter().map(|c| c.label().to_owned()))
        .collect();
    let rows = timeline
        .over_time
        .iter()
        .map(|(ts, counts)| {
            let time = ts.parse().map_or_else(|_| ts.clone(), format_ts);
            std::iter::once(time)
                .chain(counts.iter().map(u64::to_string))
                .collect()
        })
        .collect();
    output::render_grid(header, rows)
}

async fn clients(ctx: &Context, sparse: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let timeline = ctx
        .handle
        .get_client_timeline()
        .await
        .map_err(|e| ctx.api_err(e))?;

    let out = if sparse {
        let series = sparse_series(&timeline);
        output::render_list(
            &global.output,
            &series,
            |s| SeriesRow::from(s),
            |s| format!("{} {}", s.client.ip, s.total()),
        )?
    } else if matches!(global.output, OutputFormat::Table) {
        client_grid(&timeline)
    } else {
        output::render_single(&global.output, &timeline, client_grid, |t| {
            t.clients
                .iter()
                .map(|c| c.ip.clone())
                .collect::<Vec<_>>()
                .join("\n")
        })?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &Context,
    args: TimelineArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TimelineCommand::Ratio {
            from,
            until,
            interval,
        } => ratio(ctx, from.zip(until), interval, global).await,
        TimelineCommand::Clients { sparse } => clients(ctx, sparse, global).await,
    }
}
