//! Ranking handlers: top queries, top clients, query types, forward destinations.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;

use pihole_api::{Client, ForwardDestination, TopQueries};

use crate::cli::{GlobalOpts, TopArgs, TopClientsArgs};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

// ── Entries ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct DomainCount {
    domain: String,
    blocked: bool,
    count: u64,
}

#[derive(Debug, Serialize)]
struct ClientCount {
    client: Client,
    count: u64,
}

#[derive(Debug, Serialize)]
struct Share<K> {
    #[serde(rename = "name")]
    key: K,
    percent: f32,
}

fn domain_counts(top: TopQueries) -> Vec<DomainCount> {
    let entries = |map: BTreeMap<String, u64>, blocked: bool| {
        map.into_iter().map(move |(domain, count)| DomainCount {
            domain,
            blocked,
            count,
        })
    };
    let mut out: Vec<_> = entries(top.top_passed, false)
        .chain(entries(top.top_blocked, true))
        .collect();
    out.sort_by(|a, b| a.blocked.cmp(&b.blocked).then(b.count.cmp(&a.count)));
    out
}

fn client_counts(map: BTreeMap<Client, u64>) -> Vec<ClientCount> {
    let mut out: Vec<_> = map
        .into_iter()
        .map(|(client, count)| ClientCount { client, count })
        .collect();
    // Stable sort keeps client order among equal counts
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

fn shares<K>(map: BTreeMap<K, f32>) -> Vec<Share<K>> {
    let mut out: Vec<_> = map
        .into_iter()
        .map(|(key, percent)| Share { key, percent })
        .collect();
    out.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    out
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Verdict")]
    verdict: &'static str,
    #[tabled(rename = "Requests")]
    count: u64,
}

impl From<&DomainCount> for DomainRow {
    fn from(d: &DomainCount) -> Self {
        Self {
            domain: d.domain.clone(),
            verdict: if d.blocked { "blocked" } else { "permitted" },
            count: d.count,
        }
    }
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Client")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Requests")]
    count: u64,
}

impl From<&ClientCount> for ClientRow {
    fn from(c: &ClientCount) -> Self {
        Self {
            name: c.client.name.clone().unwrap_or_default(),
            ip: c.client.ip.clone(),
            count: c.count,
        }
    }
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Share")]
    percent: String,
}

impl<K: std::fmt::Display> From<&Share<K>> for ShareRow {
    fn from(s: &Share<K>) -> Self {
        Self {
            name: s.key.to_string(),
            percent: format!("{:.2}%", s.percent),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn queries(ctx: &Context, args: &TopArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let top = ctx
        .handle
        .get_top_queries(args.count)
        .await
        .map_err(|e| ctx.api_err(e))?;
    let entries = domain_counts(top);
    let out = output::render_list(&global.output, &entries, |d| DomainRow::from(d), |d| {
        d.domain.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn clients(
    ctx: &Context,
    args: &TopClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ranked = if args.blocked {
        ctx.handle.get_top_blocked_clients(args.count).await
    } else {
        ctx.handle.get_top_clients(args.count).await
    }
    .map_err(|e| ctx.api_err(e))?;

    let entries = client_counts(ranked);
    let out = output::render_list(&global.output, &entries, |c| ClientRow::from(c), |c| {
        c.client.ip.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn query_types(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let types = ctx
        .handle
        .get_query_types()
        .await
        .map_err(|e| ctx.api_err(e))?;
    let entries = shares(types);
    let out = output::render_list(
        &global.output,
        &entries,
        |s| ShareRow::from(s),
        |s| s.key.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn forward_destinations(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let destinations: BTreeMap<ForwardDestination, f32> = ctx
        .handle
        .get_forward_destinations()
        .await
        .map_err(|e| ctx.api_err(e))?;
    let entries = shares(destinations);
    let out = output::render_list(&global.output, &entries, |s| ShareRow::from(s), |s| {
        s.key.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn permitted_domains_come_first_by_count() {
        let top = TopQueries {
            top_passed: [("a.example".to_owned(), 5), ("b.example".to_owned(), 9)]
                .into_iter()
                .collect(),
            top_blocked: [("ads.example".to_owned(), 20)].into_iter().collect(),
        };
        let entries = domain_counts(top);
        let order: Vec<_> = entries.iter().map(|d| d.domain.as_str()).collect();
        assert_eq!(order, ["b.example", "a.example", "ads.example"]);
        assert!(entries[2].blocked);
    }

    #[test]
    fn clients_rank_by_count() {
        let map: BTreeMap<Client, u64> = [
            (Client::new("192.168.1.20", Some("laptop".into())), 4),
            (Client::new("192.168.1.21", None), 40),
        ]
        .into_iter()
        .collect();
        let entries = client_counts(map);
        assert_eq!(entries[0].client.ip, "192.168.1.21");
        assert_eq!(ClientRow::from(&entries[1]).name, "laptop");
    }

    #[test]
    fn shares_render_as_percentages() {
        let map: BTreeMap<ForwardDestination, f32> = [
            (ForwardDestination::Cache, 31.5),
            (
                ForwardDestination::Remote {
                    name: "dns.google".into(),
                    ip: "8.8.8.8".into(),
                },
                60.25,
            ),
        ]
        .into_iter()
        .collect();
        let entries = shares(map);
        let row = ShareRow::from(&entries[0]);
        assert_eq!(row.name, "dns.google|8.8.8.8");
        assert_eq!(row.percent, "60.25%");
    }
}
