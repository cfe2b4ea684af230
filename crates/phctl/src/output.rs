//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use pihole_api::BlockingState;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Blocking state, green when blocking and red when not.
pub fn paint_state(state: BlockingState, color: bool) -> String {
    if !color {
        return state.to_string();
    }
    match state {
        BlockingState::Enabled => state.green().to_string(),
        BlockingState::Disabled => state.red().to_string(),
        BlockingState::Mixed | BlockingState::Unknown => state.yellow().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one value per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Label/value lines, labels padded to a common width.
pub fn detail_lines(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format an optional measurement, `-` when the dashboard did not show it.
pub fn opt<T: std::fmt::Display>(value: Option<T>, suffix: &str) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v}{suffix}"))
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Table whose columns are only known at runtime.
pub fn render_grid(header: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(
    data: &T,
) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(
    data: &T,
) -> Result<String, CliError> {
    Ok(serde_json::to_string(data)?)
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        domain: String,
        count: u64,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Domain")]
        domain: String,
        #[tabled(rename = "Count")]
        count: u64,
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                domain: "ads.example.com".into(),
                count: 12,
            },
            Item {
                domain: "tracker.example.net".into(),
                count: 3,
            },
        ]
    }

    fn row(item: &Item) -> ItemRow {
        ItemRow {
            domain: item.domain.clone(),
            count: item.count,
        }
    }

    #[test]
    fn plain_emits_one_value_per_line() {
        let out = render_list(&OutputFormat::Plain, &items(), row, |i| i.domain.clone()).unwrap();
        assert_eq!(out, "ads.example.com\ntracker.example.net");
    }

    #[test]
    fn table_has_headers() {
        let out = render_list(&OutputFormat::Table, &items(), row, |i| i.domain.clone()).unwrap();
        assert!(out.contains("Domain"));
        assert!(out.contains("tracker.example.net"));
    }

    #[test]
    fn compact_json_is_single_line() {
        let out =
            render_list(&OutputFormat::JsonCompact, &items(), row, |i| i.domain.clone()).unwrap();
        assert_eq!(
            out,
            r#"[{"domain":"ads.example.com","count":12},{"domain":"tracker.example.net","count":3}]"#
        );
    }

    #[test]
    fn detail_lines_align_labels() {
        let out = detail_lines(&[("State", "enabled".into()), ("Blocklist", "92699".into())]);
        assert_eq!(out, "State      enabled\nBlocklist  92699");
    }

    #[test]
    fn grid_renders_dynamic_columns() {
        let out = render_grid(
            vec!["Time".into(), "laptop".into(), "phone".into()],
            vec![vec!["10:00".into(), "3".into(), "0".into()]],
        );
        assert!(out.contains("laptop"));
        assert!(out.contains("10:00"));
    }

    #[test]
    fn uncolored_state_is_plain_text() {
        assert_eq!(paint_state(BlockingState::Disabled, false), "disabled");
    }
}
