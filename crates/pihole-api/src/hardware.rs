// Dashboard hardware telemetry
//
// The admin dashboard is HTML with no structured equivalent for host
// telemetry, so it is scraped. All markup knowledge lives in the pattern
// table below; each field tries its patterns in order and the first match
// wins. A field whose patterns miss (or whose capture does not parse) is
// simply absent.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::trace;

use crate::error::Error;

/// Host telemetry recovered from the dashboard page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HardwareInfo {
    pub core_count: Option<u32>,
    /// CPU temperature in the unit the dashboard is configured for.
    pub cpu_temp: Option<f32>,
    pub load_1min: Option<f32>,
    pub load_5min: Option<f32>,
    pub load_15min: Option<f32>,
    /// Memory usage percentage, 0 to 100.
    pub memory_usage: Option<f32>,
}

// ── Pattern table ───────────────────────────────────────────────────

struct PatternTable {
    temperature: Vec<Regex>,
    load: Vec<Regex>,
    memory: Vec<Regex>,
    cores: Vec<Regex>,
}

const TEMPERATURE: &[&str] = &[
    r#"(?i)<span id="rawtemp" hidden>(-?\d+(?:\.\d+)?)</span>"#,
    r"(?i)Temp:(?:&nbsp;|\s)+(-?\d+(?:\.\d+)?)(?:&nbsp;|\s)*(?:&deg;|°)?\s*[FCK]?",
];
const LOAD: &[&str] = &[r"(?i)Load:(?:&nbsp;)+([\d.]+)(?:&nbsp;)+([\d.]+)(?:&nbsp;)+([\d.]+)"];
const MEMORY: &[&str] = &[r"(?i)Memory usage:(?:&nbsp;|\s)+([\d.]+)(?:&thinsp;|\s)*%"];
const CORES: &[&str] = &[r"Detected (\d+) core"];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "dropping invalid hardware pattern");
                None
            }
        })
        .collect()
}

static PATTERNS: LazyLock<PatternTable> = LazyLock::new(|| PatternTable {
    temperature: compile(TEMPERATURE),
    load: compile(LOAD),
    memory: compile(MEMORY),
    cores: compile(CORES),
});

fn first_match<'h>(patterns: &[Regex], html: &'h str) -> Option<Captures<'h>> {
    patterns.iter().find_map(|re| re.captures(html))
}

fn group<T: FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

// ── Extraction ──────────────────────────────────────────────────────

impl HardwareInfo {
    /// Extract every field independently. Never fails.
    pub fn from_html(html: &str) -> Self {
        let table = &*PATTERNS;
        let mut info = Self::default();

        match first_match(&table.temperature, html) {
            Some(caps) => info.cpu_temp = group(&caps, 1),
            None => trace!("no temperature in dashboard"),
        }

        match first_match(&table.load, html) {
            Some(caps) => {
                info.load_1min = group(&caps, 1);
                info.load_5min = group(&caps, 2);
                info.load_15min = group(&caps, 3);
            }
            None => trace!("no load averages in dashboard"),
        }

        match first_match(&table.memory, html) {
            Some(caps) => info.memory_usage = group(&caps, 1),
            None => trace!("no memory usage in dashboard"),
        }

        match first_match(&table.cores, html) {
            Some(caps) => info.core_count = group(&caps, 1),
            None => trace!("no core count in dashboard"),
        }

        info
    }

    /// `true` when no field could be extracted.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Decode a raw dashboard body. Fails only when the body is not text.
pub fn extract_hardware_info(body: &[u8]) -> Result<HardwareInfo, Error> {
    let html = std::str::from_utf8(body).map_err(|e| {
        tracing::debug!(error = %e, "dashboard body is not UTF-8");
        Error::unexpected_shape()
    })?;
    Ok(HardwareInfo::from_html(html))
}
