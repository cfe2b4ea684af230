//! Network inventory handler.

use tabled::Tabled;

use pihole_api::{HardwareAddress, NetworkClient};

use crate::cli::GlobalOpts;
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Hardware address")]
    address: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Queries")]
    queries: u64,
    #[tabled(rename = "Last query (UTC)")]
    last_query: String,
    #[tabled(rename = "Addresses")]
    aliases: String,
}

impl From<&NetworkClient> for DeviceRow {
    fn from(c: &NetworkClient) -> Self {
        let address = match &c.hardware_address {
            HardwareAddress::Mac(mac) => mac.clone(),
            HardwareAddress::Ip(ip) => format!("(ip) {ip}"),
        };
        Self {
            address,
            interface: c.interface.clone(),
            vendor: c.vendor.clone(),
            queries: c.query_count,
            last_query: c.last_query.format("%Y-%m-%d %H:%M").to_string(),
            aliases: c
                .aliases
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let mut devices = ctx.handle.get_network().await.map_err(|e| ctx.api_err(e))?;
    devices.sort_by(|a, b| b.last_query.cmp(&a.last_query));

    let out = output::render_list(
        &global.output,
        &devices,
        |c| DeviceRow::from(c),
        |c| c.hardware_address.as_str().to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
