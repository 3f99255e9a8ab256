//! Bridge command handlers.

use std::time::Duration;

use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use huecolors_core::{BridgeInfo, Device, DiscoveredBridge, HueSession, format_identifier};

use crate::cli::{BridgeArgs, BridgeCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DiscoveredRow {
    #[tabled(rename = "Bridge")]
    id: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Port")]
    port: u16,
}

impl From<&DiscoveredBridge> for DiscoveredRow {
    fn from(b: &DiscoveredBridge) -> Self {
        Self {
            id: format_identifier(&b.id),
            address: b.internal_ip_address.clone(),
            port: b.port,
        }
    }
}

#[derive(Tabled)]
struct CachedRow {
    #[tabled(rename = "#")]
    id: i64,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Bridge")]
    bridge_id: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Authorized")]
    authorized: String,
}

impl From<&BridgeInfo> for CachedRow {
    fn from(b: &BridgeInfo) -> Self {
        Self {
            id: b.id,
            hostname: b.hostname.clone(),
            bridge_id: format_identifier(&b.bridge_id),
            port: b.port,
            authorized: if b.has_credentials() { "yes" } else { "no" }.into(),
        }
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Legacy ID")]
    v1_id: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.clone(),
            name: d.metadata.name.clone(),
            product: d
                .product_data
                .as_ref()
                .and_then(|p| p.product_name.clone())
                .unwrap_or_default(),
            v1_id: d.id_v1.clone().unwrap_or_default(),
        }
    }
}

/// What `bridge status` reports.
#[derive(Debug, Serialize)]
struct BridgeStatus {
    hostname: Option<String>,
    bridge_id: Option<String>,
    authorized: bool,
}

fn status_detail(s: &BridgeStatus) -> String {
    [
        format!("Bridge:     {}", s.hostname.as_deref().unwrap_or("(none selected)")),
        format!(
            "ID:         {}",
            s.bridge_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .map_or_else(|| "-".into(), format_identifier)
        ),
        format!("Authorized: {}", if s.authorized { "yes" } else { "no" }),
    ]
    .join("\n")
}

fn bridge_detail(b: &BridgeInfo) -> String {
    [
        format!("Hostname: {}", b.hostname),
        format!("Bridge:   {}", format_identifier(&b.bridge_id)),
        format!("Port:     {}", b.port),
        format!(
            "Paired:   {}",
            if b.has_credentials() { "yes" } else { "no" }
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &HueSession,
    args: BridgeArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match args.command {
        BridgeCommand::Discover => {
            let bridges = session.discover_bridges().await?;
            if bridges.is_empty() {
                return Err(CliError::NoBridgesFound);
            }
            let out = output::render_list(
                global.output_format(),
                &bridges,
                |b| DiscoveredRow::from(b),
                |b| b.internal_ip_address.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BridgeCommand::Select { address } => {
            let bridge = match address {
                Some(address) => session.select_address(&address).await?,
                None => {
                    let discovered = pick_discovered(session).await?;
                    session.select_bridge(&discovered).await?
                }
            };
            let out = output::render_single(
                global.output_format(),
                &bridge,
                bridge_detail,
                |b| b.hostname.clone(),
            )?;
            output::print_output(&out, global.quiet);
            if !global.quiet {
                eprintln!("Next: press the link button and run `huecolors bridge authorize`");
            }
            Ok(())
        }

        BridgeCommand::Authorize { host } => {
            if let Some(host) = host {
                if host.contains("://") {
                    session.select_host(&host, "").await?;
                } else {
                    session.select_address(&host).await?;
                }
            }

            let hostname = session
                .selected_hostname()
                .await
                .ok_or(CliError::NoBridgeSelected)?;

            let spinner = link_button_spinner(&hostname, global.quiet);
            let result = session.authorize_bridge(cancel).await;
            spinner.finish_and_clear();

            let bridge = result?;
            let out = output::render_single(
                global.output_format(),
                &bridge,
                bridge_detail,
                |b| b.hostname.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BridgeCommand::Status => {
            let hostname = session.selected_hostname().await;
            let bridge = match hostname {
                Some(ref h) => session.cache().bridge_by_hostname(h)?,
                None => None,
            };
            let status = BridgeStatus {
                authorized: bridge.as_ref().is_some_and(BridgeInfo::has_credentials),
                bridge_id: bridge.map(|b| b.bridge_id),
                hostname,
            };
            let out = output::render_single(
                global.output_format(),
                &status,
                status_detail,
                |s| s.hostname.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BridgeCommand::List => {
            let bridges = session.cache().bridges()?;
            let out = output::render_list(
                global.output_format(),
                &bridges,
                |b| CachedRow::from(b),
                |b| b.hostname.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BridgeCommand::Devices => {
            let devices = session.grouped_devices().await?;
            let out = output::render_list(
                global.output_format(),
                &devices,
                |d| DeviceRow::from(d),
                |d| d.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Discover bridges and let the user pick one. A single bridge is taken
/// without asking.
async fn pick_discovered(session: &HueSession) -> Result<DiscoveredBridge, CliError> {
    let mut bridges = session.discover_bridges().await?;
    match bridges.len() {
        0 => Err(CliError::NoBridgesFound),
        1 => Ok(bridges.remove(0)),
        _ => {
            let items: Vec<String> = bridges
                .iter()
                .map(|b| format!("{}  {}", format_identifier(&b.id), b.internal_ip_address))
                .collect();
            let choice = Select::new()
                .with_prompt("Select a bridge")
                .items(&items)
                .default(0)
                .interact()
                .map_err(util::prompt_err)?;
            Ok(bridges.swap_remove(choice))
        }
    }
}

fn link_button_spinner(hostname: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Press the link button on the bridge at {hostname}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
