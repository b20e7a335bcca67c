//! Command dispatch.

use std::path::Path;

use serde::Serialize;
use sysprobe_collect::{
    DisplayScan, DisplaySource, ScanTool, SystemReport, collect_displays, decode_xrandr_output,
    scan_all, scan_interface, system_report,
};
use sysprobe_parse::{
    ScanGrammar, WirelessScan, decode_edid, parse_cpuinfo, parse_meminfo,
    parse_power_supply_uevent, parse_wireless_scan,
};

use crate::config::ProbeConfig;
use crate::{Command, DecodeFormat, SourceArg, ToolArg};

impl From<ToolArg> for ScanTool {
    fn from(arg: ToolArg) -> Self {
        match arg {
            ToolArg::Iw => ScanTool::Iw,
            ToolArg::Iwlist => ScanTool::Iwlist,
            ToolArg::Auto => ScanTool::Auto,
        }
    }
}

impl From<SourceArg> for DisplaySource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Xrandr => DisplaySource::Xrandr,
            SourceArg::Drm => DisplaySource::Drm,
            SourceArg::Auto => DisplaySource::Auto,
        }
    }
}

/// Combined output of `sysprobe all`.
#[derive(Debug, Serialize)]
pub struct Report {
    pub wireless: WirelessScan,
    pub displays: DisplayScan,
    pub system: SystemReport,
}

/// Runs one command and returns its JSON document.
pub async fn run(command: Command, config: ProbeConfig) -> anyhow::Result<serde_json::Value> {
    let value = match command {
        Command::Wireless {
            interface,
            tool,
            sudo,
        } => {
            let mut options = config.scan_options();
            if let Some(tool) = tool {
                options.tool = tool.into();
            }
            options.use_sudo |= sudo;

            let scan = match interface {
                Some(interface) => {
                    let mut scan =
                        scan_interface(&interface, options.tool, options.use_sudo).await?;
                    scan.sort_by_ssid();
                    scan
                }
                None => scan_all(&options).await?,
            };
            serde_json::to_value(scan)?
        }
        Command::Displays { source } => {
            let source = source.map(DisplaySource::from).unwrap_or(config.display_source);
            serde_json::to_value(collect_displays(source).await?)?
        }
        Command::System => serde_json::to_value(system_report().await)?,
        Command::All => {
            let wireless = match scan_all(&config.scan_options()).await {
                Ok(scan) => scan,
                Err(e) => {
                    tracing::warn!(error = %e, "wireless scan unavailable");
                    WirelessScan::default()
                }
            };
            let displays = match collect_displays(config.display_source).await {
                Ok(scan) => scan,
                Err(e) => {
                    tracing::warn!(error = %e, "display discovery unavailable");
                    DisplayScan::default()
                }
            };
            let system = system_report().await;
            serde_json::to_value(Report {
                wireless,
                displays,
                system,
            })?
        }
        Command::Decode { format, path } => decode_file(format, &path).await?,
    };
    Ok(value)
}

/// Decodes a captured file without touching the hardware.
async fn decode_file(format: DecodeFormat, path: &Path) -> anyhow::Result<serde_json::Value> {
    let value = match format {
        DecodeFormat::Iw | DecodeFormat::Iwlist => {
            let grammar = if format == DecodeFormat::Iw {
                ScanGrammar::Iw
            } else {
                ScanGrammar::Iwlist
            };
            let lines = sysprobe_collect::read_lines(path).await?;
            let mut scan = parse_wireless_scan(&lines, grammar);
            scan.sort_by_ssid();
            serde_json::to_value(scan)?
        }
        DecodeFormat::Xrandr => {
            let lines = sysprobe_collect::read_lines(path).await?;
            serde_json::to_value(decode_xrandr_output(&lines))?
        }
        DecodeFormat::Edid => {
            let bytes = sysprobe_collect::read_bytes(path).await?;
            serde_json::to_value(decode_edid(&bytes)?)?
        }
        DecodeFormat::Cpuinfo => {
            let lines = sysprobe_collect::read_lines(path).await?;
            serde_json::to_value(parse_cpuinfo(&lines))?
        }
        DecodeFormat::Meminfo => {
            let lines = sysprobe_collect::read_lines(path).await?;
            serde_json::to_value(parse_meminfo(&lines))?
        }
        DecodeFormat::Uevent => {
            let name = path
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
                .unwrap_or("unknown");
            let lines = sysprobe_collect::read_lines(path).await?;
            serde_json::to_value(parse_power_supply_uevent(name, &lines))?
        }
    };
    Ok(value)
}
