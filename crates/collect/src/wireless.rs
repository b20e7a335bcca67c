//! Wireless interface discovery and scan drivers.

use serde::{Deserialize, Serialize};
use sysprobe_parse::{ScanGrammar, WirelessScan, parse_wireless_scan};

use crate::command::{elevated, read_lines, run_command};
use crate::error::CollectError;
use crate::platform;

/// Which scan tool to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanTool {
    Iw,
    Iwlist,
    /// `iw`, falling back to `iwlist` when `iw` fails.
    #[default]
    Auto,
}

/// How to find and scan wireless interfaces.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub tool: ScanTool,
    /// Run the scan tool through `sudo -n`.
    pub use_sudo: bool,
    /// Interface name prefixes treated as wireless.
    pub prefixes: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tool: ScanTool::Auto,
            use_sudo: false,
            prefixes: vec!["wlan".into(), "wlp".into()],
        }
    }
}

/// Picks the interface names out of `/proc/net/dev` content.
///
/// Data rows look like `  wlan0: 1234 56 ...`; the two header rows have no
/// colon.
pub fn parse_net_dev<S: AsRef<str>>(lines: &[S], prefixes: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| line.as_ref().split_once(':'))
        .map(|(name, _)| name.trim())
        .filter(|name| prefixes.iter().any(|p| name.starts_with(p.as_str())))
        .map(str::to_string)
        .collect()
}

/// Lists the wireless interfaces of this machine.
pub async fn wireless_interfaces(prefixes: &[String]) -> Result<Vec<String>, CollectError> {
    let Some(path) = platform::net_dev_path() else {
        return Ok(Vec::new());
    };
    let lines = read_lines(path).await?;
    let interfaces = parse_net_dev(&lines, prefixes);
    tracing::debug!(?interfaces, "wireless interfaces");
    Ok(interfaces)
}

/// Scans one interface.
pub async fn scan_interface(
    interface: &str,
    tool: ScanTool,
    use_sudo: bool,
) -> Result<WirelessScan, CollectError> {
    match tool {
        ScanTool::Iw => run_scan(interface, ScanGrammar::Iw, use_sudo).await,
        ScanTool::Iwlist => run_scan(interface, ScanGrammar::Iwlist, use_sudo).await,
        ScanTool::Auto => match run_scan(interface, ScanGrammar::Iw, use_sudo).await {
            Ok(scan) => Ok(scan),
            Err(e) => {
                tracing::warn!(interface, error = %e, "iw scan failed, trying iwlist");
                run_scan(interface, ScanGrammar::Iwlist, use_sudo).await
            }
        },
    }
}

async fn run_scan(
    interface: &str,
    grammar: ScanGrammar,
    use_sudo: bool,
) -> Result<WirelessScan, CollectError> {
    let argv = match grammar {
        ScanGrammar::Iw => ["iw", interface, "scan"],
        ScanGrammar::Iwlist => ["iwlist", interface, "scanning"],
    };
    let lines = run_command(&elevated(use_sudo, &argv)).await?;
    let scan = parse_wireless_scan(&lines, grammar);

    for error in &scan.errors {
        tracing::debug!(interface, %error, "scan line skipped");
    }
    tracing::info!(
        interface,
        networks = scan.networks.len(),
        errors = scan.errors.len(),
        "wireless scan complete"
    );
    Ok(scan)
}

/// Scans every wireless interface and merges the results.
///
/// Networks are unique by BSSID and sorted by SSID. An interface whose scan
/// fails is skipped with a warning; the first failure is returned only when
/// no interface could be scanned.
pub async fn scan_all(options: &ScanOptions) -> Result<WirelessScan, CollectError> {
    let interfaces = wireless_interfaces(&options.prefixes).await?;

    let mut merged = WirelessScan::default();
    let mut first_error = None;
    let mut scanned = 0usize;

    for interface in &interfaces {
        match scan_interface(interface, options.tool, options.use_sudo).await {
            Ok(scan) => {
                scanned += 1;
                merged.merge(scan);
            }
            Err(e) => {
                tracing::warn!(interface = %interface, error = %e, "skipping interface");
                first_error.get_or_insert(e);
            }
        }
    }

    if scanned == 0 {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    merged.sort_by_ssid();
    Ok(merged)
}
