//! sysprobe entry point.

mod app;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Print wireless networks, attached displays and system hardware as JSON.
#[derive(Parser, Debug)]
#[command(name = "sysprobe", version, about)]
pub struct Cli {
    /// Configuration file (default: ~/.config/sysprobe/sysprobe.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan wireless networks on every wireless interface, or one.
    Wireless {
        /// Scan only this interface.
        #[arg(long)]
        interface: Option<String>,

        /// Override the configured scan tool.
        #[arg(long, value_enum)]
        tool: Option<ToolArg>,

        /// Run the scan tool through `sudo -n`.
        #[arg(long)]
        sudo: bool,
    },

    /// Decode the EDIDs of attached displays.
    Displays {
        /// Override the configured EDID source.
        #[arg(long, value_enum)]
        source: Option<SourceArg>,
    },

    /// Processors, memory and power supplies.
    System,

    /// Everything above in one report.
    All,

    /// Decode captured tool output from a file.
    Decode {
        #[arg(value_enum)]
        format: DecodeFormat,
        path: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ToolArg {
    Iw,
    Iwlist,
    Auto,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SourceArg {
    Xrandr,
    Drm,
    Auto,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeFormat {
    /// `iw <dev> scan` output.
    Iw,
    /// `iwlist <dev> scanning` output.
    Iwlist,
    /// `xrandr --verbose` output.
    Xrandr,
    /// A raw EDID blob, e.g. `/sys/class/drm/card0-DP-1/edid`.
    Edid,
    /// `/proc/cpuinfo` content.
    Cpuinfo,
    /// `/proc/meminfo` content.
    Meminfo,
    /// A power supply `uevent` file; the supply is named after its directory.
    Uevent,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::ProbeConfig::load_from(path)?,
        None => config::ProbeConfig::load()?,
    };
    tracing::debug!(?config, "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(app::run(cli.command, config))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
