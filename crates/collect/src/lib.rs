//! Collectors feeding the sysprobe decoders.
//!
//! Runs the wireless scan tools and `xrandr`, reads `/proc/net/dev`,
//! `/proc/cpuinfo`, `/proc/meminfo`, the power supply `uevent` files and the
//! DRM connector EDIDs, and hands the raw output to `sysprobe-parse`.
//! Everything that blocks lives here; the decoders stay pure.

mod command;
mod display;
mod error;
mod system;
mod wireless;

#[cfg(target_os = "linux")]
#[path = "sysfs_linux.rs"]
mod platform;

#[cfg(not(target_os = "linux"))]
#[path = "sysfs_other.rs"]
mod platform;

pub use command::{read_bytes, read_lines, run_command};
pub use display::{
    DisplayFailure, DisplayScan, DisplaySource, collect_displays, decode_xrandr_output,
    displays_from_drm, displays_from_xrandr,
};
pub use error::CollectError;
pub use system::{SystemReport, cpu_info, memory_info, power_supplies, system_report};
pub use wireless::{
    ScanOptions, ScanTool, parse_net_dev, scan_all, scan_interface, wireless_interfaces,
};
