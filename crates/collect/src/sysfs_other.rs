//! Stub locations for platforms without procfs/sysfs.

use std::path::{Path, PathBuf};

pub fn net_dev_path() -> Option<&'static Path> {
    None
}

pub fn drm_edid_paths() -> Vec<PathBuf> {
    Vec::new()
}

pub fn cpuinfo_path() -> Option<&'static Path> {
    None
}

pub fn meminfo_path() -> Option<&'static Path> {
    None
}

pub fn power_supply_uevents() -> Vec<(String, PathBuf)> {
    Vec::new()
}
