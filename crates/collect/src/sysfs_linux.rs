//! Linux procfs/sysfs locations.

use std::path::{Path, PathBuf};

const NET_DEV: &str = "/proc/net/dev";
const CPUINFO: &str = "/proc/cpuinfo";
const MEMINFO: &str = "/proc/meminfo";
const DRM_ROOT: &str = "/sys/class/drm";
const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Interface statistics table listing every network device.
pub fn net_dev_path() -> Option<&'static Path> {
    Some(Path::new(NET_DEV))
}

pub fn cpuinfo_path() -> Option<&'static Path> {
    Some(Path::new(CPUINFO))
}

pub fn meminfo_path() -> Option<&'static Path> {
    Some(Path::new(MEMINFO))
}

/// `(name, uevent path)` of every power supply, sorted by name.
pub fn power_supply_uevents() -> Vec<(String, PathBuf)> {
    uevents_in(Path::new(POWER_SUPPLY_ROOT))
}

fn uevents_in(root: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = std::fs::read_dir(root) else {
        tracing::debug!(root = %root.display(), "no power_supply class directory");
        return Vec::new();
    };

    let mut supplies: Vec<_> = entries
        .flatten()
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            let uevent = e.path().join("uevent");
            uevent.exists().then_some((name, uevent))
        })
        .collect();
    supplies.sort();
    supplies
}

/// EDID files of all DRM connectors, sorted by connector name.
///
/// Disconnected connectors still expose an (empty) `edid` file.
pub fn drm_edid_paths() -> Vec<PathBuf> {
    edid_paths_in(Path::new(DRM_ROOT))
}

/// Connectors are `card<N>-<type>-<M>` entries; bare `card<N>` and
/// `renderD*` nodes carry no EDID.
fn edid_paths_in(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        tracing::debug!(root = %root.display(), "no DRM class directory");
        return Vec::new();
    };

    let mut connectors: Vec<_> = entries
        .flatten()
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with("card") && n.contains('-'))
        })
        .collect();
    connectors.sort_by_key(|e| e.file_name());

    connectors
        .into_iter()
        .map(|e| e.path().join("edid"))
        .filter(|p| p.exists())
        .collect()
}
