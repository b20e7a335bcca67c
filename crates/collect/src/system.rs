//! Processor, memory and power supply readers.

use std::path::Path;

use serde::Serialize;
use sysprobe_parse::{
    CpuInfo, MemoryInfo, PowerSupply, parse_cpuinfo, parse_meminfo, parse_power_supply_uevent,
};

use crate::command::read_lines;
use crate::error::CollectError;
use crate::platform;

/// Processor, memory and power supplies of this machine.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemReport {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub power_supplies: Vec<PowerSupply>,
}

/// Reads `/proc/cpuinfo`.
pub async fn cpu_info() -> Result<CpuInfo, CollectError> {
    let Some(path) = platform::cpuinfo_path() else {
        return Ok(CpuInfo::default());
    };
    let info = parse_cpuinfo(read_lines(path).await?);
    tracing::debug!(
        logical = info.logical_count(),
        physical = info.physical_count(),
        "cpuinfo decoded"
    );
    Ok(info)
}

/// Reads `/proc/meminfo`.
pub async fn memory_info() -> Result<MemoryInfo, CollectError> {
    let Some(path) = platform::meminfo_path() else {
        return Ok(MemoryInfo::default());
    };
    Ok(parse_meminfo(read_lines(path).await?))
}

/// Reads every power supply's `uevent` file, sorted by name.
pub async fn power_supplies() -> Result<Vec<PowerSupply>, CollectError> {
    let mut supplies = Vec::new();
    for (name, path) in platform::power_supply_uevents() {
        supplies.push(read_uevent(&name, &path).await?);
    }
    tracing::debug!(count = supplies.len(), "power supplies decoded");
    Ok(supplies)
}

async fn read_uevent(name: &str, path: &Path) -> Result<PowerSupply, CollectError> {
    Ok(parse_power_supply_uevent(name, read_lines(path).await?))
}

/// Collects the whole [`SystemReport`]. A source that cannot be read is
/// logged and left empty.
pub async fn system_report() -> SystemReport {
    let cpu = cpu_info().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "cpuinfo unavailable");
        CpuInfo::default()
    });
    let memory = memory_info().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "meminfo unavailable");
        MemoryInfo::default()
    });
    let supplies = power_supplies().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "power supplies unavailable");
        Vec::new()
    });
    SystemReport {
        cpu,
        memory,
        power_supplies: supplies,
    }
}
