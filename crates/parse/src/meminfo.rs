//! `/proc/meminfo` decoder.

use serde::Serialize;

use crate::error::ParseError;
use crate::fields::{digits_only, parse_number};

/// Memory and swap totals, in KiB as the kernel reports them.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    pub total_kib: Option<u64>,
    /// `MemAvailable`, or an estimate on kernels older than 3.14.
    pub available_kib: Option<u64>,
    pub swap_total_kib: Option<u64>,
    pub swap_free_kib: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
}

impl MemoryInfo {
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_kib.map(|kib| kib * 1024)
    }

    pub fn available_bytes(&self) -> Option<u64> {
        self.available_kib.map(|kib| kib * 1024)
    }
}

/// Counters summed when `MemAvailable` is missing.
const RECLAIMABLE: [&str; 4] = ["MemFree", "Active(file)", "Inactive(file)", "SReclaimable"];

/// Field name reported for a meminfo key, or `None` for keys not read.
fn field_for(key: &str) -> Option<&'static str> {
    match key {
        "MemTotal" => Some("total"),
        "MemAvailable" => Some("available"),
        "SwapTotal" => Some("swap_total"),
        "SwapFree" => Some("swap_free"),
        k if RECLAIMABLE.contains(&k) => Some("reclaimable"),
        _ => None,
    }
}

/// Parses `/proc/meminfo` content (`MemTotal:       16303428 kB`).
///
/// Unknown keys are ignored. A counter whose value has no digits is
/// reported and left unset.
pub fn parse_meminfo<I, S>(lines: I) -> MemoryInfo
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut info = MemoryInfo::default();
    let mut reclaimable: Option<u64> = None;

    for (idx, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let Some(field) = field_for(key.trim()) else {
            continue;
        };

        let Some(kib) = parse_number::<u64>(&digits_only(value)) else {
            tracing::debug!(field, line = idx + 1, "meminfo counter unreadable");
            info.errors.push(ParseError::field(field, idx + 1, line, "no kB value"));
            continue;
        };

        match field {
            "total" => info.total_kib = Some(kib),
            "available" => info.available_kib = Some(kib),
            "swap_total" => info.swap_total_kib = Some(kib),
            "swap_free" => info.swap_free_kib = Some(kib),
            _ => *reclaimable.get_or_insert(0) += kib,
        }
    }

    if info.available_kib.is_none() {
        info.available_kib = reclaimable;
    }
    info
}
