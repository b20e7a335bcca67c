//! `/sys/class/power_supply/<name>/uevent` decoder.
//!
//! Each line is `POWER_SUPPLY_<KEY>=<value>`. Batteries report either
//! energy (µWh, `ENERGY_*` with `POWER_NOW` in µW) or charge (µAh,
//! `CHARGE_*` with `CURRENT_NOW` in µA); the two families are never mixed
//! in one file, so both fill the same fields.

use serde::Serialize;

use crate::error::ParseError;
use crate::fields::parse_number;

/// One battery, AC adapter or USB supply.
///
/// Equality uses the supply name only.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSupply {
    pub name: String,
    /// `Battery`, `Mains`, `USB`, ...
    pub kind: Option<String>,
    /// `Charging`, `Discharging`, `Full`, `Not charging`, `Unknown`.
    pub status: Option<String>,
    pub online: Option<bool>,
    pub present: Option<bool>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub technology: Option<String>,
    /// Remaining energy or charge.
    pub capacity_now: Option<u64>,
    /// Energy or charge when full.
    pub capacity_full: Option<u64>,
    /// Present power draw or current.
    pub drain_rate: Option<u64>,
    /// Kernel-computed charge level, 0-100.
    pub capacity_percent: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
}

impl PartialEq for PowerSupply {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PowerSupply {}

impl PowerSupply {
    pub fn is_charging(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("charging"))
    }

    /// Remaining fraction in `0.0..=1.0`, from the counters or the kernel's
    /// percentage.
    pub fn charge_ratio(&self) -> Option<f64> {
        match (self.capacity_now, self.capacity_full) {
            (Some(now), Some(full)) if full > 0 => Some((now as f64 / full as f64).min(1.0)),
            _ => self.capacity_percent.map(|p| f64::from(p) / 100.0),
        }
    }

    /// Seconds until empty at the present drain. `None` while charging or
    /// when the supply reports no drain.
    pub fn seconds_remaining(&self) -> Option<u64> {
        if self.is_charging() {
            return None;
        }
        let now = self.capacity_now?;
        let rate = self.drain_rate.filter(|r| *r > 0)?;
        Some(now.saturating_mul(3600) / rate)
    }
}

/// Parses one `uevent` file. `name` is the supply's directory name, used
/// until a `POWER_SUPPLY_NAME` line says otherwise.
pub fn parse_power_supply_uevent<I, S>(name: &str, lines: I) -> PowerSupply
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut supply = PowerSupply {
        name: name.to_string(),
        ..PowerSupply::default()
    };

    for (idx, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim();
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let Some(key) = key.strip_prefix("POWER_SUPPLY_") else {
            continue;
        };
        let value = value.trim();

        if let Err((field, reason)) = apply(&mut supply, key, value) {
            tracing::debug!(supply = %supply.name, field, %reason, "uevent value unreadable");
            supply.errors.push(ParseError::field(field, idx + 1, line, reason));
        }
    }
    supply
}

fn apply(supply: &mut PowerSupply, key: &str, value: &str) -> Result<(), (&'static str, String)> {
    let text = || Some(value.to_string()).filter(|v| !v.is_empty());
    match key {
        "NAME" if !value.is_empty() => supply.name = value.to_string(),
        "TYPE" => supply.kind = text(),
        "STATUS" => supply.status = text(),
        "MANUFACTURER" => supply.manufacturer = text(),
        "MODEL_NAME" => supply.model = text(),
        "SERIAL_NUMBER" => supply.serial = text(),
        "TECHNOLOGY" => supply.technology = text(),
        "ONLINE" => supply.online = Some(flag("online", value)?),
        "PRESENT" => supply.present = Some(flag("present", value)?),
        "ENERGY_NOW" | "CHARGE_NOW" => {
            supply.capacity_now = Some(counter("capacity_now", value)?);
        }
        "ENERGY_FULL" | "CHARGE_FULL" => {
            supply.capacity_full = Some(counter("capacity_full", value)?);
        }
        "POWER_NOW" | "CURRENT_NOW" => {
            supply.drain_rate = Some(counter("drain_rate", value)?);
        }
        "CAPACITY" => {
            let percent = parse_number::<u8>(value)
                .filter(|p| *p <= 100)
                .ok_or_else(|| ("capacity_percent", format!("not a percentage: {value:?}")))?;
            supply.capacity_percent = Some(percent);
        }
        _ => {}
    }
    Ok(())
}

fn flag(field: &'static str, value: &str) -> Result<bool, (&'static str, String)> {
    match value {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err((field, format!("expected 0 or 1, got {other:?}"))),
    }
}

/// Some drivers report a negative current while discharging; the sign is
/// dropped.
fn counter(field: &'static str, value: &str) -> Result<u64, (&'static str, String)> {
    parse_number::<i64>(value)
        .map(i64::unsigned_abs)
        .ok_or_else(|| (field, format!("not a number: {value:?}")))
}
