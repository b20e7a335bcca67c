//! Wireless scan grammars.
//!
//! Two grammars share the record scanner:
//!
//! - [`ScanGrammar::Iw`] reads `iw <dev> scan` output, one record per
//!   `BSS <address>(on <dev>)` stanza.
//! - [`ScanGrammar::Iwlist`] reads the legacy `iwlist <dev> scanning`
//!   output, one record per `Cell NN - Address: <address>` block, with the
//!   interface taken from the preceding `<dev> Scan completed :` line.
//!
//! Security flags are order dependent, as in the tools' own output: a
//! privacy capability provisionally marks a network WEP, and a later RSN or
//! WPA element switches it to WPA.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::encoding::correct_encoding;
use crate::error::ParseError;
use crate::fields::{
    decimal_chars, parse_digits, parse_number, strip_letters, strip_quotes, tokens,
    value_after_colon,
};
use crate::scanner::{self, FieldRule, Grammar, StartLine, no_context};

/// One observed access point.
///
/// Equality and hashing use the BSSID only.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WirelessNetworkRecord {
    /// Interface that saw the network, e.g. `wlan0`.
    pub interface: Option<String>,
    /// Cell ordinal or the driver's cell label (`Cell 01`).
    pub cell: Option<String>,
    /// Lowercase hardware address of the cell.
    pub bssid: String,
    pub channel: Option<u32>,
    pub frequency_mhz: Option<f64>,
    /// Signal quality as a ratio in `0.0..=1.0`.
    pub quality: Option<f64>,
    pub signal_dbm: Option<f64>,
    pub encryption: bool,
    pub wep: bool,
    pub wpa: bool,
    pub ssid: Option<String>,
    pub essid: Option<String>,
    bit_rates: Vec<f64>,
    pub mode: Option<String>,
    /// Timing synchronization function counter (microseconds).
    pub tsf: Option<u64>,
    /// Milliseconds since the last beacon.
    pub last_seen_ms: Option<u32>,
}

impl WirelessNetworkRecord {
    pub fn new(bssid: &str) -> Self {
        Self {
            bssid: bssid.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Returns the extended SSID, falling back to the SSID when unset.
    pub fn essid(&self) -> Option<&str> {
        self.essid.as_deref().or(self.ssid.as_deref())
    }

    /// Advertised bit rates in Mbps, ascending and without duplicates.
    pub fn bit_rates(&self) -> &[f64] {
        &self.bit_rates
    }

    /// Adds a bit rate, keeping the set ordered.
    pub fn add_bit_rate(&mut self, rate: f64) {
        if let Err(pos) = self.bit_rates.binary_search_by(|r| r.total_cmp(&rate)) {
            self.bit_rates.insert(pos, rate);
        }
    }

    /// Display ordering: alphabetic by SSID, networks without one first.
    pub fn cmp_by_ssid(&self, other: &Self) -> Ordering {
        self.ssid.cmp(&other.ssid)
    }

    fn set_ssid(&mut self, raw: &str) {
        let ssid = correct_encoding(raw);
        self.essid = Some(ssid.clone());
        self.ssid = Some(ssid);
    }
}

impl PartialEq for WirelessNetworkRecord {
    fn eq(&self, other: &Self) -> bool {
        self.bssid == other.bssid
    }
}

impl Eq for WirelessNetworkRecord {}

impl Hash for WirelessNetworkRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bssid.hash(state);
    }
}

/// Which tool produced the scan text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanGrammar {
    /// `iw <dev> scan`.
    Iw,
    /// `iwlist <dev> scanning`.
    Iwlist,
}

/// Networks found by one or more scans, unique by BSSID.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WirelessScan {
    pub networks: Vec<WirelessNetworkRecord>,
    pub errors: Vec<ParseError>,
}

impl WirelessScan {
    /// Adds a network unless one with the same BSSID is already present.
    pub fn insert(&mut self, network: WirelessNetworkRecord) -> bool {
        if self.networks.contains(&network) {
            tracing::trace!(bssid = %network.bssid, "duplicate network ignored");
            return false;
        }
        self.networks.push(network);
        true
    }

    /// Folds another scan into this one.
    pub fn merge(&mut self, other: WirelessScan) {
        for network in other.networks {
            self.insert(network);
        }
        self.errors.extend(other.errors);
    }

    /// Orders networks for display.
    pub fn sort_by_ssid(&mut self) {
        self.networks.sort_by(WirelessNetworkRecord::cmp_by_ssid);
    }
}

/// Parses scan output with the given grammar.
///
/// Never fails as a whole: malformed lines end up in
/// [`WirelessScan::errors`] and the affected field or record is skipped.
pub fn parse_wireless_scan<I, S>(lines: I, grammar: ScanGrammar) -> WirelessScan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let scan = match grammar {
        ScanGrammar::Iw => scanner::scan(&IW_SCAN, lines),
        ScanGrammar::Iwlist => scanner::scan(&IWLIST_SCANNING, lines),
    };

    let mut result = WirelessScan {
        networks: Vec::with_capacity(scan.records.len()),
        errors: scan.errors,
    };
    for network in scan.records {
        result.insert(network);
    }
    result
}

/// Whether `text` is a colon-separated six-octet hardware address.
fn is_hw_address(text: &str) -> bool {
    let octets: Vec<&str> = text.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Hex digits and separators, with at least one separator.
fn looks_like_address(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_hexdigit() || matches!(c, ':' | '-' | '.'))
        && text.contains([':', '-', '.'])
}

/// Finite numbers only; `NaN` and `inf` parse as `f64` but are never
/// meaningful in scan output.
fn parse_f64(text: &str) -> Result<f64, String> {
    parse_number::<f64>(text)
        .filter(|n| n.is_finite())
        .ok_or_else(|| format!("not a number: {:?}", text.trim()))
}

/// A bit rate in Mbps, which must be positive.
fn parse_rate(text: &str) -> Option<f64> {
    parse_f64(text).ok().filter(|rate| *rate > 0.0)
}

fn colon_value(line: &str) -> Result<&str, String> {
    value_after_colon(line).ok_or_else(|| "missing `:` separator".to_string())
}

fn mark_wpa(network: &mut WirelessNetworkRecord) {
    network.wpa = true;
    network.wep = false;
}

// ---------------------------------------------------------------------------
// `iw <dev> scan`
// ---------------------------------------------------------------------------

static IW_SCAN: Grammar<WirelessNetworkRecord> = Grammar {
    name: "iw scan",
    context: no_context,
    start: iw_start,
    rules: IW_RULES,
};

/// Recognizes `BSS f8:e4:fb:a0:fe:91(on wlan0) -- associated` and the older
/// `BSS f8:e4:fb:a0:fe:91 (on wlan0)`.
///
/// Element lines such as `BSS Load:` are not record starts. Anything shaped
/// like an address opens a record, so a garbled one is reported instead of
/// folding its fields into the previous network.
fn iw_start(line: &str, _: &(), ordinal: usize) -> StartLine<WirelessNetworkRecord> {
    let Some(rest) = line.strip_prefix("BSS") else {
        return StartLine::No;
    };
    if !rest.starts_with(char::is_whitespace) {
        return StartLine::No;
    }
    let addr = rest
        .trim_start()
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    if !looks_like_address(addr) {
        return StartLine::No;
    }
    if !is_hw_address(addr) {
        return StartLine::Malformed(format!("invalid BSSID {addr:?}"));
    }

    let mut network = WirelessNetworkRecord::new(addr);
    network.cell = Some(format!("Cell {ordinal}"));
    network.interface = iw_interface(line);
    StartLine::Record(network)
}

fn iw_interface(line: &str) -> Option<String> {
    if let Some(idx) = line.find("(on ") {
        let tail = &line[idx + 4..];
        let name = tail.split(')').next().unwrap_or_default().trim();
        return (!name.is_empty()).then(|| name.to_string());
    }

    // Fall back to the fourth token with punctuation removed.
    tokens(line)
        .get(3)
        .map(|t| t.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect::<String>())
        .filter(|name| !name.is_empty())
}

static IW_RULES: &[FieldRule<WirelessNetworkRecord>] = &[
    FieldRule {
        field: "channel",
        matches: |line| line.starts_with("DS Parameter set"),
        apply: iw_channel,
    },
    FieldRule {
        field: "frequency",
        matches: |line| line.starts_with("freq"),
        apply: iw_frequency,
    },
    FieldRule {
        field: "signal",
        matches: |line| line.starts_with("signal"),
        apply: iw_signal,
    },
    FieldRule {
        field: "capability",
        matches: |line| {
            line.starts_with("capability") && line.contains("ESS") && line.contains("Privacy")
        },
        apply: iw_privacy,
    },
    FieldRule {
        field: "ssid",
        matches: |line| line.starts_with("SSID"),
        apply: iw_ssid,
    },
    FieldRule {
        field: "rsn",
        matches: |line| line.starts_with("RSN") || line.starts_with("WPA:"),
        apply: |_, network| {
            mark_wpa(network);
            Ok(())
        },
    },
    FieldRule {
        field: "bit_rates",
        matches: |line| {
            line.starts_with("Supported rates") || line.starts_with("Extended supported rates")
        },
        apply: iw_rates,
    },
    FieldRule {
        field: "tsf",
        matches: |line| line.starts_with("TSF"),
        apply: iw_tsf,
    },
    FieldRule {
        field: "last_seen",
        matches: |line| line.starts_with("last seen"),
        apply: iw_last_seen,
    },
];

/// `DS Parameter set: channel 6`
fn iw_channel(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    let value = colon_value(line)?;
    network.channel = Some(parse_digits(value).ok_or("no channel number")?);
    Ok(())
}

/// `freq: 2437` (newer releases print `2437.0`)
fn iw_frequency(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    network.frequency_mhz = Some(parse_f64(colon_value(line)?)?);
    Ok(())
}

/// `signal: -64.00 dBm`
fn iw_signal(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    network.signal_dbm = Some(parse_f64(&strip_letters(colon_value(line)?))?);
    Ok(())
}

/// `capability: ESS Privacy ShortPreamble ShortSlotTime (0x0431)`
fn iw_privacy(_line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    network.encryption = true;
    network.wep = true;
    Ok(())
}

/// `SSID: Cafe \xe2\x80\x93 Guest`
fn iw_ssid(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    network.set_ssid(colon_value(line)?);
    Ok(())
}

/// `Supported rates: 1.0* 2.0* 5.5* 11.0* 6.0 9.0 12.0 18.0`
fn iw_rates(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    let mut rejected = Vec::new();
    for token in tokens(colon_value(line)?) {
        match parse_rate(token.trim_end_matches('*')) {
            Some(rate) => network.add_bit_rate(rate),
            None => rejected.push(token),
        }
    }

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(format!("unparseable rates {rejected:?}"))
    }
}

/// `TSF: 1185466856 usec (0d, 00:19:45)`
fn iw_tsf(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    let token = tokens(line).get(1).copied().unwrap_or_default();
    network.tsf = Some(parse_number(token).ok_or_else(|| format!("bad TSF {token:?}"))?);
    Ok(())
}

/// `last seen: 320 ms ago`
fn iw_last_seen(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    network.last_seen_ms = Some(parse_digits(colon_value(line)?).ok_or("no milliseconds")?);
    Ok(())
}

// ---------------------------------------------------------------------------
// `iwlist <dev> scanning`
// ---------------------------------------------------------------------------

/// Scan-wide state of the legacy grammar.
#[derive(Debug, Default)]
struct IwlistContext {
    interface: Option<String>,
}

static IWLIST_SCANNING: Grammar<WirelessNetworkRecord, IwlistContext> = Grammar {
    name: "iwlist scanning",
    context: iwlist_context,
    start: iwlist_start,
    rules: IWLIST_RULES,
};

/// `wlan0     Scan completed :`
///
/// Only the header shape counts: an interface name followed by the words
/// `Scan completed`. An ESSID that happens to read "Scan completed" is a
/// field line.
fn iwlist_context(line: &str, context: &mut IwlistContext) -> bool {
    let words = tokens(line);
    let [interface, "Scan", "completed", ..] = words[..] else {
        return false;
    };
    if interface.contains([':', '=', '"']) {
        return false;
    }
    context.interface = Some(interface.to_string());
    true
}

/// `Cell 01 - Address: F8:E4:FB:A0:FE:91`
fn iwlist_start(
    line: &str,
    context: &IwlistContext,
    _ordinal: usize,
) -> StartLine<WirelessNetworkRecord> {
    if !line.starts_with("Cell") {
        return StartLine::No;
    }

    let addr = value_after_colon(line).unwrap_or_default();
    if !is_hw_address(addr) {
        return StartLine::Malformed(format!("invalid cell address {addr:?}"));
    }

    let mut network = WirelessNetworkRecord::new(addr);
    network.cell = line.split('-').next().map(|label| label.trim().to_string());
    network.interface = context.interface.clone();
    StartLine::Record(network)
}

static IWLIST_RULES: &[FieldRule<WirelessNetworkRecord>] = &[
    FieldRule {
        field: "channel",
        matches: |line| line.starts_with("Channel"),
        apply: iwlist_channel,
    },
    FieldRule {
        field: "frequency",
        matches: |line| line.starts_with("Frequency"),
        apply: iwlist_frequency,
    },
    FieldRule {
        field: "quality",
        matches: |line| line.starts_with("Quality"),
        apply: iwlist_quality,
    },
    FieldRule {
        field: "encryption",
        matches: |line| line.starts_with("Encryption key"),
        apply: |line, network| {
            network.encryption = match colon_value(line)? {
                "on" => true,
                "off" => false,
                other => return Err(format!("expected on/off, got {other:?}")),
            };
            Ok(())
        },
    },
    FieldRule {
        field: "ssid",
        matches: |line| line.starts_with("ESSID"),
        apply: |line, network| {
            network.set_ssid(strip_quotes(colon_value(line)?));
            Ok(())
        },
    },
    FieldRule {
        field: "mode",
        matches: |line| line.starts_with("Mode"),
        apply: |line, network| {
            network.mode = Some(colon_value(line)?.to_string());
            Ok(())
        },
    },
    FieldRule {
        field: "wpa",
        matches: is_wpa_element,
        apply: |_, network| {
            mark_wpa(network);
            Ok(())
        },
    },
    FieldRule {
        field: "bit_rates",
        matches: |line| line.contains("Mb/s;") || line.starts_with("Bit Rates:"),
        apply: iwlist_rates,
    },
    FieldRule {
        field: "last_seen",
        matches: |line| line.starts_with("Extra") && line.contains("Last beacon"),
        apply: |line, network| {
            let value = line.split(':').nth(2).ok_or("missing beacon age")?;
            network.last_seen_ms = Some(parse_digits(value).ok_or("no milliseconds")?);
            Ok(())
        },
    },
    FieldRule {
        field: "tsf",
        matches: |line| line.starts_with("Extra") && line.contains("tsf="),
        apply: iwlist_tsf,
    },
];

/// `Channel:6`
fn iwlist_channel(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    let value = colon_value(line)?;
    network.channel = Some(parse_number(value).ok_or_else(|| format!("bad channel {value:?}"))?);
    Ok(())
}

/// `IE: IEEE 802.11i/WPA2 Version 1` or `IE: WPA Version 1`.
fn is_wpa_element(line: &str) -> bool {
    if line.contains("IEEE 802.11i/WPA2") {
        return true;
    }
    let element = line.strip_prefix("IE:").map(str::trim_start).unwrap_or(line);
    element.starts_with("WPA Version 1")
}

/// `Frequency:2.437 GHz (Channel 6)`
///
/// GHz values are converted to MHz. The parenthesized channel fills in the
/// channel when no `Channel:` line was seen.
fn iwlist_frequency(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    let value = colon_value(line)?;
    let number = parse_f64(value.split_whitespace().next().unwrap_or_default())?;
    let mhz = if value.contains("GHz") {
        (number * 1000.0).round()
    } else {
        number
    };
    network.frequency_mhz = Some(mhz);

    if network.channel.is_none() {
        if let Some(idx) = value.find("Channel") {
            network.channel = parse_digits(&value[idx..]);
        }
    }
    Ok(())
}

fn quality_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[=:](\d+)/(\d+)").expect("quality pattern is valid"))
}

fn signal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(-?\d+(?:\.\d+)?)\s*dBm").expect("signal pattern is valid"))
}

/// `Quality=57/70  Signal level=-53 dBm`
fn iwlist_quality(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    if let Some(caps) = quality_regex().captures(line) {
        let value: f64 = parse_f64(&caps[1])?;
        let scale: f64 = parse_f64(&caps[2])?;
        if scale > 0.0 {
            network.quality = Some(value / scale);
        }
    }

    if let Some(caps) = signal_regex().captures(line) {
        network.signal_dbm = Some(parse_f64(&caps[1])?);
    }

    if network.quality.is_none() && network.signal_dbm.is_none() {
        return Err("no quality ratio or dBm level".into());
    }
    Ok(())
}

/// `Bit Rates:1 Mb/s; 2 Mb/s; 5.5 Mb/s; 11 Mb/s; 9 Mb/s`
fn iwlist_rates(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    let mut rejected = Vec::new();
    for segment in line.split(';') {
        let digits = decimal_chars(segment);
        if digits.is_empty() {
            continue;
        }
        match parse_rate(&digits) {
            Some(rate) => network.add_bit_rate(rate),
            None => rejected.push(segment.trim()),
        }
    }

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(format!("unparseable rates {rejected:?}"))
    }
}

/// `Extra:tsf=00000003856835fe`
fn iwlist_tsf(line: &str, network: &mut WirelessNetworkRecord) -> Result<(), String> {
    let hex = line.split("tsf=").nth(1).unwrap_or_default().trim();
    let tsf = u64::from_str_radix(hex, 16).map_err(|e| format!("bad TSF {hex:?}: {e}"))?;
    network.tsf = Some(tsf);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn iw(text: &str) -> WirelessScan {
        parse_wireless_scan(text.lines(), ScanGrammar::Iw)
    }

    fn iwlist(text: &str) -> WirelessScan {
        parse_wireless_scan(text.lines(), ScanGrammar::Iwlist)
    }

    const IW_SAMPLE: &str = "\
BSS f8:e4:fb:a0:fe:91(on wlan0) -- associated
\tTSF: 1185466856 usec (0d, 00:19:45)
\tfreq: 2437
\tbeacon interval: 100 TUs
\tcapability: ESS Privacy ShortPreamble ShortSlotTime (0x0431)
\tsignal: -64.00 dBm
\tlast seen: 320 ms ago
\tSSID: HomeNetwork
\tSupported rates: 1.0* 2.0* 5.5* 11.0* 6.0 9.0 12.0 18.0
\tDS Parameter set: channel 6
\tExtended supported rates: 24.0 36.0 48.0 54.0
\tRSN:\t * Version: 1
\t\t * Group cipher: CCMP
BSS 00:1a:2b:3c:4d:5e (on wlan0)
\tfreq: 5180
\tcapability: ESS Privacy (0x0011)
\tsignal: -80.00 dBm
\tSSID: OldCafe
\tDS Parameter set: channel 36
";

    #[test]
    fn iw_parses_two_stanzas() {
        let scan = iw(IW_SAMPLE);
        assert!(scan.errors.is_empty(), "{:?}", scan.errors);
        assert_eq!(scan.networks.len(), 2);

        let home = &scan.networks[0];
        assert_eq!(home.bssid, "f8:e4:fb:a0:fe:91");
        assert_eq!(home.interface.as_deref(), Some("wlan0"));
        assert_eq!(home.cell.as_deref(), Some("Cell 0"));
        assert_eq!(home.channel, Some(6));
        assert_eq!(home.frequency_mhz, Some(2437.0));
        assert_eq!(home.signal_dbm, Some(-64.0));
        assert_eq!(home.tsf, Some(1_185_466_856));
        assert_eq!(home.last_seen_ms, Some(320));
        assert_eq!(home.ssid.as_deref(), Some("HomeNetwork"));
        assert_eq!(home.essid(), Some("HomeNetwork"));
        assert!(home.encryption);
        assert!(home.wpa);
        assert!(!home.wep);
        assert_eq!(
            home.bit_rates(),
            &[1.0, 2.0, 5.5, 6.0, 9.0, 11.0, 12.0, 18.0, 24.0, 36.0, 48.0, 54.0]
        );
        assert_eq!(home.quality, None);
    }

    #[test]
    fn iw_privacy_without_rsn_is_wep() {
        let scan = iw(IW_SAMPLE);
        let cafe = &scan.networks[1];
        assert_eq!(cafe.interface.as_deref(), Some("wlan0"));
        assert_eq!(cafe.cell.as_deref(), Some("Cell 1"));
        assert!(cafe.encryption);
        assert!(cafe.wep);
        assert!(!cafe.wpa);
        assert_eq!(cafe.channel, Some(36));
    }

    #[test]
    fn iw_open_network_has_no_flags() {
        let scan = iw("BSS 11:22:33:44:55:66(on wlp2s0)\n\tcapability: ESS ShortSlotTime (0x0401)\n\tSSID: Open\n");
        let open = &scan.networks[0];
        assert_eq!(open.interface.as_deref(), Some("wlp2s0"));
        assert!(!open.encryption);
        assert!(!open.wep);
        assert!(!open.wpa);
    }

    #[test]
    fn iw_rates_strip_basic_marker_and_dedup() {
        let scan = iw("BSS 11:22:33:44:55:66(on wlan0)\n\tSupported rates: 1.0* 2.0* 5.5*\n\tExtended supported rates: 2.0 5.5 1.0\n");
        assert_eq!(scan.networks[0].bit_rates(), &[1.0, 2.0, 5.5]);
    }

    #[test]
    fn iw_ssid_is_corrected() {
        let scan = iw("BSS 11:22:33:44:55:66(on wlan0)\n\tSSID: Cafe \\xe2\\x80\\x93 Guest\n");
        let network = &scan.networks[0];
        assert_eq!(network.ssid.as_deref(), Some("Cafe \u{2013} Guest"));
        assert_eq!(network.essid(), Some("Cafe \u{2013} Guest"));
    }

    #[test]
    fn iw_ssid_keeps_colons() {
        let scan = iw("BSS 11:22:33:44:55:66(on wlan0)\n\tSSID: lab:5g\n");
        assert_eq!(scan.networks[0].ssid.as_deref(), Some("lab:5g"));
    }

    #[test]
    fn iw_bss_load_element_is_not_a_record() {
        let text = "\
BSS 11:22:33:44:55:66(on wlan0)
\tBSS Load:
\t\t * station count: 3
\tSSID: Busy
";
        let scan = iw(text);
        assert_eq!(scan.networks.len(), 1);
        assert_eq!(scan.networks[0].ssid.as_deref(), Some("Busy"));
    }

    #[test]
    fn iw_garbled_fields_are_local() {
        let text = "\
BSS 11:22:33:44:55:66(on wlan0)
\tfreq: ???
\tsignal: weak
\tDS Parameter set: channel
\tSupported rates: 1.0* fast 2.0
\tSSID: Still
BSS 22:33:44:55:66:77(on wlan0)
\tTSF: soon
";
        let scan = iw(text);
        assert_eq!(scan.networks.len(), 2);
        let first = &scan.networks[0];
        assert_eq!(first.frequency_mhz, None);
        assert_eq!(first.signal_dbm, None);
        assert_eq!(first.channel, None);
        assert_eq!(first.bit_rates(), &[1.0, 2.0]);
        assert_eq!(first.ssid.as_deref(), Some("Still"));

        let fields: Vec<_> = scan
            .errors
            .iter()
            .map(|e| match &e.kind {
                ParseErrorKind::FieldParse { field } => *field,
                ParseErrorKind::MalformedRecord => "record",
            })
            .collect();
        assert_eq!(fields, vec!["frequency", "signal", "channel", "bit_rates", "tsf"]);
    }

    #[test]
    fn iw_invalid_bssid_drops_record() {
        let text = "\
BSS 11:22:33:44:55(on wlan0)
\tSSID: Broken
BSS 22:33:44:55:66:77(on wlan0)
\tSSID: Fine
";
        let scan = iw(text);
        assert_eq!(scan.networks.len(), 1);
        assert_eq!(scan.networks[0].ssid.as_deref(), Some("Fine"));
        assert_eq!(scan.errors.len(), 1);
        assert_eq!(scan.errors[0].kind, ParseErrorKind::MalformedRecord);
    }

    #[test]
    fn iw_dash_separated_bssid_is_not_folded_into_previous() {
        let text = "\
BSS 11:22:33:44:55:66(on wlan0)
\tSSID: First
BSS 11-22-33-44-55-77(on wlan0)
\tSSID: Second
";
        let scan = iw(text);
        assert_eq!(scan.networks.len(), 1);
        assert_eq!(scan.networks[0].ssid.as_deref(), Some("First"));
        assert_eq!(scan.errors.len(), 1);
        assert_eq!(scan.errors[0].kind, ParseErrorKind::MalformedRecord);
    }

    #[test]
    fn iw_rates_reject_non_finite_and_zero() {
        let scan = iw("BSS 11:22:33:44:55:66(on wlan0)\n\tSupported rates: 1.0* NaN inf 0.0 6.0\n");
        assert_eq!(scan.networks[0].bit_rates(), &[1.0, 6.0]);
        assert_eq!(scan.errors.len(), 1);
        assert_eq!(
            scan.errors[0].kind,
            ParseErrorKind::FieldParse { field: "bit_rates" }
        );
    }

    #[test]
    fn duplicate_bssids_collapse_to_first() {
        let text = "\
BSS 11:22:33:44:55:66(on wlan0)
\tSSID: First
BSS 11:22:33:44:55:66(on wlan0)
\tSSID: Second
";
        let scan = iw(text);
        assert_eq!(scan.networks.len(), 1);
        assert_eq!(scan.networks[0].ssid.as_deref(), Some("First"));
    }

    const IWLIST_SAMPLE: &str = "\
wlan0     Scan completed :
          Cell 01 - Address: F8:E4:FB:A0:FE:91
                    Channel:6
                    Frequency:2.437 GHz (Channel 6)
                    Quality=57/70  Signal level=-53 dBm
                    Encryption key:on
                    ESSID:\"WIFINET\"
                    Bit Rates:1 Mb/s; 2 Mb/s; 5.5 Mb/s; 11 Mb/s; 9 Mb/s
                              18 Mb/s; 36 Mb/s; 54 Mb/s
                    Bit Rates:6 Mb/s; 12 Mb/s; 24 Mb/s; 48 Mb/s
                    Mode:Master
                    Extra:tsf=00000003856835fe
                    Extra: Last beacon: 240ms ago
                    IE: Unknown: 0007574946494E4554
                    IE: IEEE 802.11i/WPA2 Version 1
                        Group Cipher : CCMP
          Cell 02 - Address: 00:1A:2B:3C:4D:5E
                    Channel:11
                    Frequency:2.462 GHz (Channel 11)
                    Quality=20/70  Signal level=-90 dBm
                    Encryption key:off
                    ESSID:\"\"
                    Mode:Master
";

    #[test]
    fn iwlist_parses_cells() {
        let scan = iwlist(IWLIST_SAMPLE);
        assert!(scan.errors.is_empty(), "{:?}", scan.errors);
        assert_eq!(scan.networks.len(), 2);

        let net = &scan.networks[0];
        assert_eq!(net.bssid, "f8:e4:fb:a0:fe:91");
        assert_eq!(net.interface.as_deref(), Some("wlan0"));
        assert_eq!(net.cell.as_deref(), Some("Cell 01"));
        assert_eq!(net.channel, Some(6));
        assert_eq!(net.frequency_mhz, Some(2437.0));
        assert!((net.quality.unwrap() - 57.0 / 70.0).abs() < 1e-9);
        assert_eq!(net.signal_dbm, Some(-53.0));
        assert!(net.encryption);
        assert!(net.wpa);
        assert!(!net.wep);
        assert_eq!(net.ssid.as_deref(), Some("WIFINET"));
        assert_eq!(net.mode.as_deref(), Some("Master"));
        assert_eq!(net.tsf, Some(0x3_8568_35fe));
        assert_eq!(net.last_seen_ms, Some(240));
        assert_eq!(
            net.bit_rates(),
            &[1.0, 2.0, 5.5, 6.0, 9.0, 11.0, 12.0, 18.0, 24.0, 36.0, 48.0, 54.0]
        );
    }

    #[test]
    fn iwlist_open_cell() {
        let scan = iwlist(IWLIST_SAMPLE);
        let open = &scan.networks[1];
        assert_eq!(open.cell.as_deref(), Some("Cell 02"));
        assert_eq!(open.bssid, "00:1a:2b:3c:4d:5e");
        assert!(!open.encryption);
        assert!(!open.wpa);
        assert_eq!(open.ssid.as_deref(), Some(""));
    }

    #[test]
    fn iwlist_quality_ratio() {
        let mut network = WirelessNetworkRecord::new("00:00:00:00:00:01");
        iwlist_quality("Quality=57/70  Signal level=-53 dBm", &mut network).unwrap();
        assert!((network.quality.unwrap() - 0.8143).abs() < 1e-4);
        assert_eq!(network.signal_dbm, Some(-53.0));
    }

    #[test]
    fn iwlist_quality_without_dbm() {
        let mut network = WirelessNetworkRecord::new("00:00:00:00:00:01");
        iwlist_quality("Quality=100/100  Signal level=100/100", &mut network).unwrap();
        assert_eq!(network.quality, Some(1.0));
        assert_eq!(network.signal_dbm, None);

        let mut empty = WirelessNetworkRecord::new("00:00:00:00:00:02");
        assert!(iwlist_quality("Quality:unknown", &mut empty).is_err());
    }

    #[test]
    fn iwlist_bad_encryption_value() {
        let text = "\
wlan0     Scan completed :
          Cell 01 - Address: F8:E4:FB:A0:FE:91
                    Encryption key:maybe
";
        let scan = iwlist(text);
        assert_eq!(scan.networks.len(), 1);
        assert!(!scan.networks[0].encryption);
        assert_eq!(
            scan.errors[0].kind,
            ParseErrorKind::FieldParse { field: "encryption" }
        );
    }

    #[test]
    fn iwlist_single_rate_line() {
        let text = "\
wlan0     Scan completed :
          Cell 01 - Address: 00:1A:2B:3C:4D:5E
                    Bit Rates:54 Mb/s
";
        let scan = iwlist(text);
        assert!(scan.errors.is_empty());
        assert_eq!(scan.networks[0].bit_rates(), &[54.0]);
    }

    #[test]
    fn iwlist_wpa_version_one() {
        assert!(is_wpa_element("IE: WPA Version 1"));
        assert!(is_wpa_element("WPA Version 1"));
        assert!(is_wpa_element("IE: IEEE 802.11i/WPA2 Version 1"));
        assert!(!is_wpa_element("IE: Unknown: 00"));
    }

    #[test]
    fn iwlist_cell_without_address_is_malformed() {
        let text = "\
wlan0     Scan completed :
          Cell 01 - Address:
                    ESSID:\"Lost\"
          Cell 02 - Address: 00:1A:2B:3C:4D:5E
                    ESSID:\"Kept\"
";
        let scan = iwlist(text);
        assert_eq!(scan.networks.len(), 1);
        assert_eq!(scan.networks[0].ssid.as_deref(), Some("Kept"));
        assert_eq!(scan.errors[0].kind, ParseErrorKind::MalformedRecord);
    }

    #[test]
    fn iwlist_essid_corrected_and_unquoted() {
        let text = "\
wlan0     Scan completed :
          Cell 01 - Address: 00:1A:2B:3C:4D:5E
                    ESSID:\"Joe\\xe2\\x80\\x99s\"
";
        let scan = iwlist(text);
        assert_eq!(scan.networks[0].ssid.as_deref(), Some("Joe\u{2019}s"));
    }

    #[test]
    fn iwlist_essid_reading_scan_completed_is_a_field() {
        let text = "\
wlan0     Scan completed :
          Cell 01 - Address: 00:1A:2B:3C:4D:5E
                    ESSID:\"Scan completed\"
          Cell 02 - Address: 66:55:44:33:22:11
                    ESSID:\"Next\"
";
        let scan = iwlist(text);
        assert!(scan.errors.is_empty(), "{:?}", scan.errors);
        assert_eq!(scan.networks[0].ssid.as_deref(), Some("Scan completed"));
        assert_eq!(scan.networks[1].interface.as_deref(), Some("wlan0"));
        assert_eq!(scan.networks[1].ssid.as_deref(), Some("Next"));
    }

    #[test]
    fn iwlist_channel_line() {
        let mut network = WirelessNetworkRecord::new("00:00:00:00:00:01");
        iwlist_channel("Channel:11", &mut network).unwrap();
        assert_eq!(network.channel, Some(11));
        assert!(iwlist_channel("Channel:eleven", &mut network).is_err());
    }

    #[test]
    fn quality_rejects_nan_level() {
        let mut network = WirelessNetworkRecord::new("00:00:00:00:00:01");
        assert!(parse_f64("NaN").is_err());
        assert!(iwlist_quality("Quality:NaN", &mut network).is_err());
        assert_eq!(network.quality, None);
    }

    #[test]
    fn frequency_in_mhz_is_kept() {
        let mut network = WirelessNetworkRecord::new("00:00:00:00:00:01");
        iwlist_frequency("Frequency:5180 MHz", &mut network).unwrap();
        assert_eq!(network.frequency_mhz, Some(5180.0));
        assert_eq!(network.channel, None);
    }

    #[test]
    fn frequency_fills_missing_channel() {
        let mut network = WirelessNetworkRecord::new("00:00:00:00:00:01");
        iwlist_frequency("Frequency:5.18 GHz (Channel 36)", &mut network).unwrap();
        assert_eq!(network.frequency_mhz, Some(5180.0));
        assert_eq!(network.channel, Some(36));
    }

    #[test]
    fn essid_falls_back_to_ssid() {
        let mut network = WirelessNetworkRecord::new("00:00:00:00:00:01");
        network.ssid = Some("only".into());
        assert_eq!(network.essid(), Some("only"));
        network.essid = Some("ext".into());
        assert_eq!(network.essid(), Some("ext"));
    }

    #[test]
    fn sort_by_ssid_orders_for_display() {
        let mut scan = WirelessScan::default();
        for (bssid, ssid) in [
            ("00:00:00:00:00:01", "zeta"),
            ("00:00:00:00:00:02", "alpha"),
            ("00:00:00:00:00:03", "mid"),
        ] {
            let mut network = WirelessNetworkRecord::new(bssid);
            network.ssid = Some(ssid.into());
            scan.insert(network);
        }
        scan.sort_by_ssid();
        let ssids: Vec<_> = scan.networks.iter().filter_map(|n| n.ssid.as_deref()).collect();
        assert_eq!(ssids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn merge_keeps_bssids_unique() {
        let mut a = iw("BSS 11:22:33:44:55:66(on wlan0)\n\tSSID: A\n");
        let b = iwlist(
            "wlan1     Scan completed :\n  Cell 01 - Address: 11:22:33:44:55:66\n  Cell 02 - Address: 66:55:44:33:22:11\n",
        );
        a.merge(b);
        assert_eq!(a.networks.len(), 2);
        assert_eq!(a.networks[0].interface.as_deref(), Some("wlan0"));
        assert_eq!(a.networks[1].interface.as_deref(), Some("wlan1"));
    }

    #[test]
    fn records_serialize_camel_case() {
        let scan = iw("BSS 11:22:33:44:55:66(on wlan0)\n\tSupported rates: 1.0*\n\tlast seen: 10 ms ago\n");
        let json = serde_json::to_value(&scan.networks[0]).unwrap();
        assert_eq!(json["bssid"], "11:22:33:44:55:66");
        assert_eq!(json["lastSeenMs"], 10);
        assert_eq!(json["bitRates"][0], 1.0);
    }
}
