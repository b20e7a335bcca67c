//! Decoders that turn Linux telemetry output into typed records.
//!
//! This crate owns the parsing engine only. It never runs commands or
//! reads files; callers hand it complete line sequences or byte buffers
//! (see `sysprobe-collect` for the I/O side).
//!
//! # Decoders
//!
//! - **Encoding**: repairs `\xe2\x80\x93`-style escapes that `iw` leaves in SSIDs
//! - **Fields**: total tokenizing helpers shared by the grammars
//! - **Scanner**: line-oriented record segmentation driven by a grammar table
//! - **Wireless**: `iw <dev> scan` and `iwlist <dev> scanning` grammars
//! - **EDID**: the 128-byte EDID base block, including its descriptor blocks
//! - **System**: `/proc/cpuinfo` stanzas, `/proc/meminfo` counters and
//!   power supply `uevent` files

pub mod cpuinfo;
pub mod edid;
pub mod encoding;
pub mod error;
pub mod fields;
pub mod meminfo;
pub mod power_supply;
pub mod scanner;
pub mod wireless;

// Re-export primary types for convenience.
pub use cpuinfo::{CpuInfo, ProcessorRecord, parse_cpuinfo};
pub use edid::{
    DescriptorBlock, DisplayDescriptor, EDID_BLOCK_LEN, ManufactureDate, RangeLimits, decode_edid,
    edid_blobs_from_xrandr,
};
pub use encoding::correct_encoding;
pub use error::{EdidError, Location, ParseError, ParseErrorKind};
pub use meminfo::{MemoryInfo, parse_meminfo};
pub use power_supply::{PowerSupply, parse_power_supply_uevent};
pub use scanner::{FieldRule, Grammar, Scan, StartLine};
pub use wireless::{ScanGrammar, WirelessNetworkRecord, WirelessScan, parse_wireless_scan};
