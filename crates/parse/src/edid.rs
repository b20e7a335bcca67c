//! EDID base-block decoder.
//!
//! Decodes the 128-byte base block a monitor reports over DDC into a
//! [`DisplayDescriptor`]. Extension blocks may follow in the buffer; they
//! are retained with the raw bytes but not interpreted.

use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::error::{EdidError, ParseError};

/// Length of the EDID base block.
pub const EDID_BLOCK_LEN: usize = 128;

const HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

const DESCRIPTOR_OFFSET: usize = 54;
const DESCRIPTOR_LEN: usize = 18;
const DESCRIPTOR_COUNT: usize = 4;

const TAG_SERIAL: u32 = 0xFF;
const TAG_COMMENT: u32 = 0xFE;
const TAG_RANGE_LIMITS: u32 = 0xFD;
const TAG_NAME: u32 = 0xFC;
const TAG_WHITE_POINT: u32 = 0xFB;
const TAG_STANDARD_TIMINGS: u32 = 0xFA;

/// Week and year of manufacture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManufactureDate {
    /// ISO week, `1..=53`. `0` means unspecified, `0xFF` means `year` is a
    /// model year.
    pub week: u8,
    pub year: u16,
}

impl ManufactureDate {
    /// Whether the year is a model year rather than a manufacture year.
    pub fn is_model_year(&self) -> bool {
        self.week == 0xFF
    }

    /// Monday of the manufacture week, when the week is specified.
    pub fn approximate_date(&self) -> Option<NaiveDate> {
        if self.week == 0 || self.is_model_year() {
            return None;
        }
        NaiveDate::from_isoywd_opt(i32::from(self.year), u32::from(self.week), Weekday::Mon)
    }
}

/// Monitor range limits from a `0xFD` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeLimits {
    pub min_vertical_hz: u8,
    pub max_vertical_hz: u8,
    pub min_horizontal_khz: u8,
    pub max_horizontal_khz: u8,
    pub max_pixel_clock_mhz: u16,
}

impl RangeLimits {
    fn from_block(block: &[u8]) -> Self {
        Self {
            min_vertical_hz: block[5],
            max_vertical_hz: block[6],
            min_horizontal_khz: block[7],
            max_horizontal_khz: block[8],
            max_pixel_clock_mhz: u16::from(block[9]) * 10,
        }
    }
}

/// One of the four 18-byte descriptor sub-blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum DescriptorBlock {
    SerialNumber(String),
    Comment(String),
    RangeLimits(RangeLimits),
    Name(String),
    WhitePoint,
    StandardTimings,
    /// Detailed timings, manufacturer-specific and unassigned tags.
    Other(u32),
}

impl DescriptorBlock {
    fn decode(block: &[u8]) -> Self {
        let tag = u32::from_be_bytes([block[0], block[1], block[2], block[3]]);
        match tag {
            TAG_SERIAL => Self::SerialNumber(descriptor_text(block)),
            TAG_COMMENT => Self::Comment(descriptor_text(block)),
            TAG_RANGE_LIMITS => Self::RangeLimits(RangeLimits::from_block(block)),
            TAG_NAME => Self::Name(descriptor_text(block)),
            TAG_WHITE_POINT => Self::WhitePoint,
            TAG_STANDARD_TIMINGS => Self::StandardTimings,
            other => Self::Other(other),
        }
    }
}

/// Text payload of a string descriptor: bytes 4..18, ended by a line feed
/// and padded with spaces.
fn descriptor_text(block: &[u8]) -> String {
    let payload = &block[4..DESCRIPTOR_LEN];
    let end = payload.iter().position(|&b| b == 0x0A).unwrap_or(payload.len());
    String::from_utf8_lossy(&payload[..end])
        .trim_matches(|c: char| c.is_whitespace() || c.is_control())
        .to_string()
}

/// One monitor, decoded from its EDID.
///
/// Immutable once decoded. Equality and hashing use the raw bytes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDescriptor {
    #[serde(serialize_with = "serialize_hex")]
    raw: Vec<u8>,
    version: String,
    manufacturer: String,
    product_code: String,
    serial_number: String,
    digital: bool,
    manufacture_date: ManufactureDate,
    width_cm: u8,
    height_cm: u8,
    name: Option<String>,
    comment: Option<String>,
    issues: Vec<ParseError>,
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

impl DisplayDescriptor {
    /// The bytes this descriptor was decoded from, extensions included.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// EDID structure version, e.g. `1.3`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Three-letter PNP vendor ID, e.g. `DEL`.
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    /// Vendor product code in lowercase hex.
    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    /// Serial number, from the serial descriptor when the monitor has one.
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn is_digital(&self) -> bool {
        self.digital
    }

    pub fn manufacture_date(&self) -> ManufactureDate {
        self.manufacture_date
    }

    pub fn width_cm(&self) -> u8 {
        self.width_cm
    }

    pub fn height_cm(&self) -> u8 {
        self.height_cm
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Out-of-range values met while decoding. The affected fields hold a
    /// best-effort value.
    pub fn issues(&self) -> &[ParseError] {
        &self.issues
    }

    /// Re-derives the four descriptor sub-blocks from the raw bytes.
    ///
    /// This is the only place range limits are exposed.
    pub fn descriptor_blocks(&self) -> Vec<DescriptorBlock> {
        descriptor_slices(&self.raw).map(DescriptorBlock::decode).collect()
    }

    /// Whether the base block sums to zero modulo 256.
    pub fn checksum_valid(&self) -> bool {
        self.raw[..EDID_BLOCK_LEN]
            .iter()
            .fold(0u8, |sum, b| sum.wrapping_add(*b))
            == 0
    }

    /// Number of extension blocks announced by the base block.
    pub fn extension_count(&self) -> u8 {
        self.raw[126]
    }
}

impl PartialEq for DisplayDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for DisplayDescriptor {}

impl Hash for DisplayDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

fn descriptor_slices(raw: &[u8]) -> impl Iterator<Item = &[u8]> {
    raw[DESCRIPTOR_OFFSET..DESCRIPTOR_OFFSET + DESCRIPTOR_LEN * DESCRIPTOR_COUNT]
        .chunks_exact(DESCRIPTOR_LEN)
}

/// Decodes an EDID buffer.
///
/// Fails as a whole when the buffer is shorter than one base block or does
/// not start with the fixed EDID header. Out-of-range field values are
/// reported through [`DisplayDescriptor::issues`] instead.
pub fn decode_edid(bytes: &[u8]) -> Result<DisplayDescriptor, EdidError> {
    if bytes.len() < EDID_BLOCK_LEN {
        return Err(EdidError::MalformedEdid {
            expected_len: EDID_BLOCK_LEN,
            actual_len: bytes.len(),
        });
    }

    let mut found = [0u8; 8];
    found.copy_from_slice(&bytes[..8]);
    if found != HEADER {
        return Err(EdidError::BadHeader { found });
    }

    let mut issues = Vec::new();
    let manufacturer = decode_manufacturer([bytes[8], bytes[9]], &mut issues);

    let manufacture_date = ManufactureDate {
        week: bytes[16],
        year: 1990 + u16::from(bytes[17]),
    };
    if manufacture_date.week > 53 && !manufacture_date.is_model_year() {
        issues.push(ParseError::bytes(
            "manufacture_date",
            16,
            18,
            format!("week {} out of range", manufacture_date.week),
        ));
    }

    let mut descriptor = DisplayDescriptor {
        raw: bytes.to_vec(),
        version: format!("{}.{}", bytes[18], bytes[19]),
        manufacturer,
        product_code: format!("{:x}", u16::from_le_bytes([bytes[10], bytes[11]])),
        serial_number: binary_serial([bytes[12], bytes[13], bytes[14], bytes[15]]),
        digital: bytes[20] >> 7 == 1,
        manufacture_date,
        width_cm: bytes[21],
        height_cm: bytes[22],
        name: None,
        comment: None,
        issues,
    };

    for block in descriptor.descriptor_blocks() {
        match block {
            DescriptorBlock::SerialNumber(serial) => descriptor.serial_number = serial,
            DescriptorBlock::Comment(comment) => descriptor.comment = Some(comment),
            DescriptorBlock::Name(name) => descriptor.name = Some(name),
            DescriptorBlock::RangeLimits(_)
            | DescriptorBlock::WhitePoint
            | DescriptorBlock::StandardTimings
            | DescriptorBlock::Other(_) => {}
        }
    }

    tracing::debug!(
        manufacturer = %descriptor.manufacturer,
        product = %descriptor.product_code,
        name = ?descriptor.name,
        "decoded EDID"
    );

    Ok(descriptor)
}

/// Unpacks the big-endian PNP ID: three 5-bit letters, `1` = `A`.
///
/// A zero field is unused filler and is skipped.
fn decode_manufacturer(pair: [u8; 2], issues: &mut Vec<ParseError>) -> String {
    let packed = u16::from_be_bytes(pair);
    let mut code = String::with_capacity(3);
    for shift in [10, 5, 0] {
        let field = (packed >> shift) & 0x1F;
        match field {
            0 => {}
            1..=26 => code.push(char::from(b'A' + (field as u8 - 1))),
            _ => {
                code.push('?');
                issues.push(ParseError::bytes(
                    "manufacturer",
                    8,
                    10,
                    format!("letter code {field} out of range"),
                ));
            }
        }
    }
    code
}

/// Renders the binary serial, most significant byte first.
fn binary_serial(le: [u8; 4]) -> String {
    le.iter()
        .rev()
        .map(|&b| {
            if b.is_ascii_alphanumeric() {
                char::from(b).to_string()
            } else {
                format!("{b:02X}")
            }
        })
        .collect()
}

/// Extracts the EDID blobs from `xrandr --verbose` output.
///
/// Each `EDID:` line is followed by the blob as lines of hex digits; the
/// lines are concatenated until the first line that is not pure hex. One
/// entry per output with an EDID, in output order.
pub fn edid_blobs_from_xrandr<I, S>(lines: I) -> Vec<Result<Vec<u8>, EdidError>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut blobs = Vec::new();
    let mut current: Option<String> = None;

    for raw in lines {
        let line = raw.as_ref().trim();
        if line.starts_with("EDID") {
            blobs.extend(current.take().map(|hex| decode_hex(&hex)));
            current = Some(String::new());
            continue;
        }

        let Some(hex) = current.as_mut() else {
            continue;
        };
        if !line.is_empty() && line.chars().all(|c| c.is_ascii_hexdigit()) {
            hex.push_str(line);
        } else {
            blobs.extend(current.take().map(|hex| decode_hex(&hex)));
        }
    }
    blobs.extend(current.take().map(|hex| decode_hex(&hex)));

    blobs
}

fn decode_hex(text: &str) -> Result<Vec<u8>, EdidError> {
    hex::decode(text).map_err(|e| EdidError::InvalidHex(e.to_string()))
}
