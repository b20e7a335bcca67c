//! Error types for the decoders.
//!
//! Text grammars report local failures as [`ParseError`] values collected
//! alongside the records they belong to. EDID decoding fails as a whole with
//! an [`EdidError`], since there is no partial display.

use std::fmt;

use serde::Serialize;

/// What went wrong while applying a text grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ParseErrorKind {
    /// One field of one record could not be parsed. The field stays unset.
    FieldParse { field: &'static str },
    /// A record-start line could not be parsed. The record is dropped.
    MalformedRecord,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldParse { field } => write!(f, "field `{field}`"),
            Self::MalformedRecord => f.write_str("record start"),
        }
    }
}

/// Where the offending input was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "source")]
pub enum Location {
    /// 1-based line number in a text input, with the line as seen.
    Line { number: usize, text: String },
    /// Half-open byte range in a binary input.
    Bytes { start: usize, end: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line { number, text } => write!(f, "line {number} ({text:?})"),
            Self::Bytes { start, end } => write!(f, "bytes {start}..{end}"),
        }
    }
}

/// A local, recoverable decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} at {location}: {reason}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
    pub reason: String,
}

impl ParseError {
    pub fn field(field: &'static str, number: usize, text: &str, reason: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::FieldParse { field },
            location: Location::Line {
                number,
                text: text.to_string(),
            },
            reason: reason.into(),
        }
    }

    pub fn malformed_record(number: usize, text: &str, reason: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::MalformedRecord,
            location: Location::Line {
                number,
                text: text.to_string(),
            },
            reason: reason.into(),
        }
    }

    /// A field of a binary input that decoded to an out-of-range value.
    pub fn bytes(field: &'static str, start: usize, end: usize, reason: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::FieldParse { field },
            location: Location::Bytes { start, end },
            reason: reason.into(),
        }
    }
}

/// Errors produced while decoding an EDID blob.
///
/// A short buffer and a wrong header are both structurally invalid EDIDs;
/// [`EdidError::is_malformed`] groups them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EdidError {
    #[error("malformed EDID: expected at least {expected_len} bytes, got {actual_len}")]
    MalformedEdid {
        expected_len: usize,
        actual_len: usize,
    },

    /// Malformed: the buffer is long enough but the fixed header is wrong.
    #[error("malformed EDID: bad header {found:02x?}")]
    BadHeader { found: [u8; 8] },

    #[error("invalid EDID hex dump: {0}")]
    InvalidHex(String),
}

impl EdidError {
    /// Whether the bytes themselves are not an EDID, as opposed to a dump
    /// that could not be turned into bytes.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEdid { .. } | Self::BadHeader { .. })
    }
}
