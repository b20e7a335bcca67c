//! Repair of escaped UTF-8 punctuation in driver-reported strings.
//!
//! `iw` prints every non-ASCII SSID byte as a literal `\xNN` escape, so an
//! SSID containing an en dash arrives as the ten ASCII characters
//! `\xe2\x80\x93`. The table below maps each escaped three-byte sequence of
//! the General Punctuation and Superscripts blocks (U+2000 to U+207F) back
//! to its character.

use std::sync::OnceLock;

/// First code point covered by the substitution table.
const FIRST: u32 = 0x2000;

/// Last code point covered by the substitution table.
const LAST: u32 = 0x207F;

/// Every escaped sequence in the table starts with the lead byte `e2` and a
/// continuation byte of `80` or `81`.
const ESCAPE_PREFIX: &str = "\\xe2\\x8";

static TABLE: OnceLock<Vec<(String, char)>> = OnceLock::new();

/// Returns the `(escaped literal, character)` pairs, in code point order.
pub fn substitution_table() -> &'static [(String, char)] {
    TABLE.get_or_init(build_table)
}

fn build_table() -> Vec<(String, char)> {
    (FIRST..=LAST)
        .filter_map(char::from_u32)
        .map(|c| (escape_utf8(c), c))
        .collect()
}

/// Renders the UTF-8 bytes of `c` the way `iw` does: `\x` plus two
/// lowercase hex digits per byte.
fn escape_utf8(c: char) -> String {
    let mut buf = [0u8; 4];
    c.encode_utf8(&mut buf)
        .bytes()
        .map(|b| format!("\\x{b:02x}"))
        .collect()
}

/// Replaces every known escaped punctuation sequence with its character.
///
/// Idempotent: replacement characters are non-ASCII and can never form a
/// new escape sequence together with their neighbours.
pub fn correct_encoding(text: &str) -> String {
    if !text.contains(ESCAPE_PREFIX) {
        return text.to_string();
    }

    let mut output = text.to_string();
    for (escaped, c) in substitution_table() {
        if output.contains(escaped.as_str()) {
            output = output.replace(escaped.as_str(), &c.to_string());
        }
    }
    output
}
