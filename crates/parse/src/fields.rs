//! Tokenizing helpers shared by the text grammars.
//!
//! Every helper is total: malformed input yields `None` or an empty value,
//! never a panic, so one garbled line cannot take a whole scan down.

use std::str::FromStr;

/// Splits a line into whitespace-separated tokens.
pub fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Returns the trimmed text after the first `:`.
///
/// Later colons stay in the value, so `"SSID: a:b"` yields `"a:b"`.
pub fn value_after_colon(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, v)| v.trim())
}

/// Removes one pair of surrounding double quotes, if present.
pub fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parses a trimmed number, returning `None` on malformed text.
pub fn parse_number<T: FromStr>(text: &str) -> Option<T> {
    text.trim().parse().ok()
}

/// Keeps only the ASCII digits of `text`.
///
/// `"channel 6"` → `"6"`, `"240ms ago"` → `"240"`.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Parses the digits embedded in descriptive text.
pub fn parse_digits<T: FromStr>(text: &str) -> Option<T> {
    let digits = digits_only(text);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Drops ASCII letters, keeping signs, digits and separators.
///
/// `"-64.00 dBm"` → `"-64.00 "`.
pub fn strip_letters(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_alphabetic()).collect()
}

/// Keeps only the characters that can appear in an unsigned decimal.
///
/// `"Bit Rates:5.5 Mb/s"` → `"5.5"`.
pub fn decimal_chars(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}
