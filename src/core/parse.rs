// src/core/parse.rs
//
// Locale-formatted counts and month-label tokens. Pure, no I/O.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Calendar month, the alignment key between two series.
/// Renders as the 3-letter uppercase code (`JAN`..`DEC`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Month { Jan, Feb, Mar, Apr, May, Jun, Jul, Aug, Sep, Oct, Nov, Dec }

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan, Month::Feb, Month::Mar, Month::Apr, Month::May, Month::Jun,
        Month::Jul, Month::Aug, Month::Sep, Month::Oct, Month::Nov, Month::Dec,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Month::Jan => "JAN", Month::Feb => "FEB", Month::Mar => "MAR",
            Month::Apr => "APR", Month::May => "MAY", Month::Jun => "JUN",
            Month::Jul => "JUL", Month::Aug => "AUG", Month::Sep => "SEP",
            Month::Oct => "OCT", Month::Nov => "NOV", Month::Dec => "DEC",
        }
    }

    fn full_name(self) -> &'static str {
        match self {
            Month::Jan => "JANUARY", Month::Feb => "FEBRUARY", Month::Mar => "MARCH",
            Month::Apr => "APRIL", Month::May => "MAY", Month::Jun => "JUNE",
            Month::Jul => "JULY", Month::Aug => "AUGUST", Month::Sep => "SEPTEMBER",
            Month::Oct => "OCTOBER", Month::Nov => "NOVEMBER", Month::Dec => "DECEMBER",
        }
    }

    /// From the 1-based calendar number.
    pub fn from_number(n: u32) -> Option<Month> {
        Month::ALL.get(n.checked_sub(1)? as usize).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.code())
    }
}

impl<'de> serde::Deserialize<'de> for Month {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        parse_label(&raw).ok_or_else(|| serde::de::Error::custom(format!("not a month: {raw:?}")))
    }
}

impl std::str::FromStr for Month {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s).ok_or_else(|| format!("not a month: {s:?}"))
    }
}

/// Normalize free text into a month code.
///
/// Case-insensitive; accepts the 3-letter form, the full name and `SEPT`.
/// The leading alphabetic word must be the whole name: `"Oct 2026"` and
/// `"Nov-26"` match, `"Octopus"` and `"Total"` do not.
pub fn parse_label(text: &str) -> Option<Month> {
    let t = text.trim();
    let end = t
        .char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(t.len());
    let word = t[..end].to_ascii_uppercase();
    if word.len() < 3 {
        return None;
    }
    if word == "SEPT" {
        return Some(Month::Sep);
    }
    Month::ALL
        .into_iter()
        .find(|m| word == m.code() || word == m.full_name())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCountError {
    #[error("not a number: {0:?}")]
    NotANumber(String),
}

/// Parse a locale-formatted non-negative count (`"1,234"` → 1234).
///
/// Grouping commas and spaces (incl. NBSP / narrow NBSP) are stripped.
/// Empty or non-digit content is `NotANumber`; callers treat that as an
/// absent value, not a fatal error.
pub fn parse_count(text: &str) -> Result<u64, ParseCountError> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCountError::NotANumber(text.to_string()));
    }
    digits
        .parse::<u64>()
        .map_err(|_| ParseCountError::NotANumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_separators_are_ignored() {
        assert_eq!(parse_count("1,234"), Ok(1234));
        assert_eq!(parse_count("1234"), Ok(1234));
        assert_eq!(parse_count("  9,999,999 "), Ok(9_999_999));
        assert_eq!(parse_count("12\u{a0}500"), Ok(12_500));
        assert_eq!(parse_count("0"), Ok(0));
    }

    #[test]
    fn non_numbers_fail() {
        assert!(parse_count("").is_err());
        assert!(parse_count("   ").is_err());
        assert!(parse_count("abc").is_err());
        assert!(parse_count("-5").is_err());
        assert!(parse_count("12.5").is_err());
        assert_eq!(parse_count("n/a"), Err(ParseCountError::NotANumber(s!("n/a"))));
    }

    #[test]
    fn month_names_normalize_to_codes() {
        assert_eq!(parse_label("jan"), Some(Month::Jan));
        assert_eq!(parse_label("  December "), Some(Month::Dec));
        assert_eq!(parse_label("Sept"), Some(Month::Sep));
        assert_eq!(parse_label("OCT 2026"), Some(Month::Oct));
        assert_eq!(parse_label("Nov-26"), Some(Month::Nov));
        assert_eq!(Month::Dec.to_string(), "DEC");
    }

    #[test]
    fn non_months_are_rejected() {
        assert_eq!(parse_label(""), None);
        assert_eq!(parse_label("Total"), None);
        assert_eq!(parse_label("Octopus"), None);
        assert_eq!(parse_label("Ma"), None);
        assert_eq!(parse_label("2026"), None);
    }

    #[test]
    fn calendar_numbers_are_one_based() {
        assert_eq!(Month::from_number(1), Some(Month::Jan));
        assert_eq!(Month::from_number(10), Some(Month::Oct));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }
}
