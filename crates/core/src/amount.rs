use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An exact monetary amount as captured from message text.
///
/// Wraps `rust_decimal::Decimal` so that "9.60" stays 9.60 (scale 2)
/// and "11,500" stays the integer 11500 — no binary float drift and no
/// rounding of money values. The scale records whether the source text
/// carried a fractional part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Parse a raw numeric substring captured from a message.
    ///
    /// Strips thousands separators and translates Khmer numerals
    /// before conversion. Returns `None` for captures with no digits,
    /// more than one decimal point, or any other stray character —
    /// a malformed capture is a no-match, never an error.
    pub fn parse(raw: &str) -> Option<Amount> {
        let cleaned: String = to_ascii_digits(raw.trim())
            .chars()
            .filter(|&c| c != ',')
            .collect();
        if !cleaned.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        if cleaned.chars().filter(|&c| c == '.').count() > 1 {
            return None;
        }
        if cleaned.chars().any(|c| !c.is_ascii_digit() && c != '.') {
            return None;
        }
        Decimal::from_str(&cleaned).ok().map(Amount)
    }

    pub fn from_decimal(value: Decimal) -> Amount {
        Amount(value)
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    /// Whether the source text was a whole number (no decimal point).
    pub fn is_integral(self) -> bool {
        self.0.scale() == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Translate Khmer numerals (U+17E0–U+17E9) to ASCII digits, leaving
/// every other character untouched. Bank messages in Khmer script
/// write clock times and occasionally amounts with these digits.
pub fn to_ascii_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '០'..='៩' => char::from(b'0' + (c as u32 - '០' as u32) as u8),
            _ => c,
        })
        .collect()
}
