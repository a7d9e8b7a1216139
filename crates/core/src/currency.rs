use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical currency of a payment notification.
///
/// Every token the pattern library can capture — ISO code, symbol, or
/// Khmer word — normalizes into one of these. Tokens outside the
/// recognized alphabet map to `Unknown`; normalization never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Khr,
    #[default]
    Unknown,
}

impl Currency {
    /// Normalize a captured currency token. Total over any input.
    pub fn from_token(token: &str) -> Currency {
        match token.trim() {
            "$" | "ដុល្លារ" => Currency::Usd,
            "៛" | "រៀល" => Currency::Khr,
            t if t.eq_ignore_ascii_case("USD") => Currency::Usd,
            t if t.eq_ignore_ascii_case("KHR") => Currency::Khr,
            _ => Currency::Unknown,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Khr => "KHR",
            Currency::Unknown => "UNKNOWN",
        }
    }

    /// The symbol banks print in message text, where one exists.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Currency::Usd => Some("$"),
            Currency::Khr => Some("៛"),
            Currency::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != Currency::Unknown
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
