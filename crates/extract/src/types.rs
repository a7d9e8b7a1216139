use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use riel_core::{Amount, Currency};

/// Everything one extraction call recovered from a message.
///
/// Fields are independent: any subset may be present, and a fully
/// empty result is a valid outcome, not an error. Extraction never
/// fails — "nothing recognized" is `ParseResult::default()`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParseResult {
    /// `Currency::Unknown` when no currency token was recognized.
    pub currency: Currency,
    pub amount: Option<Amount>,
    /// Absolute transaction time in ICT (UTC+7). Callers fall back to
    /// the message arrival time when absent.
    pub transaction_time: Option<DateTime<FixedOffset>>,
    /// Bank-assigned transaction reference (Trx. ID, hash, ref no.).
    pub reference: Option<String>,
    /// Masked payer account digits — the NNN of "(*NNN)".
    pub payer_account: Option<String>,
    pub payer_name: Option<String>,
}

impl ParseResult {
    /// True when nothing at all was recognized.
    pub fn is_empty(&self) -> bool {
        !self.currency.is_known()
            && self.amount.is_none()
            && self.transaction_time.is_none()
            && self.reference.is_none()
            && self.payer_account.is_none()
            && self.payer_name.is_none()
    }

    /// Callers treat a result without an amount as "not a financial
    /// message" rather than as a failure.
    pub fn is_financial(&self) -> bool {
        self.amount.is_some()
    }
}
