//! Compiled pattern library for amount + currency extraction.
//!
//! Every pattern is compiled once on first use and shared for the life
//! of the process. Rule lists are ordered: extractors try them in
//! declaration order and the first match wins.

use regex::Regex;
use std::sync::OnceLock;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub(crate) use re;

/// Which capture slot of a rule holds the amount vs. the currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotOrder {
    /// Group 1 = amount digits, group 2 = currency token.
    AmountThenCurrency,
    /// Group 1 = currency token, group 2 = amount digits.
    CurrencyThenAmount,
    /// Group 1 = amount digits; the message grammar implies USD.
    AmountOnlyUsd,
    /// Group 1 = amount digits; the message grammar implies KHR.
    AmountOnlyKhr,
}

/// One amount+currency matcher.
pub(crate) struct AmountRule {
    pub pattern: fn() -> &'static Regex,
    pub order: SlotOrder,
}

// ── Source-specific patterns ─────────────────────────────────────────────────

// ACLEDA: "Received 9.60 USD from ..." / "បានទទួល 17,000 រៀល ពី ...".
// English and Khmer verbs share one rule; the currency slot accepts
// both codes and Khmer words.
re!(acleda_received,
    r"(?i)(?:Received|បានទទួល)\s+([\d,]+(?:\.\d+)?)\s+(USD|KHR|ដុល្លារ|រៀល)");

// ABA: "៛78,000 paid by ..." / "$4.00 ត្រូវបានបង់ដោយ ..." — currency
// symbol at start of a line.
re!(aba_symbol_start,
    r"(?m)^([៛$])([\d,]+(?:\.\d+)?)\s+(?:paid|ត្រូវបានបង់)");

// PLB: "4,000 KHR was credited by ...".
re!(plb_credited,
    r"(?i)([\d,]+(?:\.\d+)?)\s+(USD|KHR)\s+was\s+credited");

// Canadia: "1.50 USD was paid to your account ...".
re!(canadia_paid,
    r"(?i)([\d,]+(?:\.\d+)?)\s+(USD|KHR)\s+was\s+paid");

// HLB / Chip Mong: "KHR 14,000.00 is paid ...".
re!(is_paid_code_first,
    r"(?i)(USD|KHR)\s+([\d,]+(?:\.\d+)?)\s+is\s+paid");

// Vattanac: "USD 16.50 is paid by ...".
re!(vattanac_is_paid_by,
    r"(?i)(USD|KHR)\s+([\d,]+(?:\.\d+)?)\s+is\s+paid\s+by");

// CP Bank: "You have received KHR 104,000 ..." or
// "Transaction amount USD 5.50 ...".
re!(cpbank_received,
    r"(?i)(?:received|amount)\s+(USD|KHR)\s+([\d,]+(?:\.\d+)?)");

// Sathapana: "The amount 55.50 USD is paid from ...".
re!(sathapana_amount,
    r"(?i)amount\s+([\d,]+(?:\.\d+)?)\s+(USD|KHR)");

// PRASAC: "Received Payment Amount 4.75 USD".
re!(prasac_payment_amount,
    r"(?i)Payment\s+Amount\s+([\d,]+(?:\.\d+)?)\s+(USD|KHR)");

// AMK: "**KHR 10,000** is paid from ..." — bold markers survive in
// the delivered text.
re!(amk_bold_amount,
    r"(?i)\*\*(USD|KHR)\s+([\d,]+(?:\.\d+)?)\*\*");

// Prince: "Amount: **USD 50.00**".
re!(prince_amount_bold,
    r"(?i)Amount:\s+\*\*(USD|KHR)\s+([\d,]+(?:\.\d+)?)\*\*");

// CCU: "105.00 USD is paid by SOYANUK SAMOEURN, ...".
re!(ccu_is_paid_by,
    r"(?i)([\d,]+(?:\.\d+)?)\s+(USD|KHR)\s+is\s+paid\s+by");

// S7POS receipts: "សរុបចុងក្រោយ: 10.00 $" (grand-total line, USD).
re!(s7pos_final_amount,
    r"សរុបចុងក្រោយ:\s*([\d,]+(?:\.\d+)?)\s*\$");

// S7days shift reports: every "= N$" / ": N$" revenue line. Matched
// with `captures_iter` and summed, not first-match.
re!(s7days_usd_values,
    r"[=:]\s*([\d]+(?:\.\d+)?)\s*\$");

// ── Universal patterns ───────────────────────────────────────────────────────

// Khmer word-suffix forms: "23.25 ដុល្លារ", "11,500 រៀល".
re!(khmer_dollar_suffix,
    r"([\d,]+(?:\.\d+)?)\s+ដុល្លារ");
re!(khmer_riel_suffix,
    r"([\d,]+(?:\.\d+)?)\s+រៀល");

// "$100", "៛ 1,500".
re!(symbol_before_amount,
    r"([៛$])\s?([\d,]+(?:\.\d+)?)");

// "65.00 USD".
re!(amount_before_code,
    r"(?i)([\d,]+(?:\.\d+)?)\s+(USD|KHR)");

// "KHR 562,500".
re!(code_before_amount,
    r"(?i)(USD|KHR)\s+([\d,]+(?:\.\d+)?)");

// "Amount: KHR 562,500".
re!(amount_with_label,
    r"(?i)Amount:\s+(USD|KHR)\s+([\d,]+(?:\.\d+)?)");

// ── Rule lists ───────────────────────────────────────────────────────────────

pub(crate) const ACLEDA_RULES: &[AmountRule] = &[AmountRule {
    pattern: acleda_received,
    order: SlotOrder::AmountThenCurrency,
}];

pub(crate) const ABA_RULES: &[AmountRule] = &[AmountRule {
    pattern: aba_symbol_start,
    order: SlotOrder::CurrencyThenAmount,
}];

pub(crate) const PLB_RULES: &[AmountRule] = &[AmountRule {
    pattern: plb_credited,
    order: SlotOrder::AmountThenCurrency,
}];

pub(crate) const CANADIA_RULES: &[AmountRule] = &[AmountRule {
    pattern: canadia_paid,
    order: SlotOrder::AmountThenCurrency,
}];

pub(crate) const HLB_RULES: &[AmountRule] = &[AmountRule {
    pattern: is_paid_code_first,
    order: SlotOrder::CurrencyThenAmount,
}];

pub(crate) const VATTANAC_RULES: &[AmountRule] = &[AmountRule {
    pattern: vattanac_is_paid_by,
    order: SlotOrder::CurrencyThenAmount,
}];

pub(crate) const CPBANK_RULES: &[AmountRule] = &[AmountRule {
    pattern: cpbank_received,
    order: SlotOrder::CurrencyThenAmount,
}];

pub(crate) const SATHAPANA_RULES: &[AmountRule] = &[AmountRule {
    pattern: sathapana_amount,
    order: SlotOrder::AmountThenCurrency,
}];

pub(crate) const CHIPMONG_RULES: &[AmountRule] = &[AmountRule {
    pattern: is_paid_code_first,
    order: SlotOrder::CurrencyThenAmount,
}];

pub(crate) const PRASAC_RULES: &[AmountRule] = &[AmountRule {
    pattern: prasac_payment_amount,
    order: SlotOrder::AmountThenCurrency,
}];

pub(crate) const AMK_RULES: &[AmountRule] = &[AmountRule {
    pattern: amk_bold_amount,
    order: SlotOrder::CurrencyThenAmount,
}];

pub(crate) const PRINCE_RULES: &[AmountRule] = &[AmountRule {
    pattern: prince_amount_bold,
    order: SlotOrder::CurrencyThenAmount,
}];

pub(crate) const CCU_RULES: &[AmountRule] = &[AmountRule {
    pattern: ccu_is_paid_by,
    order: SlotOrder::AmountThenCurrency,
}];

pub(crate) const S7POS_RULES: &[AmountRule] = &[AmountRule {
    pattern: s7pos_final_amount,
    order: SlotOrder::AmountOnlyUsd,
}];

/// The generic fallback set every unknown source resolves to, and the
/// degraded baseline known sources fall back on. Broad patterns last.
pub(crate) const UNIVERSAL_RULES: &[AmountRule] = &[
    AmountRule { pattern: khmer_dollar_suffix, order: SlotOrder::AmountOnlyUsd },
    AmountRule { pattern: khmer_riel_suffix, order: SlotOrder::AmountOnlyKhr },
    AmountRule { pattern: symbol_before_amount, order: SlotOrder::CurrencyThenAmount },
    AmountRule { pattern: amount_before_code, order: SlotOrder::AmountThenCurrency },
    AmountRule { pattern: code_before_amount, order: SlotOrder::CurrencyThenAmount },
    AmountRule { pattern: amount_with_label, order: SlotOrder::CurrencyThenAmount },
];
