//! Transaction-reference and payer extraction.
//!
//! Every source labels its reference differently (Trx. ID, Ref.ID,
//! hashes, Khmer labels); the patterns below are tried in priority
//! order and the first capture wins. Payer details come from the
//! "paid by NAME (*NNN)" family of phrasings.

use regex::Regex;
use std::sync::OnceLock;

use crate::patterns::re;

re!(trx_id, r"Trx\.\s*ID:\s*([A-Za-z0-9]+)");
re!(hash_paren, r"(?i)\(Hash\.\s*([a-f0-9]+)\)?");
re!(khmer_ref, r"លេខយោង\s+([0-9]+)");
re!(khmer_transaction_no, r"លេខប្រតិបត្តិការ:\s*([0-9]+)");
re!(txn_hash, r"(?i)Txn\s+Hash:\s*([a-f0-9]+)");
re!(transaction_hash, r"(?i)Transaction\s+Hash:\s*([a-f0-9]+)");
re!(ref_id, r"Ref\.ID:\s*([0-9]+)");
re!(transaction_id, r"Transaction\s+ID:\s*([a-zA-Z0-9]+)");
re!(reference_no, r"Reference\s+No:\s*([0-9]+)");
re!(hash_label, r"(?i)Hash:\s*([a-f0-9]+)");

const REFERENCE_PATTERNS: &[fn() -> &'static Regex] = &[
    trx_id,
    hash_paren,
    khmer_ref,
    khmer_transaction_no,
    txn_hash,
    transaction_hash,
    ref_id,
    transaction_id,
    reference_no,
    hash_label,
];

pub(crate) fn extract_reference(text: &str) -> Option<String> {
    REFERENCE_PATTERNS.iter().find_map(|p| {
        p().captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}

// Masked account: "(*655)". First occurrence is the payer; later ones
// belong to the receiving side.
re!(payer_account, r"\(\*(\d+)\)");

// Name phrasings, most specific first. Character classes keep a lazy
// capture from running across parentheses or sentence boundaries.
re!(paid_by_before_paren, r"(?i)paid\s+by\s+([^()\r\n]+?)\s*\(");
re!(khmer_paid_by_before_paren, r"ត្រូវបានបង់ដោយ\s+([^()\r\n]+?)\s*\(");
re!(is_paid_by_before_comma, r"(?i)is\s+paid\s+by\s+([^,.\r\n]+?),");
re!(credited_by_before_paren, r"(?i)credited\s+by\s+([^()\r\n]+?)\s*\(");

const PAYER_NAME_PATTERNS: &[fn() -> &'static Regex] = &[
    paid_by_before_paren,
    khmer_paid_by_before_paren,
    is_paid_by_before_comma,
    credited_by_before_paren,
];

pub(crate) fn extract_payer(text: &str) -> (Option<String>, Option<String>) {
    let account = payer_account()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    let name = PAYER_NAME_PATTERNS.iter().find_map(|p| {
        p().captures(text)
            .and_then(|c| c.get(1))
            .map(|m| collapse_whitespace(m.as_str()))
    });
    (account, name)
}

/// Bank templates pad names with alignment spaces; collapse runs.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
