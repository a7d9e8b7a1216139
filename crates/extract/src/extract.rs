//! Source extractors, the universal fallback, and the dispatcher.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use riel_core::{Amount, Currency};

use crate::patterns::{self, AmountRule, SlotOrder};
use crate::reference;
use crate::registry;
use crate::timestamp::{self, now_ict};
use crate::types::ParseResult;

/// Identity of one extractor: a known notification source, or the
/// generic fallback every unknown source resolves to.
///
/// A closed enum (rather than string keys) makes the registry a total
/// function — there is no missing-extractor runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extractor {
    Acleda,
    Aba,
    Plb,
    Canadia,
    Hlb,
    Vattanac,
    CpBank,
    Sathapana,
    ChipMong,
    Prasac,
    Amk,
    Prince,
    Ccu,
    S7Pos,
    S7Days,
    PaymentBk,
    Universal,
}

impl std::str::FromStr for Extractor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "acleda" => Ok(Extractor::Acleda),
            "aba" => Ok(Extractor::Aba),
            "plb" => Ok(Extractor::Plb),
            "canadia" => Ok(Extractor::Canadia),
            "hlb" => Ok(Extractor::Hlb),
            "vattanac" => Ok(Extractor::Vattanac),
            "cpbank" => Ok(Extractor::CpBank),
            "sathapana" => Ok(Extractor::Sathapana),
            "chipmong" => Ok(Extractor::ChipMong),
            "prasac" => Ok(Extractor::Prasac),
            "amk" => Ok(Extractor::Amk),
            "prince" => Ok(Extractor::Prince),
            "ccu" => Ok(Extractor::Ccu),
            "s7pos" => Ok(Extractor::S7Pos),
            "s7days" => Ok(Extractor::S7Days),
            "payment_bk" | "payment-bk" => Ok(Extractor::PaymentBk),
            "universal" => Ok(Extractor::Universal),
            other => Err(format!("Unknown extractor: '{other}'")),
        }
    }
}

impl Extractor {
    /// This extractor's own amount+currency rule list.
    fn rules(self) -> &'static [AmountRule] {
        match self {
            Extractor::Acleda => patterns::ACLEDA_RULES,
            Extractor::Aba => patterns::ABA_RULES,
            Extractor::Plb => patterns::PLB_RULES,
            Extractor::Canadia => patterns::CANADIA_RULES,
            Extractor::Hlb => patterns::HLB_RULES,
            Extractor::Vattanac => patterns::VATTANAC_RULES,
            Extractor::CpBank => patterns::CPBANK_RULES,
            Extractor::Sathapana => patterns::SATHAPANA_RULES,
            Extractor::ChipMong => patterns::CHIPMONG_RULES,
            Extractor::Prasac => patterns::PRASAC_RULES,
            Extractor::Amk => patterns::AMK_RULES,
            Extractor::Prince => patterns::PRINCE_RULES,
            Extractor::Ccu => patterns::CCU_RULES,
            Extractor::S7Pos => patterns::S7POS_RULES,
            // Aggregated separately in `match_amount`.
            Extractor::S7Days => &[],
            // No dedicated grammar observed yet for this source.
            Extractor::PaymentBk => patterns::UNIVERSAL_RULES,
            Extractor::Universal => patterns::UNIVERSAL_RULES,
        }
    }

    fn match_amount(self, text: &str) -> Option<(Currency, Amount)> {
        if self == Extractor::S7Days {
            if let Some(total) = sum_usd_values(text) {
                return Some((Currency::Usd, total));
            }
        }
        first_rule_match(self.rules(), text)
    }

    /// Extract against the current wall clock.
    pub fn extract(self, text: &str) -> ParseResult {
        self.extract_at(text, now_ict())
    }

    /// Extract with an explicit reference time. `now` supplies the
    /// calendar date for grammars that carry only a time of day; it is
    /// read exactly once per call.
    pub fn extract_at(self, text: &str, now: DateTime<FixedOffset>) -> ParseResult {
        let matched = self.match_amount(text).or_else(|| {
            if self == Extractor::Universal {
                return None;
            }
            trace!(extractor = ?self, "source rules missed, degrading to universal");
            Extractor::Universal.match_amount(text)
        });
        let (currency, amount) = match matched {
            Some((currency, amount)) => (currency, Some(amount)),
            None => (Currency::Unknown, None),
        };

        // Timestamp, reference, and payer are independent of the
        // amount outcome and of each other.
        let transaction_time = timestamp::extract_time(text, now);
        let reference = reference::extract_reference(text);
        let (payer_account, payer_name) = reference::extract_payer(text);

        ParseResult {
            currency,
            amount,
            transaction_time,
            reference,
            payer_account,
            payer_name,
        }
    }
}

/// Short-circuiting first-match fold over an ordered rule list.
fn first_rule_match(rules: &[AmountRule], text: &str) -> Option<(Currency, Amount)> {
    rules.iter().find_map(|rule| {
        let caps = (rule.pattern)().captures(text)?;
        let group = |idx: usize| caps.get(idx).map(|m| m.as_str());
        match rule.order {
            SlotOrder::AmountThenCurrency => Some((
                Currency::from_token(group(2)?),
                Amount::parse(group(1)?)?,
            )),
            SlotOrder::CurrencyThenAmount => Some((
                Currency::from_token(group(1)?),
                Amount::parse(group(2)?)?,
            )),
            SlotOrder::AmountOnlyUsd => Some((Currency::Usd, Amount::parse(group(1)?)?)),
            SlotOrder::AmountOnlyKhr => Some((Currency::Khr, Amount::parse(group(1)?)?)),
        }
    })
}

/// S7days shift reports list many "= N$" revenue lines; the message
/// amount is their sum, with a spurious trailing zero scale stripped.
fn sum_usd_values(text: &str) -> Option<Amount> {
    let mut total = Decimal::ZERO;
    let mut seen = false;
    for caps in patterns::s7days_usd_values().captures_iter(text) {
        if let Some(value) = caps.get(1).and_then(|m| Amount::parse(m.as_str())) {
            total += value.value();
            seen = true;
        }
    }
    seen.then(|| Amount::from_decimal(total.normalize()))
}

/// Parse one notification message.
///
/// Absent or unrecognized `source_id` routes to the universal
/// extractor. Never fails: unrecognized fields come back absent.
pub fn parse(source_id: Option<&str>, text: &str) -> ParseResult {
    parse_at(source_id, text, now_ict())
}

/// [`parse`] with an injected reference time (see
/// [`Extractor::extract_at`]).
pub fn parse_at(source_id: Option<&str>, text: &str, now: DateTime<FixedOffset>) -> ParseResult {
    registry::default_registry().parse_at(source_id, text, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::ict;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn fixed_now() -> DateTime<FixedOffset> {
        ict().with_ymd_and_hms(2025, 10, 11, 12, 0, 0).unwrap()
    }

    fn run(source: Option<&str>, text: &str) -> ParseResult {
        parse_at(source, text, fixed_now())
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn when(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        ict().with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    // ── End-to-end scenarios ─────────────────────────────────────────────────

    #[test]
    fn acleda_english_usd() {
        let r = run(
            Some("ACLEDABankBot"),
            "Received 9.60 USD from 089 536 367 Tot sochea, 11-Oct-2025 10:12AM. \
             Ref.ID: 52841705680",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().to_string(), "9.60");
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 10, 12, 0)));
        assert_eq!(r.reference.as_deref(), Some("52841705680"));
    }

    #[test]
    fn acleda_english_khr() {
        let r = run(
            Some("ACLEDABankBot"),
            "Received 5,000 KHR from 097 9841 404 PO LYHOR, 11-Oct-2025 10:13AM. \
             Ref.ID: 52841706944, at Yellow Mart Norton.",
        );
        assert_eq!(r.currency, Currency::Khr);
        assert_eq!(r.amount.unwrap().value(), dec("5000"));
        assert!(r.amount.unwrap().is_integral());
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 10, 13, 0)));
    }

    #[test]
    fn acleda_khmer_usd() {
        let r = run(
            Some("ACLEDABankBot"),
            "បានទទួល 21.15 ដុល្លារ ពី 097 8555 757 Saing Sopheak, \
             ថ្ងៃទី១១ តុលា ២០២៥ ១០:១៩ព្រឹក, លេខយោង 52841751197, នៅ PHE MUYTOUNG.",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().value(), dec("21.15"));
        // Khmer calendar day resolves to the reference date; the clock
        // time and morning marker resolve fully.
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 10, 19, 0)));
        assert_eq!(r.reference.as_deref(), Some("52841751197"));
    }

    #[test]
    fn aba_english_khr() {
        let r = run(
            Some("PayWayByABA_bot"),
            "៛78,000 paid by CHOR SEIHA (*655) on Oct 11, 10:21 AM via ABA PAY at \
             KEAM LILAY. Trx. ID: 176015291441643, APV: 134672.",
        );
        assert_eq!(r.currency, Currency::Khr);
        assert_eq!(r.amount.unwrap().value(), dec("78000"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 10, 21, 0)));
        assert_eq!(r.reference.as_deref(), Some("176015291441643"));
        assert_eq!(r.payer_account.as_deref(), Some("655"));
        assert_eq!(r.payer_name.as_deref(), Some("CHOR SEIHA"));
    }

    #[test]
    fn aba_khmer_usd() {
        let r = run(
            Some("PayWayByABA_bot"),
            "$4.00 ត្រូវបានបង់ដោយ NANG NALIN (*775) នៅថ្ងៃទី 11 ខែតុលា ឆ្នាំ 2025 \
             ម៉ោង 10:10 តាម ABA KHQR នៅ PHY SREYNANG។ \
             លេខប្រតិបត្តិការ: 176015224834254។ APV: 943476។",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().to_string(), "4.00");
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 10, 10, 0)));
        assert_eq!(r.reference.as_deref(), Some("176015224834254"));
        assert_eq!(r.payer_account.as_deref(), Some("775"));
        assert_eq!(r.payer_name.as_deref(), Some("NANG NALIN"));
    }

    #[test]
    fn plb_usd_with_seconds() {
        let r = run(
            Some("PLBITBot"),
            "2.65 USD was credited by VITOU SOKTHY            (ABA Bank) via KHQR to \
             MIXUE TAKHMAO 2 on 2025-10-11 09:36:33 Ref. No. 46201",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().value(), dec("2.65"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 9, 36, 33)));
        assert_eq!(r.payer_name.as_deref(), Some("VITOU SOKTHY"));
    }

    #[test]
    fn canadia_usd() {
        let r = run(
            Some("CanadiaMerchant_bot"),
            "1.50 USD was paid to your account: ZTO EXPRESS 1154039021 on 11 OCT 2025 \
             at 10:08:53 from  Advanced Bank of Asia Ltd. with Ref: FT25284T1CZ3, \
             Txn Hash: f12176a6",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().value(), dec("1.50"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 10, 8, 53)));
        assert_eq!(r.reference.as_deref(), Some("f12176a6"));
    }

    #[test]
    fn hlb_khr_at_joined_time() {
        let r = run(
            Some("HLBCAM_Bot"),
            "KHR 14,000.00 is paid to INFINITE MINI WASH from VANDALY LONG on \
             11-Oct-2025 @10:23:23.",
        );
        assert_eq!(r.currency, Currency::Khr);
        assert_eq!(r.amount.unwrap().to_string(), "14000.00");
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 10, 23, 23)));
    }

    #[test]
    fn vattanac_usd_evening() {
        let r = run(
            Some("vattanac_bank_merchant_prod_bot"),
            "USD 16.50 is paid by VELAI SEUP (ABA Bank) via KHQR on 04/10/2025 \
             09:32 PM at HOUSE 59 BY S.MEL\nTrx. ID: 001FTRA252780212\nHash: 8babcc36",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().value(), dec("16.50"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 4, 21, 32, 0)));
        assert_eq!(r.reference.as_deref(), Some("001FTRA252780212"));
        assert_eq!(r.payer_name.as_deref(), Some("VELAI SEUP"));
    }

    #[test]
    fn cpbank_received_and_amount_forms() {
        let received = run(
            Some("CPBankBot"),
            "You have received KHR 104,000 from THANGMEAS KHIEV, bank name: ABA Bank. \
             Transaction Hash: 333986e5. Transaction Date: 11-10-2025 10:52:51 AM.",
        );
        assert_eq!(received.currency, Currency::Khr);
        assert_eq!(received.amount.unwrap().value(), dec("104000"));
        assert_eq!(received.transaction_time, Some(when(2025, 10, 11, 10, 52, 51)));
        assert_eq!(received.reference.as_deref(), Some("333986e5"));

        let amount = run(
            Some("CPBankBot"),
            "Transaction amount USD 5.50 is paid from CHIEV SAMITH to DARIYA \
             RESTAURANT on 09-10-2025 01:11:55 PM. Transaction ID: CP2528205463",
        );
        assert_eq!(amount.currency, Currency::Usd);
        assert_eq!(amount.amount.unwrap().value(), dec("5.50"));
        assert_eq!(amount.transaction_time, Some(when(2025, 10, 9, 13, 11, 55)));
        assert_eq!(amount.reference.as_deref(), Some("CP2528205463"));
    }

    #[test]
    fn sathapana_dotted_clock() {
        let r = run(
            Some("SathapanaBank_bot"),
            "The amount 55.50 USD is paid from Khat Senghak, KB PRASAC Bank Plc, \
             Bill No.: Payment breakfast | 02A64CSItFU on 2025-10-04 08.58.45 AM with \
             Transaction ID: 099QORT252770056, Hash: 9277630f",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().value(), dec("55.50"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 4, 8, 58, 45)));
        assert_eq!(r.reference.as_deref(), Some("099QORT252770056"));
    }

    #[test]
    fn chipmong_khr() {
        let r = run(
            Some("chipmongbankpaymentbot"),
            "KHR 6,500 is paid by ABA Bank via KHQR for purchase d0ab71cd. From \
             ANDREW STEPHEN WARNER, at TIN KIMCHHE, date Oct 11, 2025 11:28 AM",
        );
        assert_eq!(r.currency, Currency::Khr);
        assert_eq!(r.amount.unwrap().value(), dec("6500"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 11, 28, 0)));
    }

    #[test]
    fn prasac_multiline() {
        let r = run(
            Some("prasac_merchant_payment_bot"),
            "Received Payment Amount 4.75 USD\n- Paid by: RASIN NY / ABA Bank\n\
             - Shop ID: 12003630\n- Transaction Date: 11-Oct-25 09:43.44 AM",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().value(), dec("4.75"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 9, 43, 44)));
    }

    #[test]
    fn amk_bold_markers() {
        let r = run(
            Some("AMKPlc_bot"),
            "**AMK PAY**\n**KHR 10,000** is paid from **THAK, CHHORN** to \
             **RANN, DANIEL** on **15-09-2025 04:17 PM** with Transaction ID: \
             **17579278527470001**",
        );
        assert_eq!(r.currency, Currency::Khr);
        assert_eq!(r.amount.unwrap().value(), dec("10000"));
        assert_eq!(r.transaction_time, Some(when(2025, 9, 15, 16, 17, 0)));
    }

    #[test]
    fn prince_labeled_bold_amount() {
        let r = run(
            Some("prince_pay_bot"),
            "Dear valued customer, you have received a payment:\n\
             Amount: **KHR 1,129,000**\nDatetime: 2025/10/10, 10:36 pm\n\
             Reference No: 820162501\nMerchant name: SOU CHENDA\nHash: c9b37f6d",
        );
        assert_eq!(r.currency, Currency::Khr);
        assert_eq!(r.amount.unwrap().value(), dec("1129000"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 10, 22, 36, 0)));
        assert_eq!(r.reference.as_deref(), Some("820162501"));
    }

    #[test]
    fn ccu_full_month_name() {
        let r = run(
            Some("ccu_bank_bot"),
            "105.00 USD is paid by SOYANUK SAMOEURN, ABA Bank *3961 on \
             31-October-2025, 08:35PM at X Gear Computer with Hash ID #865ecfef",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().to_string(), "105.00");
        assert_eq!(r.transaction_time, Some(when(2025, 10, 31, 20, 35, 0)));
        assert_eq!(r.payer_name.as_deref(), Some("SOYANUK SAMOEURN"));
    }

    #[test]
    fn s7pos_grand_total_line() {
        let r = run(
            Some("s7pos_bot"),
            "ការកម្មង់\nក្តិបកាបូប Longcharm  X1  5 $\nសរុប: 10.00 $\n\
             បញ្ចុះតំលៃ: 0.00 $\nសរុបចុងក្រោយ: 10.00 $\nថ្ងៃ: 2025-10-11 10:58:00",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().to_string(), "10.00");
        assert_eq!(r.transaction_time, Some(when(2025, 10, 11, 10, 58, 0)));
    }

    #[test]
    fn s7days_sums_every_revenue_line() {
        let r = run(
            Some("S7days777"),
            "-Cash = 0$\n-Total Room Revenues =20$\n-Bank Card = 20$\n\
             -Cash: = 74.6$\n-Total Room Revenue = 74.6$\n-Expenses = 0\n",
        );
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().value(), dec("189.2"));
    }

    // ── Fallback and equivalence properties ──────────────────────────────────

    #[test]
    fn known_source_falls_back_to_universal_rules() {
        // Not a Vattanac shape: its rules miss, the universal list
        // still recovers amount and currency.
        let text = "ចំនួន 11,500 រៀល លេខយោង 123456";
        let from_vattanac = run(Some("vattanac_bank_merchant_prod_bot"), text);
        let from_universal = run(None, text);
        assert_eq!(from_vattanac.currency, from_universal.currency);
        assert_eq!(from_vattanac.amount, from_universal.amount);
        assert_eq!(from_vattanac.currency, Currency::Khr);
        assert_eq!(from_vattanac.amount.unwrap().value(), dec("11500"));
    }

    #[test]
    fn fallback_never_skips_timestamp_extraction() {
        let text = "unfamiliar wording 12.50 USD at 2025-10-10 14:35:22";
        let r = run(Some("HLBCAM_Bot"), text);
        assert_eq!(r.amount.unwrap().value(), dec("12.50"));
        assert_eq!(r.transaction_time, Some(when(2025, 10, 10, 14, 35, 22)));
    }

    #[test]
    fn unknown_source_equals_absent_source_equals_universal() {
        let text = "$50.25 Transaction completed";
        let unknown = run(Some("unknown_bot_123"), text);
        let absent = run(None, text);
        let direct = Extractor::Universal.extract_at(text, fixed_now());
        assert_eq!(unknown, absent);
        assert_eq!(absent, direct);
        assert_eq!(direct.currency, Currency::Usd);
        assert_eq!(direct.amount.unwrap().value(), dec("50.25"));
    }

    #[test]
    fn universal_khmer_riel_scenario() {
        let r = run(None, "ចំនួន 11,500 រៀល លេខយោង 123456");
        assert_eq!(r.currency, Currency::Khr);
        assert_eq!(r.amount.unwrap().value(), dec("11500"));
        assert!(r.amount.unwrap().is_integral());
        assert_eq!(r.transaction_time, None);
        assert_eq!(r.reference.as_deref(), Some("123456"));
    }

    #[test]
    fn universal_khmer_dollar_suffix() {
        let r = run(Some("unknown_bot_xyz"), "ទទួលបាន 15.50 ដុល្លារ ពីអ្នកប្រើប្រាស់");
        assert_eq!(r.currency, Currency::Usd);
        assert_eq!(r.amount.unwrap().value(), dec("15.50"));
    }

    #[test]
    fn universal_labeled_amount() {
        let r = run(
            None,
            "Dear valued customer, you have received a payment:\nAmount: KHR 562,500\n\
             Datetime: 2025/08/22, 01:01 pm\nReference No: 737407541",
        );
        assert_eq!(r.currency, Currency::Khr);
        assert_eq!(r.amount.unwrap().value(), dec("562500"));
        assert_eq!(r.transaction_time, Some(when(2025, 8, 22, 13, 1, 0)));
    }

    #[test]
    fn no_match_yields_empty_result_without_panicking() {
        let r = run(Some("anything"), "hello world, no numbers here");
        assert_eq!(r.currency, Currency::Unknown);
        assert_eq!(r.amount, None);
        assert_eq!(r.transaction_time, None);
        assert!(r.is_empty());

        // Garbage input is equally safe.
        let _ = run(None, "!@#$%^&*()\n\u{0}\u{1}\u{2}");
        let _ = run(None, "");
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "Received 9.60 USD from A, 11-Oct-2025 10:12AM. Ref.ID: 1";
        let a = run(Some("ACLEDABankBot"), text);
        let b = run(Some("ACLEDABankBot"), text);
        assert_eq!(a, b);
    }

    #[test]
    fn extractor_names_round_trip() {
        for (name, extractor) in [
            ("acleda", Extractor::Acleda),
            ("cpbank", Extractor::CpBank),
            ("s7days", Extractor::S7Days),
            ("universal", Extractor::Universal),
        ] {
            assert_eq!(name.parse::<Extractor>().unwrap(), extractor);
        }
        assert!("mystery".parse::<Extractor>().is_err());
    }
}
