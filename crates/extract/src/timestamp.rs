//! Timestamp grammars and the timestamp normalizer.
//!
//! Bank notification channels disagree wildly on date-time spelling;
//! this module carries one grammar per observed lexical form, tried in
//! a fixed priority order. A grammar that matches lexically but fails
//! range validation (e.g. an accidental "52:51 AM" window inside a
//! longer token) is skipped and the next grammar is tried, so a bad
//! window never shadows a later, correct one.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::{Captures, Regex};
use std::sync::OnceLock;

use riel_core::to_ascii_digits;

use crate::patterns::re;

/// The fixed timezone all normalized timestamps are expressed in.
pub fn ict() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).expect("UTC+7 is a valid offset")
}

/// Current wall-clock time in ICT. Read once per extraction call so a
/// single result is internally consistent.
pub fn now_ict() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&ict())
}

/// Lexical shape of a matched date/time substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grammar {
    /// "2025-10-04 08.58.45 AM" (Sathapana).
    IsoDotted12h,
    /// "11-10-2025 10:52:51 AM" (CP Bank).
    DmyDash12hSec,
    /// "15-09-2025 04:17 PM", optionally bold-wrapped (AMK, CP Bank).
    DmyDash12h,
    /// "04/10/2025 09:32 PM" (Vattanac).
    DmySlash12h,
    /// "11-Oct-2025 10:12AM" — no space before the meridiem (ACLEDA).
    DayMon12hTight,
    /// "31-October-2025, 08:35PM" — full month name (CCU).
    DayMonthComma12h,
    /// "11-Oct-2025 @10:23:23" (HLB).
    DayMonAt24h,
    /// "11 OCT 2025 at 10:08:53" (Canadia, ABA English).
    DayMonWordAt24h,
    /// "11-Oct-25 09:43.44 AM" — two-digit year, dotted seconds (PRASAC).
    DayMonShortDotted12h,
    /// "Oct 11, 10:21 AM" or "Oct 11, 2025 11:28 AM" — year optional,
    /// defaulting to the reference year (ABA, Chip Mong).
    MonDayComma12h,
    /// "2025/09/26, 10:07 pm" (Prince).
    YmdSlash12h,
    /// "2025-10-11 10:58:00", seconds optional (PLB, S7POS).
    Iso24h,
    /// "10/10/2025 14:35", seconds optional.
    DmySlash24h,
    /// "ម៉ោង 10:15" / "ថ្ងៃទី១១ តុលា ២០២៥ ១០:១៩ព្រឹក" — clock time with
    /// optional day-period marker; no resolvable calendar date.
    KhmerClock,
    /// "08.58.45" — bare dotted time-of-day.
    DottedTime,
}

pub(crate) struct TimeRule {
    pub pattern: fn() -> &'static Regex,
    pub grammar: Grammar,
}

re!(iso_dotted_12h,
    r"(?i)(\d{4})-(\d{2})-(\d{2})\s+(\d{1,2})\.(\d{2})\.(\d{2})\s+(AM|PM)");
re!(dmy_dash_12h_sec,
    r"(?i)(\d{2})-(\d{2})-(\d{4})\s+(\d{1,2}):(\d{2}):(\d{2})\s+(AM|PM)");
re!(dmy_dash_12h,
    r"(?i)\*{0,2}(\d{2})-(\d{2})-(\d{4})\s+(\d{1,2}):(\d{2})\s+(AM|PM)\*{0,2}");
re!(dmy_slash_12h,
    r"(?i)(\d{2})/(\d{2})/(\d{4})\s+(\d{1,2}):(\d{2})\s+(AM|PM)");
re!(day_mon_12h_tight,
    r"(?i)(\d{2})-(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)-(\d{4})\s+(\d{1,2}):(\d{2})(AM|PM)");
re!(day_month_comma_12h,
    r"(?i)(\d{1,2})-(January|February|March|April|May|June|July|August|September|October|November|December)-(\d{4}),\s*(\d{1,2}):(\d{2})\s*(AM|PM)");
re!(day_mon_at_24h,
    r"(?i)(\d{2})-(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)-(\d{4})\s+@(\d{2}):(\d{2}):(\d{2})");
re!(day_mon_word_at_24h,
    r"(?i)(\d{2})\s+(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(\d{4})\s+at\s+(\d{2}):(\d{2}):(\d{2})");
re!(day_mon_short_dotted_12h,
    r"(?i)(\d{2})-(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)-(\d{2})\s+(\d{2}):(\d{2})\.(\d{2})\s+(AM|PM)");
re!(mon_day_comma_12h,
    r"(?i)(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(\d{1,2}),\s+(?:(\d{4})\s+)?(\d{1,2}):(\d{2})\s+(AM|PM)");
re!(ymd_slash_12h,
    r"(?i)(\d{4})/(\d{2})/(\d{2}),\s+(\d{1,2}):(\d{2})\s+(AM|PM)");
re!(iso_24h,
    r"(\d{4})-(\d{2})-(\d{2})\s+(\d{1,2}):(\d{2})(?::(\d{2}))?");
re!(dmy_slash_24h,
    r"(\d{2})/(\d{2})/(\d{4})\s+(\d{1,2}):(\d{2})(?::(\d{2}))?");
re!(khmer_clock,
    r"(?i)(?:ម៉ោង|ថ្ងៃទី).*?(\d{1,2}):(\d{2})\s*(AM|PM|ព្រឹក|ល្ងាច)?");
re!(dotted_time,
    r"(\d{1,2})\.(\d{2})\.(\d{2})");

/// Grammar priority: most specific first; bare time-of-day forms last.
pub(crate) const TIME_RULES: &[TimeRule] = &[
    TimeRule { pattern: iso_dotted_12h, grammar: Grammar::IsoDotted12h },
    TimeRule { pattern: dmy_dash_12h_sec, grammar: Grammar::DmyDash12hSec },
    TimeRule { pattern: dmy_dash_12h, grammar: Grammar::DmyDash12h },
    TimeRule { pattern: dmy_slash_12h, grammar: Grammar::DmySlash12h },
    TimeRule { pattern: day_mon_12h_tight, grammar: Grammar::DayMon12hTight },
    TimeRule { pattern: day_month_comma_12h, grammar: Grammar::DayMonthComma12h },
    TimeRule { pattern: day_mon_at_24h, grammar: Grammar::DayMonAt24h },
    TimeRule { pattern: day_mon_word_at_24h, grammar: Grammar::DayMonWordAt24h },
    TimeRule { pattern: day_mon_short_dotted_12h, grammar: Grammar::DayMonShortDotted12h },
    TimeRule { pattern: mon_day_comma_12h, grammar: Grammar::MonDayComma12h },
    TimeRule { pattern: ymd_slash_12h, grammar: Grammar::YmdSlash12h },
    TimeRule { pattern: iso_24h, grammar: Grammar::Iso24h },
    TimeRule { pattern: dmy_slash_24h, grammar: Grammar::DmySlash24h },
    TimeRule { pattern: khmer_clock, grammar: Grammar::KhmerClock },
    TimeRule { pattern: dotted_time, grammar: Grammar::DottedTime },
];

/// Find the transaction timestamp in `text`, normalized to ICT.
///
/// `now` supplies the calendar date (and year, for year-less grammars)
/// when the matched grammar omits them. Near local midnight this can
/// attribute a delayed time-only message to the wrong day; that
/// ambiguity is inherent to the message formats.
pub(crate) fn extract_time(
    text: &str,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    TIME_RULES.iter().find_map(|rule| {
        let caps = (rule.pattern)().captures(text)?;
        resolve(rule.grammar, &caps, now)
    })
}

fn resolve(
    grammar: Grammar,
    caps: &Captures<'_>,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let (date, time) = match grammar {
        Grammar::IsoDotted12h => (
            ymd(num(caps, 1)?, num(caps, 2)?, num(caps, 3)?)?,
            clock_12h(num(caps, 4)?, num(caps, 5)?, num(caps, 6)?, is_pm(caps, 7)?)?,
        ),
        Grammar::DmyDash12hSec => (
            ymd(num(caps, 3)?, num(caps, 2)?, num(caps, 1)?)?,
            clock_12h(num(caps, 4)?, num(caps, 5)?, num(caps, 6)?, is_pm(caps, 7)?)?,
        ),
        Grammar::DmyDash12h | Grammar::DmySlash12h => (
            ymd(num(caps, 3)?, num(caps, 2)?, num(caps, 1)?)?,
            clock_12h(num(caps, 4)?, num(caps, 5)?, 0, is_pm(caps, 6)?)?,
        ),
        Grammar::DayMon12hTight | Grammar::DayMonthComma12h => (
            ymd(num(caps, 3)?, month_num(caps.get(2)?.as_str())?, num(caps, 1)?)?,
            clock_12h(num(caps, 4)?, num(caps, 5)?, 0, is_pm(caps, 6)?)?,
        ),
        Grammar::DayMonAt24h | Grammar::DayMonWordAt24h => (
            ymd(num(caps, 3)?, month_num(caps.get(2)?.as_str())?, num(caps, 1)?)?,
            NaiveTime::from_hms_opt(num(caps, 4)?, num(caps, 5)?, num(caps, 6)?)?,
        ),
        Grammar::DayMonShortDotted12h => (
            ymd(
                expand_year(num(caps, 3)?),
                month_num(caps.get(2)?.as_str())?,
                num(caps, 1)?,
            )?,
            clock_12h(num(caps, 4)?, num(caps, 5)?, num(caps, 6)?, is_pm(caps, 7)?)?,
        ),
        Grammar::MonDayComma12h => {
            let year = match caps.get(3) {
                Some(_) => num(caps, 3)?,
                None => now.year() as u32,
            };
            (
                ymd(year, month_num(caps.get(1)?.as_str())?, num(caps, 2)?)?,
                clock_12h(num(caps, 4)?, num(caps, 5)?, 0, is_pm(caps, 6)?)?,
            )
        }
        Grammar::YmdSlash12h => (
            ymd(num(caps, 1)?, num(caps, 2)?, num(caps, 3)?)?,
            clock_12h(num(caps, 4)?, num(caps, 5)?, 0, is_pm(caps, 6)?)?,
        ),
        Grammar::Iso24h => (
            ymd(num(caps, 1)?, num(caps, 2)?, num(caps, 3)?)?,
            NaiveTime::from_hms_opt(
                num(caps, 4)?,
                num(caps, 5)?,
                caps.get(6).map_or(Some(0), |_| num(caps, 6))?,
            )?,
        ),
        Grammar::DmySlash24h => (
            ymd(num(caps, 3)?, num(caps, 2)?, num(caps, 1)?)?,
            NaiveTime::from_hms_opt(
                num(caps, 4)?,
                num(caps, 5)?,
                caps.get(6).map_or(Some(0), |_| num(caps, 6))?,
            )?,
        ),
        Grammar::KhmerClock => (
            now.date_naive(),
            khmer_clock_time(
                num(caps, 1)?,
                num(caps, 2)?,
                caps.get(3).map(|m| m.as_str()),
            )?,
        ),
        Grammar::DottedTime => (
            now.date_naive(),
            NaiveTime::from_hms_opt(num(caps, 1)?, num(caps, 2)?, num(caps, 3)?)?,
        ),
    };
    at_ict(date, time)
}

// ── Capture helpers ──────────────────────────────────────────────────────────

/// Numeric capture, translating Khmer numerals first — `\d` matches
/// them, but `str::parse` does not.
fn num(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    to_ascii_digits(caps.get(idx)?.as_str()).parse().ok()
}

fn is_pm(caps: &Captures<'_>, idx: usize) -> Option<bool> {
    match caps.get(idx)?.as_str().to_ascii_lowercase().as_str() {
        "pm" => Some(true),
        "am" => Some(false),
        _ => None,
    }
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn expand_year(y: u32) -> u32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

fn month_num(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    match &lower[..3] {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

/// 12-hour to 24-hour. Out-of-range hours fall out at
/// `from_hms_opt`, rejecting the whole capture.
fn clock_12h(hour: u32, minute: u32, second: u32, pm: bool) -> Option<NaiveTime> {
    let hour = match (pm, hour) {
        (true, 12) => 12,
        (true, h) => h + 12,
        (false, 12) => 0,
        (false, h) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Khmer clock times carry an optional day-period word instead of a
/// reliable meridiem: ព្រឹក = morning, ល្ងាច = evening. Without a
/// marker the hour is taken as written (many Khmer messages use a
/// 24-hour clock).
fn khmer_clock_time(hour: u32, minute: u32, marker: Option<&str>) -> Option<NaiveTime> {
    let pm = marker.map(|m| matches!(m.to_ascii_lowercase().as_str(), "pm" | "ល្ងាច"));
    let hour = match pm {
        Some(true) if (1..=11).contains(&hour) => hour + 12,
        Some(false) if hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn at_ict(date: NaiveDate, time: NaiveTime) -> Option<DateTime<FixedOffset>> {
    ict().from_local_datetime(&date.and_time(time)).single()
}
