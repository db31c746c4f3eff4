//! Relative time-phrase parsing and display.
//!
//! Retrieval queries frequently carry temporal phrases ("notes from
//! yesterday", "what did I write last week"). When the language model is
//! unavailable this module provides the deterministic fallback: an explicit
//! ordered table of (phrase, range computation) pairs, matched by
//! case-insensitive substring, first match wins.
//!
//! All boundaries are inclusive. Start of day is 00:00:00.000 and end of day
//! is 23:59:59.999 in local time; ranges are converted to UTC on the way out.

use chrono::{DateTime, Datelike, Duration, Local, Months, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ParsedTimeRange, TimeRangeKind};

type RangeFn = fn(DateTime<Local>) -> (DateTime<Local>, DateTime<Local>);

/// Ordered phrase table. Order is the match priority: a query containing
/// several phrases resolves to the first entry that matches.
const PHRASES: [(&str, RangeFn); 4] = [
    ("last week", last_week),
    ("yesterday", yesterday),
    ("last month", last_month),
    ("today", today),
];

/// Regex covering the phrase vocabulary above, used to strip temporal words
/// from a query before keyword scoring.
static TIME_PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"last (week|month|year)|yesterday|today").expect("time phrase regex is valid")
});

/// Parse a relative time phrase out of a query, evaluated against the
/// current local time.
pub fn parse_relative_time(query: &str) -> Option<ParsedTimeRange> {
    parse_relative_time_at(query, Local::now())
}

/// Parse a relative time phrase against an explicit `now`.
///
/// Pure function over `now`; this is the variant unit tests exercise.
pub fn parse_relative_time_at(query: &str, now: DateTime<Local>) -> Option<ParsedTimeRange> {
    let lower = query.to_lowercase();
    for (phrase, compute) in PHRASES {
        if lower.contains(phrase) {
            let (start, end) = compute(now);
            return Some(
                ParsedTimeRange::new(
                    TimeRangeKind::RelativePhrase,
                    start.with_timezone(&Utc),
                    end.with_timezone(&Utc),
                )
                .with_phrase(phrase),
            );
        }
    }
    None
}

/// Remove recognized time phrases from a query so temporal words do not
/// pollute keyword scoring.
pub fn strip_time_phrases(query: &str) -> String {
    TIME_PHRASE_RE.replace_all(query, "").trim().to_string()
}

/// Render an instant relative to `now` for display in chat context:
/// "today", "yesterday", "N days ago", "last week", "last month", or an
/// absolute date for anything older.
pub fn format_relative_time(instant: DateTime<Utc>, now: DateTime<Local>) -> String {
    let local = instant.with_timezone(&Local);
    let days = (now.date_naive() - local.date_naive()).num_days();
    match days {
        i64::MIN..=-1 => local.format("%B %-d, %Y").to_string(),
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        7..=13 => "last week".to_string(),
        14..=45 => "last month".to_string(),
        _ => local.format("%B %-d, %Y").to_string(),
    }
}

// Phrase table entries. Each returns an inclusive (start, end) pair.

fn last_week(now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
    let today = now.date_naive();
    (start_of_day(today - Duration::days(7)), end_of_day(today))
}

fn yesterday(now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
    let day = now.date_naive() - Duration::days(1);
    (start_of_day(day), end_of_day(day))
}

fn last_month(now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
    let today = now.date_naive();
    // Calendar-month subtraction, clamped to the last valid day (Mar 31 -> Feb 28).
    let floor = today.checked_sub_months(Months::new(1)).unwrap_or(today);
    (start_of_day(floor), end_of_day(today))
}

fn today(now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
    let day = now.date_naive();
    (start_of_day(day), end_of_day(day))
}

fn start_of_day(day: NaiveDate) -> DateTime<Local> {
    let naive = day
        .and_hms_milli_opt(0, 0, 0, 0)
        .expect("midnight is a valid wall-clock time");
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

fn end_of_day(day: NaiveDate) -> DateTime<Local> {
    let naive = day
        .and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is a valid wall-clock time");
    Local
        .from_local_datetime(&naive)
        .latest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}
