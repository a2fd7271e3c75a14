//! Local calendar dates and the day sequences the grids are built from.
//!
//! Every key produced here is a local calendar date rendered as
//! `YYYY-MM-DD`. Nothing in this module reads the clock: callers pass
//! `today` in.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const DATE_KEY_LEN: usize = 10;

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Date key of an instant as seen on the wall clock of its own timezone.
///
/// Uses the local year/month/day components, so 23:30 at UTC+05:00 stays on
/// the same calendar day instead of drifting to the UTC date.
pub fn local_date_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    date_key(instant.date_naive())
}

/// First ten characters of a stored key, dropping any time-of-day suffix.
pub fn normalize_date_key(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.char_indices().nth(DATE_KEY_LEN) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

/// Parses a stored or requested key. Only the zero-padded form is accepted,
/// so `"2024-3-9"` is as malformed here as it is to a string comparison.
pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    let key = normalize_date_key(raw);
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .ok()
        .filter(|date| date_key(*date) == key)
}

/// The `n` days ending at `today`, oldest first.
pub fn recent_days(today: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset as i64)))
        .collect()
}

/// Every day of `month` (1-12) in `year`.
pub fn month_days(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|date| date.month() == month)
        .collect()
}

/// Weekday of the 1st of the month, Monday = 0 through Sunday = 6.
pub fn first_weekday_index_monday(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|first| first.weekday().num_days_from_monday())
}

/// Days from `start` through `today`. Empty when `start` lies in the future.
pub fn range_days(start: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    if start > today {
        return Vec::new();
    }
    start.iter_days().take_while(|date| *date <= today).collect()
}

/// First day of a heatmap: the later of the look-back window start and the
/// earliest logged day.
pub fn heatmap_start(
    today: NaiveDate,
    lookback_months: u32,
    earliest_log: Option<NaiveDate>,
) -> NaiveDate {
    let window_start = today
        .checked_sub_months(Months::new(lookback_months))
        .unwrap_or(NaiveDate::MIN);
    match earliest_log {
        Some(earliest) if earliest > window_start => earliest.min(today),
        _ => window_start,
    }
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn week_days(start: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take(7).collect()
}
