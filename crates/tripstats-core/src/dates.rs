//! Date helpers
//!
//! Compact date keys (`YYYYMMDD`, `YYYYMM`), charge-session dates and the
//! fixed-offset local time used for hour/weekday buckets.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// `YYYYMMDD` (extra trailing characters are ignored)
pub fn is_compact_date(s: &str) -> bool {
    parse_compact_date(s).is_some()
}

/// `YYYYMM`
pub fn is_compact_month(s: &str) -> bool {
    s.len() >= 6
        && s.as_bytes()[..6].iter().all(u8::is_ascii_digit)
        && matches!(s[4..6].parse::<u32>(), Ok(1..=12))
}

/// Parse the first eight digits of a `YYYYMMDD` key
pub fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    let head = s.get(..8)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = head[..4].parse().ok()?;
    let month = head[4..6].parse().ok()?;
    let day = head[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Accepts `YYYY-MM-DD` or `YYYYMMDD`
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_compact_date(s))
}

/// Range bound from a filter: `YYYY-MM-DD` or `YYYYMMDD`, returned as a key
pub fn to_compact_key(s: &str) -> Option<String> {
    parse_flexible_date(s).map(|d| d.format("%Y%m%d").to_string())
}

/// `HH:MM` (seconds optional)
pub fn parse_clock(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

fn offset(utc_offset_minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)
}

/// Unix seconds to wall-clock time at a fixed offset
pub fn local_datetime(ts: i64, utc_offset_minutes: i32) -> Option<NaiveDateTime> {
    let utc = DateTime::<Utc>::from_timestamp(ts, 0)?;
    Some(utc.with_timezone(&offset(utc_offset_minutes)?).naive_local())
}

/// Wall-clock time at a fixed offset to Unix seconds
pub fn local_to_unix(local: NaiveDateTime, utc_offset_minutes: i32) -> Option<i64> {
    offset(utc_offset_minutes)?
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.timestamp())
}

/// Manufacturing date as an instant.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, `YYYYMMDD` and `YYYY-MM`; bare
/// dates are taken at midnight UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    let date = parse_flexible_date(s)
        .or_else(|| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok())?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
