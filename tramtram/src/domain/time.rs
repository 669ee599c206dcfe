//! Europe/Rome wall clock without a timezone database.
//!
//! EU DST rule: clocks spring forward on the last Sunday of March at
//! 01:00 UTC and fall back on the last Sunday of October at 01:00 UTC.
//! Computed from the calendar year, so no platform tz tables are needed.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

/// Current wall-clock time in Europe/Rome.
pub fn rome_now() -> DateTime<FixedOffset> {
    to_rome(Utc::now())
}

/// Convert a UTC instant to Europe/Rome wall-clock time.
pub fn to_rome(utc: DateTime<Utc>) -> DateTime<FixedOffset> {
    let hours = if is_cest(utc) { 2 } else { 1 };
    // 1 or 2 hours east is always a valid offset
    let offset = FixedOffset::east_opt(hours * 3600).expect("valid offset");
    utc.with_timezone(&offset)
}

/// True while central European summer time (UTC+2) is in effect.
pub fn is_cest(utc: DateTime<Utc>) -> bool {
    let start = dst_transition(utc.year(), 3);
    let end = dst_transition(utc.year(), 10);
    utc >= start && utc < end
}

/// Last Sunday of the given month at 01:00 UTC.
fn dst_transition(year: i32, month: u32) -> DateTime<Utc> {
    // Only called for March and October; both have 31 days.
    let day31 = NaiveDate::from_ymd_opt(year, month, 31).expect("month has 31 days");
    let sunday = day31 - Duration::days(day31.weekday().num_days_from_sunday() as i64);
    Utc.from_utc_datetime(&sunday.and_hms_opt(1, 0, 0).expect("01:00 is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn transition_dates_for_known_years() {
        assert_eq!(dst_transition(2024, 3), utc("2024-03-31T01:00:00Z"));
        assert_eq!(dst_transition(2024, 10), utc("2024-10-27T01:00:00Z"));
        assert_eq!(dst_transition(2025, 3), utc("2025-03-30T01:00:00Z"));
        assert_eq!(dst_transition(2025, 10), utc("2025-10-26T01:00:00Z"));
        assert_eq!(dst_transition(2026, 3), utc("2026-03-29T01:00:00Z"));
        assert_eq!(dst_transition(2026, 10), utc("2026-10-25T01:00:00Z"));
    }

    #[test]
    fn spring_forward_boundary() {
        assert!(!is_cest(utc("2024-03-31T00:59:59Z")));
        assert!(is_cest(utc("2024-03-31T01:00:00Z")));
    }

    #[test]
    fn fall_back_boundary() {
        assert!(is_cest(utc("2024-10-27T00:59:59Z")));
        assert!(!is_cest(utc("2024-10-27T01:00:00Z")));
    }

    #[test]
    fn rome_offsets() {
        // Midwinter: CET = UTC+1
        let winter = to_rome(utc("2025-01-15T12:00:00Z"));
        assert_eq!(winter.hour(), 13);
        // Midsummer: CEST = UTC+2
        let summer = to_rome(utc("2025-07-15T12:00:00Z"));
        assert_eq!(summer.hour(), 14);
    }

    #[test]
    fn rome_hour_wraps_past_midnight() {
        let late = to_rome(utc("2025-07-15T23:30:00Z"));
        assert_eq!(late.hour(), 1);
    }
}
