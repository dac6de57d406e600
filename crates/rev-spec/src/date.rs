//! The `@{<date>}` sub-grammar.
//!
//! Accepts, in priority order: a bare Unix timestamp, an ISO-like
//! `YYYY-M[M]-D[D] [HH:MM:SS [±HHMM]]`, a bare date (midnight local time),
//! and relative expressions like `2 days ago`. "Local" and "now" come from
//! the repository clock.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rev_utils::date::Clock;

use crate::ResolveError;

/// Parse a reflog date body into seconds since the Unix epoch.
pub(crate) fn parse_reflog_date(body: &str, clock: &Clock) -> Result<i64, ResolveError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ResolveError::Invalid("empty date in '@{}'".into()));
    }

    // 1. Bare Unix timestamp.
    if body.bytes().all(|b| b.is_ascii_digit()) {
        return body
            .parse::<i64>()
            .map_err(|_| ResolveError::Invalid(format!("timestamp out of range: '{}'", body)));
    }

    // 2. ISO-like with explicit timezone.
    if let Ok(dt) = DateTime::parse_from_str(body, "%Y-%m-%d %H:%M:%S %z") {
        return Ok(dt.timestamp());
    }

    // 3. ISO-like without timezone: local time per the clock.
    if let Ok(naive) = NaiveDateTime::parse_from_str(body, "%Y-%m-%d %H:%M:%S") {
        return Ok(to_epoch(naive, clock));
    }

    // 4. Bare date: midnight local time.
    if let Ok(date) = NaiveDate::parse_from_str(body, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(to_epoch(naive, clock));
        }
    }

    // 5. Relative to now.
    if let Some(seconds) = parse_relative(body) {
        return Ok(clock.now() - seconds);
    }

    Err(ResolveError::Invalid(format!(
        "unrecognized date: '{}'",
        body
    )))
}

/// Convert a local naive datetime to epoch seconds using the clock's zone.
fn to_epoch(naive: NaiveDateTime, clock: &Clock) -> i64 {
    naive.and_utc().timestamp() - i64::from(clock.tz_offset_minutes()) * 60
}

/// Parse `N <unit>[s] [ago]` into an offset in seconds.
fn parse_relative(body: &str) -> Option<i64> {
    let mut words = body.split_whitespace();
    let count: i64 = words.next()?.parse().ok()?;
    let unit = words.next()?;

    match words.next() {
        None => {}
        Some("ago") if words.next().is_none() => {}
        Some(_) => return None,
    }

    let unit_seconds = match unit.trim_end_matches('s') {
        "second" => 1,
        "minute" => 60,
        "hour" => 3600,
        "day" => 86400,
        "week" => 7 * 86400,
        "month" => 30 * 86400,
        "year" => 365 * 86400,
        _ => return None,
    };

    Some(count.checked_mul(unit_seconds)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_clock(now: i64) -> Clock {
        Clock::Fixed { now, tz_offset: 0 }
    }

    #[test]
    fn bare_timestamp() {
        let t = parse_reflog_date("1335806603", &utc_clock(0)).unwrap();
        assert_eq!(t, 1335806603);
    }

    #[test]
    fn iso_with_zone() {
        let t = parse_reflog_date("2012-04-30 17:22:43 +0000", &utc_clock(0)).unwrap();
        assert_eq!(t, 1335806563);
    }

    #[test]
    fn iso_with_negative_zone() {
        let utc = parse_reflog_date("2012-04-30 17:22:43 +0000", &utc_clock(0)).unwrap();
        let pacific = parse_reflog_date("2012-04-30 09:22:43 -0800", &utc_clock(0)).unwrap();
        assert_eq!(utc, pacific);
    }

    #[test]
    fn single_digit_month_and_day() {
        let a = parse_reflog_date("2012-4-30 09:23:27 -0800", &utc_clock(0)).unwrap();
        let b = parse_reflog_date("2012-04-30 09:23:27 -0800", &utc_clock(0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn iso_without_zone_uses_clock_zone() {
        let utc = parse_reflog_date("2012-04-30 17:22:43", &utc_clock(0)).unwrap();
        assert_eq!(utc, 1335806563);

        let behind = Clock::Fixed {
            now: 0,
            tz_offset: -480,
        };
        let local = parse_reflog_date("2012-04-30 09:22:43", &behind).unwrap();
        assert_eq!(local, utc);
    }

    #[test]
    fn bare_date_is_midnight_local() {
        let t = parse_reflog_date("2012-05-03", &utc_clock(0)).unwrap();
        assert_eq!(t, 1336003200); // 2012-05-03 00:00:00 UTC
    }

    #[test]
    fn relative_units() {
        let clock = utc_clock(1_000_000);
        assert_eq!(
            parse_reflog_date("1 second ago", &clock).unwrap(),
            999_999
        );
        assert_eq!(parse_reflog_date("1 second", &clock).unwrap(), 999_999);
        assert_eq!(
            parse_reflog_date("2 days ago", &clock).unwrap(),
            1_000_000 - 2 * 86400
        );
        assert_eq!(
            parse_reflog_date("3 weeks ago", &clock).unwrap(),
            1_000_000 - 3 * 7 * 86400
        );
        assert_eq!(
            parse_reflog_date("10 years ago", &clock).unwrap(),
            1_000_000 - 10 * 365 * 86400
        );
    }

    #[test]
    fn rejects_garbage() {
        let clock = utc_clock(0);
        assert!(parse_reflog_date("1a", &clock).is_err());
        assert!(parse_reflog_date("next tuesday-ish", &clock).is_err());
        assert!(parse_reflog_date("5 fortnights ago", &clock).is_err());
        assert!(parse_reflog_date("", &clock).is_err());
    }
}
