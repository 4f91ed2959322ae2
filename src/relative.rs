//! Natural-language relative time, over a small strict grammar.
//!
//! ```text
//! expr := today | tomorrow | yesterday | now
//!       | next WDAY [at TIME] | last WDAY [at TIME]
//!       | in N UNIT | N UNIT (ago | from now)
//! WDAY := monday | tuesday | … | sunday
//! UNIT := minute | hour | day | week | month | year   (plural accepted)
//! TIME := H[:M][am|pm] | H:MM (24h)
//! ```
//!
//! Matching is case-insensitive and strict: an expression that does not
//! fit one branch exactly is rejected with the offending token named,
//! never reinterpreted under another branch.
//!
//! Day-name and day-word branches resolve on the anchor's local calendar
//! in the given zone; the result converts back to UTC through the fold
//! policy in [`crate::tz`].

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::{tz, Error, Result};

/// Resolves `expression` against `anchor`, in `zone`.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::relative::resolve;
/// use toon_temporal::tz;
///
/// let anchor = tz::parse_instant("2026-02-18T14:30:00+00:00").unwrap();
/// let zone = tz::resolve("UTC").unwrap();
/// let resolved = resolve(anchor, "next Tuesday at 2pm", zone).unwrap();
/// assert_eq!(tz::format_instant(resolved), "2026-02-24T14:00:00Z");
/// ```
pub fn resolve(anchor: DateTime<Utc>, expression: &str, zone: Tz) -> Result<DateTime<Utc>> {
    let lowered = expression.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    let local = anchor.with_timezone(&zone).naive_local();

    match tokens.as_slice() {
        [] => Err(Error::bad_input("empty relative expression")),
        ["now"] => Ok(anchor),
        ["today"] => day_start(zone, local.date(), 0),
        ["tomorrow"] => day_start(zone, local.date(), 1),
        ["yesterday"] => day_start(zone, local.date(), -1),
        ["next", wday, rest @ ..] => {
            let weekday = parse_weekday(wday)?;
            let time = parse_at_clause(rest, local.time())?;
            let mut date = local.date();
            loop {
                date = date.succ_opt().ok_or_else(date_overflow)?;
                if date.weekday() == weekday {
                    break;
                }
            }
            tz::local_to_utc(zone, date.and_time(time))
        }
        ["last", wday, rest @ ..] => {
            let weekday = parse_weekday(wday)?;
            let time = parse_at_clause(rest, local.time())?;
            let mut date = local.date();
            loop {
                date = date.pred_opt().ok_or_else(date_overflow)?;
                if date.weekday() == weekday {
                    break;
                }
            }
            tz::local_to_utc(zone, date.and_time(time))
        }
        ["in", n, unit] => shift(anchor, zone, parse_count(n)?, unit, 1),
        [n, unit, "ago"] => shift(anchor, zone, parse_count(n)?, unit, -1),
        [n, unit, "from", "now"] => shift(anchor, zone, parse_count(n)?, unit, 1),
        [first, ..] => Err(Error::bad_input(format!(
            "unrecognized relative expression token '{}'",
            first
        ))),
    }
}

fn date_overflow() -> Error {
    Error::overflow("relative expression leaves the representable date range")
}

fn day_start(zone: Tz, date: chrono::NaiveDate, offset_days: i64) -> Result<DateTime<Utc>> {
    let shifted = date
        .checked_add_signed(Duration::days(offset_days))
        .ok_or_else(date_overflow)?;
    let midnight = shifted
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::internal("midnight does not exist"))?;
    tz::local_to_utc(zone, midnight)
}

/// Applies `sign * n` units to the anchor. Minutes through weeks are
/// exact durations in UTC; months and years move the local wall clock on
/// the calendar, clamping the day-of-month, then convert back.
fn shift(
    anchor: DateTime<Utc>,
    zone: Tz,
    n: u32,
    unit: &str,
    sign: i64,
) -> Result<DateTime<Utc>> {
    let exact = |minutes: i64| -> Result<DateTime<Utc>> {
        let delta = minutes
            .checked_mul(n as i64)
            .and_then(|m| m.checked_mul(sign))
            .and_then(Duration::try_minutes)
            .ok_or_else(date_overflow)?;
        anchor.checked_add_signed(delta).ok_or_else(date_overflow)
    };
    match normalize_unit(unit)? {
        "minute" => exact(1),
        "hour" => exact(60),
        "day" => exact(60 * 24),
        "week" => exact(60 * 24 * 7),
        "month" => shift_months(anchor, zone, n, sign),
        "year" => {
            let months = n.checked_mul(12).ok_or_else(date_overflow)?;
            shift_months(anchor, zone, months, sign)
        }
        _ => unreachable!(),
    }
}

fn shift_months(anchor: DateTime<Utc>, zone: Tz, months: u32, sign: i64) -> Result<DateTime<Utc>> {
    let local = anchor.with_timezone(&zone).naive_local();
    let shifted = if sign >= 0 {
        local.checked_add_months(Months::new(months))
    } else {
        local.checked_sub_months(Months::new(months))
    }
    .ok_or_else(date_overflow)?;
    tz::local_to_utc(zone, shifted)
}

fn normalize_unit(unit: &str) -> Result<&'static str> {
    match unit {
        "minute" | "minutes" => Ok("minute"),
        "hour" | "hours" => Ok("hour"),
        "day" | "days" => Ok("day"),
        "week" | "weeks" => Ok("week"),
        "month" | "months" => Ok("month"),
        "year" | "years" => Ok("year"),
        other => Err(Error::bad_input(format!(
            "unrecognized time unit '{}'",
            other
        ))),
    }
}

fn parse_count(token: &str) -> Result<u32> {
    token.parse::<u32>().map_err(|_| {
        Error::bad_input(format!("expected a number, found '{}'", token))
    })
}

fn parse_weekday(token: &str) -> Result<Weekday> {
    match token {
        "monday" => Ok(Weekday::Mon),
        "tuesday" => Ok(Weekday::Tue),
        "wednesday" => Ok(Weekday::Wed),
        "thursday" => Ok(Weekday::Thu),
        "friday" => Ok(Weekday::Fri),
        "saturday" => Ok(Weekday::Sat),
        "sunday" => Ok(Weekday::Sun),
        other => Err(Error::bad_input(format!("unknown weekday '{}'", other))),
    }
}

/// Parses the optional `at TIME` tail; with no tail the default applies.
fn parse_at_clause(rest: &[&str], default: NaiveTime) -> Result<NaiveTime> {
    match rest {
        [] => Ok(default),
        ["at", time] => parse_time(time),
        [other, ..] => Err(Error::bad_input(format!(
            "unrecognized relative expression token '{}'",
            other
        ))),
    }
}

/// `H[:M][am|pm]` or 24-hour `H:MM`.
fn parse_time(token: &str) -> Result<NaiveTime> {
    let err = || Error::bad_input(format!("invalid time '{}'", token));
    let (body, meridiem) = if let Some(b) = token.strip_suffix("am") {
        (b, Some(false))
    } else if let Some(b) = token.strip_suffix("pm") {
        (b, Some(true))
    } else {
        (token, None)
    };
    if body.is_empty() {
        return Err(err());
    }
    let (hour_text, minute_text) = match body.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (body, None),
    };
    if !hour_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let mut hour: u32 = hour_text.parse().map_err(|_| err())?;
    let minute: u32 = match minute_text {
        Some(m) if m.bytes().all(|b| b.is_ascii_digit()) && !m.is_empty() => {
            m.parse().map_err(|_| err())?
        }
        Some(_) => return Err(err()),
        None => 0,
    };
    match meridiem {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return Err(err());
            }
            hour %= 12;
            if pm {
                hour += 12;
            }
        }
        None => {
            if hour > 23 {
                return Err(err());
            }
        }
    }
    if minute > 59 {
        return Err(err());
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        tz::parse_instant(s).unwrap()
    }

    fn run(anchor: &str, expr: &str, zone: &str) -> Result<String> {
        let zone = tz::resolve(zone)?;
        resolve(utc(anchor), expr, zone).map(tz::format_instant)
    }

    #[test]
    fn day_words_resolve_to_local_midnight() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "tomorrow", "UTC").unwrap(),
            "2026-02-19T00:00:00Z"
        );
        assert_eq!(
            run("2026-02-18T14:30:00Z", "today", "UTC").unwrap(),
            "2026-02-18T00:00:00Z"
        );
        assert_eq!(
            run("2026-02-18T14:30:00Z", "yesterday", "UTC").unwrap(),
            "2026-02-17T00:00:00Z"
        );
    }

    #[test]
    fn day_words_use_the_zone_calendar() {
        // 23:30Z on the 18th is already Feb 19 in Tokyo.
        assert_eq!(
            run("2026-02-18T23:30:00Z", "tomorrow", "Asia/Tokyo").unwrap(),
            "2026-02-19T15:00:00Z" // Feb 20 00:00 JST
        );
    }

    #[test]
    fn now_is_the_anchor() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "now", "America/New_York").unwrap(),
            "2026-02-18T14:30:00Z"
        );
    }

    #[test]
    fn next_weekday_with_time_override() {
        assert_eq!(
            run("2026-02-18T14:30:00+00:00", "next Tuesday at 2pm", "UTC").unwrap(),
            "2026-02-24T14:00:00Z"
        );
    }

    #[test]
    fn next_weekday_keeps_anchor_time_by_default() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "next tuesday", "UTC").unwrap(),
            "2026-02-24T14:30:00Z"
        );
    }

    #[test]
    fn next_is_strictly_after_the_anchor_date() {
        // The anchor is a Wednesday; "next wednesday" is a week out.
        assert_eq!(
            run("2026-02-18T14:30:00Z", "next wednesday", "UTC").unwrap(),
            "2026-02-25T14:30:00Z"
        );
    }

    #[test]
    fn last_weekday() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "last friday at 9:15am", "UTC").unwrap(),
            "2026-02-13T09:15:00Z"
        );
    }

    #[test]
    fn in_n_units() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "in 45 minutes", "UTC").unwrap(),
            "2026-02-18T15:15:00Z"
        );
        assert_eq!(
            run("2026-02-18T14:30:00Z", "in 2 weeks", "UTC").unwrap(),
            "2026-03-04T14:30:00Z"
        );
    }

    #[test]
    fn ago_and_from_now() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "3 hours ago", "UTC").unwrap(),
            "2026-02-18T11:30:00Z"
        );
        assert_eq!(
            run("2026-02-18T14:30:00Z", "2 days from now", "UTC").unwrap(),
            "2026-02-20T14:30:00Z"
        );
    }

    #[test]
    fn month_arithmetic_clamps_day() {
        assert_eq!(
            run("2026-01-31T10:00:00Z", "in 1 month", "UTC").unwrap(),
            "2026-02-28T10:00:00Z"
        );
        assert_eq!(
            run("2026-03-31T10:00:00Z", "1 month ago", "UTC").unwrap(),
            "2026-02-28T10:00:00Z"
        );
        assert_eq!(
            run("2024-02-29T10:00:00Z", "in 1 year", "UTC").unwrap(),
            "2025-02-28T10:00:00Z"
        );
    }

    #[test]
    fn twenty_four_hour_times() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "next monday at 14:05", "UTC").unwrap(),
            "2026-02-23T14:05:00Z"
        );
        assert_eq!(
            run("2026-02-18T14:30:00Z", "next monday at 9", "UTC").unwrap(),
            "2026-02-23T09:00:00Z"
        );
    }

    #[test]
    fn meridiem_edge_cases() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "next monday at 12am", "UTC").unwrap(),
            "2026-02-23T00:00:00Z"
        );
        assert_eq!(
            run("2026-02-18T14:30:00Z", "next monday at 12pm", "UTC").unwrap(),
            "2026-02-23T12:00:00Z"
        );
    }

    #[test]
    fn case_is_insensitive() {
        assert_eq!(
            run("2026-02-18T14:30:00Z", "NEXT TUESDAY AT 2PM", "UTC").unwrap(),
            "2026-02-24T14:00:00Z"
        );
    }

    #[test]
    fn rejects_with_offending_token() {
        let err = run("2026-02-18T14:30:00Z", "next frisday", "UTC").unwrap_err();
        assert!(err.to_string().contains("frisday"));

        let err = run("2026-02-18T14:30:00Z", "sometime soon", "UTC").unwrap_err();
        assert!(err.to_string().contains("sometime"));

        let err = run("2026-02-18T14:30:00Z", "in five days", "UTC").unwrap_err();
        assert!(err.to_string().contains("five"));

        let err = run("2026-02-18T14:30:00Z", "next tuesday at 25:00", "UTC").unwrap_err();
        assert!(err.to_string().contains("25:00"));

        assert!(run("2026-02-18T14:30:00Z", "", "UTC").is_err());
        assert!(run("2026-02-18T14:30:00Z", "3 fortnights ago", "UTC").is_err());
        assert!(run("2026-02-18T14:30:00Z", "next tuesday maybe", "UTC").is_err());
    }
}
