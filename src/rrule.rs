//! RFC-5545 recurrence rule parsing and expansion.
//!
//! [`RRuleSpec::parse`] reads the `KEY=VALUE;…` rule text; [`expand`]
//! enumerates concrete occurrences from a local-time anchor in a zone,
//! returning absolute UTC instants. The wall-clock time of the anchor is
//! preserved across DST transitions; invalid or ambiguous wall clocks
//! resolve through the fold policy in [`crate::tz`]. Durations are added
//! in UTC, so every instance is exactly `duration_minutes` long.
//!
//! ## Examples
//!
//! ```rust
//! use toon_temporal::rrule::{expand, RRuleSpec};
//! use toon_temporal::tz;
//!
//! let spec = RRuleSpec::parse("FREQ=DAILY;COUNT=3").unwrap();
//! let zone = tz::resolve("America/Los_Angeles").unwrap();
//! let anchor = tz::parse_local("2026-02-17T14:00:00").unwrap();
//!
//! let events = expand(&spec, anchor, 60, zone, None, None).unwrap();
//! assert_eq!(events.len(), 3);
//! ```

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use chrono_tz::Tz;

use crate::event::EventInstance;
use crate::{tz, Error, Result};

/// Hard ceiling on emitted occurrences, protecting unbounded rules.
pub const DEFAULT_SAFETY_CAP: usize = 10_000;

/// Ceiling on generation cycles, so filters that never match (for
/// example `BYMONTHDAY=31` stepping through Februaries) cannot spin
/// forever.
const CYCLE_SCAN_CAP: u64 = 200_000;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freq {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// One BYDAY entry: a weekday with an optional ordinal (`2MO` = second
/// Monday, `-1FR` = last Friday).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    pub ordinal: Option<i32>,
    pub weekday: Weekday,
}

/// The parsed form of an RRULE.
#[derive(Debug, Clone, PartialEq)]
pub struct RRuleSpec {
    pub freq: Freq,
    pub interval: u32,
    pub count: Option<u32>,
    /// Interpreted local-naive in the anchor zone, even when the rule
    /// text carried a `Z` suffix.
    pub until: Option<NaiveDateTime>,
    pub byday: Vec<ByDay>,
    pub bymonth: Vec<u32>,
    pub bymonthday: Vec<i32>,
}

impl RRuleSpec {
    /// Parses rule text, with or without the leading `RRULE:` marker.
    ///
    /// # Errors
    ///
    /// `BadInput` on empty rules, parts that are not `KEY=VALUE`, unknown
    /// keys, and out-of-range values.
    pub fn parse(rule: &str) -> Result<Self> {
        let trimmed = rule.trim();
        let body = trimmed.strip_prefix("RRULE:").unwrap_or(trimmed);
        if body.is_empty() {
            return Err(Error::bad_input("empty rrule"));
        }

        let mut freq = None;
        let mut interval = 1u32;
        let mut count = None;
        let mut until = None;
        let mut byday = Vec::new();
        let mut bymonth = Vec::new();
        let mut bymonthday = Vec::new();

        for part in body.split(';').filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                Error::bad_input(format!("rrule part '{}' is not KEY=VALUE", part))
            })?;
            match key.to_ascii_uppercase().as_str() {
                "FREQ" => {
                    freq = Some(match value.to_ascii_uppercase().as_str() {
                        "DAILY" => Freq::Daily,
                        "WEEKLY" => Freq::Weekly,
                        "MONTHLY" => Freq::Monthly,
                        "YEARLY" => Freq::Yearly,
                        other => {
                            return Err(Error::bad_input(format!(
                                "unsupported rrule frequency '{}'",
                                other
                            )));
                        }
                    });
                }
                "INTERVAL" => {
                    interval = value.parse::<u32>().ok().filter(|i| *i >= 1).ok_or_else(
                        || {
                            Error::bad_input(format!(
                                "rrule INTERVAL '{}' must be a positive integer",
                                value
                            ))
                        },
                    )?;
                }
                "COUNT" => {
                    count = Some(value.parse::<u32>().map_err(|_| {
                        Error::bad_input(format!("rrule COUNT '{}' is not an integer", value))
                    })?);
                }
                "UNTIL" => until = Some(parse_until(value)?),
                "BYDAY" => {
                    byday = value
                        .split(',')
                        .map(parse_byday)
                        .collect::<Result<Vec<_>>>()?;
                }
                "BYMONTH" => {
                    for m in value.split(',') {
                        let month = m.parse::<u32>().ok().filter(|m| (1..=12).contains(m));
                        bymonth.push(month.ok_or_else(|| {
                            Error::bad_input(format!("rrule BYMONTH '{}' is out of range", m))
                        })?);
                    }
                }
                "BYMONTHDAY" => {
                    for d in value.split(',') {
                        let day = d
                            .parse::<i32>()
                            .ok()
                            .filter(|d| (1..=31).contains(&d.abs()));
                        bymonthday.push(day.ok_or_else(|| {
                            Error::bad_input(format!(
                                "rrule BYMONTHDAY '{}' is out of range",
                                d
                            ))
                        })?);
                    }
                }
                // Weeks start on Monday here; the value is validated and
                // otherwise ignored.
                "WKST" => {
                    parse_weekday_code(value)?;
                }
                other => {
                    return Err(Error::bad_input(format!(
                        "unsupported rrule part '{}'",
                        other
                    )));
                }
            }
        }

        let freq = freq.ok_or_else(|| Error::bad_input("rrule is missing FREQ"))?;
        if freq == Freq::Yearly && !byday.is_empty() {
            return Err(Error::bad_input("BYDAY is not supported with FREQ=YEARLY"));
        }
        Ok(RRuleSpec {
            freq,
            interval,
            count,
            until,
            byday,
            bymonth,
            bymonthday,
        })
    }
}

fn parse_byday(token: &str) -> Result<ByDay> {
    let token = token.trim();
    if !token.is_ascii() {
        return Err(Error::bad_input(format!(
            "rrule BYDAY entry '{}' is invalid",
            token
        )));
    }
    let split = token.len().saturating_sub(2);
    let (ordinal_text, code) = token.split_at(split);
    let weekday = parse_weekday_code(code)?;
    let ordinal = if ordinal_text.is_empty() {
        None
    } else {
        let n = ordinal_text
            .parse::<i32>()
            .ok()
            .filter(|n| (1..=53).contains(&n.abs()))
            .ok_or_else(|| {
                Error::bad_input(format!("rrule BYDAY ordinal '{}' is invalid", ordinal_text))
            })?;
        Some(n)
    };
    Ok(ByDay { ordinal, weekday })
}

fn parse_weekday_code(code: &str) -> Result<Weekday> {
    match code.to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(Error::bad_input(format!(
            "unknown rrule weekday '{}'",
            other
        ))),
    }
}

fn parse_until(value: &str) -> Result<NaiveDateTime> {
    for format in ["%Y%m%dT%H%M%SZ", "%Y%m%dT%H%M%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    // A bare date bounds through the end of that day.
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        if let Some(dt) = date.and_hms_opt(23, 59, 59) {
            return Ok(dt);
        }
    }
    Err(Error::bad_input(format!(
        "rrule UNTIL '{}' is not a recognized datetime",
        value
    )))
}

/// Expands a recurrence into concrete `{start, end}` instances.
///
/// Termination, in order of precedence: `max_count`, the rule's `COUNT`,
/// the first candidate past `UNTIL` (the rule's own or `until_override`,
/// whichever bounds earlier), then [`DEFAULT_SAFETY_CAP`].
///
/// # Errors
///
/// `BadInput` on a non-positive duration; conversion errors from the
/// zone propagate.
pub fn expand(
    spec: &RRuleSpec,
    anchor: NaiveDateTime,
    duration_min: i64,
    zone: Tz,
    until_override: Option<NaiveDateTime>,
    max_count: Option<usize>,
) -> Result<Vec<EventInstance>> {
    if duration_min <= 0 {
        return Err(Error::bad_input(format!(
            "duration_minutes must be positive, got {}",
            duration_min
        )));
    }
    let until = match (spec.until, until_override) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    let mut limit = DEFAULT_SAFETY_CAP;
    if let Some(c) = spec.count {
        limit = limit.min(c as usize);
    }
    if let Some(m) = max_count {
        limit = limit.min(m);
    }

    let duration = Duration::try_minutes(duration_min)
        .ok_or_else(|| Error::overflow("duration_minutes is out of range"))?;
    let mut out = Vec::new();
    if limit == 0 {
        return Ok(out);
    }

    let mut cycle: u64 = 0;
    'cycles: while cycle < CYCLE_SCAN_CAP {
        for local in cycle_candidates(spec, anchor, cycle)? {
            if cycle == 0 && local < anchor {
                continue;
            }
            if let Some(bound) = until {
                if local > bound {
                    break 'cycles;
                }
            }
            let start = tz::local_to_utc(zone, local)?;
            out.push(EventInstance {
                start,
                end: start + duration,
            });
            if out.len() >= limit {
                break 'cycles;
            }
        }
        cycle += 1;
    }
    Ok(out)
}

/// Candidate wall-clock datetimes for one generation cycle, ascending.
/// A cycle is one step of `INTERVAL` frequency units; filters may leave
/// it empty.
fn cycle_candidates(
    spec: &RRuleSpec,
    anchor: NaiveDateTime,
    cycle: u64,
) -> Result<Vec<NaiveDateTime>> {
    let time = anchor.time();
    let step = cycle as i64 * spec.interval as i64;
    match spec.freq {
        Freq::Daily => {
            let date = checked_shift_days(anchor.date(), step)?;
            if passes_filters(date, spec) {
                Ok(vec![date.and_time(time)])
            } else {
                Ok(vec![])
            }
        }
        Freq::Weekly => {
            if spec.byday.is_empty() {
                let date = checked_shift_days(anchor.date(), step * 7)?;
                if passes_filters(date, spec) {
                    Ok(vec![date.and_time(time)])
                } else {
                    Ok(vec![])
                }
            } else {
                let week_start = anchor.date()
                    - Duration::days(anchor.weekday().num_days_from_monday() as i64);
                let base = checked_shift_days(week_start, step * 7)?;
                let mut offsets: Vec<i64> = spec
                    .byday
                    .iter()
                    .map(|bd| bd.weekday.num_days_from_monday() as i64)
                    .collect();
                offsets.sort_unstable();
                offsets.dedup();
                let mut out = Vec::with_capacity(offsets.len());
                for offset in offsets {
                    let date = base + Duration::days(offset);
                    if passes_filters(date, spec) {
                        out.push(date.and_time(time));
                    }
                }
                Ok(out)
            }
        }
        Freq::Monthly => {
            let (year, month) = month_shift(anchor.year(), anchor.month(), step);
            if !spec.bymonth.is_empty() && !spec.bymonth.contains(&month) {
                return Ok(vec![]);
            }
            let mut dates = Vec::new();
            if !spec.byday.is_empty() {
                for bd in &spec.byday {
                    match bd.ordinal {
                        Some(n) => {
                            if let Some(date) = nth_weekday(year, month, bd.weekday, n) {
                                dates.push(date);
                            }
                        }
                        None => dates.extend(weekdays_in_month(year, month, bd.weekday)),
                    }
                }
                dates.sort_unstable();
                dates.dedup();
            } else if !spec.bymonthday.is_empty() {
                for &d in &spec.bymonthday {
                    if let Some(date) = resolve_monthday(year, month, d) {
                        dates.push(date);
                    }
                }
                dates.sort_unstable();
                dates.dedup();
            } else if let Some(date) = NaiveDate::from_ymd_opt(year, month, anchor.day()) {
                // Months without the anchor's day are skipped entirely.
                dates.push(date);
            }
            Ok(dates.into_iter().map(|d| d.and_time(time)).collect())
        }
        Freq::Yearly => {
            let year = anchor.year() + i32::try_from(step).map_err(|_| {
                Error::overflow("rrule expansion year is out of range")
            })?;
            let months: Vec<u32> = if spec.bymonth.is_empty() {
                vec![anchor.month()]
            } else {
                let mut m = spec.bymonth.clone();
                m.sort_unstable();
                m.dedup();
                m
            };
            let mut dates = Vec::new();
            for month in months {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, anchor.day()) {
                    if spec.bymonthday.is_empty() || monthday_matches(date, &spec.bymonthday) {
                        dates.push(date);
                    }
                }
            }
            Ok(dates.into_iter().map(|d| d.and_time(time)).collect())
        }
    }
}

fn passes_filters(date: NaiveDate, spec: &RRuleSpec) -> bool {
    if !spec.byday.is_empty()
        && !spec.byday.iter().any(|bd| bd.weekday == date.weekday())
    {
        return false;
    }
    if !spec.bymonth.is_empty() && !spec.bymonth.contains(&date.month()) {
        return false;
    }
    if !spec.bymonthday.is_empty() && !monthday_matches(date, &spec.bymonthday) {
        return false;
    }
    true
}

fn monthday_matches(date: NaiveDate, bymonthday: &[i32]) -> bool {
    let day = date.day() as i32;
    let last = days_in_month(date.year(), date.month()) as i32;
    bymonthday
        .iter()
        .any(|&d| if d > 0 { d == day } else { last + 1 + d == day })
}

/// Resolves one BYMONTHDAY value in a month; negative values count from
/// the end (`-1` is the last day). `None` when the month has no such
/// day, so short months are skipped like the anchor-day rule.
fn resolve_monthday(year: i32, month: u32, day: i32) -> Option<NaiveDate> {
    let last = days_in_month(year, month) as i32;
    let resolved = if day > 0 { day } else { last + 1 + day };
    if !(1..=last).contains(&resolved) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, resolved as u32)
}

fn checked_shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| Error::overflow("rrule expansion date is out of range"))
}

fn month_shift(year: i32, month: u32, add: i64) -> (i32, u32) {
    let index = year as i64 * 12 + (month as i64 - 1) + add;
    ((index.div_euclid(12)) as i32, (index.rem_euclid(12) + 1) as u32)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = month_shift(year, month, 1);
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or(NaiveDate::MAX);
    (first_of_next - Duration::days(1)).day()
}

/// The nth weekday of a month; `n < 0` counts from the end.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: i32) -> Option<NaiveDate> {
    if n > 0 {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let shift = (7 + weekday.num_days_from_monday() as i64
            - first.weekday().num_days_from_monday() as i64)
            % 7;
        let date = first + Duration::days(shift + (n as i64 - 1) * 7);
        (date.month() == month && date.year() == year).then_some(date)
    } else {
        let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
        let shift = (7 + last.weekday().num_days_from_monday() as i64
            - weekday.num_days_from_monday() as i64)
            % 7;
        let date = last - Duration::days(shift + (-n as i64 - 1) * 7);
        (date.month() == month && date.year() == year).then_some(date)
    }
}

fn weekdays_in_month(year: i32, month: u32, weekday: Weekday) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut n = 1;
    while let Some(date) = nth_weekday(year, month, weekday, n) {
        out.push(date);
        n += 1;
    }
    out
}
