//! Timezone resolution and civil-time conversion.
//!
//! Backed by the IANA database embedded by `chrono-tz`; no I/O happens at
//! call time. The one policy decision lives in [`local_to_utc`] and is
//! the contract for every conversion in the crate:
//!
//! - a local time that does not exist (spring-forward gap) shifts forward
//!   by the width of the gap, i.e. the wall clock is interpreted with the
//!   pre-transition offset;
//! - an ambiguous local time (fall-back overlap) resolves to the earlier,
//!   pre-transition offset.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

use crate::{Error, Result};

/// Transitions are minutes-aligned in practice; three hours covers every
/// gap in the tzdb.
const MAX_GAP_PROBE_MINUTES: i64 = 180;

/// Looks up an IANA zone id.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::tz;
///
/// assert!(tz::resolve("America/New_York").is_ok());
/// assert!(tz::resolve("Not/A/Timezone").is_err());
/// ```
pub fn resolve(zone_id: &str) -> Result<Tz> {
    zone_id
        .parse::<Tz>()
        .map_err(|_| Error::bad_input(format!("invalid timezone id '{}'", zone_id)))
}

/// The zone's UTC offset at `instant`, in seconds east of UTC.
pub fn offset_at(tz: Tz, instant: DateTime<Utc>) -> i32 {
    tz.offset_from_utc_datetime(&instant.naive_utc())
        .fix()
        .local_minus_utc()
}

/// Whether a DST offset is in effect at `instant`.
pub fn dst_active(tz: Tz, instant: DateTime<Utc>) -> bool {
    tz.offset_from_utc_datetime(&instant.naive_utc())
        .dst_offset()
        != Duration::zero()
}

/// Converts a wall-clock time in `tz` to an absolute instant, applying
/// the fold policy described in the module docs.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => Ok(first.min(second).with_timezone(&Utc)),
        LocalResult::None => map_gap_forward(tz, local),
    }
}

/// Resolves a nonexistent local time by interpreting it with the offset
/// in force just before the transition, which shifts the wall clock
/// forward by exactly the width of the gap.
fn map_gap_forward(tz: Tz, local: NaiveDateTime) -> Result<DateTime<Utc>> {
    let mut probe = local;
    for _ in 0..MAX_GAP_PROBE_MINUTES {
        probe += Duration::minutes(1);
        let resolved = match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(first, second) => first.min(second),
            LocalResult::None => continue,
        };
        let transition = resolved.with_timezone(&Utc);
        let pre_offset = tz
            .offset_from_utc_datetime(&(transition - Duration::seconds(1)).naive_utc())
            .fix()
            .local_minus_utc();
        let utc_naive = local - Duration::seconds(pre_offset as i64);
        return Ok(Utc.from_utc_datetime(&utc_naive));
    }
    Err(Error::internal(format!(
        "{} does not occur in {} and no transition was found within {} minutes",
        local, tz, MAX_GAP_PROBE_MINUTES
    )))
}

/// Parses an RFC-3339 instant (any offset), normalized to UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::bad_input(format!("invalid RFC-3339 timestamp '{}'", s)))
}

/// Parses a local-naive datetime `YYYY-MM-DDTHH:MM:SS[.fff]`.
pub fn parse_local(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| Error::bad_input(format!("invalid local datetime '{}'", s)))
}

/// Renders an instant as RFC-3339 UTC with a `Z` suffix.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Renders the wall-clock time of `instant` in `tz`, without an offset
/// suffix.
pub fn format_local(tz: Tz, instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&tz)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn resolves_known_zones() {
        assert!(resolve("UTC").is_ok());
        assert!(resolve("America/New_York").is_ok());
        assert!(resolve("Australia/Lord_Howe").is_ok());
        assert!(resolve("").is_err());
        assert!(resolve("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn offsets_track_dst() {
        let tz = resolve("America/New_York").unwrap();
        let winter = parse_instant("2026-01-15T12:00:00Z").unwrap();
        let summer = parse_instant("2026-07-15T12:00:00Z").unwrap();
        assert_eq!(offset_at(tz, winter), -5 * 3600);
        assert_eq!(offset_at(tz, summer), -4 * 3600);
        assert!(!dst_active(tz, winter));
        assert!(dst_active(tz, summer));
    }

    #[test]
    fn unambiguous_local_converts_directly() {
        let tz = resolve("America/New_York").unwrap();
        let utc = local_to_utc(tz, naive(2026, 2, 16, 9, 0, 0)).unwrap();
        assert_eq!(format_instant(utc), "2026-02-16T14:00:00Z");
    }

    #[test]
    fn spring_forward_gap_shifts_by_gap_width() {
        // New York 2026: clocks jump 02:00 -> 03:00 on March 8.
        let tz = resolve("America/New_York").unwrap();
        let utc = local_to_utc(tz, naive(2026, 3, 8, 2, 30, 0)).unwrap();
        // 02:30 EST would be 07:30Z; the local rendering lands at 03:30 EDT.
        assert_eq!(format_instant(utc), "2026-03-08T07:30:00Z");
        assert_eq!(format_local(tz, utc), "2026-03-08T03:30:00");
    }

    #[test]
    fn fall_back_overlap_prefers_earlier_offset() {
        // New York 2026: clocks fall back 02:00 -> 01:00 on November 1,
        // so 01:30 occurs twice; the EDT (earlier) reading wins.
        let tz = resolve("America/New_York").unwrap();
        let utc = local_to_utc(tz, naive(2026, 11, 1, 1, 30, 0)).unwrap();
        assert_eq!(format_instant(utc), "2026-11-01T05:30:00Z");
    }

    #[test]
    fn parse_instant_accepts_any_offset() {
        let a = parse_instant("2026-02-18T14:30:00+00:00").unwrap();
        let b = parse_instant("2026-02-18T14:30:00Z").unwrap();
        let c = parse_instant("2026-02-18T09:30:00-05:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(parse_instant("2026-02-18 14:30:00").is_err());
    }

    #[test]
    fn parse_local_accepts_optional_fraction() {
        assert!(parse_local("2026-02-17T14:00:00").is_ok());
        assert!(parse_local("2026-02-17T14:00:00.250").is_ok());
        assert!(parse_local("2026-02-17T14:00").is_err());
        assert!(parse_local("not a datetime").is_err());
    }
}
