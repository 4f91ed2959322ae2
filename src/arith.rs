//! Timestamp arithmetic: zone conversion, duration decomposition, and
//! signed adjustment.
//!
//! All arithmetic happens on UTC instants; zones matter only when a wall
//! clock is rendered. Adjustment is checked, so `Overflow` is returned
//! instead of wrapping at the edges of the representable range.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::{tz, Error, Result};

/// The result of rendering an instant in a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZonedView {
    pub utc: String,
    pub local: String,
    pub timezone: String,
    pub offset_seconds: i32,
    pub dst_active: bool,
}

/// The Euclidean decomposition of the distance between two instants.
/// `sign` reports direction: negative when `b` precedes `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationBreakdown {
    pub total_seconds: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub sign: i32,
}

/// The result of applying a signed offset to an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub adjusted_utc: String,
    pub adjusted_local: String,
    pub adjustment_applied: String,
}

/// Renders `instant` in `zone`.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::arith::convert_timezone;
/// use toon_temporal::tz;
///
/// let instant = tz::parse_instant("2026-03-15T14:00:00Z").unwrap();
/// let zone = tz::resolve("America/New_York").unwrap();
/// let view = convert_timezone(instant, zone);
/// assert_eq!(view.local, "2026-03-15T10:00:00");
/// assert!(view.dst_active);
/// ```
pub fn convert_timezone(instant: DateTime<Utc>, zone: Tz) -> ZonedView {
    ZonedView {
        utc: tz::format_instant(instant),
        local: tz::format_local(zone, instant),
        timezone: zone.name().to_string(),
        offset_seconds: tz::offset_at(zone, instant),
        dst_active: tz::dst_active(zone, instant),
    }
}

/// Decomposes `|b - a|` into days/hours/minutes/seconds.
pub fn compute_duration(a: DateTime<Utc>, b: DateTime<Utc>) -> DurationBreakdown {
    let delta = b.signed_duration_since(a).num_seconds();
    let total_seconds = delta.abs();
    DurationBreakdown {
        total_seconds,
        days: total_seconds / 86_400,
        hours: (total_seconds % 86_400) / 3_600,
        minutes: (total_seconds % 3_600) / 60,
        seconds: total_seconds % 60,
        sign: match delta {
            0 => 0,
            d if d > 0 => 1,
            _ => -1,
        },
    }
}

/// Parses an offset spec of the exact shape `[+-]digits[dhms]` into
/// signed seconds.
fn parse_offset_spec(spec: &str) -> Result<i64> {
    let err = || Error::bad_input(format!("invalid offset spec '{}'", spec));
    let bytes = spec.as_bytes();
    if bytes.len() < 3 {
        return Err(err());
    }
    let sign: i64 = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(err()),
    };
    let unit: i64 = match bytes[bytes.len() - 1] {
        b'd' => 86_400,
        b'h' => 3_600,
        b'm' => 60,
        b's' => 1,
        _ => return Err(err()),
    };
    let digits = &spec[1..spec.len() - 1];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let magnitude = digits.parse::<i64>().map_err(|_| {
        Error::overflow(format!("offset spec '{}' is out of range", spec))
    })?;
    magnitude
        .checked_mul(unit)
        .map(|s| s * sign)
        .ok_or_else(|| Error::overflow(format!("offset spec '{}' is out of range", spec)))
}

/// Shifts `instant` by `offset_spec` seconds in UTC and renders the
/// result in `zone`.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::arith::adjust_timestamp;
/// use toon_temporal::tz;
///
/// let instant = tz::parse_instant("2026-03-16T09:00:00Z").unwrap();
/// let zone = tz::resolve("UTC").unwrap();
/// let adjusted = adjust_timestamp(instant, "+3h", zone).unwrap();
/// assert_eq!(adjusted.adjusted_utc, "2026-03-16T12:00:00Z");
/// ```
pub fn adjust_timestamp(instant: DateTime<Utc>, offset_spec: &str, zone: Tz) -> Result<Adjustment> {
    let seconds = parse_offset_spec(offset_spec)?;
    let delta = Duration::try_seconds(seconds).ok_or_else(|| {
        Error::overflow(format!("offset spec '{}' is out of range", offset_spec))
    })?;
    let adjusted = instant
        .checked_add_signed(delta)
        .ok_or_else(|| {
            Error::overflow(format!(
                "adjusting {} by {} leaves the representable range",
                tz::format_instant(instant),
                offset_spec
            ))
        })?;
    Ok(Adjustment {
        adjusted_utc: tz::format_instant(adjusted),
        adjusted_local: tz::format_local(zone, adjusted),
        adjustment_applied: offset_spec.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        tz::parse_instant(s).unwrap()
    }

    #[test]
    fn convert_reports_offset_and_dst() {
        let zone = tz::resolve("America/New_York").unwrap();
        let view = convert_timezone(utc("2026-03-15T14:00:00Z"), zone);
        assert_eq!(view.utc, "2026-03-15T14:00:00Z");
        assert_eq!(view.local, "2026-03-15T10:00:00");
        assert_eq!(view.timezone, "America/New_York");
        assert_eq!(view.offset_seconds, -4 * 3600);
        assert!(view.dst_active);

        let winter = convert_timezone(utc("2026-01-15T14:00:00Z"), zone);
        assert_eq!(winter.offset_seconds, -5 * 3600);
        assert!(!winter.dst_active);
    }

    #[test]
    fn duration_decomposition() {
        let d = compute_duration(utc("2026-03-16T09:00:00Z"), utc("2026-03-16T17:00:00Z"));
        assert_eq!(d.total_seconds, 28_800);
        assert_eq!(d.days, 0);
        assert_eq!(d.hours, 8);
        assert_eq!(d.minutes, 0);
        assert_eq!(d.seconds, 0);
        assert_eq!(d.sign, 1);
    }

    #[test]
    fn duration_is_symmetric_with_sign() {
        let fwd = compute_duration(utc("2026-03-16T09:00:00Z"), utc("2026-03-18T10:30:45Z"));
        let back = compute_duration(utc("2026-03-18T10:30:45Z"), utc("2026-03-16T09:00:00Z"));
        assert_eq!(fwd.total_seconds, back.total_seconds);
        assert_eq!(fwd.days, 2);
        assert_eq!(fwd.hours, 1);
        assert_eq!(fwd.minutes, 30);
        assert_eq!(fwd.seconds, 45);
        assert_eq!(fwd.sign, 1);
        assert_eq!(back.sign, -1);

        let zero = compute_duration(utc("2026-03-16T09:00:00Z"), utc("2026-03-16T09:00:00Z"));
        assert_eq!(zero.sign, 0);
        assert_eq!(zero.total_seconds, 0);
    }

    #[test]
    fn adjust_roundtrips() {
        let zone = tz::resolve("Europe/Berlin").unwrap();
        let start = utc("2026-03-16T09:00:00Z");
        let forward = adjust_timestamp(start, "+36h", zone).unwrap();
        assert_eq!(forward.adjusted_utc, "2026-03-17T21:00:00Z");
        let back = adjust_timestamp(
            tz::parse_instant(&forward.adjusted_utc).unwrap(),
            "-36h",
            zone,
        )
        .unwrap();
        assert_eq!(back.adjusted_utc, "2026-03-16T09:00:00Z");
    }

    #[test]
    fn adjust_renders_local_in_zone() {
        let zone = tz::resolve("America/New_York").unwrap();
        let adjusted = adjust_timestamp(utc("2026-03-15T14:00:00Z"), "+1d", zone).unwrap();
        assert_eq!(adjusted.adjusted_utc, "2026-03-16T14:00:00Z");
        assert_eq!(adjusted.adjusted_local, "2026-03-16T10:00:00");
        assert_eq!(adjusted.adjustment_applied, "+1d");
    }

    #[test]
    fn offset_spec_shape_is_strict() {
        for bad in ["", "1h", "+h", "+1", "+1.5h", "+1w", "++1h", "+1h ", " +1h", "+-1h"] {
            assert!(parse_offset_spec(bad).is_err(), "accepted {:?}", bad);
        }
        assert_eq!(parse_offset_spec("+90m").unwrap(), 5_400);
        assert_eq!(parse_offset_spec("-2d").unwrap(), -172_800);
        assert_eq!(parse_offset_spec("+45s").unwrap(), 45);
    }

    #[test]
    fn huge_offsets_overflow() {
        let zone = tz::resolve("UTC").unwrap();
        let result = adjust_timestamp(
            utc("2026-03-16T09:00:00Z"),
            "+999999999999999999d",
            zone,
        );
        assert!(matches!(result, Err(Error::Overflow(_))));
    }
}
