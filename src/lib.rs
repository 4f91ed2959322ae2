//! # toon-temporal
//!
//! A TOON codec and calendar truth engine for LLM-bound payloads.
//!
//! ## What is TOON?
//!
//! TOON is a compact, human-readable rendering of JSON-shaped data.
//! Indentation replaces braces, quotes appear only where a string would
//! be ambiguous, and uniform object sequences collapse into tables —
//! typically 30-60% fewer tokens than the equivalent JSON while staying
//! lossless: decoding an encoded document restores the original
//! structure, entry order, and numeric kinds.
//!
//! ## What is the truth engine?
//!
//! The temporal half of the crate answers calendar questions that LLMs
//! get wrong: expanding RFC-5545 recurrence rules into concrete UTC
//! instances, converting and adjusting timestamps across IANA zones
//! (with a pinned DST fold policy), resolving relative expressions like
//! `next Tuesday at 2pm`, and merging event streams into a free/busy
//! timeline.
//!
//! ## Quick start
//!
//! Every boundary operation consumes and produces UTF-8 strings, so the
//! crate drops into any host runtime unchanged:
//!
//! ```rust
//! use toon_temporal::{decode, encode, expand_rrule, filter_and_encode};
//!
//! // JSON -> TOON -> JSON, losslessly.
//! let toon = encode(r#"{"name":"Alice","age":30}"#).unwrap();
//! assert_eq!(toon, "name: Alice\nage: 30");
//! let json = decode(&toon).unwrap();
//! assert_eq!(json, r#"{"name":"Alice","age":30}"#);
//!
//! // Strip noisy fields before encoding.
//! let slim = filter_and_encode(
//!     r#"{"items":[{"name":"Standup","etag":"x1"}]}"#,
//!     &["*.etag".to_string()],
//! )
//! .unwrap();
//! assert!(!slim.contains("etag"));
//!
//! // Expand a recurrence into concrete instances.
//! let events = expand_rrule(
//!     "FREQ=DAILY;COUNT=3",
//!     "2026-02-17T14:00:00",
//!     60,
//!     "America/Los_Angeles",
//!     None,
//!     None,
//! )
//! .unwrap();
//! assert!(events.contains("2026-02-17T22:00:00Z"));
//! ```
//!
//! ## Typed API
//!
//! Rust callers can skip the string boundary: [`Value`] with
//! [`to_string`]/[`from_str`] for the codec, and the [`rrule`], [`tz`],
//! [`arith`], [`relative`] and [`avail`] modules for the engine.
//!
//! ```rust
//! use toon_temporal::{from_str, to_string, toon};
//!
//! let value = toon!({ "scores": [95, 87, 92] });
//! let text = to_string(&value).unwrap();
//! assert_eq!(from_str(&text).unwrap(), value);
//! ```
//!
//! ## Guarantees
//!
//! - Pure functions: no shared mutable state, safe to call from any
//!   number of threads; the IANA database is embedded, read-only data.
//! - No partial output: every operation returns a complete result or a
//!   single [`Error`] naming the offending input.
//! - Bounded work: recurrence expansion is capped, so a hostile rule
//!   cannot spin forever.

pub mod arith;
pub mod avail;
pub mod de;
pub mod error;
pub mod event;
pub mod filter;
pub mod format;
pub mod macros;
pub mod map;
pub mod options;
pub mod relative;
pub mod rrule;
pub mod ser;
pub mod tz;
pub mod value;

pub use de::from_str;
pub use error::{Error, ErrorKind, Result};
pub use event::{EventInstance, EventStream, IntervalKind, MergedInterval, Window};
pub use filter::FieldPattern;
pub use map::ValueMap;
pub use options::{ToonOptions, DEFAULT_WIDTH_BUDGET};
pub use rrule::RRuleSpec;
pub use ser::{to_string, to_string_with_options};
pub use value::{Number, Value};

use chrono::Duration;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable that silences the one-shot merge hint.
pub const QUIET_ENV: &str = "TOON_TEMPORAL_QUIET";

static MERGE_HINT_SHOWN: AtomicBool = AtomicBool::new(false);

/// Encodes JSON text as TOON.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::encode;
///
/// let toon = encode(r#"{"user":{"name":"Bob","active":true}}"#).unwrap();
/// assert_eq!(toon, "user:\n  name: Bob\n  active: true");
/// ```
///
/// # Errors
///
/// `BadInput` on malformed JSON.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(json_text: &str) -> Result<String> {
    let value = parse_json(json_text)?;
    ser::to_string(&value)
}

/// Decodes TOON text back to JSON.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::decode;
///
/// let json = decode("name: Alice\nage: 30").unwrap();
/// assert_eq!(json, r#"{"name":"Alice","age":30}"#);
/// ```
///
/// # Errors
///
/// `BadInput` on malformed TOON, with the offending line number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(toon_text: &str) -> Result<String> {
    let value = de::from_str(toon_text)?;
    to_json(&value)
}

/// Removes entries matching `patterns` from the JSON text, then encodes
/// the remainder as TOON. Patterns are validated before any parsing
/// work.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::filter_and_encode;
///
/// let toon = filter_and_encode(
///     r#"{"name":"Alice","etag":"abc","kind":"event"}"#,
///     &["etag".to_string(), "kind".to_string()],
/// )
/// .unwrap();
/// assert_eq!(toon, "name: Alice");
/// ```
///
/// # Errors
///
/// `BadInput` on malformed JSON or a malformed pattern.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn filter_and_encode(json_text: &str, patterns: &[String]) -> Result<String> {
    let parsed = filter::parse_patterns(patterns)?;
    let mut value = parse_json(json_text)?;
    filter::apply(&mut value, &parsed);
    ser::to_string(&value)
}

#[derive(Serialize)]
struct Occurrence {
    start: String,
    end: String,
}

/// Expands an RRULE from a local-time anchor into a JSON array of
/// `{start, end}` instances in RFC-3339 UTC.
///
/// `anchor_local` and `until` are local-naive (`YYYY-MM-DDTHH:MM:SS`),
/// interpreted in `zone`; `max_count` caps the expansion ahead of the
/// rule's own bounds.
///
/// # Errors
///
/// `BadInput` on an invalid rule, zone, anchor, or non-positive
/// duration.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn expand_rrule(
    rrule: &str,
    anchor_local: &str,
    duration_min: i64,
    zone: &str,
    until: Option<&str>,
    max_count: Option<usize>,
) -> Result<String> {
    let spec = rrule::RRuleSpec::parse(rrule)?;
    let zone = tz::resolve(zone)?;
    let anchor = tz::parse_local(anchor_local)?;
    let until = until.map(tz::parse_local).transpose()?;
    let events = rrule::expand(&spec, anchor, duration_min, zone, until, max_count)?;
    let occurrences: Vec<Occurrence> = events
        .iter()
        .map(|event| Occurrence {
            start: tz::format_instant(event.start),
            end: tz::format_instant(event.end),
        })
        .collect();
    to_json(&occurrences)
}

/// Renders an instant in a zone: `{utc, local, timezone, offset_seconds,
/// dst_active}`.
///
/// # Errors
///
/// `BadInput` on an invalid instant or zone.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn convert_timezone(instant: &str, zone: &str) -> Result<String> {
    let instant = tz::parse_instant(instant)?;
    let zone = tz::resolve(zone)?;
    to_json(&arith::convert_timezone(instant, zone))
}

/// Computes `{total_seconds, days, hours, minutes, seconds, sign}`
/// between two instants.
///
/// # Errors
///
/// `BadInput` on an invalid instant.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn compute_duration(instant_a: &str, instant_b: &str) -> Result<String> {
    let a = tz::parse_instant(instant_a)?;
    let b = tz::parse_instant(instant_b)?;
    to_json(&arith::compute_duration(a, b))
}

/// Shifts an instant by an offset spec (`[+-]digits[dhms]`), returning
/// `{adjusted_utc, adjusted_local, adjustment_applied}`.
///
/// # Errors
///
/// `BadInput` on an invalid instant, zone, or spec; `Overflow` when the
/// shift leaves the representable range.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn adjust_timestamp(instant: &str, offset_spec: &str, zone: &str) -> Result<String> {
    let instant = tz::parse_instant(instant)?;
    let zone = tz::resolve(zone)?;
    to_json(&arith::adjust_timestamp(instant, offset_spec, zone)?)
}

#[derive(Serialize)]
struct Resolved {
    resolved_utc: String,
    expression: String,
    timezone: String,
}

/// Resolves a relative expression (`tomorrow`, `next Tuesday at 2pm`,
/// `in 3 days`, …) against an anchor instant, in a zone.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::resolve_relative;
///
/// let json = resolve_relative(
///     "2026-02-18T14:30:00+00:00",
///     "next Tuesday at 2pm",
///     "UTC",
/// )
/// .unwrap();
/// assert!(json.contains("2026-02-24T14:00:00Z"));
/// ```
///
/// # Errors
///
/// `BadInput` on an invalid anchor or zone, or an expression outside
/// the grammar; the message names the offending token.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn resolve_relative(anchor_instant: &str, expression: &str, zone: &str) -> Result<String> {
    let anchor = tz::parse_instant(anchor_instant)?;
    let zone = tz::resolve(zone)?;
    let resolved = relative::resolve(anchor, expression, zone)?;
    to_json(&Resolved {
        resolved_utc: tz::format_instant(resolved),
        expression: expression.to_string(),
        timezone: zone.name().to_string(),
    })
}

#[derive(Serialize)]
struct MergeResult {
    intervals: Vec<MergedInterval>,
}

/// Merges event streams into `{intervals: [{start, end, kind,
/// stream_ids?}]}` partitioning the window. With `opaque = true`,
/// contributor ids are omitted.
///
/// `streams_json` is a JSON array of `{stream_id, events}` objects.
///
/// # Errors
///
/// `BadInput` on malformed streams JSON or an invalid window.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn merge_availability(
    streams_json: &str,
    window_start: &str,
    window_end: &str,
    opaque: bool,
) -> Result<String> {
    let streams: Vec<EventStream> = serde_json::from_str(streams_json)
        .map_err(|e| Error::bad_input(format!("invalid streams JSON: {}", e)))?;
    maybe_log_merge_hint(streams.len());
    let window = Window::new(tz::parse_instant(window_start)?, tz::parse_instant(window_end)?)?;
    let intervals = avail::merge(&streams, &window, opaque)?;
    to_json(&MergeResult { intervals })
}

/// Returns the earliest Free interval of at least `duration_min`
/// minutes across all streams as `{start, end}`, or JSON `null`.
///
/// # Errors
///
/// `BadInput` on malformed streams JSON, an invalid window, or a
/// non-positive duration.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn find_first_free_across(
    streams_json: &str,
    window_start: &str,
    window_end: &str,
    duration_min: i64,
) -> Result<String> {
    if duration_min <= 0 {
        return Err(Error::bad_input(format!(
            "duration_minutes must be positive, got {}",
            duration_min
        )));
    }
    let streams: Vec<EventStream> = serde_json::from_str(streams_json)
        .map_err(|e| Error::bad_input(format!("invalid streams JSON: {}", e)))?;
    let window = Window::new(tz::parse_instant(window_start)?, tz::parse_instant(window_end)?)?;
    let duration = Duration::try_minutes(duration_min)
        .ok_or_else(|| Error::overflow("duration_minutes is out of range"))?;
    let slot = avail::find_first_free(&streams, &window, duration)?;
    match slot {
        Some(interval) => to_json(&Occurrence {
            start: tz::format_instant(interval.start),
            end: tz::format_instant(interval.end),
        }),
        None => Ok("null".to_string()),
    }
}

fn parse_json(json_text: &str) -> Result<Value> {
    serde_json::from_str(json_text).map_err(|e| Error::bad_input(format!("invalid JSON: {}", e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::internal(format!("JSON rendering failed: {}", e)))
}

/// One informational line the first time a merge sees three or more
/// streams, suppressed by [`QUIET_ENV`]. The flag is monotonic and
/// never affects results.
fn maybe_log_merge_hint(stream_count: usize) {
    if stream_count < 3 || std::env::var_os(QUIET_ENV).is_some() {
        return;
    }
    if !MERGE_HINT_SHOWN.swap(true, Ordering::Relaxed) {
        log::info!(
            "merging {} event streams; merged timelines are cheap to cache for repeated windows",
            stream_count
        );
    }
}
