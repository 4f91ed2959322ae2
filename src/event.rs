//! Event and interval types shared by the truth engine.
//!
//! These types cross the string boundary as JSON, so they derive serde
//! and keep chrono's RFC-3339 rendering for instants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A concrete occurrence: `end` is strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInstance {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One calendar's events. Within a stream, events are expected to be
/// sorted and non-overlapping; the availability sweep tolerates and
/// normalizes violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStream {
    pub stream_id: String,
    pub events: Vec<EventInstance>,
}

/// The half-open query window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Builds a window, rejecting `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(Error::bad_input(format!(
                "window end {} is not after window start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Window { start, end })
    }
}

/// Whether a merged slice of the window is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Busy,
    Free,
}

/// One slice of the merged timeline. `stream_ids` is present only on
/// Busy intervals of a non-opaque merge, sorted for determinism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: IntervalKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_ids: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_rejects_inverted_bounds() {
        let a = Utc.with_ymd_and_hms(2026, 3, 17, 8, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 3, 18, 0, 0, 0).unwrap();
        assert!(Window::new(a, b).is_ok());
        assert!(Window::new(b, a).is_err());
        assert!(Window::new(a, a).is_err());
    }

    #[test]
    fn streams_parse_from_json() {
        let json = r#"[{"stream_id":"cal-1","events":[
            {"start":"2026-03-17T09:00:00Z","end":"2026-03-17T10:00:00+00:00"}
        ]}]"#;
        let streams: Vec<EventStream> = serde_json::from_str(json).unwrap();
        assert_eq!(streams[0].stream_id, "cal-1");
        assert_eq!(streams[0].events.len(), 1);
        assert!(streams[0].events[0].end > streams[0].events[0].start);
    }

    #[test]
    fn interval_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&IntervalKind::Busy).unwrap(),
            "\"busy\""
        );
        assert_eq!(
            serde_json::to_string(&IntervalKind::Free).unwrap(),
            "\"free\""
        );
    }
}
