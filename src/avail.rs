//! Free/busy availability merging.
//!
//! Given N event streams and a window, [`merge`] produces a timeline of
//! Busy and Free intervals that exactly partitions the window. The sweep
//! processes end markers before start markers at equal instants, so
//! back-to-back events coalesce instead of leaking zero-width Free gaps.
//!
//! With `opaque = false`, each Busy interval carries the sorted set of
//! stream ids active during that slice, and the timeline splits wherever
//! the set changes. With `opaque = true` the ids are omitted and only the
//! busy/free alternation remains.
//!
//! Input streams are untrusted: events are clipped to the window, empty
//! or inverted events are dropped, and intra-stream disorder or overlap
//! is absorbed by the sweep's busy counting.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::event::{EventStream, IntervalKind, MergedInterval, Window};
use crate::Result;

/// Merges event streams into a Busy/Free partition of `window`.
pub fn merge(streams: &[EventStream], window: &Window, opaque: bool) -> Result<Vec<MergedInterval>> {
    // (+1, stream) at each clipped start, (-1, stream) at each clipped
    // end; equal instants order end-before-start via the marker value.
    let mut markers: Vec<(DateTime<Utc>, i8, usize)> = Vec::new();
    for (index, stream) in streams.iter().enumerate() {
        for event in &stream.events {
            let start = event.start.max(window.start);
            let end = event.end.min(window.end);
            if start >= end {
                continue;
            }
            markers.push((start, 1, index));
            markers.push((end, -1, index));
        }
    }
    markers.sort_by_key(|&(at, marker, _)| (at, marker));

    let mut intervals: Vec<MergedInterval> = Vec::new();
    let mut active: BTreeMap<usize, usize> = BTreeMap::new();
    let mut position = window.start;
    let mut index = 0;

    while index < markers.len() {
        let at = markers[index].0;
        if at > position {
            push_interval(&mut intervals, streams, &active, position, at, opaque);
            position = at;
        }
        // Apply every marker at this instant before emitting further.
        while index < markers.len() && markers[index].0 == at {
            let (_, marker, stream) = markers[index];
            if marker < 0 {
                match active.get_mut(&stream) {
                    Some(count) if *count > 1 => *count -= 1,
                    _ => {
                        active.remove(&stream);
                    }
                }
            } else {
                *active.entry(stream).or_insert(0) += 1;
            }
            index += 1;
        }
    }
    if position < window.end {
        push_interval(&mut intervals, streams, &active, position, window.end, opaque);
    }
    Ok(intervals)
}

/// Appends a slice, merging into the previous interval when kind (and,
/// for non-opaque output, the id set) is unchanged.
fn push_interval(
    intervals: &mut Vec<MergedInterval>,
    streams: &[EventStream],
    active: &BTreeMap<usize, usize>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    opaque: bool,
) {
    let kind = if active.is_empty() {
        IntervalKind::Free
    } else {
        IntervalKind::Busy
    };
    let stream_ids = if !opaque && kind == IntervalKind::Busy {
        let mut ids: Vec<String> = active
            .keys()
            .map(|&i| streams[i].stream_id.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Some(ids)
    } else {
        None
    };
    if let Some(last) = intervals.last_mut() {
        if last.kind == kind && last.stream_ids == stream_ids {
            last.end = end;
            return;
        }
    }
    intervals.push(MergedInterval {
        start,
        end,
        kind,
        stream_ids,
    });
}

/// The earliest Free interval of at least `duration`, or `None`.
pub fn find_first_free(
    streams: &[EventStream],
    window: &Window,
    duration: Duration,
) -> Result<Option<MergedInterval>> {
    let merged = merge(streams, window, true)?;
    Ok(merged
        .into_iter()
        .find(|interval| {
            interval.kind == IntervalKind::Free && interval.end - interval.start >= duration
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventInstance;
    use crate::tz;

    fn utc(s: &str) -> DateTime<Utc> {
        tz::parse_instant(s).unwrap()
    }

    fn stream(id: &str, events: &[(&str, &str)]) -> EventStream {
        EventStream {
            stream_id: id.to_string(),
            events: events
                .iter()
                .map(|(start, end)| EventInstance {
                    start: utc(start),
                    end: utc(end),
                })
                .collect(),
        }
    }

    fn window(start: &str, end: &str) -> Window {
        Window::new(utc(start), utc(end)).unwrap()
    }

    fn assert_partitions(intervals: &[MergedInterval], window: &Window) {
        assert_eq!(intervals.first().unwrap().start, window.start);
        assert_eq!(intervals.last().unwrap().end, window.end);
        for pair in intervals.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert_ne!(pair[0].kind, pair[1].kind, "adjacent intervals must alternate");
        }
        for interval in intervals {
            assert!(interval.start < interval.end);
        }
    }

    #[test]
    fn empty_streams_yield_one_free_interval() {
        let streams = vec![
            stream("cal-0", &[]),
            stream("cal-1", &[]),
            stream("cal-2", &[]),
        ];
        let w = window("2026-03-17T08:00:00Z", "2026-03-18T00:00:00Z");
        let merged = merge(&streams, &w, true).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, IntervalKind::Free);
        assert_eq!(merged[0].start, w.start);
        assert_eq!(merged[0].end, w.end);
    }

    #[test]
    fn single_event_splits_window_in_three() {
        let streams = vec![stream(
            "cal",
            &[("2026-03-17T10:00:00Z", "2026-03-17T11:00:00Z")],
        )];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T18:00:00Z");
        let merged = merge(&streams, &w, true).unwrap();
        assert_partitions(&merged, &w);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].kind, IntervalKind::Free);
        assert_eq!(merged[1].kind, IntervalKind::Busy);
        assert_eq!(merged[1].start, utc("2026-03-17T10:00:00Z"));
        assert_eq!(merged[1].end, utc("2026-03-17T11:00:00Z"));
        assert_eq!(merged[2].kind, IntervalKind::Free);
    }

    #[test]
    fn adjacent_events_coalesce() {
        let streams = vec![
            stream("a", &[("2026-03-17T09:00:00Z", "2026-03-17T10:00:00Z")]),
            stream("b", &[("2026-03-17T10:00:00Z", "2026-03-17T11:00:00Z")]),
        ];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T12:00:00Z");
        let merged = merge(&streams, &w, true).unwrap();
        assert_partitions(&merged, &w);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].kind, IntervalKind::Busy);
        assert_eq!(merged[1].start, utc("2026-03-17T09:00:00Z"));
        assert_eq!(merged[1].end, utc("2026-03-17T11:00:00Z"));
    }

    #[test]
    fn overlapping_events_merge_into_one_busy() {
        let streams = vec![
            stream("a", &[("2026-03-17T09:00:00Z", "2026-03-17T10:30:00Z")]),
            stream("b", &[("2026-03-17T10:00:00Z", "2026-03-17T11:00:00Z")]),
        ];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T12:00:00Z");
        let merged = merge(&streams, &w, true).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].start, utc("2026-03-17T09:00:00Z"));
        assert_eq!(merged[1].end, utc("2026-03-17T11:00:00Z"));
        assert!(merged[1].stream_ids.is_none());
    }

    #[test]
    fn non_opaque_splits_on_contributor_changes() {
        let streams = vec![
            stream("a", &[("2026-03-17T09:00:00Z", "2026-03-17T10:30:00Z")]),
            stream("b", &[("2026-03-17T10:00:00Z", "2026-03-17T11:00:00Z")]),
        ];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T12:00:00Z");
        let merged = merge(&streams, &w, false).unwrap();
        let busy: Vec<_> = merged
            .iter()
            .filter(|i| i.kind == IntervalKind::Busy)
            .collect();
        assert_eq!(busy.len(), 3);
        assert_eq!(busy[0].stream_ids, Some(vec!["a".to_string()]));
        assert_eq!(
            busy[1].stream_ids,
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(busy[2].stream_ids, Some(vec!["b".to_string()]));
        // Equal-kind neighbors with different contributors stay split.
        assert_eq!(busy[0].end, busy[1].start);
        assert_eq!(busy[1].end, busy[2].start);
    }

    #[test]
    fn events_clip_to_the_window() {
        let streams = vec![stream(
            "cal",
            &[
                ("2026-03-17T06:00:00Z", "2026-03-17T09:00:00Z"),
                ("2026-03-17T17:00:00Z", "2026-03-17T20:00:00Z"),
                ("2026-03-18T10:00:00Z", "2026-03-18T11:00:00Z"),
            ],
        )];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T18:00:00Z");
        let merged = merge(&streams, &w, true).unwrap();
        assert_partitions(&merged, &w);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].kind, IntervalKind::Busy);
        assert_eq!(merged[0].end, utc("2026-03-17T09:00:00Z"));
        assert_eq!(merged[2].kind, IntervalKind::Busy);
        assert_eq!(merged[2].start, utc("2026-03-17T17:00:00Z"));
    }

    #[test]
    fn disordered_and_overlapping_input_is_normalized() {
        let streams = vec![stream(
            "messy",
            &[
                ("2026-03-17T11:00:00Z", "2026-03-17T12:00:00Z"),
                ("2026-03-17T09:00:00Z", "2026-03-17T11:30:00Z"),
                ("2026-03-17T10:00:00Z", "2026-03-17T10:00:00Z"), // empty
            ],
        )];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T13:00:00Z");
        let merged = merge(&streams, &w, true).unwrap();
        assert_partitions(&merged, &w);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].start, utc("2026-03-17T09:00:00Z"));
        assert_eq!(merged[1].end, utc("2026-03-17T12:00:00Z"));
    }

    #[test]
    fn busy_covering_whole_window() {
        let streams = vec![stream(
            "cal",
            &[("2026-03-17T00:00:00Z", "2026-03-18T00:00:00Z")],
        )];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T18:00:00Z");
        let merged = merge(&streams, &w, true).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, IntervalKind::Busy);
        assert_eq!(merged[0].start, w.start);
        assert_eq!(merged[0].end, w.end);
    }

    #[test]
    fn first_free_slot_of_duration() {
        let streams = vec![stream(
            "cal",
            &[
                ("2026-03-17T08:30:00Z", "2026-03-17T09:00:00Z"),
                ("2026-03-17T09:15:00Z", "2026-03-17T10:00:00Z"),
            ],
        )];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T12:00:00Z");

        let slot = find_first_free(&streams, &w, Duration::minutes(30))
            .unwrap()
            .unwrap();
        assert_eq!(slot.start, utc("2026-03-17T10:00:00Z"));
        assert_eq!(slot.end, w.end);

        let quick = find_first_free(&streams, &w, Duration::minutes(15))
            .unwrap()
            .unwrap();
        assert_eq!(quick.start, utc("2026-03-17T09:00:00Z"));
        assert_eq!(quick.end, utc("2026-03-17T09:15:00Z"));
    }

    #[test]
    fn no_free_slot_returns_none() {
        let streams = vec![stream(
            "cal",
            &[("2026-03-17T08:00:00Z", "2026-03-17T12:00:00Z")],
        )];
        let w = window("2026-03-17T08:00:00Z", "2026-03-17T12:00:00Z");
        let slot = find_first_free(&streams, &w, Duration::minutes(1)).unwrap();
        assert!(slot.is_none());
    }
}
