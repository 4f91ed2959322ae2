//! Semantic field filtering.
//!
//! Removes entries matching a set of dotted-path patterns from a value
//! tree before encoding. Patterns anchor at the root; each segment is a
//! literal key or the wildcard `*`, which matches exactly one key at that
//! depth. Descending into a sequence does not consume a segment: every
//! element is matched at the same depth, so `*.etag` strips `etag` both
//! from maps nested one level down and from each element of a sequence
//! nested one level down.
//!
//! Removal never disturbs the survivors: sibling order and values are
//! untouched, and removing a field from a sequence element keeps the
//! element itself.
//!
//! ## Examples
//!
//! ```rust
//! use toon_temporal::filter_and_encode;
//!
//! let toon = filter_and_encode(
//!     r#"{"items":[{"name":"E","etag":"x"}]}"#,
//!     &["*.etag".to_string()],
//! )
//! .unwrap();
//! assert!(toon.contains("name"));
//! assert!(!toon.contains("etag"));
//! ```

use crate::{Error, Result, Value};

/// A parsed dotted-path pattern.
///
/// # Examples
///
/// ```rust
/// use toon_temporal::FieldPattern;
///
/// let pattern = FieldPattern::parse("items.*.etag").unwrap();
/// assert_eq!(pattern.len(), 3);
///
/// assert!(FieldPattern::parse("").is_err());
/// assert!(FieldPattern::parse("trailing.").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPattern {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Wildcard,
}

impl FieldPattern {
    /// Parses a dotted pattern. Empty patterns and empty segments
    /// (leading, trailing, or doubled dots) are rejected.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::bad_input("empty filter pattern"));
        }
        let mut segments = Vec::new();
        for part in pattern.split('.') {
            if part.is_empty() {
                return Err(Error::bad_input(format!(
                    "filter pattern '{}' has an empty segment",
                    pattern
                )));
            }
            segments.push(if part == "*" {
                Segment::Wildcard
            } else {
                Segment::Key(part.to_string())
            });
        }
        Ok(FieldPattern { segments })
    }

    /// The number of path segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`: parsing rejects empty patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn matches(&self, position: usize, key: &str) -> bool {
        match &self.segments[position] {
            Segment::Key(k) => k == key,
            Segment::Wildcard => true,
        }
    }

    fn is_terminal(&self, position: usize) -> bool {
        position + 1 == self.segments.len()
    }
}

/// Parses a list of textual patterns, failing fast on the first bad one.
pub fn parse_patterns(patterns: &[String]) -> Result<Vec<FieldPattern>> {
    patterns.iter().map(|p| FieldPattern::parse(p)).collect()
}

/// Removes every entry matching one of `patterns` from `value`, in place.
pub fn apply(value: &mut Value, patterns: &[FieldPattern]) {
    if patterns.is_empty() {
        return;
    }
    let active: Vec<(&FieldPattern, usize)> = patterns.iter().map(|p| (p, 0)).collect();
    prune(value, &active);
}

/// `active` carries each pattern still matching the path so far, with the
/// segment position to test next.
fn prune(value: &mut Value, active: &[(&FieldPattern, usize)]) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| {
                !active
                    .iter()
                    .any(|(p, pos)| p.matches(*pos, key) && p.is_terminal(*pos))
            });
            for (key, child) in map.iter_mut() {
                let descended: Vec<(&FieldPattern, usize)> = active
                    .iter()
                    .filter(|(p, pos)| p.matches(*pos, key) && !p.is_terminal(*pos))
                    .map(|(p, pos)| (*p, pos + 1))
                    .collect();
                if !descended.is_empty() {
                    prune(child, &descended);
                }
            }
        }
        Value::Array(elements) => {
            // A sequence is transparent to the path: elements sit at the
            // same depth as the sequence itself.
            for element in elements {
                prune(element, active);
            }
        }
        _ => {}
    }
}
