//! Deduplication and chronological ordering of candidate events.
//!
//! Two events are duplicates when they share the same raw timestamp string and
//! the same best-available name. The last occurrence wins; its slot in the
//! output is the slot of the first occurrence, so ties stay deterministic.
//! Ordering compares raw timestamp strings; events without one sort last.

use std::collections::HashMap;

use crate::api::RawEvent;
use crate::models::fields::{extract_name, extract_timestamp};

/// Timestamp sentinel for the dedup key.
pub const MISSING_TIMESTAMP_KEY: &str = "na";
/// Name sentinel for the dedup key.
pub const MISSING_NAME_KEY: &str = "unknown";
/// Sort value used for events without a timestamp.
pub const MAX_SORT_TIMESTAMP: &str = "9999-12-31T00:00:00Z";

/// `(timestamp, name)` identity of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub timestamp: String,
    pub name: String,
}

impl EventKey {
    pub fn of(event: &RawEvent) -> Self {
        Self {
            timestamp: extract_timestamp(event).unwrap_or_else(|| MISSING_TIMESTAMP_KEY.to_string()),
            name: extract_name(event).unwrap_or_else(|| MISSING_NAME_KEY.to_string()),
        }
    }
}

/// Chronological sort value: the raw timestamp, or [`MAX_SORT_TIMESTAMP`].
pub fn sort_key(event: &RawEvent) -> String {
    extract_timestamp(event).unwrap_or_else(|| MAX_SORT_TIMESTAMP.to_string())
}

/// Collapse duplicates, last write wins.
pub fn deduplicate<I>(events: I) -> Vec<RawEvent>
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut slots: HashMap<EventKey, usize> = HashMap::new();
    let mut unique: Vec<RawEvent> = Vec::new();

    for event in events {
        let key = EventKey::of(&event);
        match slots.get(&key) {
            Some(&index) => unique[index] = event,
            None => {
                slots.insert(key, unique.len());
                unique.push(event);
            }
        }
    }

    unique
}

/// Stable chronological sort; timestamp-less events go to the tail.
pub fn sort_chronologically(events: &mut [RawEvent]) {
    events.sort_by_cached_key(|event| {
        let missing = extract_timestamp(event).is_none();
        (missing, sort_key(event))
    });
}

/// Deduplicate then sort.
pub fn dedup_and_rank<I>(events: I) -> Vec<RawEvent>
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut unique = deduplicate(events);
    sort_chronologically(&mut unique);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> RawEvent {
        value.as_object().cloned().unwrap()
    }

    fn names(events: &[RawEvent]) -> Vec<String> {
        events
            .iter()
            .map(|e| e.get("tag").and_then(|v| v.as_str()).unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn test_duplicate_keeps_later_record() {
        let events = vec![
            event(json!({ "tag": "first", "name": "Ceres", "datetime": "2026-11-01T00:00:00Z", "magnitude_drop": 0.5 })),
            event(json!({ "tag": "other", "name": "Vesta", "datetime": "2026-11-01T00:00:00Z" })),
            event(json!({ "tag": "second", "name": "Ceres", "datetime": "2026-11-01T00:00:00Z", "magnitude_drop": 0.9 })),
        ];
        let unique = deduplicate(events);
        assert_eq!(unique.len(), 2);
        assert_eq!(names(&unique), vec!["second", "other"]);
        assert_eq!(unique[0]["magnitude_drop"], json!(0.9));
    }

    #[test]
    fn test_sentinel_keys_collapse_anonymous_events() {
        let events = vec![
            event(json!({ "tag": "a" })),
            event(json!({ "tag": "b" })),
        ];
        let unique = deduplicate(events);
        assert_eq!(names(&unique), vec!["b"]);
        assert_eq!(
            EventKey::of(&unique[0]),
            EventKey {
                timestamp: MISSING_TIMESTAMP_KEY.to_string(),
                name: MISSING_NAME_KEY.to_string(),
            }
        );
    }

    #[test]
    fn test_alternate_field_names_share_key() {
        let a = event(json!({ "datetime": "2026-11-01T00:00:00Z", "name": "Ceres" }));
        let b = event(json!({ "date_time": "2026-11-01T00:00:00Z", "object_name": "Ceres" }));
        assert_eq!(EventKey::of(&a), EventKey::of(&b));
    }

    #[test]
    fn test_sort_puts_missing_timestamps_last() {
        let mut events = vec![
            event(json!({ "tag": "none" })),
            event(json!({ "tag": "late", "datetime": "2027-01-01T00:00:00Z" })),
            event(json!({ "tag": "early", "datetime": "2026-11-01T00:00:00Z" })),
        ];
        sort_chronologically(&mut events);
        assert_eq!(names(&events), vec!["early", "late", "none"]);
    }

    #[test]
    fn test_missing_timestamp_after_sentinel_valued_timestamp() {
        let mut events = vec![
            event(json!({ "tag": "none" })),
            event(json!({ "tag": "max", "datetime": MAX_SORT_TIMESTAMP })),
        ];
        sort_chronologically(&mut events);
        assert_eq!(names(&events), vec!["max", "none"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let mut events = vec![
            event(json!({ "tag": "x", "name": "X", "datetime": "2026-11-01T00:00:00Z" })),
            event(json!({ "tag": "y", "name": "Y", "datetime": "2026-11-01T00:00:00Z" })),
            event(json!({ "tag": "z", "name": "Z", "datetime": "2026-10-31T00:00:00Z" })),
        ];
        sort_chronologically(&mut events);
        assert_eq!(names(&events), vec!["z", "x", "y"]);
    }

    #[test]
    fn test_dedup_and_rank() {
        let events = vec![
            event(json!({ "tag": "b1", "name": "B", "datetime": "2026-12-01T00:00:00Z" })),
            event(json!({ "tag": "a", "name": "A", "datetime": "2026-11-01T00:00:00Z" })),
            event(json!({ "tag": "b2", "name": "B", "datetime": "2026-12-01T00:00:00Z" })),
        ];
        assert_eq!(names(&dedup_and_rank(events)), vec!["a", "b2"]);
    }
}
