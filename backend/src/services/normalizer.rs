//! Mapping of selected raw events into the published schema.

use crate::api::{NormalizedEvent, RawEvent};
use crate::models::fields::{
    extract_coordinate, extract_duration, extract_magnitude_drop, extract_name, extract_timestamp,
};
use crate::models::time::{format_utc, parse_utc};

/// Name used when no candidate name field is present.
pub const UNNAMED_EVENT: &str = "Unnamed occultation";

/// Map one raw event to a [`NormalizedEvent`].
///
/// Pure and infallible. The timestamp is rendered as RFC 3339 UTC when it
/// parses and passed through verbatim otherwise; callers only hand over
/// events with a resolvable timestamp.
pub fn normalize(event: &RawEvent) -> NormalizedEvent {
    let datetime_utc = extract_timestamp(event)
        .map(|raw| parse_utc(&raw).map(format_utc).unwrap_or(raw))
        .unwrap_or_default();
    let coordinate = extract_coordinate(event);

    NormalizedEvent {
        name: extract_name(event).unwrap_or_else(|| UNNAMED_EVENT.to_string()),
        datetime_utc,
        magnitude_drop: extract_magnitude_drop(event),
        duration: extract_duration(event),
        ra_deg: coordinate.map(|c| c.ra_deg),
        dec_deg: coordinate.map(|c| c.dec_deg),
    }
}

pub fn normalize_all(events: &[RawEvent]) -> Vec<NormalizedEvent> {
    events.iter().map(normalize).collect()
}
