//! Schema-tolerant field extraction from raw upstream records.
//!
//! Prediction providers and API versions disagree on field names, so every
//! value is looked up through an ordered table of candidate keys: the first
//! key that yields a usable value wins. Supporting a new provider means adding
//! a key to one of the tables below; callers never change.
//!
//! Malformed values (non-numeric coordinates, empty strings) are treated the
//! same as missing ones.

use serde_json::Value;

use crate::api::{Coordinate, RawEvent};

/// Timestamp field names, highest priority first.
pub const TIMESTAMP_KEYS: &[&str] = &[
    "datetime",
    "datetime_utc",
    "date_time",
    "event_time",
    "epoch_utc",
];

/// Star position pairs. Preferred over target pairs when both are present.
pub const STAR_COORDINATE_KEYS: &[(&str, &str)] = &[
    ("ra_star_deg", "dec_star_deg"),
    ("star_ra_deg", "star_dec_deg"),
    ("star_ra", "star_dec"),
];

/// Target/object position pairs.
pub const TARGET_COORDINATE_KEYS: &[(&str, &str)] = &[
    ("ra_target_deg", "dec_target_deg"),
    ("target_ra", "target_dec"),
    ("ra_deg", "dec_deg"),
    ("ra", "dec"),
];

pub const NAME_KEYS: &[&str] = &[
    "name",
    "object_name",
    "target_name",
    "asteroid",
    "principal_designation",
    "designation",
];

pub const MAGNITUDE_DROP_KEYS: &[&str] = &["magnitude_drop", "mag_drop", "delta_mag"];

pub const DURATION_KEYS: &[&str] = &["event_duration", "duration", "duration_s"];

/// First non-empty string timestamp among [`TIMESTAMP_KEYS`].
pub fn extract_timestamp(event: &RawEvent) -> Option<String> {
    first_text(event, TIMESTAMP_KEYS)
}

/// Best available sky position: star pairs first, then target pairs.
///
/// A pair only matches when both halves parse as finite numbers.
pub fn extract_coordinate(event: &RawEvent) -> Option<Coordinate> {
    STAR_COORDINATE_KEYS
        .iter()
        .chain(TARGET_COORDINATE_KEYS.iter())
        .find_map(|(ra_key, dec_key)| {
            let ra = event.get(*ra_key).and_then(as_number)?;
            let dec = event.get(*dec_key).and_then(as_number)?;
            Some(Coordinate::new(ra, dec))
        })
}

pub fn extract_name(event: &RawEvent) -> Option<String> {
    first_text(event, NAME_KEYS)
}

/// Magnitude drop as published (number or text), without conversion.
pub fn extract_magnitude_drop(event: &RawEvent) -> Option<Value> {
    first_present(event, MAGNITUDE_DROP_KEYS)
}

/// Event duration as published (number or text), without conversion.
pub fn extract_duration(event: &RawEvent) -> Option<Value> {
    first_present(event, DURATION_KEYS)
}

/// Interpret a JSON value as a finite `f64`; numeric strings are accepted.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn first_text(event: &RawEvent, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match event.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn first_present(event: &RawEvent, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| match event.get(*key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v.clone()),
    })
}
