//! Public data model for the occultation finder.
//!
//! Raw upstream records are kept as untyped JSON objects; everything the
//! pipeline derives from them is strongly typed here. `NormalizedEvent` is the
//! only type that leaves the process, and its serialized field names are the
//! contract with downstream consumers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One raw candidate record as returned by the prediction source.
///
/// No schema is guaranteed; fields are read through [`crate::models::fields`].
pub type RawEvent = serde_json::Map<String, serde_json::Value>;

/// Sky position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Right ascension in degrees
    pub ra_deg: f64,
    /// Declination in degrees
    pub dec_deg: f64,
}

impl Coordinate {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }
}

/// Geographic location of the observing site (latitude, longitude, elevation).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeographicLocation {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180), east positive
    pub longitude: f64,
    /// Elevation in meters above sea level (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
}

impl GeographicLocation {
    pub fn new(latitude: f64, longitude: f64, elevation_m: Option<f64>) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        Ok(Self {
            latitude,
            longitude,
            elevation_m,
        })
    }

    /// Elginfield Observatory, London, Ontario.
    pub fn elginfield() -> Self {
        Self {
            latitude: 43.0739,
            longitude: -81.3158,
            elevation_m: Some(326.0),
        }
    }
}

/// One tier of the visibility relaxation ladder.
///
/// A tier is looser than another when its `min_altitude_deg` is smaller and
/// its `max_sun_altitude_deg` is larger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityThreshold {
    /// Minimum target altitude above the horizon, in degrees
    pub min_altitude_deg: f64,
    /// Maximum Sun altitude, in degrees (negative = below the horizon)
    pub max_sun_altitude_deg: f64,
}

impl VisibilityThreshold {
    pub fn new(min_altitude_deg: f64, max_sun_altitude_deg: f64) -> Self {
        Self {
            min_altitude_deg,
            max_sun_altitude_deg,
        }
    }

    /// `true` when every event passing `self` also passes `other`.
    pub fn is_at_least_as_strict_as(&self, other: &VisibilityThreshold) -> bool {
        self.min_altitude_deg >= other.min_altitude_deg
            && self.max_sun_altitude_deg <= other.max_sun_altitude_deg
    }
}

impl std::fmt::Display for VisibilityThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "alt>={:.1}° sun<={:.1}°",
            self.min_altitude_deg, self.max_sun_altitude_deg
        )
    }
}

/// Calendar span queried against the prediction source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SearchWindow {
    /// Window covering `days` days from `now`, `None` when the end is not
    /// representable.
    pub fn from_now(now: DateTime<Utc>, days: i64) -> Option<Self> {
        let end = Duration::try_days(days).and_then(|span| now.checked_add_signed(span))?;
        Some(Self { start: now, end })
    }

    /// Start date as `YYYY-MM-DD`.
    pub fn start_date(&self) -> String {
        self.start.date_naive().format("%Y-%m-%d").to_string()
    }

    /// End date as `YYYY-MM-DD`.
    pub fn end_date(&self) -> String {
        self.end.date_naive().format("%Y-%m-%d").to_string()
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Stable output record handed to the publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Occulting body name
    pub name: String,
    /// Event time, RFC 3339 UTC with a trailing `Z`
    pub datetime_utc: String,
    /// Expected magnitude drop, passed through as published upstream
    #[serde(default)]
    pub magnitude_drop: Option<serde_json::Value>,
    /// Expected event duration, passed through as published upstream
    #[serde(default)]
    pub duration: Option<serde_json::Value>,
    #[serde(default)]
    pub ra_deg: Option<f64>,
    #[serde(default)]
    pub dec_deg: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_geographic_location_rejects_bad_latitude() {
        assert!(GeographicLocation::new(91.0, 0.0, None).is_err());
        assert!(GeographicLocation::new(-90.5, 0.0, None).is_err());
    }

    #[test]
    fn test_geographic_location_rejects_bad_longitude() {
        assert!(GeographicLocation::new(0.0, 180.5, None).is_err());
        assert!(GeographicLocation::new(10.0, -17.9, Some(2396.0)).is_ok());
    }

    #[test]
    fn test_threshold_strictness() {
        let strict = VisibilityThreshold::new(20.0, -12.0);
        let loose = VisibilityThreshold::new(15.0, -6.0);
        assert!(strict.is_at_least_as_strict_as(&loose));
        assert!(!loose.is_at_least_as_strict_as(&strict));
        assert!(strict.is_at_least_as_strict_as(&strict));
    }

    #[test]
    fn test_search_window_dates() {
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 22, 30, 0).unwrap();
        let window = SearchWindow::from_now(now, 90).unwrap();
        assert_eq!(window.start_date(), "2026-10-14");
        assert_eq!(window.end_date(), "2027-01-12");
        assert_eq!(window.span_days(), 90);
    }

    #[test]
    fn test_search_window_out_of_range() {
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap();
        assert!(SearchWindow::from_now(now, i64::MAX).is_none());
        assert!(SearchWindow::from_now(now, 400_000_000).is_none());
    }

    #[test]
    fn test_normalized_event_field_names() {
        let event = NormalizedEvent {
            name: "(2) Pallas".to_string(),
            datetime_utc: "2026-11-01T03:04:05Z".to_string(),
            magnitude_drop: Some(serde_json::json!(1.2)),
            duration: None,
            ra_deg: Some(10.5),
            dec_deg: Some(-3.25),
        };
        let value = serde_json::to_value(&event).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "name",
            "datetime_utc",
            "magnitude_drop",
            "duration",
            "ra_deg",
            "dec_deg",
        ] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        assert!(obj["duration"].is_null());
    }
}
