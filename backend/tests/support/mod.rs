#![allow(dead_code)]

use std::env;
use std::ffi::OsString;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use qtty::Degrees;
use serde_json::Value;

use occultation_finder::api::{Coordinate, GeographicLocation, RawEvent};
use occultation_finder::error::AstronomyError;
use occultation_finder::services::AstronomyProvider;

/// Serializes tests that touch process environment variables.
static ENV_MUTEX: Mutex<()> = parking_lot::const_mutex(());

/// Apply `vars` while `body` runs, then put the previous values back, also
/// when `body` panics. `None` unsets a variable.
pub fn with_env<R>(vars: &[(&str, Option<&str>)], body: impl FnOnce() -> R) -> R {
    let _serial = ENV_MUTEX.lock();
    let _restore = EnvRestore::capture(vars.iter().map(|(key, _)| *key));
    for (key, value) in vars {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
    body()
}

/// Saved values of the variables a test overrides.
struct EnvRestore(Vec<(String, Option<OsString>)>);

impl EnvRestore {
    fn capture<'a>(keys: impl Iterator<Item = &'a str>) -> Self {
        let mut saved: Vec<(String, Option<OsString>)> = Vec::new();
        for key in keys {
            if saved.iter().all(|(seen, _)| seen != key) {
                saved.push((key.to_string(), env::var_os(key)));
            }
        }
        Self(saved)
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in self.0.drain(..) {
            match value {
                Some(value) => env::set_var(&key, value),
                None => env::remove_var(&key),
            }
        }
    }
}

/// Astronomy stub: target altitude is the event's declination, the Sun has a
/// fixed altitude. Lets fixtures choose which tiers an event passes.
pub struct DeclinationAsAltitude {
    pub sun_altitude: f64,
}

impl Default for DeclinationAsAltitude {
    fn default() -> Self {
        Self { sun_altitude: -20.0 }
    }
}

impl AstronomyProvider for DeclinationAsAltitude {
    fn target_altitude(
        &self,
        coordinate: Coordinate,
        _at: DateTime<Utc>,
        _site: &GeographicLocation,
    ) -> Result<Degrees, AstronomyError> {
        Ok(Degrees::new(coordinate.dec_deg))
    }

    fn sun_altitude(
        &self,
        _at: DateTime<Utc>,
        _site: &GeographicLocation,
    ) -> Result<Degrees, AstronomyError> {
        Ok(Degrees::new(self.sun_altitude))
    }
}

/// Fixed evaluation time used by every fixture.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap()
}

pub fn raw(value: Value) -> RawEvent {
    value
        .as_object()
        .cloned()
        .expect("fixture must be a JSON object")
}

/// Timestamp `days` days after [`now`] (negative for the past).
pub fn days_from_now(days: i64) -> String {
    (now() + chrono::Duration::days(days))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Event whose stubbed target altitude is `altitude`.
pub fn event(name: &str, days: i64, altitude: f64) -> RawEvent {
    raw(serde_json::json!({
        "name": name,
        "datetime": days_from_now(days),
        "ra_star_deg": 100.0,
        "dec_star_deg": altitude,
    }))
}
