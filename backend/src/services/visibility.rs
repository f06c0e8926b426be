//! Per-event visibility test.
//!
//! An event is visible when, at its predicted time, it is still in the future,
//! the target is high enough above the horizon and the Sun is low enough.
//! Every failure path (missing field, bad timestamp, astronomy error) answers
//! "not visible" and never reaches the caller as an error.

use chrono::{DateTime, Utc};

use crate::api::{GeographicLocation, RawEvent, VisibilityThreshold};
use crate::models::fields::{extract_coordinate, extract_timestamp};
use crate::models::time::parse_utc;
use crate::services::astronomy::AstronomyProvider;

/// Evaluates events against one observing site at a fixed evaluation time.
pub struct VisibilityEvaluator<'a> {
    astronomy: &'a dyn AstronomyProvider,
    site: &'a GeographicLocation,
    now: DateTime<Utc>,
}

impl<'a> VisibilityEvaluator<'a> {
    pub fn new(
        astronomy: &'a dyn AstronomyProvider,
        site: &'a GeographicLocation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            astronomy,
            site,
            now,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// `true` iff the event is in the future and passes `threshold`.
    pub fn is_visible(&self, event: &RawEvent, threshold: &VisibilityThreshold) -> bool {
        let Some(raw_ts) = extract_timestamp(event) else {
            log::debug!("Skipping event without timestamp");
            return false;
        };
        let Some(at) = parse_utc(&raw_ts) else {
            log::debug!("Skipping event with unparseable timestamp '{}'", raw_ts);
            return false;
        };
        if at <= self.now {
            return false;
        }
        let Some(coordinate) = extract_coordinate(event) else {
            log::debug!("Skipping event at {} without usable coordinates", raw_ts);
            return false;
        };

        let target_alt = match self.astronomy.target_altitude(coordinate, at, self.site) {
            Ok(alt) => alt,
            Err(e) => {
                log::debug!("Cannot evaluate target altitude for {}: {}", raw_ts, e);
                return false;
            }
        };
        let sun_alt = match self.astronomy.sun_altitude(at, self.site) {
            Ok(alt) => alt,
            Err(e) => {
                log::debug!("Cannot evaluate sun altitude for {}: {}", raw_ts, e);
                return false;
            }
        };

        target_alt.value() >= threshold.min_altitude_deg
            && sun_alt.value() <= threshold.max_sun_altitude_deg
    }

    /// Events from `events` passing `threshold`, in input order.
    pub fn filter<'e>(
        &self,
        events: &'e [RawEvent],
        threshold: &VisibilityThreshold,
    ) -> Vec<&'e RawEvent> {
        events
            .iter()
            .filter(|event| self.is_visible(event, threshold))
            .collect()
    }
}

/// `true` when the event has a parseable timestamp strictly after `now`.
pub fn is_future(event: &RawEvent, now: DateTime<Utc>) -> bool {
    extract_timestamp(event)
        .and_then(|raw| parse_utc(&raw))
        .is_some_and(|at| at > now)
}

/// `true` when the event carries a parseable timestamp.
pub fn has_resolvable_timestamp(event: &RawEvent) -> bool {
    extract_timestamp(event)
        .and_then(|raw| parse_utc(&raw))
        .is_some()
}
