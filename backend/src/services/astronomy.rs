//! Horizon altitude computation.
//!
//! The visibility test only needs two numbers per event: the target's altitude
//! and the Sun's altitude at the event time, seen from the observing site.
//! [`AstronomyProvider`] is the seam; [`SiderustAstronomy`] is the built-in
//! implementation on top of the siderust astronomy library.
//!
//! UTC instants are handed to siderust as MJD without the TT-UTC offset
//! (about 69 s), well below what a horizon altitude threshold can resolve.
//! No local horizon profile is applied.

use chrono::{DateTime, Utc};
use qtty::Degrees;
use siderust::bodies::solar_system::Sun;
use siderust::coordinates::centers::Geodetic;
use siderust::coordinates::frames::ECEF;
use siderust::coordinates::spherical::direction::ICRS;
use siderust::event::altitude::AltitudeProvider;
use siderust::qtty as sq;
use siderust::time::ModifiedJulianDate as SiderustMJD;

use crate::api::{Coordinate, GeographicLocation};
use crate::error::AstronomyError;
use crate::models::ModifiedJulianDate;

/// Computes local altitudes for the fixed observing site.
///
/// Implementations report every failure as an [`AstronomyError`]; callers
/// treat any error as "cannot evaluate".
pub trait AstronomyProvider: Send + Sync {
    /// Altitude of `coordinate` (equatorial, J2000 degrees) above the local horizon.
    fn target_altitude(
        &self,
        coordinate: Coordinate,
        at: DateTime<Utc>,
        site: &GeographicLocation,
    ) -> Result<Degrees, AstronomyError>;

    /// Altitude of the Sun's centre above the local horizon.
    fn sun_altitude(
        &self,
        at: DateTime<Utc>,
        site: &GeographicLocation,
    ) -> Result<Degrees, AstronomyError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SiderustAstronomy;

impl SiderustAstronomy {
    pub fn new() -> Self {
        Self
    }
}

impl AstronomyProvider for SiderustAstronomy {
    fn target_altitude(
        &self,
        coordinate: Coordinate,
        at: DateTime<Utc>,
        site: &GeographicLocation,
    ) -> Result<Degrees, AstronomyError> {
        let observer = observer_site(site)?;
        validate_coordinate(coordinate)?;
        let mjd = to_siderust_mjd(at)?;

        let direction = ICRS::new(
            sq::Degrees::new(coordinate.ra_deg),
            sq::Degrees::new(coordinate.dec_deg),
        );
        to_degrees(direction.altitude_at(&observer, mjd), at)
    }

    fn sun_altitude(
        &self,
        at: DateTime<Utc>,
        site: &GeographicLocation,
    ) -> Result<Degrees, AstronomyError> {
        let observer = observer_site(site)?;
        let mjd = to_siderust_mjd(at)?;
        to_degrees(Sun.altitude_at(&observer, mjd), at)
    }
}

/// Convert the site to a siderust geodetic position (lon, lat, height).
fn observer_site(site: &GeographicLocation) -> Result<Geodetic<ECEF>, AstronomyError> {
    if !site.latitude.is_finite() || !(-90.0..=90.0).contains(&site.latitude) {
        return Err(AstronomyError::InvalidSite(format!(
            "latitude {}",
            site.latitude
        )));
    }
    if !site.longitude.is_finite() {
        return Err(AstronomyError::InvalidSite(format!(
            "longitude {}",
            site.longitude
        )));
    }
    let elevation_m = site.elevation_m.unwrap_or(0.0);
    if !elevation_m.is_finite() {
        return Err(AstronomyError::InvalidSite(format!("elevation {}", elevation_m)));
    }

    Ok(Geodetic::<ECEF>::new(
        sq::Degrees::new(site.longitude),
        sq::Degrees::new(site.latitude),
        sq::Meters::new(elevation_m),
    ))
}

fn to_siderust_mjd(at: DateTime<Utc>) -> Result<SiderustMJD, AstronomyError> {
    let mjd = ModifiedJulianDate::from_datetime(at).value();
    if mjd.is_finite() {
        Ok(SiderustMJD::new(mjd))
    } else {
        Err(AstronomyError::InvalidTimestamp(at.to_rfc3339()))
    }
}

fn to_degrees(altitude: sq::Radians, at: DateTime<Utc>) -> Result<Degrees, AstronomyError> {
    let degrees = altitude.value().to_degrees();
    if degrees.is_finite() {
        Ok(Degrees::new(degrees))
    } else {
        Err(AstronomyError::InvalidTimestamp(at.to_rfc3339()))
    }
}

fn validate_coordinate(coordinate: Coordinate) -> Result<(), AstronomyError> {
    let valid = coordinate.ra_deg.is_finite()
        && coordinate.dec_deg.is_finite()
        && (-90.0..=90.0).contains(&coordinate.dec_deg);
    if valid {
        Ok(())
    } else {
        Err(AstronomyError::InvalidCoordinate {
            ra_deg: coordinate.ra_deg,
            dec_deg: coordinate.dec_deg,
        })
    }
}
