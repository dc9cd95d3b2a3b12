//! Great-circle distance and geofence membership.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sphere radius used for distance calculations, in meters.
///
/// Matches the equatorial radius the dashboard's distance library uses, so a
/// geofence evaluated here agrees with one evaluated on the device.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),

    #[error("radius {0} must be a finite, non-negative number of meters")]
    InvalidRadius(f64),
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns `GeoError` if either component is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Haversine distance between two points, rounded to the nearest meter.
#[must_use]
pub fn distance_meters(a: &Coordinates, b: &Coordinates) -> f64 {
    let phi_a = a.latitude.to_radians();
    let phi_b = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1.0 for antipodal points.
    let central_angle = 2.0 * h.sqrt().min(1.0).asin();

    (EARTH_RADIUS_METERS * central_angle).round()
}

/// A circular target area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    center: Coordinates,
    radius_meters: f64,
}

impl Geofence {
    /// # Errors
    ///
    /// Returns `GeoError::InvalidRadius` for negative or non-finite radii.
    pub fn new(center: Coordinates, radius_meters: f64) -> Result<Self, GeoError> {
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(GeoError::InvalidRadius(radius_meters));
        }
        Ok(Self {
            center,
            radius_meters,
        })
    }

    #[must_use]
    pub fn center(&self) -> Coordinates {
        self.center
    }

    #[must_use]
    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// True iff `position` lies within the radius (boundary inclusive).
    #[must_use]
    pub fn contains(&self, position: &Coordinates) -> bool {
        distance_meters(position, &self.center) <= self.radius_meters
    }
}
