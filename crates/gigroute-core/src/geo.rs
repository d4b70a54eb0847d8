//! Great-circle distance between geographic coordinates.
//!
//! Uses the haversine formula on a spherical Earth of radius 3958.8 miles.
//! This ignores roads and terrain entirely; it is a coarse routing signal,
//! not a drive-distance estimate.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Mean Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Constructs a point, validating that both coordinates are finite and
    /// within their domains (latitude ±90°, longitude ±180°).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Coordinate`] if either value is non-finite
    /// or out of domain.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::Coordinate {
                field: "latitude",
                value: latitude,
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::Coordinate {
                field: "longitude",
                value: longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Great-circle (haversine) distance between two points, in miles.
///
/// Symmetric, and zero for identical points. Inputs are already validated
/// by [`GeoPoint::new`], so this is a total function.
#[must_use]
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}
