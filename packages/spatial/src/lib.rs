#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Proximity lookups over amenities.
//!
//! [`ProximityIndex`] answers "which schools / health facilities / transit
//! routes are within R meters of this point", annotated with great-circle
//! distance and ordered nearest-first. The underlying data comes from any
//! [`AmenitySource`]; [`index::AmenityIndex`] is an in-memory R-tree
//! implementation usable when the amenity set fits in memory.

pub mod distance;
pub mod index;
pub mod proximity;

pub use distance::{EARTH_RADIUS_METERS, haversine_distance};
pub use index::AmenityIndex;
pub use proximity::{AmenitySource, Nearby, NearbyAmenity, ProximityIndex};

use hood_map_amenity_models::InvalidCoordinateError;
use thiserror::Error;

/// Errors that can occur during spatial lookups.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A point's latitude or longitude is out of range.
    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lng: f64,
    },

    /// The search radius is negative or not finite.
    #[error("Invalid radius: {radius_m}m")]
    InvalidRadius {
        /// Offending radius in meters.
        radius_m: f64,
    },

    /// The backing amenity source could not be reached.
    #[error("Amenity source unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<InvalidCoordinateError> for SpatialError {
    fn from(e: InvalidCoordinateError) -> Self {
        Self::InvalidCoordinate {
            lat: e.lat,
            lng: e.lng,
        }
    }
}
