#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geospatial livability and price-projection engine.
//!
//! Turns a [`NeighborhoodProfile`] plus nearby amenities into normalized
//! predictive factors, then derives a livability score, a monthly price
//! projection, and a gentrification risk assessment from them.
//!
//! Every computation takes its [`ProximityIndex`] and [`EngineConfig`]
//! explicitly; nothing holds a connection or global state.
//! [`engine::AnalyticsEngine`] bundles the two for callers that want the
//! four high-level operations behind one handle.
//!
//! [`NeighborhoodProfile`]: hood_map_neighborhood_models::NeighborhoodProfile
//! [`ProximityIndex`]: hood_map_spatial::ProximityIndex

pub mod config;
pub mod engine;
pub mod factors;
pub mod gentrification;
pub mod livability;
pub mod projection;

pub use config::{ConfigError, EngineConfig};
pub use engine::AnalyticsEngine;
pub use projection::{FixedDraw, RandomSource};

use hood_map_amenity_models::InvalidCoordinateError;
use thiserror::Error;

/// Longest supported projection, in months.
pub const MAX_HORIZON_MONTHS: u32 = 60;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The neighborhood's position is out of range.
    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lng: f64,
    },

    /// The requested projection horizon is outside `1..=60` months.
    #[error("Invalid horizon: {horizon} months (expected 1-{MAX_HORIZON_MONTHS})")]
    InvalidHorizon {
        /// The requested horizon.
        horizon: u32,
    },

    /// The starting price is not a positive finite number.
    #[error("Invalid price: {price} (expected a positive amount)")]
    InvalidPrice {
        /// The offending price.
        price: f64,
    },

    /// Engine configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<InvalidCoordinateError> for AnalyticsError {
    fn from(e: InvalidCoordinateError) -> Self {
        Self::InvalidCoordinate {
            lat: e.lat,
            lng: e.lng,
        }
    }
}

/// Divides, returning 0 when the denominator is zero or the result is
/// not finite.
#[must_use]
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() { ratio } else { 0.0 }
}

/// Rounds a score and clamps it into `[lo, hi]` as a `u8`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn clamp_score(value: f64, lo: u8, hi: u8) -> u8 {
    if value.is_nan() {
        return lo;
    }
    value.round().clamp(f64::from(lo), f64::from(hi)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_guards_zero_denominator() {
        assert!(ratio_or_zero(5.0, 0.0).abs() < f64::EPSILON);
        assert!(ratio_or_zero(0.0, 0.0).abs() < f64::EPSILON);
        assert!((ratio_or_zero(3.0, 4.0) - 0.75).abs() < f64::EPSILON);
        assert!(ratio_or_zero(f64::MAX, 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_score_bounds() {
        assert_eq!(clamp_score(-3.0, 0, 100), 0);
        assert_eq!(clamp_score(49.5, 0, 100), 50);
        assert_eq!(clamp_score(140.0, 0, 100), 100);
        assert_eq!(clamp_score(f64::NAN, 15, 100), 15);
        assert_eq!(clamp_score(3.0, 15, 100), 15);
    }
}
