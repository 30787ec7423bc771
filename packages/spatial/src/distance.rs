//! Great-circle distance.

use hood_map_amenity_models::GeoPoint;

use crate::SpatialError;

/// Mean Earth radius used for all distance calculations.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Returns the haversine distance between two points in meters, rounded
/// to the nearest meter.
///
/// # Errors
///
/// Returns [`SpatialError::InvalidCoordinate`] if either point is out of
/// range.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> Result<f64, SpatialError> {
    a.validate()?;
    b.validate()?;

    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // rounding error can push h a hair above 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    Ok((EARTH_RADIUS_METERS * c).round())
}
