//! Radius lookups annotated with distance.
//!
//! [`AmenitySource`] is the read interface exposed by the data store (or
//! by [`crate::AmenityIndex`]). [`ProximityIndex`] wraps any source,
//! validates inputs, computes exact haversine distances, drops anything
//! outside the radius, and orders the result nearest-first.

use std::sync::Arc;

use async_trait::async_trait;
use hood_map_amenity_models::{Amenity, AmenityCategory, GeoPoint};

use crate::{SpatialError, haversine_distance};

/// A spatial read interface over amenity records.
///
/// Implementations must be safe to query concurrently from many
/// in-flight requests. They may return a superset of the matches (e.g.
/// everything in a bounding box); [`ProximityIndex`] filters precisely.
#[async_trait]
pub trait AmenitySource: Send + Sync {
    /// Returns amenities of `category` within `radius_m` meters of `point`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::Unavailable`] if the backing store cannot be
    /// reached, or [`SpatialError::InvalidCoordinate`] for a bad `point`.
    async fn find_within(
        &self,
        point: GeoPoint,
        radius_m: f64,
        category: AmenityCategory,
    ) -> Result<Vec<Amenity>, SpatialError>;
}

/// An amenity paired with its distance from the query center.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyAmenity {
    /// The matched amenity.
    pub amenity: Amenity,
    /// Haversine distance from the query center, whole meters.
    pub distance_m: f64,
}

/// Nearest-first sequence of [`NearbyAmenity`] results.
///
/// Consumed once; collect it if the results are needed more than once.
#[derive(Debug)]
pub struct Nearby {
    inner: std::vec::IntoIter<NearbyAmenity>,
}

impl Iterator for Nearby {
    type Item = NearbyAmenity;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Nearby {}

/// Distance-annotated radius queries over an [`AmenitySource`].
///
/// Cheap to clone; clones share the same source.
#[derive(Clone)]
pub struct ProximityIndex {
    source: Arc<dyn AmenitySource>,
}

impl std::fmt::Debug for ProximityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProximityIndex").finish_non_exhaustive()
    }
}

impl ProximityIndex {
    /// Wraps an amenity source.
    #[must_use]
    pub fn new(source: Arc<dyn AmenitySource>) -> Self {
        Self { source }
    }

    /// Returns amenities of `category` within `radius_m` meters of
    /// `center`, nearest first. Ties keep the source's order.
    ///
    /// Amenities the source returns with out-of-range coordinates are
    /// skipped with a warning rather than failing the whole lookup.
    ///
    /// # Errors
    ///
    /// * [`SpatialError::InvalidCoordinate`] if `center` is out of range
    /// * [`SpatialError::InvalidRadius`] if `radius_m` is negative or not finite
    /// * any error from the underlying source
    pub async fn nearby(
        &self,
        center: GeoPoint,
        radius_m: f64,
        category: AmenityCategory,
    ) -> Result<Nearby, SpatialError> {
        center.validate()?;
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(SpatialError::InvalidRadius { radius_m });
        }

        let candidates = self.source.find_within(center, radius_m, category).await?;
        let candidate_count = candidates.len();

        let mut results = Vec::with_capacity(candidate_count);
        for amenity in candidates {
            if amenity.category() != category {
                continue;
            }
            let distance_m = match haversine_distance(center, amenity.position) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("Skipping amenity {} ({}): {e}", amenity.id, amenity.name);
                    continue;
                }
            };
            if distance_m <= radius_m {
                results.push(NearbyAmenity {
                    amenity,
                    distance_m,
                });
            }
        }

        results.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

        log::debug!(
            "{category} within {radius_m}m of ({}, {}): {} of {candidate_count} candidates",
            center.lat,
            center.lng,
            results.len(),
        );

        Ok(Nearby {
            inner: results.into_iter(),
        })
    }
}
