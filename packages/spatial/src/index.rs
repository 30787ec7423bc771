//! In-memory R-tree amenity index.
//!
//! Built once from a snapshot of amenity records and shared read-only
//! across requests. Radius queries first pull everything inside a
//! lat/lng bounding box from the R-tree, then keep only points within the
//! exact haversine radius.

use async_trait::async_trait;
use hood_map_amenity_models::{Amenity, AmenityCategory, GeoPoint};
use rstar::{AABB, RTree, RTreeObject};

use crate::{AmenitySource, SpatialError, haversine_distance};

/// Meters per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Extra margin applied to the bounding box so points on its edge are not
/// lost to the spherical approximation.
const ENVELOPE_PADDING: f64 = 1.01;

/// An amenity stored in the R-tree, keyed by `[lng, lat]`.
struct AmenityEntry {
    point: [f64; 2],
    amenity: Amenity,
}

impl RTreeObject for AmenityEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// Pre-built R-tree over a fixed amenity set.
pub struct AmenityIndex {
    tree: RTree<AmenityEntry>,
}

impl AmenityIndex {
    /// Builds the index. Amenities with out-of-range coordinates are
    /// skipped with a warning.
    #[must_use]
    pub fn new(amenities: impl IntoIterator<Item = Amenity>) -> Self {
        let mut entries = Vec::new();

        for amenity in amenities {
            if !amenity.position.is_valid() {
                log::warn!(
                    "Skipping amenity {} with invalid position ({}, {})",
                    amenity.id,
                    amenity.position.lat,
                    amenity.position.lng
                );
                continue;
            }
            entries.push(AmenityEntry {
                point: [amenity.position.lng, amenity.position.lat],
                amenity,
            });
        }

        let tree = RTree::bulk_load(entries);
        log::info!("Loaded {} amenities into proximity index", tree.size());

        Self { tree }
    }

    /// Number of indexed amenities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Synchronous radius lookup backing [`AmenitySource::find_within`].
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCoordinate`] if `point` is out of
    /// range.
    pub fn within(
        &self,
        point: GeoPoint,
        radius_m: f64,
        category: AmenityCategory,
    ) -> Result<Vec<Amenity>, SpatialError> {
        point.validate()?;
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(SpatialError::InvalidRadius { radius_m });
        }

        let envelope = search_envelope(point, radius_m);
        let mut matches = Vec::new();

        for entry in self.tree.locate_in_envelope(&envelope) {
            if entry.amenity.category() != category {
                continue;
            }
            if haversine_distance(point, entry.amenity.position)? <= radius_m {
                matches.push(entry.amenity.clone());
            }
        }

        Ok(matches)
    }
}

#[async_trait]
impl AmenitySource for AmenityIndex {
    async fn find_within(
        &self,
        point: GeoPoint,
        radius_m: f64,
        category: AmenityCategory,
    ) -> Result<Vec<Amenity>, SpatialError> {
        self.within(point, radius_m, category)
    }
}

/// Computes a `[lng, lat]` bounding box that contains every point within
/// `radius_m` of `center`.
///
/// Falls back to the full longitude range near the poles and when the box
/// would cross the antimeridian.
fn search_envelope(center: GeoPoint, radius_m: f64) -> AABB<[f64; 2]> {
    let lat_delta = radius_m * ENVELOPE_PADDING / METERS_PER_DEGREE;
    let min_lat = (center.lat - lat_delta).max(-90.0);
    let max_lat = (center.lat + lat_delta).min(90.0);

    // longitude degrees shrink fastest at the box edge closest to a pole
    let widest_lat = min_lat.abs().max(max_lat.abs());
    let cos_lat = widest_lat.to_radians().cos();

    let (min_lng, max_lng) = if cos_lat <= f64::EPSILON {
        (-180.0, 180.0)
    } else {
        let lng_delta = lat_delta / cos_lat;
        let min_lng = center.lng - lng_delta;
        let max_lng = center.lng + lng_delta;
        if lng_delta >= 180.0 || min_lng < -180.0 || max_lng > 180.0 {
            (-180.0, 180.0)
        } else {
            (min_lng, max_lng)
        }
    };

    AABB::from_corners([min_lng, min_lat], [max_lng, max_lat])
}
