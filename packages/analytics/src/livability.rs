//! Composite livability scoring.
//!
//! Education, healthcare, and transport sub-scores come from nearby
//! amenities; safety and amenities come straight from the profile. The
//! composite is a fixed weighted sum, rounded and clamped to `[0, 100]`.

use std::collections::BTreeSet;

use hood_map_amenity_models::{AmenityCategory, AmenityKind, SchoolType};
use hood_map_analytics_models::{
    EducationDetail, FactorWarning, FallbackFactor, HealthcareDetail, LivabilityReport,
    TransportDetail,
};
use hood_map_neighborhood_models::NeighborhoodProfile;
use hood_map_spatial::{NearbyAmenity, ProximityIndex, SpatialError};

use crate::config::{EngineConfig, LivabilityConfig};
use crate::factors::{SanitizedInputs, operational_count, school_type};
use crate::{AnalyticsError, clamp_score, ratio_or_zero};

/// Combines sub-scores into the composite livability score.
///
/// `education`, `healthcare`, and `transport` are `[0, 100]` sub-scores.
/// Safety is the profile's safety score scaled by 10 and amenities is the
/// profile's transit score, both already sanitized.
#[must_use]
pub fn score(
    education: f64,
    healthcare: f64,
    transport: f64,
    neighborhood: &NeighborhoodProfile,
    config: &LivabilityConfig,
) -> u8 {
    let inputs = SanitizedInputs::from_profile(neighborhood);
    let w = &config.weights;

    let composite = w.education * education.clamp(0.0, 100.0)
        + w.healthcare * healthcare.clamp(0.0, 100.0)
        + w.transport * transport.clamp(0.0, 100.0)
        + w.safety * (inputs.safety_score * 10.0).clamp(0.0, 100.0)
        + w.amenities * inputs.transit_score;

    clamp_score(composite, 0, 100)
}

/// Education sub-score from nearby schools, nearest first.
#[must_use]
pub fn education_detail(schools: &[NearbyAmenity], config: &LivabilityConfig) -> EducationDetail {
    let operational: Vec<SchoolType> = schools
        .iter()
        .filter(|n| n.amenity.is_operational())
        .filter_map(|n| school_type(&n.amenity.kind))
        .collect();
    let count_of = |t: SchoolType| {
        u32::try_from(operational.iter().filter(|s| **s == t).count()).unwrap_or(u32::MAX)
    };

    let school_count = operational_count(schools);
    let primary_count = count_of(SchoolType::Primary);
    let secondary_count = count_of(SchoolType::Secondary);

    let mut raw = (f64::from(school_count) * config.school_multiplier).min(100.0);
    if primary_count > 0 && secondary_count > 0 {
        raw += config.school_mix_bonus;
    }

    EducationDetail {
        school_count,
        primary_count,
        secondary_count,
        combined_count: count_of(SchoolType::Combined),
        nearest_school_m: nearest_operational(schools),
        operational_share: operational_share(school_count, schools.len()),
        score: clamp_score(raw, 0, 100),
        fallback: false,
    }
}

/// Healthcare sub-score from nearby facilities, nearest first.
#[must_use]
pub fn healthcare_detail(
    facilities: &[NearbyAmenity],
    config: &LivabilityConfig,
) -> HealthcareDetail {
    let facility_count = operational_count(facilities);
    let hospital_present = facilities.iter().any(|n| {
        n.amenity.is_operational()
            && matches!(n.amenity.kind, AmenityKind::HealthFacility(t) if t.is_hospital_class())
    });

    let mut raw = (f64::from(facility_count) * config.facility_multiplier).min(100.0);
    if hospital_present {
        raw += config.hospital_bonus;
    }

    HealthcareDetail {
        facility_count,
        hospital_present,
        nearest_facility_m: nearest_operational(facilities),
        operational_share: operational_share(facility_count, facilities.len()),
        score: clamp_score(raw, 0, 100),
        fallback: false,
    }
}

/// Transport sub-score from nearby transit routes, nearest first.
#[must_use]
pub fn transport_detail(routes: &[NearbyAmenity], config: &LivabilityConfig) -> TransportDetail {
    let route_count = operational_count(routes);
    let modes: BTreeSet<_> = routes
        .iter()
        .filter(|n| n.amenity.is_operational())
        .filter_map(|n| match n.amenity.kind {
            AmenityKind::TransitRoute(mode) => Some(mode),
            _ => None,
        })
        .collect();
    let mode_count = u32::try_from(modes.len()).unwrap_or(u32::MAX);

    let mut raw = (f64::from(route_count) * config.route_multiplier).min(100.0);
    if mode_count >= 2 {
        raw += config.multimodal_bonus;
    }

    TransportDetail {
        route_count,
        mode_count,
        nearest_route_m: nearest_operational(routes),
        operational_share: operational_share(route_count, routes.len()),
        score: clamp_score(raw, 0, 100),
        fallback: false,
    }
}

fn nearest_operational(nearby: &[NearbyAmenity]) -> Option<f64> {
    nearby
        .iter()
        .find(|n| n.amenity.is_operational())
        .map(|n| n.distance_m)
}

#[allow(clippy::cast_precision_loss)]
fn operational_share(operational: u32, total: usize) -> f64 {
    ratio_or_zero(f64::from(operational), total as f64)
}

/// Scores a neighborhood's livability from its nearby amenities.
///
/// The three amenity lookups run concurrently. A failed lookup gives its
/// sub-score the configured neutral value (flagged via `fallback` on the
/// detail and recorded in the report's warnings) rather than failing the
/// call.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidCoordinate`] if the neighborhood's
/// position is out of range.
pub async fn score_livability(
    index: &ProximityIndex,
    config: &EngineConfig,
    neighborhood: &NeighborhoodProfile,
) -> Result<LivabilityReport, AnalyticsError> {
    neighborhood.position.validate()?;

    let center = neighborhood.position;
    let (schools, facilities, routes) = futures::join!(
        index.nearby(center, config.radii.school_m, AmenityCategory::School),
        index.nearby(
            center,
            config.radii.health_facility_m,
            AmenityCategory::HealthFacility,
        ),
        index.nearby(
            center,
            config.radii.transit_route_m,
            AmenityCategory::TransitRoute,
        ),
    );

    let cfg = &config.livability;
    let neutral = cfg.neutral_sub_score;
    let mut warnings = Vec::new();

    let education = match schools {
        Ok(nearby) => education_detail(&nearby.collect::<Vec<_>>(), cfg),
        Err(e) => {
            warnings.push(fallback(
                neighborhood,
                AmenityCategory::School,
                FallbackFactor::Education,
                neutral,
                &e,
            ));
            EducationDetail {
                school_count: 0,
                primary_count: 0,
                secondary_count: 0,
                combined_count: 0,
                nearest_school_m: None,
                operational_share: 0.0,
                score: neutral,
                fallback: true,
            }
        }
    };

    let healthcare = match facilities {
        Ok(nearby) => healthcare_detail(&nearby.collect::<Vec<_>>(), cfg),
        Err(e) => {
            warnings.push(fallback(
                neighborhood,
                AmenityCategory::HealthFacility,
                FallbackFactor::Healthcare,
                neutral,
                &e,
            ));
            HealthcareDetail {
                facility_count: 0,
                hospital_present: false,
                nearest_facility_m: None,
                operational_share: 0.0,
                score: neutral,
                fallback: true,
            }
        }
    };

    let transport = match routes {
        Ok(nearby) => transport_detail(&nearby.collect::<Vec<_>>(), cfg),
        Err(e) => {
            warnings.push(fallback(
                neighborhood,
                AmenityCategory::TransitRoute,
                FallbackFactor::Transport,
                neutral,
                &e,
            ));
            TransportDetail {
                route_count: 0,
                mode_count: 0,
                nearest_route_m: None,
                operational_share: 0.0,
                score: neutral,
                fallback: true,
            }
        }
    };

    let composite = score(
        f64::from(education.score),
        f64::from(healthcare.score),
        f64::from(transport.score),
        neighborhood,
        cfg,
    );

    log::debug!(
        "Livability for neighborhood {}: {composite} (education={}, healthcare={}, transport={})",
        neighborhood.id,
        education.score,
        healthcare.score,
        transport.score,
    );

    Ok(LivabilityReport {
        score: composite,
        education,
        healthcare,
        transport,
        warnings,
    })
}

fn fallback(
    neighborhood: &NeighborhoodProfile,
    category: AmenityCategory,
    factor: FallbackFactor,
    neutral: u8,
    error: &SpatialError,
) -> FactorWarning {
    log::warn!(
        "{category} lookup failed for neighborhood {}; using neutral sub-score {neutral}: {error}",
        neighborhood.id
    );
    FactorWarning {
        factor,
        default_value: f64::from(neutral),
        reason: error.to_string(),
    }
}
