//! Predictive factor derivation.
//!
//! Turns a [`NeighborhoodProfile`] and its nearby amenities into a
//! [`FactorSet`]. Proximity lookups are the only I/O; if one fails, the
//! factors that depend on it fall back to the configured neutral value
//! and a [`FactorWarning`] is recorded instead of failing the call.
//!
//! # Input defaults
//!
//! Raw profile attributes are sanitized once, before any factor math:
//!
//! | Field            | Invalid when              | Replacement                  |
//! |------------------|---------------------------|------------------------------|
//! | `avg_rent`       | negative or not finite    | unknown: no rent pressure    |
//! | `safety_score`   | not finite                | 5.0                          |
//! | `safety_score`   | outside `[0, 10]`         | clamped                      |
//! | `transit_score`  | not finite                | 50.0                         |
//! | `transit_score`  | outside `[0, 100]`        | clamped                      |

use hood_map_amenity_models::{AmenityCategory, AmenityKind, SchoolType};
use hood_map_analytics_models::{FactorComputation, FactorSet, FactorWarning, FallbackFactor};
use hood_map_neighborhood_models::NeighborhoodProfile;
use hood_map_spatial::{NearbyAmenity, ProximityIndex, SpatialError};

use crate::config::{EducationWeights, EngineConfig, InfrastructureWeights};
use crate::{AnalyticsError, ratio_or_zero};

const NEUTRAL_SAFETY_SCORE: f64 = 5.0;
const NEUTRAL_TRANSIT_SCORE: f64 = 50.0;

/// Rent below this adds gentrification pressure.
const LOW_RENT_THRESHOLD: f64 = 20_000.0;
const LOW_RENT_PRESSURE: f64 = 0.3;
const SAFE_AREA_THRESHOLD: f64 = 6.0;
const SAFE_AREA_PRESSURE: f64 = 0.2;
const TRANSIT_THRESHOLD: f64 = 70.0;
const TRANSIT_PRESSURE: f64 = 0.2;
const INFRASTRUCTURE_PRESSURE_WEIGHT: f64 = 0.3;

/// Profile attributes after the defaults table above has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanitizedInputs {
    /// `None` when the rent is unknown.
    pub avg_rent: Option<f64>,
    /// `[0, 10]`
    pub safety_score: f64,
    /// `[0, 100]`
    pub transit_score: f64,
}

impl SanitizedInputs {
    /// Applies the input defaults table to a profile.
    #[must_use]
    pub fn from_profile(neighborhood: &NeighborhoodProfile) -> Self {
        let avg_rent = (neighborhood.avg_rent.is_finite() && neighborhood.avg_rent >= 0.0)
            .then_some(neighborhood.avg_rent);
        if avg_rent.is_none() {
            log::debug!(
                "Neighborhood {} has unusable avg_rent {}, ignoring rent pressure",
                neighborhood.id,
                neighborhood.avg_rent
            );
        }

        Self {
            avg_rent,
            safety_score: finite_or(neighborhood.safety_score, NEUTRAL_SAFETY_SCORE)
                .clamp(0.0, 10.0),
            transit_score: finite_or(neighborhood.transit_score, NEUTRAL_TRANSIT_SCORE)
                .clamp(0.0, 100.0),
        }
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

/// Computes the factor set for a neighborhood, recording any fallbacks.
///
/// The school and health facility lookups run concurrently.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidCoordinate`] if the neighborhood's
/// position is out of range. Proximity index failures do not error.
pub async fn compute_factors(
    index: &ProximityIndex,
    config: &EngineConfig,
    neighborhood: &NeighborhoodProfile,
) -> Result<FactorComputation, AnalyticsError> {
    neighborhood.position.validate()?;

    let (schools, facilities) = futures::join!(
        index.nearby(
            neighborhood.position,
            config.radii.school_m,
            AmenityCategory::School,
        ),
        index.nearby(
            neighborhood.position,
            config.radii.health_facility_m,
            AmenityCategory::HealthFacility,
        ),
    );

    let schools: Result<Vec<NearbyAmenity>, SpatialError> = schools.map(Iterator::collect);
    let facilities: Result<Vec<NearbyAmenity>, SpatialError> = facilities.map(Iterator::collect);

    let mut warnings = Vec::new();
    let neutral = config.neutral_factor;

    let infrastructure_score = match (&schools, &facilities) {
        (Ok(schools), Ok(facilities)) => infrastructure_score(
            operational_count(schools),
            operational_count(facilities),
            &config.infrastructure,
        ),
        (Err(e), _) | (_, Err(e)) => {
            warnings.push(fallback(
                neighborhood,
                FallbackFactor::Infrastructure,
                neutral,
                e,
            ));
            neutral
        }
    };

    let education_factor = match &schools {
        Ok(schools) => education_factor(
            schools
                .iter()
                .filter(|n| n.amenity.is_operational())
                .filter_map(|n| school_type(&n.amenity.kind)),
            &config.education,
        ),
        Err(e) => {
            warnings.push(fallback(neighborhood, FallbackFactor::Education, neutral, e));
            neutral
        }
    };

    let inputs = SanitizedInputs::from_profile(neighborhood);

    let factors = FactorSet {
        infrastructure_score,
        safety_trend: safety_trend(inputs.safety_score),
        education_factor,
        transport_factor: transport_factor(inputs.transit_score),
        economic_growth: config.economic_growth.lookup(&neighborhood.region),
        supply_demand: config
            .supply_demand
            .lookup(neighborhood.affordability_category),
        gentrification_pressure: gentrification_pressure(&inputs, infrastructure_score),
    }
    .clamped();

    log::debug!("Factors for neighborhood {}: {factors:?}", neighborhood.id);

    Ok(FactorComputation { factors, warnings })
}

fn fallback(
    neighborhood: &NeighborhoodProfile,
    factor: FallbackFactor,
    default_value: f64,
    error: &SpatialError,
) -> FactorWarning {
    log::warn!(
        "Proximity lookup failed for neighborhood {}; using neutral {factor} value {default_value}: {error}",
        neighborhood.id
    );
    FactorWarning {
        factor,
        default_value,
        reason: error.to_string(),
    }
}

pub(crate) fn operational_count(nearby: &[NearbyAmenity]) -> u32 {
    u32::try_from(nearby.iter().filter(|n| n.amenity.is_operational()).count())
        .unwrap_or(u32::MAX)
}

pub(crate) const fn school_type(kind: &AmenityKind) -> Option<SchoolType> {
    match kind {
        AmenityKind::School(t) => Some(*t),
        _ => None,
    }
}

/// Weighted school and health facility coverage, `[0, 1]`.
#[must_use]
pub fn infrastructure_score(
    school_count: u32,
    facility_count: u32,
    weights: &InfrastructureWeights,
) -> f64 {
    let school_score = ratio_or_zero(
        f64::from(school_count),
        f64::from(weights.school_saturation),
    )
    .min(1.0);
    let health_score = ratio_or_zero(
        f64::from(facility_count),
        f64::from(weights.facility_saturation),
    )
    .min(1.0);

    weights
        .school_weight
        .mul_add(school_score, weights.health_weight * health_score)
        .clamp(0.0, 1.0)
}

/// Sum of per-school quality weights, capped at 1.
#[must_use]
pub fn education_factor(
    schools: impl IntoIterator<Item = SchoolType>,
    weights: &EducationWeights,
) -> f64 {
    schools
        .into_iter()
        .map(|t| match t {
            SchoolType::Secondary => weights.secondary,
            SchoolType::Combined => weights.combined,
            SchoolType::Primary => weights.primary,
            SchoolType::Other => weights.other,
        })
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Expected safety trajectory from a `[0, 10]` safety score.
#[must_use]
pub fn safety_trend(safety_score: f64) -> f64 {
    let base = safety_score / 10.0;
    let trend: f64 = if base > 0.7 {
        0.1
    } else if base > 0.5 {
        0.05
    } else {
        -0.05
    };
    let (lo, hi) = FactorSet::SAFETY_TREND_RANGE;
    trend.clamp(lo, hi)
}

/// Tiered transit premium from a `[0, 100]` transit score.
#[must_use]
pub fn transport_factor(transit_score: f64) -> f64 {
    let norm = transit_score / 100.0;
    if norm > 0.8 {
        0.15
    } else if norm > 0.6 {
        0.10
    } else if norm > 0.4 {
        0.05
    } else {
        0.0
    }
}

/// Heuristic gentrification pressure, `[0, 1]`.
#[must_use]
pub fn gentrification_pressure(inputs: &SanitizedInputs, infrastructure_score: f64) -> f64 {
    let mut pressure = 0.0;

    if inputs.avg_rent.is_some_and(|rent| rent < LOW_RENT_THRESHOLD) {
        pressure += LOW_RENT_PRESSURE;
    }
    if inputs.safety_score > SAFE_AREA_THRESHOLD {
        pressure += SAFE_AREA_PRESSURE;
    }
    if inputs.transit_score > TRANSIT_THRESHOLD {
        pressure += TRANSIT_PRESSURE;
    }
    pressure += infrastructure_score * INFRASTRUCTURE_PRESSURE_WEIGHT;

    pressure.clamp(0.0, 1.0)
}
