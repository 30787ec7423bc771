#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types produced by the livability and price-projection engine.
//!
//! Every bounded field documents its range. The producing component in
//! `hood_map_analytics` clamps values before constructing these types,
//! so consumers (the API layer, the chat pipeline) can rely on the ranges
//! without re-checking.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Normalized predictive factors for one neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorSet {
    /// Nearby school and health facility coverage, `[0, 1]`.
    pub infrastructure_score: f64,
    /// Expected safety trajectory, `[-0.2, 0.2]`.
    pub safety_trend: f64,
    /// Quality-weighted school presence, `[0, 1]`.
    pub education_factor: f64,
    /// Transit premium, `[0, 0.15]`.
    pub transport_factor: f64,
    /// Regional annualized growth fraction, `[0, 1]`.
    pub economic_growth: f64,
    /// Annualized demand pressure from the affordability band, `[0, 1]`.
    pub supply_demand: f64,
    /// Likelihood of rapid price/demographic change, `[0, 1]`.
    pub gentrification_pressure: f64,
}

impl FactorSet {
    /// Valid range of [`Self::infrastructure_score`].
    pub const INFRASTRUCTURE_RANGE: (f64, f64) = (0.0, 1.0);
    /// Valid range of [`Self::safety_trend`].
    pub const SAFETY_TREND_RANGE: (f64, f64) = (-0.2, 0.2);
    /// Valid range of [`Self::education_factor`].
    pub const EDUCATION_RANGE: (f64, f64) = (0.0, 1.0);
    /// Valid range of [`Self::transport_factor`].
    pub const TRANSPORT_RANGE: (f64, f64) = (0.0, 0.15);
    /// Valid range of [`Self::economic_growth`].
    pub const ECONOMIC_GROWTH_RANGE: (f64, f64) = (0.0, 1.0);
    /// Valid range of [`Self::supply_demand`].
    pub const SUPPLY_DEMAND_RANGE: (f64, f64) = (0.0, 1.0);
    /// Valid range of [`Self::gentrification_pressure`].
    pub const GENTRIFICATION_RANGE: (f64, f64) = (0.0, 1.0);

    /// Returns a copy with every field clamped to its documented range.
    #[must_use]
    pub fn clamped(self) -> Self {
        let clamp = |v: f64, (lo, hi): (f64, f64)| if v.is_nan() { lo } else { v.clamp(lo, hi) };
        Self {
            infrastructure_score: clamp(self.infrastructure_score, Self::INFRASTRUCTURE_RANGE),
            safety_trend: clamp(self.safety_trend, Self::SAFETY_TREND_RANGE),
            education_factor: clamp(self.education_factor, Self::EDUCATION_RANGE),
            transport_factor: clamp(self.transport_factor, Self::TRANSPORT_RANGE),
            economic_growth: clamp(self.economic_growth, Self::ECONOMIC_GROWTH_RANGE),
            supply_demand: clamp(self.supply_demand, Self::SUPPLY_DEMAND_RANGE),
            gentrification_pressure: clamp(
                self.gentrification_pressure,
                Self::GENTRIFICATION_RANGE,
            ),
        }
    }
}

/// Factors that can fall back to a neutral default when the proximity
/// index is unavailable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FallbackFactor {
    /// [`FactorSet::infrastructure_score`]
    Infrastructure,
    /// [`FactorSet::education_factor`] or the livability education sub-score
    Education,
    /// Livability healthcare sub-score
    Healthcare,
    /// Livability transport sub-score
    Transport,
}

/// A value replaced by its neutral default because a dependency failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorWarning {
    /// Which value was replaced.
    pub factor: FallbackFactor,
    /// The default that was used instead.
    pub default_value: f64,
    /// Why the real value could not be computed.
    pub reason: String,
}

/// A [`FactorSet`] plus any fallbacks taken while computing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorComputation {
    /// The computed factors.
    pub factors: FactorSet,
    /// Fallbacks taken; empty when every lookup succeeded.
    pub warnings: Vec<FactorWarning>,
}

impl FactorComputation {
    /// Returns `true` if any factor fell back to its neutral default.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// One month of a price projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    /// Month offset from now, starting at 1.
    pub month: u32,
    /// Projected price after growth and volatility, `> 0`.
    pub predicted_price: f64,
    /// Clamped monthly growth rate applied this month, `[-0.02, 0.05]`.
    pub growth_rate: f64,
    /// Confidence in this month's figure, `[0, 100]`.
    pub confidence: u8,
}

/// A monthly price path over a requested horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceProjection {
    /// Starting price.
    pub current_price: f64,
    /// One point per month, months `1..=horizon` in order.
    pub points: Vec<PricePoint>,
    /// Confidence in the projection as a whole, `[15, 100]`.
    pub overall_confidence: u8,
    /// Price at the final month.
    pub projected_price: f64,
    /// Percent change from `current_price` to `projected_price`.
    pub total_growth_percent: f64,
    /// Mean of the monthly growth rates.
    pub average_monthly_growth: f64,
}

/// Gentrification risk category, lowest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Pressure below 0.2
    VeryLow,
    /// Pressure in `[0.2, 0.4)`
    Low,
    /// Pressure in `[0.4, 0.6)`
    Moderate,
    /// Pressure in `[0.6, 0.8)`
    High,
    /// Pressure of 0.8 or more
    VeryHigh,
}

impl RiskLevel {
    /// Returns the estimated time until significant change for this level.
    #[must_use]
    pub const fn timeframe(self) -> &'static str {
        match self {
            Self::VeryHigh => "1-2 years",
            Self::High => "2-4 years",
            Self::Moderate => "4-7 years",
            Self::Low => "7-10 years",
            Self::VeryLow => "10+ years",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::VeryLow,
            Self::Low,
            Self::Moderate,
            Self::High,
            Self::VeryHigh,
        ]
    }
}

/// Gentrification risk for a neighborhood, with reasons and guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GentrificationAssessment {
    /// Risk category.
    pub risk_level: RiskLevel,
    /// Pressure expressed as a percentage, `[0, 100]`.
    pub risk_score: u8,
    /// Estimated time until significant change (e.g. "2-4 years").
    pub timeframe: String,
    /// Human-readable drivers of the pressure.
    pub key_factors: Vec<String>,
    /// Guidance for residents and investors.
    pub recommendations: Vec<String>,
}

/// Education sub-score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationDetail {
    /// Operational schools within the search radius.
    pub school_count: u32,
    /// Primary schools among them.
    pub primary_count: u32,
    /// Secondary schools among them.
    pub secondary_count: u32,
    /// Combined schools among them.
    pub combined_count: u32,
    /// Distance to the nearest operational school, if any.
    pub nearest_school_m: Option<f64>,
    /// Operational schools over all schools found, 0 when none were found.
    pub operational_share: f64,
    /// Sub-score, `[0, 100]`.
    pub score: u8,
    /// `true` if the score is the neutral default.
    pub fallback: bool,
}

/// Healthcare sub-score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareDetail {
    /// Operational facilities within the search radius.
    pub facility_count: u32,
    /// Whether a hospital-class facility is among them.
    pub hospital_present: bool,
    /// Distance to the nearest operational facility, if any.
    pub nearest_facility_m: Option<f64>,
    /// Operational facilities over all facilities found.
    pub operational_share: f64,
    /// Sub-score, `[0, 100]`.
    pub score: u8,
    /// `true` if the score is the neutral default.
    pub fallback: bool,
}

/// Transport sub-score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportDetail {
    /// Operational transit routes within the search radius.
    pub route_count: u32,
    /// Distinct transit modes among them.
    pub mode_count: u32,
    /// Distance to the nearest operational route, if any.
    pub nearest_route_m: Option<f64>,
    /// Operational routes over all routes found.
    pub operational_share: f64,
    /// Sub-score, `[0, 100]`.
    pub score: u8,
    /// `true` if the score is the neutral default.
    pub fallback: bool,
}

/// Composite livability score with its sub-domain breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivabilityReport {
    /// Composite score, `[0, 100]`.
    pub score: u8,
    /// Education breakdown.
    pub education: EducationDetail,
    /// Healthcare breakdown.
    pub healthcare: HealthcareDetail,
    /// Transport breakdown.
    pub transport: TransportDetail,
    /// Sub-scores replaced by the neutral default.
    pub warnings: Vec<FactorWarning>,
}

/// Everything the engine computes for one neighborhood in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodReport {
    /// Neighborhood identifier.
    pub neighborhood_id: String,
    /// Shared factor set the downstream results were computed from.
    pub factors: FactorSet,
    /// Fallbacks taken while computing factors.
    pub warnings: Vec<FactorWarning>,
    /// Livability score and breakdown.
    pub livability: LivabilityReport,
    /// Price projection.
    pub projection: PriceProjection,
    /// Gentrification risk.
    pub gentrification: GentrificationAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wild() -> FactorSet {
        FactorSet {
            infrastructure_score: 1.7,
            safety_trend: -0.9,
            education_factor: f64::NAN,
            transport_factor: 0.4,
            economic_growth: -0.1,
            supply_demand: 0.05,
            gentrification_pressure: 3.0,
        }
    }

    #[test]
    fn clamped_respects_ranges() {
        let f = wild().clamped();
        assert!((f.infrastructure_score - 1.0).abs() < f64::EPSILON);
        assert!((f.safety_trend - (-0.2)).abs() < f64::EPSILON);
        assert!(f.education_factor.abs() < f64::EPSILON);
        assert!((f.transport_factor - 0.15).abs() < f64::EPSILON);
        assert!(f.economic_growth.abs() < f64::EPSILON);
        assert!((f.supply_demand - 0.05).abs() < f64::EPSILON);
        assert!((f.gentrification_pressure - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::all().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(RiskLevel::High.timeframe(), "2-4 years");
        assert_eq!(RiskLevel::VeryLow.timeframe(), "10+ years");
    }

    #[test]
    fn serializes_camel_case() {
        let point = PricePoint {
            month: 1,
            predicted_price: 15_100.0,
            growth_rate: 0.01,
            confidence: 40,
        };
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json["predictedPrice"], 15_100.0);
        assert_eq!(json["growthRate"], 0.01);

        assert_eq!(
            serde_json::to_value(RiskLevel::VeryHigh).unwrap(),
            serde_json::json!("VERY_HIGH")
        );
    }
}
