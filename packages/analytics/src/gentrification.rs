//! Gentrification risk classification.

use hood_map_analytics_models::{FactorSet, GentrificationAssessment, RiskLevel};

use crate::clamp_score;

const KEY_FACTOR_INFRASTRUCTURE: &str =
    "Well-developed school and healthcare infrastructure is attracting new residents";
const KEY_FACTOR_TRANSPORT: &str =
    "Strong public transport access makes the area attractive to commuters";
const KEY_FACTOR_SAFETY: &str = "Improving safety is drawing higher-income buyers and renters";
const KEY_FACTOR_DEMAND: &str = "Housing demand is outpacing available supply";

const HIGH_PRESSURE_RECOMMENDATIONS: &[&str] = &[
    "Long-term renters should look into lease extensions and tenant protection options now",
    "Buyers should expect rapid price appreciation; entering early carries displacement risk for existing residents",
    "Community organizations should engage with municipal planning on inclusionary housing",
];

const MODERATE_PRESSURE_RECOMMENDATIONS: &[&str] = &[
    "Monitor rent and sale price trends over the next few years",
    "Buyers may find good value before infrastructure improvements are priced in",
    "Residents should get involved in local development consultations",
];

const LOW_PRESSURE_RECOMMENDATIONS: &[&str] = &[
    "The area is likely to remain stable and affordable in the near term",
    "Buyers looking for quick appreciation should look elsewhere",
    "Investment in local amenities could improve livability without rapid displacement",
];

/// Returns the risk level for a gentrification pressure value.
///
/// Boundaries are inclusive at 0.2, 0.4, 0.6, and 0.8.
#[must_use]
pub fn risk_level(pressure: f64) -> RiskLevel {
    if pressure >= 0.8 {
        RiskLevel::VeryHigh
    } else if pressure >= 0.6 {
        RiskLevel::High
    } else if pressure >= 0.4 {
        RiskLevel::Moderate
    } else if pressure >= 0.2 {
        RiskLevel::Low
    } else {
        RiskLevel::VeryLow
    }
}

/// Drivers of gentrification pressure, one reason per condition met.
#[must_use]
pub fn key_factors(factors: &FactorSet) -> Vec<String> {
    [
        (factors.infrastructure_score > 0.7, KEY_FACTOR_INFRASTRUCTURE),
        (factors.transport_factor > 0.1, KEY_FACTOR_TRANSPORT),
        (factors.safety_trend > 0.05, KEY_FACTOR_SAFETY),
        (factors.supply_demand > 0.1, KEY_FACTOR_DEMAND),
    ]
    .into_iter()
    .filter(|(applies, _)| *applies)
    .map(|(_, reason)| reason.to_string())
    .collect()
}

/// Guidance for the given pressure.
#[must_use]
pub fn recommendations(pressure: f64) -> Vec<String> {
    let block = if pressure >= 0.7 {
        HIGH_PRESSURE_RECOMMENDATIONS
    } else if pressure >= 0.4 {
        MODERATE_PRESSURE_RECOMMENDATIONS
    } else {
        LOW_PRESSURE_RECOMMENDATIONS
    };
    block.iter().map(ToString::to_string).collect()
}

/// Classifies gentrification risk from a factor set.
#[must_use]
pub fn classify(factors: &FactorSet) -> GentrificationAssessment {
    let factors = factors.clamped();
    let pressure = factors.gentrification_pressure;
    let level = risk_level(pressure);

    GentrificationAssessment {
        risk_level: level,
        risk_score: clamp_score(pressure * 100.0, 0, 100),
        timeframe: level.timeframe().to_string(),
        key_factors: key_factors(&factors),
        recommendations: recommendations(pressure),
    }
}
