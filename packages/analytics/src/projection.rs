//! Monthly price simulation.
//!
//! Compounds the factor set into a monthly growth rate, applies the
//! seasonal table, clamps, then perturbs each month's price by a small
//! volatility draw. Randomness comes from an injected [`RandomSource`] so
//! projections are reproducible with a seeded generator.

use hood_map_analytics_models::{FactorSet, PricePoint, PriceProjection};
use rand::rngs::StdRng;

use crate::config::ProjectionConfig;
use crate::{AnalyticsError, MAX_HORIZON_MONTHS, clamp_score, ratio_or_zero};

/// Bounds applied to the monthly growth rate after seasonality.
pub const MONTHLY_GROWTH_BOUNDS: (f64, f64) = (-0.02, 0.05);

const INFRASTRUCTURE_PREMIUM: f64 = 0.02;
const EDUCATION_PREMIUM: f64 = 0.015;
const GENTRIFICATION_PREMIUM: f64 = 0.03;
/// Months over which gentrification pressure ramps to its full premium.
const GENTRIFICATION_RAMP_MONTHS: f64 = 36.0;
const BASE_VOLATILITY: f64 = 0.05;
/// Month at which per-month confidence would reach zero without the floor.
const CONFIDENCE_HORIZON_MONTHS: f64 = 60.0;
const MIN_TIME_DECAY: f64 = 0.3;

/// Uniform draws in `[0, 1)` for the volatility step.
pub trait RandomSource {
    /// Returns the next uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        use rand::RngExt as _;
        self.random::<f64>()
    }
}

/// A source that always returns the same draw.
///
/// `FixedDraw(0.5)` removes volatility entirely and yields the expected
/// price path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDraw(pub f64);

impl RandomSource for FixedDraw {
    fn next_unit(&mut self) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}

/// Undampened monthly growth rate for month `month` (1-based), before
/// seasonality and clamping.
#[must_use]
pub fn base_monthly_rate(factors: &FactorSet, month: u32) -> f64 {
    let ramp = f64::from(month) / GENTRIFICATION_RAMP_MONTHS;

    factors.economic_growth / 12.0
        + factors.infrastructure_score * INFRASTRUCTURE_PREMIUM / 12.0
        + factors.safety_trend / 12.0
        + factors.education_factor * EDUCATION_PREMIUM / 12.0
        + factors.transport_factor / 12.0
        + factors.supply_demand / 12.0
        + (factors.gentrification_pressure * ramp * GENTRIFICATION_PREMIUM) / 12.0
}

/// Seasonally adjusted, clamped growth rate for month `month`.
#[must_use]
pub fn monthly_growth_rate(factors: &FactorSet, month: u32, config: &ProjectionConfig) -> f64 {
    let (lo, hi) = MONTHLY_GROWTH_BOUNDS;
    (base_monthly_rate(factors, month) * config.seasonal_multiplier(month)).clamp(lo, hi)
}

/// Relative size of the volatility perturbation. Lower for stable,
/// well-served areas.
#[must_use]
pub fn volatility(factors: &FactorSet) -> f64 {
    let stability = (factors.infrastructure_score + factors.safety_trend + 1.0) / 3.0;
    BASE_VOLATILITY * (2.0 - stability)
}

/// Confidence in month `month`'s figure, `[0, 100]`.
#[must_use]
pub fn month_confidence(factors: &FactorSet, month: u32) -> u8 {
    let time_decay = (1.0 - f64::from(month) / CONFIDENCE_HORIZON_MONTHS).max(MIN_TIME_DECAY);
    let stability = (factors.infrastructure_score
        + factors.safety_trend.abs()
        + factors.education_factor)
        / 3.0;
    clamp_score(time_decay * stability * 100.0, 0, 100)
}

/// Confidence in the projection as a whole, `[15, 100]`.
#[must_use]
pub fn overall_confidence(factors: &FactorSet) -> u8 {
    let safety_quality = if factors.safety_trend > 0.0 { 1.0 } else { 0.5 };
    let data_quality =
        (factors.infrastructure_score + factors.education_factor + safety_quality) / 3.0;
    clamp_score(data_quality.mul_add(85.0, 15.0), 15, 100)
}

/// Projects a monthly price path over `horizon_months`.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidHorizon`] if `horizon_months` is outside `1..=60`
/// * [`AnalyticsError::InvalidPrice`] if `current_price` is not positive and finite
pub fn project<R: RandomSource + ?Sized>(
    current_price: f64,
    factors: &FactorSet,
    horizon_months: u32,
    config: &ProjectionConfig,
    rng: &mut R,
) -> Result<PriceProjection, AnalyticsError> {
    validate_request(current_price, horizon_months)?;

    let factors = factors.clamped();
    let volatility = volatility(&factors);
    let mut price = current_price;
    let mut points = Vec::with_capacity(horizon_months as usize);

    for month in 1..=horizon_months {
        let growth_rate = monthly_growth_rate(&factors, month, config);
        price *= 1.0 + growth_rate;
        price *= 1.0 + (rng.next_unit() - 0.5) * volatility;

        points.push(PricePoint {
            month,
            predicted_price: price,
            growth_rate,
            confidence: month_confidence(&factors, month),
        });
    }

    let projected_price = points.last().map_or(current_price, |p| p.predicted_price);
    let growth_sum: f64 = points.iter().map(|p| p.growth_rate).sum();

    log::debug!(
        "Projected {current_price:.2} -> {projected_price:.2} over {horizon_months} months"
    );

    Ok(PriceProjection {
        current_price,
        overall_confidence: overall_confidence(&factors),
        projected_price,
        total_growth_percent: ratio_or_zero(projected_price - current_price, current_price)
            * 100.0,
        average_monthly_growth: ratio_or_zero(growth_sum, f64::from(horizon_months)),
        points,
    })
}

/// Checks the inputs of [`project`] without doing any work.
///
/// # Errors
///
/// Same as [`project`].
pub fn validate_request(current_price: f64, horizon_months: u32) -> Result<(), AnalyticsError> {
    if !(1..=MAX_HORIZON_MONTHS).contains(&horizon_months) {
        return Err(AnalyticsError::InvalidHorizon {
            horizon: horizon_months,
        });
    }
    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(AnalyticsError::InvalidPrice {
            price: current_price,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use rand::SeedableRng as _;

    fn factors() -> FactorSet {
        FactorSet {
            infrastructure_score: 0.6,
            safety_trend: 0.05,
            education_factor: 0.7,
            transport_factor: 0.10,
            economic_growth: 0.15,
            supply_demand: 0.08,
            gentrification_pressure: 0.5,
        }
    }

    fn extremes() -> Vec<FactorSet> {
        let min = FactorSet {
            infrastructure_score: 0.0,
            safety_trend: -0.2,
            education_factor: 0.0,
            transport_factor: 0.0,
            economic_growth: 0.0,
            supply_demand: 0.0,
            gentrification_pressure: 0.0,
        };
        let max = FactorSet {
            infrastructure_score: 1.0,
            safety_trend: 0.2,
            education_factor: 1.0,
            transport_factor: 0.15,
            economic_growth: 1.0,
            supply_demand: 1.0,
            gentrification_pressure: 1.0,
        };
        vec![min, max, factors()]
    }

    fn config() -> ProjectionConfig {
        EngineConfig::default().projection
    }

    #[test]
    fn returns_one_point_per_month() {
        let mut rng = StdRng::seed_from_u64(7);
        let projection = project(15_000.0, &factors(), 36, &config(), &mut rng).unwrap();

        assert_eq!(projection.points.len(), 36);
        assert_eq!(projection.points[0].month, 1);
        assert_eq!(projection.points[35].month, 36);
        assert!(
            projection
                .points
                .windows(2)
                .all(|w| w[1].month == w[0].month + 1)
        );
    }

    #[test]
    fn same_seed_same_path() {
        let a = project(
            15_000.0,
            &factors(),
            24,
            &config(),
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        let b = project(
            15_000.0,
            &factors(),
            24,
            &config(),
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn prices_positive_and_growth_bounded_for_all_extremes() {
        let (lo, hi) = MONTHLY_GROWTH_BOUNDS;
        for f in extremes() {
            for seed in 0..20 {
                let projection = project(
                    1.0,
                    &f,
                    MAX_HORIZON_MONTHS,
                    &config(),
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap();
                for p in &projection.points {
                    assert!(
                        p.predicted_price > 0.0,
                        "month {} price {}",
                        p.month,
                        p.predicted_price
                    );
                    assert!((lo..=hi).contains(&p.growth_rate), "rate {}", p.growth_rate);
                    assert!(p.confidence <= 100);
                }
                assert!((15..=100).contains(&projection.overall_confidence));
            }
        }
    }

    #[test]
    fn fixed_midpoint_draw_is_noise_free() {
        let config = config();
        let f = factors();
        let projection = project(10_000.0, &f, 12, &config, &mut FixedDraw(0.5)).unwrap();

        let mut expected = 10_000.0;
        for p in &projection.points {
            expected *= 1.0 + monthly_growth_rate(&f, p.month, &config);
            assert!((p.predicted_price - expected).abs() < 1e-6);
        }
        assert!((projection.projected_price - expected).abs() < 1e-6);
        assert!(projection.total_growth_percent > 0.0);
    }

    #[test]
    fn volatility_draw_bounds_the_perturbation() {
        let config = config();
        let f = factors();
        let vol = volatility(&f);

        let low = project(10_000.0, &f, 1, &config, &mut FixedDraw(0.0)).unwrap();
        let mid = project(10_000.0, &f, 1, &config, &mut FixedDraw(0.5)).unwrap();

        let ratio = low.points[0].predicted_price / mid.points[0].predicted_price;
        assert!((ratio - (1.0 - 0.5 * vol)).abs() < 1e-12);
    }

    #[test]
    fn growth_is_clamped_at_both_ends() {
        let config = config();
        let max = extremes()[1];
        assert!((monthly_growth_rate(&max, 5, &config) - 0.05).abs() < f64::EPSILON);

        let shrinking = FactorSet {
            safety_trend: -0.2,
            economic_growth: 0.0,
            supply_demand: 0.0,
            infrastructure_score: 0.0,
            education_factor: 0.0,
            transport_factor: 0.0,
            gentrification_pressure: 0.0,
        };
        let rate = monthly_growth_rate(&shrinking, 1, &config);
        assert!((rate - (-0.2 / 12.0 * 0.98)).abs() < 1e-12);
        assert!(rate >= -0.02);
    }

    #[test]
    fn gentrification_premium_ramps_with_time() {
        let f = factors();
        assert!(base_monthly_rate(&f, 36) > base_monthly_rate(&f, 1));
        let delta = base_monthly_rate(&f, 36) - base_monthly_rate(&f, 0);
        assert!((delta - 0.5 * 0.03 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn confidence_decays_with_floor() {
        let f = factors();
        let stability = (0.6 + 0.05 + 0.7) / 3.0;

        assert_eq!(
            month_confidence(&f, 1),
            clamp_score((1.0 - 1.0 / 60.0) * stability * 100.0, 0, 100)
        );
        assert!(month_confidence(&f, 1) >= month_confidence(&f, 30));
        // decay bottoms out at 0.3
        assert_eq!(month_confidence(&f, 50), month_confidence(&f, 60));
        assert_eq!(
            month_confidence(&f, 60),
            clamp_score(0.3 * stability * 100.0, 0, 100)
        );
    }

    #[test]
    fn overall_confidence_formula() {
        // (0.6 + 0.7 + 1.0) / 3 * 85 + 15 = 80.17
        assert_eq!(overall_confidence(&factors()), 80);

        let mut f = factors();
        f.safety_trend = -0.05;
        // (0.6 + 0.7 + 0.5) / 3 * 85 + 15 = 66
        assert_eq!(overall_confidence(&f), 66);

        let empty = extremes()[0];
        // (0 + 0 + 0.5) / 3 * 85 + 15 = 29.17
        assert_eq!(overall_confidence(&empty), 29);
    }

    #[test]
    fn rejects_bad_horizon() {
        let mut rng = FixedDraw(0.5);
        for horizon in [0, 61, 120] {
            assert!(matches!(
                project(15_000.0, &factors(), horizon, &config(), &mut rng),
                Err(AnalyticsError::InvalidHorizon { horizon: h }) if h == horizon
            ));
        }
        assert!(project(15_000.0, &factors(), 60, &config(), &mut rng).is_ok());
        assert!(project(15_000.0, &factors(), 1, &config(), &mut rng).is_ok());
    }

    #[test]
    fn rejects_bad_price() {
        let mut rng = FixedDraw(0.5);
        for price in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                project(price, &factors(), 12, &config(), &mut rng),
                Err(AnalyticsError::InvalidPrice { .. })
            ));
        }
    }
}
