//! High-level engine operations consumed by the API layer and the chat
//! pipeline.
//!
//! [`AnalyticsEngine`] owns nothing but an injected [`ProximityIndex`] and
//! a shared [`EngineConfig`]; it is cheap to clone and safe to share
//! across concurrent requests.

use std::sync::Arc;

use hood_map_analytics_models::{
    FactorComputation, FactorSet, GentrificationAssessment, LivabilityReport,
    NeighborhoodReport, PriceProjection,
};
use hood_map_neighborhood_models::NeighborhoodProfile;
use hood_map_spatial::ProximityIndex;

use crate::projection::{self, RandomSource};
use crate::{AnalyticsError, EngineConfig, factors, gentrification, livability};

/// Entry point for neighborhood analytics.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    index: ProximityIndex,
    config: Arc<EngineConfig>,
}

impl AnalyticsEngine {
    /// Creates an engine over `index` using `config`.
    #[must_use]
    pub const fn new(index: ProximityIndex, config: Arc<EngineConfig>) -> Self {
        Self { index, config }
    }

    /// Creates an engine over `index` with config from the environment
    /// (see [`EngineConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Config`] if an override file is set but
    /// unreadable or invalid.
    pub fn from_env(index: ProximityIndex) -> Result<Self, AnalyticsError> {
        Ok(Self::new(index, Arc::new(EngineConfig::from_env()?)))
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes the factor set, discarding fallback details (they are
    /// still logged).
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidCoordinate`] for a bad position.
    pub async fn compute_factors(
        &self,
        neighborhood: &NeighborhoodProfile,
    ) -> Result<FactorSet, AnalyticsError> {
        Ok(self.compute_factors_detailed(neighborhood).await?.factors)
    }

    /// Computes the factor set along with any fallbacks taken.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidCoordinate`] for a bad position.
    pub async fn compute_factors_detailed(
        &self,
        neighborhood: &NeighborhoodProfile,
    ) -> Result<FactorComputation, AnalyticsError> {
        factors::compute_factors(&self.index, &self.config, neighborhood).await
    }

    /// Scores livability with education, healthcare, and transport detail.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidCoordinate`] for a bad position.
    pub async fn score_livability(
        &self,
        neighborhood: &NeighborhoodProfile,
    ) -> Result<LivabilityReport, AnalyticsError> {
        livability::score_livability(&self.index, &self.config, neighborhood).await
    }

    /// Projects prices starting from the neighborhood's average rent.
    ///
    /// Inputs are validated before any proximity lookup is made.
    ///
    /// # Errors
    ///
    /// * [`AnalyticsError::InvalidHorizon`] if `horizon_months` is outside `1..=60`
    /// * [`AnalyticsError::InvalidPrice`] if the average rent is not positive
    /// * [`AnalyticsError::InvalidCoordinate`] for a bad position
    pub async fn project_prices<R: RandomSource + Send + ?Sized>(
        &self,
        neighborhood: &NeighborhoodProfile,
        horizon_months: u32,
        rng: &mut R,
    ) -> Result<PriceProjection, AnalyticsError> {
        projection::validate_request(neighborhood.avg_rent, horizon_months)?;
        let factors = self.compute_factors(neighborhood).await?;
        projection::project(
            neighborhood.avg_rent,
            &factors,
            horizon_months,
            &self.config.projection,
            rng,
        )
    }

    /// Classifies gentrification risk.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidCoordinate`] for a bad position.
    pub async fn assess_gentrification(
        &self,
        neighborhood: &NeighborhoodProfile,
    ) -> Result<GentrificationAssessment, AnalyticsError> {
        let factors = self.compute_factors(neighborhood).await?;
        Ok(gentrification::classify(&factors))
    }

    /// Runs every analysis in one pass.
    ///
    /// Factor and livability lookups run concurrently; the projection and
    /// classification then share the single computed factor set.
    ///
    /// # Errors
    ///
    /// Same as [`Self::project_prices`].
    pub async fn analyze<R: RandomSource + Send + ?Sized>(
        &self,
        neighborhood: &NeighborhoodProfile,
        horizon_months: u32,
        rng: &mut R,
    ) -> Result<NeighborhoodReport, AnalyticsError> {
        projection::validate_request(neighborhood.avg_rent, horizon_months)?;

        let (computation, livability) = futures::try_join!(
            self.compute_factors_detailed(neighborhood),
            self.score_livability(neighborhood),
        )?;
        let factors = computation.factors;

        let projection = projection::project(
            neighborhood.avg_rent,
            &factors,
            horizon_months,
            &self.config.projection,
            rng,
        )?;
        let gentrification = gentrification::classify(&factors);

        log::info!(
            "Analyzed neighborhood {} ({}): livability={}, risk={}, {} fallback(s)",
            neighborhood.id,
            neighborhood.name,
            livability.score,
            gentrification.risk_level,
            computation.warnings.len(),
        );

        Ok(NeighborhoodReport {
            neighborhood_id: neighborhood.id.clone(),
            factors,
            warnings: computation.warnings,
            livability,
            projection,
            gentrification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedDraw;
    use async_trait::async_trait;
    use hood_map_amenity_models::{
        Amenity, AmenityCategory, AmenityKind, AmenityStatus, FacilityType, GeoPoint,
        SchoolType, TransitMode,
    };
    use hood_map_analytics_models::RiskLevel;
    use hood_map_neighborhood_models::AffordabilityCategory;
    use hood_map_spatial::{AmenityIndex, AmenitySource, SpatialError};
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    const CENTER: GeoPoint = GeoPoint::new(-33.9249, 18.4241);

    fn woodstock() -> NeighborhoodProfile {
        NeighborhoodProfile {
            id: "nbhd-12".to_string(),
            name: "Woodstock".to_string(),
            region: "City Bowl".to_string(),
            position: CENTER,
            avg_rent: 15_000.0,
            safety_score: 8.0,
            transit_score: 75.0,
            affordability_category: AffordabilityCategory::Budget,
        }
    }

    fn amenity(id: &str, lat_offset: f64, kind: AmenityKind) -> Amenity {
        Amenity {
            id: id.to_string(),
            name: id.to_string(),
            position: GeoPoint::new(CENTER.lat + lat_offset, CENTER.lng),
            kind,
            status: AmenityStatus::Operational,
        }
    }

    fn empty_engine() -> AnalyticsEngine {
        AnalyticsEngine::new(
            ProximityIndex::new(Arc::new(AmenityIndex::new(Vec::new()))),
            Arc::new(EngineConfig::default()),
        )
    }

    fn stocked_engine() -> AnalyticsEngine {
        let amenities = vec![
            amenity("p1", 0.001, AmenityKind::School(SchoolType::Primary)),
            amenity("s1", 0.004, AmenityKind::School(SchoolType::Secondary)),
            amenity("h1", 0.010, AmenityKind::HealthFacility(FacilityType::Hospital)),
            amenity("c1", 0.012, AmenityKind::HealthFacility(FacilityType::Clinic)),
            amenity("r1", 0.002, AmenityKind::TransitRoute(TransitMode::Rail)),
            amenity("b1", 0.003, AmenityKind::TransitRoute(TransitMode::Bus)),
        ];
        AnalyticsEngine::new(
            ProximityIndex::new(Arc::new(AmenityIndex::new(amenities))),
            Arc::new(EngineConfig::default()),
        )
    }

    struct DownSource;

    #[async_trait]
    impl AmenitySource for DownSource {
        async fn find_within(
            &self,
            _point: GeoPoint,
            _radius_m: f64,
            _category: AmenityCategory,
        ) -> Result<Vec<Amenity>, SpatialError> {
            Err(SpatialError::Unavailable {
                message: "index not loaded".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn gentrification_example_without_amenities() {
        let engine = empty_engine();
        let neighborhood = woodstock();

        let factors = engine.compute_factors(&neighborhood).await.unwrap();
        assert!((factors.gentrification_pressure - 0.7).abs() < 1e-9);

        let assessment = engine.assess_gentrification(&neighborhood).await.unwrap();
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.timeframe, "2-4 years");
        assert_eq!(assessment.risk_score, 70);
    }

    #[tokio::test]
    async fn thirty_six_month_projection() {
        let engine = stocked_engine();
        let projection = engine
            .project_prices(&woodstock(), 36, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();

        assert_eq!(projection.points.len(), 36);
        assert_eq!(projection.points[0].month, 1);
        assert_eq!(projection.points[35].month, 36);
        assert!((projection.current_price - 15_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn projection_validates_before_lookup() {
        let engine = AnalyticsEngine::new(
            ProximityIndex::new(Arc::new(DownSource)),
            Arc::new(EngineConfig::default()),
        );

        let result = engine
            .project_prices(&woodstock(), 0, &mut FixedDraw(0.5))
            .await;
        assert!(matches!(
            result,
            Err(AnalyticsError::InvalidHorizon { horizon: 0 })
        ));

        let mut free = woodstock();
        free.avg_rent = 0.0;
        let result = engine.project_prices(&free, 12, &mut FixedDraw(0.5)).await;
        assert!(matches!(result, Err(AnalyticsError::InvalidPrice { .. })));
    }

    #[tokio::test]
    async fn analyze_shares_one_factor_set() {
        let engine = stocked_engine();
        let neighborhood = woodstock();

        let report = engine
            .analyze(&neighborhood, 24, &mut FixedDraw(0.5))
            .await
            .unwrap();

        assert_eq!(report.neighborhood_id, "nbhd-12");
        assert!(report.warnings.is_empty());
        assert_eq!(report.projection.points.len(), 24);
        assert_eq!(report.gentrification, gentrification::classify(&report.factors));
        assert_eq!(
            report.factors,
            engine.compute_factors(&neighborhood).await.unwrap()
        );
        assert_eq!(
            report.livability,
            engine.score_livability(&neighborhood).await.unwrap()
        );
        assert!(report.livability.healthcare.hospital_present);
        assert_eq!(report.livability.transport.mode_count, 2);
    }

    #[tokio::test]
    async fn analyze_survives_index_outage() {
        let engine = AnalyticsEngine::new(
            ProximityIndex::new(Arc::new(DownSource)),
            Arc::new(EngineConfig::default()),
        );

        let report = engine
            .analyze(&woodstock(), 12, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();

        assert_eq!(report.warnings.len(), 2);
        assert!(report.livability.education.fallback);
        assert_eq!(report.livability.warnings.len(), 3);
        assert!((report.factors.infrastructure_score - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn invalid_position_fails_every_operation() {
        let engine = empty_engine();
        let mut lost = woodstock();
        lost.position = GeoPoint::new(-95.0, 18.0);

        assert!(matches!(
            engine.compute_factors(&lost).await,
            Err(AnalyticsError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            engine.score_livability(&lost).await,
            Err(AnalyticsError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            engine.assess_gentrification(&lost).await,
            Err(AnalyticsError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            engine.analyze(&lost, 12, &mut FixedDraw(0.5)).await,
            Err(AnalyticsError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn engine_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnalyticsEngine>();
    }
}
