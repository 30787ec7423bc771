//! Engine tuning constants.
//!
//! The defaults are embedded at compile time from `config/default.toml`.
//! A deployment can point `HOOD_MAP_ENGINE_CONFIG` at its own TOML file
//! with the same schema to override them.

use std::collections::BTreeMap;
use std::path::Path;

use hood_map_neighborhood_models::AffordabilityCategory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an override config file.
pub const CONFIG_PATH_ENV: &str = "HOOD_MAP_ENGINE_CONFIG";

const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Seasonal multipliers must stay within this band.
const SEASONAL_BOUNDS: (f64, f64) = (0.97, 1.03);

/// Errors that can occur while loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML could not be parsed into [`EngineConfig`].
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of its allowed range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// All tunable constants used by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Infrastructure/education value used when the proximity index fails.
    pub neutral_factor: f64,
    /// Amenity search radii.
    pub radii: SearchRadii,
    /// Infrastructure score weights.
    pub infrastructure: InfrastructureWeights,
    /// Education quality weight per school type.
    pub education: EducationWeights,
    /// Regional growth lookup.
    pub economic_growth: RegionGrowthTable,
    /// Affordability demand lookup.
    pub supply_demand: SupplyDemandTable,
    /// Price simulation constants.
    pub projection: ProjectionConfig,
    /// Livability scoring constants.
    pub livability: LivabilityConfig,
}

/// Search radius per amenity category, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRadii {
    /// Schools.
    pub school_m: f64,
    /// Health facilities.
    pub health_facility_m: f64,
    /// Transit routes.
    pub transit_route_m: f64,
}

/// Weights and saturation counts for the infrastructure score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureWeights {
    /// Weight of the school component.
    pub school_weight: f64,
    /// Weight of the health facility component.
    pub health_weight: f64,
    /// School count at which the school component reaches 1.0.
    pub school_saturation: u32,
    /// Facility count at which the health component reaches 1.0.
    pub facility_saturation: u32,
}

/// Per-school quality weights summed into the education factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EducationWeights {
    /// Primary schools.
    pub primary: f64,
    /// Secondary schools.
    pub secondary: f64,
    /// Combined schools.
    pub combined: f64,
    /// Any other school type.
    pub other: f64,
}

/// Annualized growth fraction per named region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGrowthTable {
    /// Used for regions not in the table.
    pub default: f64,
    /// Region name to growth fraction. Lookups ignore ASCII case.
    pub regions: BTreeMap<String, f64>,
}

impl RegionGrowthTable {
    /// Returns the growth fraction for `region`, or the default.
    #[must_use]
    pub fn lookup(&self, region: &str) -> f64 {
        let region = region.trim();
        self.regions
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(region))
            .map_or_else(
                || {
                    log::debug!("No growth entry for region '{region}', using default");
                    self.default
                },
                |(_, growth)| *growth,
            )
    }
}

/// Annualized demand fraction per affordability band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyDemandTable {
    /// Used for bands missing from the table.
    pub default: f64,
    /// Band to demand fraction.
    pub categories: BTreeMap<AffordabilityCategory, f64>,
}

impl SupplyDemandTable {
    /// Returns the demand fraction for `category`, or the default.
    #[must_use]
    pub fn lookup(&self, category: AffordabilityCategory) -> f64 {
        self.categories
            .get(&category)
            .copied()
            .unwrap_or(self.default)
    }
}

/// Price simulation constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Growth multiplier for projection months 1-12, repeating yearly.
    pub seasonal: [f64; 12],
}

impl ProjectionConfig {
    /// Returns the seasonal multiplier for a 1-based projection month.
    #[must_use]
    pub const fn seasonal_multiplier(&self, month: u32) -> f64 {
        self.seasonal[(month.saturating_sub(1) % 12) as usize]
    }
}

/// Livability scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivabilityConfig {
    /// Sub-score used when the proximity index fails.
    pub neutral_sub_score: u8,
    /// Points per school.
    pub school_multiplier: f64,
    /// Points per health facility.
    pub facility_multiplier: f64,
    /// Points per transit route.
    pub route_multiplier: f64,
    /// Bonus when both primary and secondary schools are present.
    pub school_mix_bonus: f64,
    /// Bonus when a hospital-class facility is present.
    pub hospital_bonus: f64,
    /// Bonus when two or more transit modes are present.
    pub multimodal_bonus: f64,
    /// Composite weights.
    pub weights: LivabilityWeights,
}

/// Weights of the five livability sub-scores. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivabilityWeights {
    /// Education sub-score weight.
    pub education: f64,
    /// Healthcare sub-score weight.
    pub healthcare: f64,
    /// Transport sub-score weight.
    pub transport: f64,
    /// Safety sub-score weight.
    pub safety: f64,
    /// Amenities (transit score) weight.
    pub amenities: f64,
}

impl LivabilityWeights {
    fn sum(&self) -> f64 {
        self.education + self.healthcare + self.transport + self.safety + self.amenities
    }
}

impl EngineConfig {
    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or a value is out
    /// of range.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`] if set, otherwise the
    /// embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the override file is unreadable or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV);
        Self::from_override(path.as_deref().map(Path::new))
    }

    fn from_override(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                log::info!("Loading engine config from {}", path.display());
                Self::from_path(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("neutral_factor", self.neutral_factor)?;

        for (name, radius) in [
            ("radii.school_m", self.radii.school_m),
            ("radii.health_facility_m", self.radii.health_facility_m),
            ("radii.transit_route_m", self.radii.transit_route_m),
        ] {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(invalid(format!("{name} must be positive, got {radius}")));
            }
        }

        let infra = &self.infrastructure;
        if infra.school_saturation == 0 || infra.facility_saturation == 0 {
            return Err(invalid("infrastructure saturation counts must be non-zero"));
        }
        check_fraction("infrastructure.school_weight", infra.school_weight)?;
        check_fraction("infrastructure.health_weight", infra.health_weight)?;

        check_fraction("economic_growth.default", self.economic_growth.default)?;
        for (region, growth) in &self.economic_growth.regions {
            check_fraction(&format!("economic_growth.regions.{region}"), *growth)?;
        }

        check_fraction("supply_demand.default", self.supply_demand.default)?;
        for (category, demand) in &self.supply_demand.categories {
            check_fraction(&format!("supply_demand.categories.{category}"), *demand)?;
        }

        let (lo, hi) = SEASONAL_BOUNDS;
        for (i, m) in self.projection.seasonal.iter().enumerate() {
            if !(lo..=hi).contains(m) {
                return Err(invalid(format!(
                    "projection.seasonal[{i}] = {m} is outside [{lo}, {hi}]"
                )));
            }
        }

        if self.livability.neutral_sub_score > 100 {
            return Err(invalid("livability.neutral_sub_score must be at most 100"));
        }
        let weight_sum = self.livability.weights.sum();
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(invalid(format!(
                "livability.weights must sum to 1, got {weight_sum}"
            )));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    /// Returns the embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse or validate. Since it is
    /// a compile-time constant, failure indicates a development error and
    /// is caught by the tests.
    fn default() -> Self {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
            .unwrap_or_else(|e| panic!("Failed to load embedded engine config: {e}"))
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be in [0, 1], got {value}")))
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}
