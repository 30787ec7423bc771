#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood profile types.
//!
//! A [`NeighborhoodProfile`] is looked up by the caller (the CRUD layer
//! or chat pipeline) and handed to the engine per request. The engine
//! never fetches or mutates profiles.

use hood_map_amenity_models::GeoPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Housing affordability band of a neighborhood, cheapest first.
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
pub enum AffordabilityCategory {
    /// Lowest rents, highest demand pressure
    Budget,
    /// Below-median rents
    Affordable,
    /// Around the median
    Moderate,
    /// Above-median rents
    Expensive,
    /// Premium suburbs
    Luxury,
    /// Top of the market
    UltraLuxury,
}

impl AffordabilityCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Budget,
            Self::Affordable,
            Self::Moderate,
            Self::Expensive,
            Self::Luxury,
            Self::UltraLuxury,
        ]
    }
}

/// Raw attributes of a neighborhood, as stored by the CRUD layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodProfile {
    /// Store identifier.
    pub id: String,
    /// Human-readable name (e.g. "Observatory").
    pub name: String,
    /// Region name used for the economic growth lookup.
    pub region: String,
    /// Representative point (usually the centroid).
    pub position: GeoPoint,
    /// Average monthly rent in local currency, `>= 0`.
    pub avg_rent: f64,
    /// Safety score, `[0, 10]`.
    pub safety_score: f64,
    /// Transit accessibility score, `[0, 100]`.
    pub transit_score: f64,
    /// Affordability band.
    pub affordability_category: AffordabilityCategory,
}
