#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Amenity and coordinate types shared by the livability engine.
//!
//! Amenities (schools, health facilities, transit routes) are created by
//! the external data store and are read-only to the engine. Their raw
//! subtype strings are normalized into the closed enums defined here via
//! the keyword mappers at the bottom of this crate.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Valid latitude range in degrees.
pub const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees.
pub const LNG_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a point without validating it. Use [`Self::validate`]
    /// before feeding it into distance math.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both components are finite and in range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        LAT_RANGE.contains(&self.lat) && LNG_RANGE.contains(&self.lng)
    }

    /// Checks that the point lies within the valid lat/lng ranges.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if either component is out of
    /// range or not finite.
    pub fn validate(&self) -> Result<(), InvalidCoordinateError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(InvalidCoordinateError {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// Error returned when a [`GeoPoint`] is outside the valid coordinate
/// ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinateError {
    /// The offending latitude.
    pub lat: f64,
    /// The offending longitude.
    pub lng: f64,
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid coordinate ({}, {}): expected lat in [-90, 90] and lng in [-180, 180]",
            self.lat, self.lng
        )
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// Top-level amenity categories the proximity index can be queried for.
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
pub enum AmenityCategory {
    /// Schools of any phase
    School,
    /// Hospitals, clinics, and other health facilities
    HealthFacility,
    /// Public transit routes and stops
    TransitRoute,
}

/// School phase, used to weight education quality.
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
pub enum SchoolType {
    /// Primary / elementary school
    Primary,
    /// Secondary / high school
    Secondary,
    /// Combined primary and secondary phases
    Combined,
    /// Anything else (special needs, pre-primary, unknown)
    Other,
}

/// Classification of a health facility.
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
pub enum FacilityType {
    /// District, regional, or academic hospital
    Hospital,
    /// Primary-care clinic
    Clinic,
    /// Community health centre (extended-hours primary care)
    CommunityHealthCentre,
    /// Retail or dispensing pharmacy
    Pharmacy,
    /// Anything else
    Other,
}

impl FacilityType {
    /// Returns `true` for facilities that count as hospital-class for the
    /// healthcare bonus.
    #[must_use]
    pub const fn is_hospital_class(self) -> bool {
        matches!(self, Self::Hospital)
    }
}

/// Mode of a transit route.
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
pub enum TransitMode {
    /// Scheduled bus service
    Bus,
    /// Commuter rail or metro
    Rail,
    /// Minibus taxi route
    MinibusTaxi,
    /// Ferry
    Ferry,
    /// Anything else
    Other,
}

/// Operational status of an amenity.
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
pub enum AmenityStatus {
    /// Open and serving the public
    Operational,
    /// Closed, suspended, or decommissioned
    Inactive,
}

/// Category plus its category-specific subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", content = "subtype", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmenityKind {
    /// A school and its phase.
    School(SchoolType),
    /// A health facility and its classification.
    HealthFacility(FacilityType),
    /// A transit route and its mode.
    TransitRoute(TransitMode),
}

impl AmenityKind {
    /// Returns the top-level [`AmenityCategory`] for this kind.
    #[must_use]
    pub const fn category(self) -> AmenityCategory {
        match self {
            Self::School(_) => AmenityCategory::School,
            Self::HealthFacility(_) => AmenityCategory::HealthFacility,
            Self::TransitRoute(_) => AmenityCategory::TransitRoute,
        }
    }
}

/// A single amenity record as supplied by the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    /// Store identifier.
    pub id: String,
    /// Human-readable name (e.g. "Rondebosch Boys' High School").
    pub name: String,
    /// Location of the amenity.
    pub position: GeoPoint,
    /// Category and subtype.
    pub kind: AmenityKind,
    /// Whether the amenity is currently operating.
    pub status: AmenityStatus,
}

impl Amenity {
    /// Returns the top-level category of this amenity.
    #[must_use]
    pub const fn category(&self) -> AmenityCategory {
        self.kind.category()
    }

    /// Returns `true` if the amenity is operational.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.status == AmenityStatus::Operational
    }
}

/// Maps a raw school subtype string (e.g. `"Secondary School"`) to a
/// [`SchoolType`].
///
/// Matching is keyword-based and case-insensitive. Returns
/// [`SchoolType::Other`] when nothing matches.
#[must_use]
pub fn map_school_type(raw: &str) -> SchoolType {
    let lower = raw.to_lowercase();

    // "combined" must win over the phase keywords it often appears with
    if lower.contains("combined") {
        return SchoolType::Combined;
    }
    if contains_any(&lower, &["secondary", "high school"]) || has_word(&lower, "high") {
        return SchoolType::Secondary;
    }
    if contains_any(&lower, &["primary", "elementary", "junior"]) {
        return SchoolType::Primary;
    }

    log::debug!("Unmapped school subtype '{raw}', using OTHER");
    SchoolType::Other
}

/// Maps a raw health facility subtype string to a [`FacilityType`].
#[must_use]
pub fn map_facility_type(raw: &str) -> FacilityType {
    let lower = raw.to_lowercase();

    // day hospitals are primary-care centres, not hospital-class
    if contains_any(&lower, &["community health", "chc", "day hospital"]) {
        return FacilityType::CommunityHealthCentre;
    }
    if lower.contains("hospital") {
        return FacilityType::Hospital;
    }
    if contains_any(&lower, &["clinic", "surgery", "practice"]) {
        return FacilityType::Clinic;
    }
    if contains_any(&lower, &["pharmacy", "chemist", "dispensary"]) {
        return FacilityType::Pharmacy;
    }

    log::debug!("Unmapped facility subtype '{raw}', using OTHER");
    FacilityType::Other
}

/// Maps a raw transit route subtype string to a [`TransitMode`].
#[must_use]
pub fn map_transit_mode(raw: &str) -> TransitMode {
    let lower = raw.to_lowercase();

    if contains_any(&lower, &["rail", "train", "metro"]) {
        return TransitMode::Rail;
    }
    // minibus before bus, since "minibus" contains "bus"
    if contains_any(&lower, &["minibus", "taxi"]) {
        return TransitMode::MinibusTaxi;
    }
    if lower.contains("bus") {
        return TransitMode::Bus;
    }
    if lower.contains("ferry") {
        return TransitMode::Ferry;
    }

    log::debug!("Unmapped transit subtype '{raw}', using OTHER");
    TransitMode::Other
}

/// Maps a raw status string to an [`AmenityStatus`]. Anything not
/// recognizably open is treated as inactive.
#[must_use]
pub fn map_status(raw: &str) -> AmenityStatus {
    let lower = raw.to_lowercase();

    if contains_any(
        &lower,
        &[
            "inactive",
            "not operational",
            "non-operational",
            "closed",
            "suspended",
            "decommissioned",
        ],
    ) {
        return AmenityStatus::Inactive;
    }
    if contains_any(&lower, &["operational", "open", "active"]) {
        return AmenityStatus::Operational;
    }
    AmenityStatus::Inactive
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn has_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_validation() {
        assert!(GeoPoint::new(-33.9249, 18.4241).is_valid());
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
        assert!(GeoPoint::new(90.1, 0.0).validate().is_err());
        assert!(GeoPoint::new(0.0, 180.5).validate().is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn kind_category_consistency() {
        assert_eq!(
            AmenityKind::School(SchoolType::Primary).category(),
            AmenityCategory::School
        );
        assert_eq!(
            AmenityKind::HealthFacility(FacilityType::Clinic).category(),
            AmenityCategory::HealthFacility
        );
        assert_eq!(
            AmenityKind::TransitRoute(TransitMode::Rail).category(),
            AmenityCategory::TransitRoute
        );
    }

    #[test]
    fn school_type_mapping() {
        assert_eq!(map_school_type("Secondary School"), SchoolType::Secondary);
        assert_eq!(map_school_type("PRIMARY SCHOOL"), SchoolType::Primary);
        assert_eq!(map_school_type("Combined School"), SchoolType::Combined);
        assert_eq!(map_school_type("Special Needs"), SchoolType::Other);
        assert_eq!(map_school_type("Rondebosch Boys' High"), SchoolType::Secondary);
    }

    #[test]
    fn high_inside_a_name_is_not_a_phase() {
        assert_eq!(map_school_type("Highlands Primary School"), SchoolType::Primary);
        assert_eq!(map_school_type("Highbury Primary"), SchoolType::Primary);
        assert_eq!(map_school_type("Highlands"), SchoolType::Other);
    }

    #[test]
    fn facility_type_mapping() {
        assert_eq!(map_facility_type("Regional Hospital"), FacilityType::Hospital);
        assert_eq!(
            map_facility_type("Community Health Centre"),
            FacilityType::CommunityHealthCentre
        );
        assert_eq!(map_facility_type("Clinic"), FacilityType::Clinic);
        assert_eq!(map_facility_type("Mobile unit"), FacilityType::Other);
        assert!(FacilityType::Hospital.is_hospital_class());
        assert!(!FacilityType::Clinic.is_hospital_class());
    }

    #[test]
    fn day_hospitals_are_community_health_centres() {
        let kind = map_facility_type("Hanover Park Day Hospital");
        assert_eq!(kind, FacilityType::CommunityHealthCentre);
        assert!(!kind.is_hospital_class());
        assert_eq!(
            map_facility_type("Groote Schuur Hospital"),
            FacilityType::Hospital
        );
    }

    #[test]
    fn transit_mode_mapping() {
        assert_eq!(map_transit_mode("MyCiTi Bus"), TransitMode::Bus);
        assert_eq!(map_transit_mode("Minibus Taxi"), TransitMode::MinibusTaxi);
        assert_eq!(map_transit_mode("Metrorail"), TransitMode::Rail);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(map_status("Operational"), AmenityStatus::Operational);
        assert_eq!(map_status("inactive"), AmenityStatus::Inactive);
        assert_eq!(map_status("Not operational"), AmenityStatus::Inactive);
        assert_eq!(map_status("NON-OPERATIONAL"), AmenityStatus::Inactive);
        assert_eq!(map_status(""), AmenityStatus::Inactive);
    }

    #[test]
    fn strict_parsing_rejects_unknown_variants() {
        assert_eq!("SECONDARY".parse::<SchoolType>(), Ok(SchoolType::Secondary));
        assert!("TERTIARY".parse::<SchoolType>().is_err());
        assert!("SPACEPORT".parse::<FacilityType>().is_err());
        assert!("HOVERCRAFT".parse::<TransitMode>().is_err());
    }
}
