#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Value types shared by the area fusion pipeline.
//!
//! These types describe what flows between the loaders, the fusion core,
//! and whatever renders the result: normalized demographic profiles,
//! point features (services and transit stops), the per-area need
//! metrics, and region-wide summaries. They carry no geometry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Upper bound of the service gap score.
pub const MAX_GAP_SCORE: f64 = 100.0;

/// A demographic row after field-alias resolution.
///
/// Every count is optional so that "reported as zero" and "not reported"
/// stay distinguishable. The accessors default absent values to 0, which
/// is what scoring and output consume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicRecord {
    /// Canonical area key (postal code with leading zeros preserved).
    pub zip_code: String,
    /// Total population.
    pub population: Option<u64>,
    /// Population below the poverty line.
    pub poverty_population: Option<u64>,
    /// Median household income.
    pub median_income: Option<f64>,
    /// Population living in rented housing.
    pub renter_population: Option<u64>,
    /// Median gross rent, reported downstream as `housingBurden`.
    pub median_gross_rent: Option<f64>,
    /// Veteran population.
    pub veteran_population: Option<u64>,
    /// Population with a disability.
    pub disability_population: Option<u64>,
    /// Population aged 60 and over.
    pub senior_population: Option<u64>,
    /// Youth population.
    pub youth_population: Option<u64>,
}

impl DemographicRecord {
    /// Creates an empty record for `zip_code` with every field absent.
    #[must_use]
    pub fn new(zip_code: impl Into<String>) -> Self {
        Self {
            zip_code: zip_code.into(),
            ..Self::default()
        }
    }

    /// Total population, 0 when absent.
    #[must_use]
    pub fn population(&self) -> u64 {
        self.population.unwrap_or(0)
    }

    /// Poverty population, 0 when absent.
    #[must_use]
    pub fn poverty_population(&self) -> u64 {
        self.poverty_population.unwrap_or(0)
    }

    /// Percentage of the population in poverty, in `[0, 100]`.
    ///
    /// Returns 0 when the population is absent or zero.
    #[must_use]
    pub fn poverty_rate(&self) -> f64 {
        percentage(self.poverty_population(), self.population())
    }

    /// Percentage of the population renting, in `[0, 100]`.
    ///
    /// Returns 0 when the population is absent or zero.
    #[must_use]
    pub fn renter_rate(&self) -> f64 {
        percentage(self.renter_population.unwrap_or(0), self.population())
    }
}

/// `100 * part / whole`, clamped to `[0, 100]`, or 0 when `whole` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (100.0 * part as f64 / whole as f64).min(100.0)
}

/// What a [`PointFeature`] represents.
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
pub enum PointKind {
    /// A social service location.
    HomelessService,
    /// A public transit stop.
    TransitStop,
}

/// Coarse service classification, derived from a service's name and
/// description by the loaders.
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
pub enum ServiceCategory {
    /// Shelters, emergency and transitional housing.
    #[serde(rename = "Shelter/Housing")]
    #[strum(serialize = "Shelter/Housing")]
    ShelterHousing,
    /// Meals, pantries, and kitchens.
    #[serde(rename = "Food Services")]
    #[strum(serialize = "Food Services")]
    FoodServices,
    /// Clinics, dental, pharmacy.
    #[serde(rename = "Medical/Health")]
    #[strum(serialize = "Medical/Health")]
    MedicalHealth,
    /// Counseling and behavioral health.
    #[serde(rename = "Mental Health")]
    #[strum(serialize = "Mental Health")]
    MentalHealth,
    /// Job training and placement.
    #[serde(rename = "Employment")]
    #[strum(serialize = "Employment")]
    Employment,
    /// Clothing, hygiene, showers, laundry.
    #[serde(rename = "Basic Needs")]
    #[strum(serialize = "Basic Needs")]
    BasicNeeds,
    /// Legal aid, advocacy, case management.
    #[serde(rename = "Legal/Advocacy")]
    #[strum(serialize = "Legal/Advocacy")]
    LegalAdvocacy,
    /// Youth and family programs.
    #[serde(rename = "Youth/Family")]
    #[strum(serialize = "Youth/Family")]
    YouthFamily,
    /// Anything not matching a more specific category.
    #[serde(rename = "Other")]
    #[strum(serialize = "Other")]
    Other,
}

impl ServiceCategory {
    /// Returns all variants in classification precedence order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ShelterHousing,
            Self::FoodServices,
            Self::MedicalHealth,
            Self::MentalHealth,
            Self::Employment,
            Self::BasicNeeds,
            Self::LegalAdvocacy,
            Self::YouthFamily,
            Self::Other,
        ]
    }
}

/// A located point: a service or a transit stop.
///
/// Coordinates are always present; loaders drop records without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointFeature {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Service or transit stop.
    pub kind: PointKind,
    /// Service classification (services only).
    pub category: Option<ServiceCategory>,
    /// Display name, if the source record had one.
    pub name: Option<String>,
    /// The untouched source record.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl PointFeature {
    /// Creates a point with no metadata.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, kind: PointKind) -> Self {
        Self {
            latitude,
            longitude,
            kind,
            category: None,
            name: None,
            attributes: serde_json::Map::new(),
        }
    }
}

/// Need metrics derived for one area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaMetrics {
    /// Services located inside the area polygon.
    pub service_count: u32,
    /// Great-circle miles from the area centroid to the nearest service,
    /// `None` when there are no services at all.
    pub nearest_service_distance: Option<f64>,
    /// Composite need score in `[0, 100]`.
    pub service_gap_score: f64,
}

impl AreaMetrics {
    /// Returns the tier this area's score falls in.
    #[must_use]
    pub fn tier(&self) -> GapTier {
        GapTier::from_score(self.service_gap_score)
    }
}

/// Score buckets used for region summaries.
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
pub enum GapTier {
    /// Score below 20.
    Low,
    /// Score in `[20, 40)`.
    LowMedium,
    /// Score in `[40, 60)`.
    Medium,
    /// Score in `[60, 80)`.
    MediumHigh,
    /// Score of 80 or more.
    High,
}

impl GapTier {
    /// Buckets a gap score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::High
        } else if score >= 60.0 {
            Self::MediumHigh
        } else if score >= 40.0 {
            Self::Medium
        } else if score >= 20.0 {
            Self::LowMedium
        } else {
            Self::Low
        }
    }
}

/// Soft counters collected while fusing.
///
/// Nothing recorded here aborts a run; it only describes how much of the
/// input had to be defaulted or skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionDiagnostics {
    /// Areas joined to a demographic record.
    pub matched_areas: u64,
    /// Areas with a key but no demographic record.
    pub unmatched_areas: u64,
    /// Areas assigned the reserved score without evaluation.
    pub short_circuited_areas: u64,
    /// Demographic rows ignored because an earlier row had the same key.
    pub duplicate_demographic_keys: u64,
    /// Point/polygon containment tests skipped on degenerate rings.
    pub skipped_containment_checks: u64,
    /// Areas whose centroid fell back to the vertex mean.
    pub centroid_fallbacks: u64,
}

impl FusionDiagnostics {
    /// Adds another set of counters into this one.
    pub fn absorb(&mut self, other: &Self) {
        self.matched_areas += other.matched_areas;
        self.unmatched_areas += other.unmatched_areas;
        self.short_circuited_areas += other.short_circuited_areas;
        self.duplicate_demographic_keys += other.duplicate_demographic_keys;
        self.skipped_containment_checks += other.skipped_containment_checks;
        self.centroid_fallbacks += other.centroid_fallbacks;
    }
}

/// One row of the highest-need ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedArea {
    /// Area key.
    pub zip_code: String,
    /// Gap score.
    pub service_gap_score: f64,
    /// Poverty rate of the matched demographic record.
    pub poverty_rate: f64,
    /// Population of the matched demographic record.
    pub population: u64,
    /// Services inside the area.
    pub service_count: u32,
}

/// Region-wide rollup of a fused run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    /// Sum of population over populated areas.
    pub total_population: u64,
    /// Aggregate poverty rate over populated areas.
    pub average_poverty_rate: f64,
    /// Mean gap score over populated areas.
    pub average_service_gap: f64,
    /// Key of the populated area with the highest score.
    pub highest_gap_zip_code: Option<String>,
    /// Number of services in the run.
    pub total_services: u64,
    /// Number of transit stops in the run.
    pub total_transit_stops: u64,
    /// Services per category.
    pub services_by_category: BTreeMap<ServiceCategory, u64>,
    /// Areas per score tier (all areas, populated or not).
    pub areas_by_tier: BTreeMap<GapTier, u64>,
    /// Highest-scoring keyed areas, descending.
    pub top_gaps: Vec<RankedArea>,
}
