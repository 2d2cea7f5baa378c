//! Service gap score.
//!
//! | Term | Value | Cap |
//! |------|-------|-----|
//! | poverty | `poverty_rate * 2` | 50 |
//! | population | `population / 1000 * 5` | 25 |
//! | services | `15 - service_count * 3` | floor 0 |
//! | distance | `nearest_miles * 2`, or 10 with no services | 10 |
//!
//! The sum is capped at [`MAX_GAP_SCORE`]. Areas that cannot be verified
//! (no key or no geometry) skip the formula and take
//! [`RESERVED_GAP_SCORE`].

use service_gap_fusion_models::MAX_GAP_SCORE;

/// Score assigned to areas without a key or usable geometry.
pub const RESERVED_GAP_SCORE: f64 = MAX_GAP_SCORE;

const POVERTY_CAP: f64 = 50.0;
const POPULATION_CAP: f64 = 25.0;
const SERVICE_BASE: f64 = 15.0;
const DISTANCE_CAP: f64 = 10.0;

/// Inputs to [`gap_score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapSignals {
    /// Poverty rate in percent.
    pub poverty_rate: f64,
    /// Total population.
    pub population: u64,
    /// Services inside the area.
    pub service_count: u32,
    /// Miles to the nearest service, `None` when there are none.
    pub nearest_miles: Option<f64>,
}

/// Individual contributions to a score, for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapTerms {
    /// Poverty contribution, `[0, 50]`.
    pub poverty: f64,
    /// Population contribution, `[0, 25]`.
    pub population: f64,
    /// Service-count contribution, `[0, 15]`.
    pub service: f64,
    /// Distance contribution, `[0, 10]`.
    pub distance: f64,
}

impl GapTerms {
    /// Computes each term from `signals`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_signals(signals: &GapSignals) -> Self {
        Self {
            poverty: (signals.poverty_rate.max(0.0) * 2.0).min(POVERTY_CAP),
            population: (signals.population as f64 / 1000.0 * 5.0).min(POPULATION_CAP),
            service: f64::from(signals.service_count)
                .mul_add(-3.0, SERVICE_BASE)
                .max(0.0),
            distance: signals
                .nearest_miles
                .map_or(DISTANCE_CAP, |miles| (miles.max(0.0) * 2.0).min(DISTANCE_CAP)),
        }
    }

    /// Capped sum of the terms.
    #[must_use]
    pub fn total(&self) -> f64 {
        (self.poverty + self.population + self.service + self.distance).min(MAX_GAP_SCORE)
    }
}

/// Computes the gap score for an evaluated area. Always in `[0, 100]`.
#[must_use]
pub fn gap_score(signals: &GapSignals) -> f64 {
    GapTerms::from_signals(signals).total()
}
