#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Area data fusion and need scoring.
//!
//! Takes area polygons, demographic rows, and service points, and produces
//! the same polygons annotated with a demographic profile, a count of
//! services inside each area, the distance from each area's centroid to
//! the nearest service, and a composite service gap score.
//!
//! The stages run in order:
//!
//! 1. [`normalize`] maps raw demographic rows onto [`DemographicRecord`]
//!    using the [`aliases`] table.
//! 2. [`merge`] joins each polygon to at most one record by canonical key
//!    ([`keys`]).
//! 3. [`pipeline`] attributes services and scores each area ([`score`])
//!    on a pool of blocking workers.
//! 4. [`output`] and [`summary`] assemble the annotated collection and
//!    the region rollup.
//!
//! [`DemographicRecord`]: service_gap_fusion_models::DemographicRecord

pub mod aliases;
pub mod keys;
pub mod merge;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod score;
pub mod summary;

use std::sync::Arc;

use geojson::FeatureCollection;
use serde_json::{Map, Value};
use service_gap_fusion_models::{FusionDiagnostics, PointFeature, RegionSummary};
use service_gap_spatial::{LocatorKind, ServiceLocator, build_locator};

use crate::aliases::FieldAliases;
use crate::merge::{DemographicIndex, areas_from_collection, merge_areas};
use crate::pipeline::{CancelFlag, ScoredArea, score_areas};

/// Default number of areas in the highest-need ranking.
pub const DEFAULT_TOP_N: usize = 15;

/// Errors that abort a fusion run.
///
/// Data problems (unmatched keys, degenerate rings, missing values) are
/// never errors; they are defaulted and counted in [`FusionDiagnostics`].
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    /// The field-alias table is not valid TOML for the expected shape.
    #[error("Invalid field-alias table: {0}")]
    Aliases(#[from] toml::de::Error),

    /// The field-alias table parsed but is unusable.
    #[error("Invalid field-alias table: {message}")]
    InvalidAliases {
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error reading a field-alias file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The run was cancelled before every area was scored.
    #[error("Fusion cancelled")]
    Cancelled,

    /// A scoring worker panicked or was aborted.
    #[error("Scoring worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Settings for a fusion run.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Accepted source field names.
    pub aliases: FieldAliases,
    /// Spatial strategy for attribution and nearest lookups.
    pub locator: LocatorKind,
    /// Number of scoring workers.
    pub workers: usize,
    /// Number of areas in the summary ranking.
    pub top_n: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            aliases: FieldAliases::default(),
            locator: LocatorKind::default(),
            workers: std::thread::available_parallelism().map_or(1, std::num::NonZero::get),
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Everything a run consumes, already loaded.
#[derive(Debug, Clone)]
pub struct FusionInput {
    /// Area polygons.
    pub areas: FeatureCollection,
    /// Raw demographic rows.
    pub demographics: Vec<Map<String, Value>>,
    /// Service locations.
    pub services: Vec<PointFeature>,
    /// Transit stop locations, reported in the summary only.
    pub transit_stops: Vec<PointFeature>,
}

/// The result of a completed run.
#[derive(Debug, Clone)]
pub struct FusionOutput {
    /// Annotated polygons, in input order.
    pub collection: FeatureCollection,
    /// Per-area merge and scoring results, in input order.
    pub scored: Vec<ScoredArea>,
    /// Region rollup.
    pub summary: RegionSummary,
    /// Soft counters gathered across every stage.
    pub diagnostics: FusionDiagnostics,
}

/// Runs the whole pipeline over `input`.
///
/// # Errors
///
/// Returns [`FusionError::Cancelled`] if `cancel` is set before scoring
/// completes, or [`FusionError::Worker`] if a scoring task fails. No
/// partial output is produced in either case.
pub async fn fuse(
    mut input: FusionInput,
    config: &FusionConfig,
    cancel: &CancelFlag,
) -> Result<FusionOutput, FusionError> {
    let records = normalize::normalize_rows(&input.demographics, &config.aliases.demographics);
    let index = DemographicIndex::build(records);
    log::info!("Indexed {} demographic records", index.len());

    let bbox = input.areas.bbox.clone();
    let foreign_members = input.areas.foreign_members.take();
    let areas = areas_from_collection(input.areas, &config.aliases.area);
    let (merged, mut diagnostics) = merge_areas(areas, &index);

    let locator: Arc<dyn ServiceLocator> = build_locator(config.locator, &input.services).into();
    log::info!(
        "Built {} locator over {} services",
        config.locator,
        locator.len()
    );

    let (scored, scoring_diagnostics) =
        score_areas(merged, locator, config.workers, cancel).await?;
    diagnostics.absorb(&scoring_diagnostics);

    let collection = output::scored_collection(&scored, bbox, foreign_members);
    let summary = summary::summarize(
        &scored,
        &input.services,
        input.transit_stops.len(),
        config.top_n,
    );

    log::info!(
        "Scored {} areas ({} matched, {} unmatched, {} short-circuited)",
        scored.len(),
        diagnostics.matched_areas,
        diagnostics.unmatched_areas,
        diagnostics.short_circuited_areas
    );

    Ok(FusionOutput {
        collection,
        scored,
        summary,
        diagnostics,
    })
}
