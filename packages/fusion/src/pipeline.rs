//! Per-area attribution, distance, and scoring across a worker pool.
//!
//! Areas are independent once merged, so the merged set is split into
//! contiguous chunks and each chunk is scored on a blocking worker with
//! shared read-only access to the service locator. Each worker returns
//! its own output vector; chunks are concatenated in order, so results
//! do not depend on the number of workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use service_gap_fusion_models::{AreaMetrics, FusionDiagnostics};
use service_gap_spatial::ServiceLocator;

use crate::FusionError;
use crate::merge::MergedArea;
use crate::score::{GapSignals, RESERVED_GAP_SCORE, gap_score};

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cancels a running scoring batch as a whole.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Resolves once cancellation is requested. Lets async stages race
    /// their own work against the flag.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            tokio::time::sleep(CANCEL_POLL_INTERVAL).await;
        }
    }
}

/// A merged area with its need metrics.
#[derive(Debug, Clone)]
pub struct ScoredArea {
    /// The merged area.
    pub merged: MergedArea,
    /// Derived metrics.
    pub metrics: AreaMetrics,
}

impl ScoredArea {
    /// The area key, if resolved.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.merged.area.key.as_deref()
    }
}

/// Scores one area against `locator`, adding to `diagnostics`.
pub fn score_area(
    merged: &MergedArea,
    locator: &dyn ServiceLocator,
    diagnostics: &mut FusionDiagnostics,
) -> AreaMetrics {
    let area = &merged.area;

    let centroid = area.shape.as_ref().and_then(|shape| shape.centroid());
    if centroid.is_some_and(|c| c.fallback) {
        diagnostics.centroid_fallbacks += 1;
    }
    let nearest_service_distance =
        centroid.and_then(|c| locator.nearest_miles(c.point.x(), c.point.y()));

    let shape = match (&area.key, &area.shape) {
        (Some(_), Some(shape)) => shape,
        _ => {
            diagnostics.short_circuited_areas += 1;
            return AreaMetrics {
                service_count: 0,
                nearest_service_distance,
                service_gap_score: RESERVED_GAP_SCORE,
            };
        }
    };

    let containment = locator.count_within(shape);
    diagnostics.skipped_containment_checks += containment.skipped;

    let (poverty_rate, population) = merged
        .demographics
        .as_ref()
        .map_or((0.0, 0), |d| (d.poverty_rate(), d.population()));

    AreaMetrics {
        service_count: containment.count,
        nearest_service_distance,
        service_gap_score: gap_score(&GapSignals {
            poverty_rate,
            population,
            service_count: containment.count,
            nearest_miles: nearest_service_distance,
        }),
    }
}

fn score_chunk(
    chunk: Vec<MergedArea>,
    locator: &dyn ServiceLocator,
    cancel: &CancelFlag,
) -> Result<(Vec<ScoredArea>, FusionDiagnostics), FusionError> {
    let mut diagnostics = FusionDiagnostics::default();
    let mut scored = Vec::with_capacity(chunk.len());

    for merged in chunk {
        if cancel.is_cancelled() {
            return Err(FusionError::Cancelled);
        }
        let metrics = score_area(&merged, locator, &mut diagnostics);
        scored.push(ScoredArea { merged, metrics });
    }

    Ok((scored, diagnostics))
}

/// Scores every area on up to `workers` blocking tasks.
///
/// Output order matches input order.
///
/// # Errors
///
/// Returns [`FusionError::Cancelled`] if `cancel` is set before every
/// area is scored, or [`FusionError::Worker`] if a worker task fails.
pub async fn score_areas(
    areas: Vec<MergedArea>,
    locator: Arc<dyn ServiceLocator>,
    workers: usize,
    cancel: &CancelFlag,
) -> Result<(Vec<ScoredArea>, FusionDiagnostics), FusionError> {
    let total = areas.len();
    let chunk_size = total.div_ceil(workers.max(1)).max(1);

    let mut chunks: Vec<Vec<MergedArea>> = Vec::new();
    let mut remaining = areas.into_iter();
    loop {
        let chunk: Vec<MergedArea> = remaining.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }

    log::info!(
        "Scoring {total} areas against {} services on {} worker(s)",
        locator.len(),
        chunks.len()
    );

    let handles = chunks.into_iter().map(|chunk| {
        let locator = Arc::clone(&locator);
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || score_chunk(chunk, locator.as_ref(), &cancel))
    });

    let results = futures::future::try_join_all(handles).await?;

    let mut scored = Vec::with_capacity(total);
    let mut diagnostics = FusionDiagnostics::default();
    for result in results {
        let (chunk, chunk_diagnostics) = result?;
        scored.extend(chunk);
        diagnostics.absorb(&chunk_diagnostics);
    }

    if diagnostics.skipped_containment_checks > 0 {
        log::warn!(
            "Skipped {} containment checks on degenerate polygons",
            diagnostics.skipped_containment_checks
        );
    }

    Ok((scored, diagnostics))
}
