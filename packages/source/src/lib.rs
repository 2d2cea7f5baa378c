#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Input loading for the service gap pipeline.
//!
//! Four sources feed a run: area polygons (`GeoJSON`), service records
//! (JSON), transit stops (CSV), and demographic rows (CSV). Each may be
//! a local path or an HTTP(S) URL. [`load_all`] reads them concurrently
//! and fails on the first error.

pub mod categorize;
pub mod fetch;
pub mod parsing;
pub mod records;

use std::time::Duration;

use geojson::FeatureCollection;
use serde_json::{Map, Value};
use service_gap_fusion_models::PointFeature;

/// Default time limit for fetching one remote source.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur while loading a source. Every variant names the
/// source that failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// I/O error reading a local file.
    #[error("[{source_name}] I/O error: {error}")]
    Io {
        /// Which source failed.
        source_name: String,
        /// Underlying error.
        #[source]
        error: std::io::Error,
    },

    /// HTTP request failed or returned an error status.
    #[error("[{source_name}] HTTP request failed: {error}")]
    Http {
        /// Which source failed.
        source_name: String,
        /// Underlying error.
        #[source]
        error: reqwest::Error,
    },

    /// JSON parsing failed.
    #[error("[{source_name}] JSON parse error: {error}")]
    Json {
        /// Which source failed.
        source_name: String,
        /// Underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// CSV parsing failed.
    #[error("[{source_name}] CSV parse error: {error}")]
    Csv {
        /// Which source failed.
        source_name: String,
        /// Underlying error.
        #[source]
        error: csv::Error,
    },

    /// `GeoJSON` parsing failed.
    #[error("[{source_name}] GeoJSON parse error: {error}")]
    GeoJson {
        /// Which source failed.
        source_name: String,
        /// Underlying error.
        #[source]
        error: geojson::Error,
    },

    /// A remote source did not respond in time.
    #[error("[{source_name}] Timed out after {seconds}s")]
    Timeout {
        /// Which source failed.
        source_name: String,
        /// The limit that was exceeded.
        seconds: u64,
    },

    /// The document parsed but has the wrong shape.
    #[error("[{source_name}] Invalid data: {message}")]
    Invalid {
        /// Which source failed.
        source_name: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// Where each source lives: a file path or an HTTP(S) URL.
#[derive(Debug, Clone)]
pub struct SourceLocations {
    /// Area polygons.
    pub zipcodes: String,
    /// Service records.
    pub services: String,
    /// Transit stops.
    pub transit_stops: String,
    /// Demographic rows.
    pub demographics: String,
}

/// Everything loaded for one run.
#[derive(Debug, Clone)]
pub struct LoadedSources {
    /// Area polygons.
    pub areas: FeatureCollection,
    /// Service points, categorized.
    pub services: Vec<PointFeature>,
    /// Transit stop points.
    pub transit_stops: Vec<PointFeature>,
    /// Demographic rows with every cell as text.
    pub demographics: Vec<Map<String, Value>>,
}

/// Loads the area polygons.
///
/// # Errors
///
/// Returns [`LoadError`] if the source cannot be read or decoded.
pub async fn load_areas(location: &str, timeout: Duration) -> Result<FeatureCollection, LoadError> {
    let bytes = fetch::read_location("zipcodes", location, timeout).await?;
    records::parse_areas("zipcodes", &bytes)
}

/// Loads and categorizes the service records.
///
/// # Errors
///
/// Returns [`LoadError`] if the source cannot be read or decoded.
pub async fn load_services(
    location: &str,
    timeout: Duration,
) -> Result<Vec<PointFeature>, LoadError> {
    let bytes = fetch::read_location("services", location, timeout).await?;
    records::parse_services("services", &bytes)
}

/// Loads the transit stops.
///
/// # Errors
///
/// Returns [`LoadError`] if the source cannot be read or decoded.
pub async fn load_transit_stops(
    location: &str,
    timeout: Duration,
) -> Result<Vec<PointFeature>, LoadError> {
    let bytes = fetch::read_location("transit_stops", location, timeout).await?;
    records::parse_transit_stops("transit_stops", &bytes)
}

/// Loads the demographic rows.
///
/// # Errors
///
/// Returns [`LoadError`] if the source cannot be read or decoded.
pub async fn load_demographics(
    location: &str,
    timeout: Duration,
) -> Result<Vec<Map<String, Value>>, LoadError> {
    let bytes = fetch::read_location("demographics", location, timeout).await?;
    records::parse_csv_rows("demographics", &bytes)
}

/// Loads all four sources concurrently.
///
/// # Errors
///
/// Returns the first [`LoadError`] raised by any source; the remaining
/// loads are dropped.
pub async fn load_all(
    locations: &SourceLocations,
    timeout: Duration,
) -> Result<LoadedSources, LoadError> {
    log::info!("Loading sources");

    let (areas, services, transit_stops, demographics) = tokio::try_join!(
        load_areas(&locations.zipcodes, timeout),
        load_services(&locations.services, timeout),
        load_transit_stops(&locations.transit_stops, timeout),
        load_demographics(&locations.demographics, timeout),
    )?;

    log::info!(
        "Loaded {} areas, {} services, {} transit stops, {} demographic rows",
        areas.features.len(),
        services.len(),
        transit_stops.len(),
        demographics.len()
    );

    Ok(LoadedSources {
        areas,
        services,
        transit_stops,
        demographics,
    })
}
