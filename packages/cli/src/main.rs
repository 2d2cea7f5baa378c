#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Runs the service gap pipeline end to end.
//!
//! ```text
//! service_gap --zipcodes data/zipcodes.geojson \
//!     --services data/services.json \
//!     --transit-stops data/stops.txt \
//!     --demographics data/acs.csv \
//!     --output data/generated/service_gaps.geojson
//! ```
//!
//! Each input may be a path or an HTTP(S) URL. Ctrl-C cancels the run
//! without writing any output. Set `RUST_LOG=info` to follow progress.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use geojson::FeatureCollection;
use service_gap_fusion::aliases::FieldAliases;
use service_gap_fusion::pipeline::CancelFlag;
use service_gap_fusion::{DEFAULT_TOP_N, FusionConfig, FusionError, FusionInput, fuse};
use service_gap_fusion_models::{GapTier, RegionSummary};
use service_gap_source::{SourceLocations, load_all};
use service_gap_spatial::LocatorKind;

#[derive(Parser)]
#[command(
    name = "service_gap",
    about = "Score unmet service need per area from polygons, demographics, and service locations"
)]
struct Cli {
    /// Area polygons (`GeoJSON` `FeatureCollection`)
    #[arg(long)]
    zipcodes: String,

    /// Service records (JSON array with latitude/longitude)
    #[arg(long)]
    services: String,

    /// Transit stops (CSV with `stop_lat`/`stop_lon`)
    #[arg(long)]
    transit_stops: String,

    /// Demographic rows (CSV)
    #[arg(long)]
    demographics: String,

    /// Where to write the scored `GeoJSON`
    #[arg(long, default_value = "data/generated/service_gaps.geojson")]
    output: PathBuf,

    /// Replacement field-alias table (TOML)
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Scoring workers (defaults to available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Spatial strategy: `linear` or `rtree`
    #[arg(long, default_value = "rtree")]
    locator: LocatorKind,

    /// Timeout in seconds for each remote source
    #[arg(long, default_value = "60")]
    load_timeout_secs: u64,

    /// Number of areas to list in the ranking
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = FusionConfig {
        locator: cli.locator,
        top_n: cli.top,
        ..FusionConfig::default()
    };
    if let Some(workers) = cli.workers {
        config.workers = workers.max(1);
    }
    if let Some(path) = &cli.aliases {
        log::info!("Using field aliases from {}", path.display());
        config.aliases = FieldAliases::from_path(path)?;
    }

    let cancel = CancelFlag::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted; cancelling run");
                cancel.cancel();
            }
        })
    };

    let locations = SourceLocations {
        zipcodes: cli.zipcodes,
        services: cli.services,
        transit_stops: cli.transit_stops,
        demographics: cli.demographics,
    };
    let timeout = Duration::from_secs(cli.load_timeout_secs);
    let loaded = tokio::select! {
        result = load_all(&locations, timeout) => result?,
        () = cancel.cancelled() => return Err(FusionError::Cancelled.into()),
    };

    let input = FusionInput {
        areas: loaded.areas,
        demographics: loaded.demographics,
        services: loaded.services,
        transit_stops: loaded.transit_stops,
    };
    let result = fuse(input, &config, &cancel).await;
    watcher.abort();
    let output = result?;

    write_collection(&cli.output, &output.collection)?;
    log::info!("Wrote {}", cli.output.display());

    print_summary(&output.summary);
    Ok(())
}

fn write_collection(
    path: &Path,
    collection: &FeatureCollection,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string(collection)?)?;
    Ok(())
}

fn print_summary(summary: &RegionSummary) {
    println!("Region summary");
    println!("{}", "-".repeat(60));
    println!("{:<28} {}", "Total population", summary.total_population);
    println!(
        "{:<28} {:.1}%",
        "Aggregate poverty rate", summary.average_poverty_rate
    );
    println!(
        "{:<28} {:.1}",
        "Average service gap", summary.average_service_gap
    );
    println!(
        "{:<28} {}",
        "Highest gap area",
        summary.highest_gap_zip_code.as_deref().unwrap_or("-")
    );
    println!("{:<28} {}", "Services", summary.total_services);
    println!("{:<28} {}", "Transit stops", summary.total_transit_stops);

    if !summary.services_by_category.is_empty() {
        println!();
        println!("{:<28} COUNT", "CATEGORY");
        for (category, count) in &summary.services_by_category {
            println!("{category:<28} {count}");
        }
    }

    println!();
    println!("{:<28} AREAS", "TIER");
    for tier in [
        GapTier::High,
        GapTier::MediumHigh,
        GapTier::Medium,
        GapTier::LowMedium,
        GapTier::Low,
    ] {
        let count = summary.areas_by_tier.get(&tier).copied().unwrap_or(0);
        println!("{tier:<28} {count}");
    }

    if summary.top_gaps.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<10} {:>8} {:>9} {:>11} {:>9}",
        "ZIP", "SCORE", "POVERTY", "POPULATION", "SERVICES"
    );
    println!("{}", "-".repeat(51));
    for area in &summary.top_gaps {
        println!(
            "{:<10} {:>8.1} {:>8.1}% {:>11} {:>9}",
            area.zip_code,
            area.service_gap_score,
            area.poverty_rate,
            area.population,
            area.service_count
        );
    }
}
