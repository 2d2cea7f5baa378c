//! Decoders for each source format.
//!
//! Point records without usable coordinates are dropped here and counted,
//! so everything handed on carries a latitude and longitude.

use geojson::{FeatureCollection, GeoJson};
use serde_json::{Map, Value};
use service_gap_fusion_models::{PointFeature, PointKind};

use crate::LoadError;
use crate::categorize::categorize;
use crate::parsing::record_lat_lng;

/// Decodes a `GeoJSON` `FeatureCollection` of area polygons.
///
/// # Errors
///
/// Returns [`LoadError::GeoJson`] if the document is not valid `GeoJSON`
/// or is not a `FeatureCollection`.
pub fn parse_areas(source_name: &str, bytes: &[u8]) -> Result<FeatureCollection, LoadError> {
    let geojson_error = |error: geojson::Error| LoadError::GeoJson {
        source_name: source_name.to_string(),
        error,
    };

    let text = String::from_utf8_lossy(bytes);
    let geojson = text.parse::<GeoJson>().map_err(geojson_error)?;
    let collection = FeatureCollection::try_from(geojson).map_err(geojson_error)?;

    log::info!("[{source_name}] Loaded {} area features", collection.features.len());
    Ok(collection)
}

/// Decodes a JSON array of service records.
///
/// Records carry `latitude`/`longitude` as numbers or numeric strings;
/// optional `name` and `description` drive categorization.
///
/// # Errors
///
/// Returns [`LoadError::Json`] if the document is not JSON, or
/// [`LoadError::Invalid`] if it is not an array of objects.
pub fn parse_services(source_name: &str, bytes: &[u8]) -> Result<Vec<PointFeature>, LoadError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|error| LoadError::Json {
        source_name: source_name.to_string(),
        error,
    })?;

    let Value::Array(items) = value else {
        return Err(LoadError::Invalid {
            source_name: source_name.to_string(),
            message: "expected a JSON array of service records".to_string(),
        });
    };

    let total = items.len();
    let mut services = Vec::with_capacity(total);
    for item in items {
        let record = match item {
            Value::Object(record) => record,
            other => {
                return Err(LoadError::Invalid {
                    source_name: source_name.to_string(),
                    message: format!("expected service records to be objects, got {other}"),
                });
            }
        };
        if let Some(service) = service_from_record(record) {
            services.push(service);
        }
    }

    log_dropped(source_name, "services", total, services.len());
    Ok(services)
}

fn service_from_record(record: Map<String, Value>) -> Option<PointFeature> {
    let (latitude, longitude) = record_lat_lng(&record, "latitude", "longitude")?;
    let name = text_field(&record, "name");
    let description = text_field(&record, "description");

    Some(PointFeature {
        latitude,
        longitude,
        kind: PointKind::HomelessService,
        category: Some(categorize(name.as_deref(), description.as_deref())),
        name,
        attributes: record,
    })
}

fn text_field(record: &Map<String, Value>, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Decodes a CSV file with a header row into one map per row.
///
/// Every cell stays text (trimmed) so codes such as postal codes keep
/// their leading zeros. Rows may be shorter than the header; missing
/// cells are omitted.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] if the CSV is malformed.
pub fn parse_csv_rows(
    source_name: &str,
    bytes: &[u8],
) -> Result<Vec<Map<String, Value>>, LoadError> {
    let csv_error = |error: csv::Error| LoadError::Csv {
        source_name: source_name.to_string(),
        error,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(row);
    }

    log::info!("[{source_name}] Loaded {} rows", rows.len());
    Ok(rows)
}

/// Decodes a GTFS-style `stops.txt` CSV (`stop_lat`, `stop_lon`).
///
/// # Errors
///
/// Returns [`LoadError::Csv`] if the CSV is malformed.
pub fn parse_transit_stops(
    source_name: &str,
    bytes: &[u8],
) -> Result<Vec<PointFeature>, LoadError> {
    let rows = parse_csv_rows(source_name, bytes)?;
    let total = rows.len();

    let stops: Vec<PointFeature> = rows
        .into_iter()
        .filter_map(|row| {
            let (latitude, longitude) = record_lat_lng(&row, "stop_lat", "stop_lon")?;
            Some(PointFeature {
                latitude,
                longitude,
                kind: PointKind::TransitStop,
                category: None,
                name: text_field(&row, "stop_name"),
                attributes: row,
            })
        })
        .collect();

    log_dropped(source_name, "transit stops", total, stops.len());
    Ok(stops)
}

fn log_dropped(source_name: &str, what: &str, total: usize, kept: usize) {
    let dropped = total - kept;
    if dropped > 0 {
        log::warn!(
            "[{source_name}] Dropped {dropped} of {total} {what} without usable coordinates"
        );
    }
    log::info!("[{source_name}] Loaded {kept} {what}");
}
