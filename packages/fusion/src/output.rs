//! Builds the output `GeoJSON` collection.
//!
//! Each input feature is emitted unchanged except for its property bag,
//! which gains the demographic profile (when matched), the resolved
//! `zipCode`, `serviceCount`, `nearestServiceDistance`, and
//! `serviceGapScore`. Demographic fields overwrite same-named source
//! properties.

use geojson::{Bbox, Feature, FeatureCollection, JsonObject};
use serde_json::{Map, Value, json};
use service_gap_fusion_models::DemographicRecord;

use crate::pipeline::ScoredArea;

/// Inserts the demographic profile of `record` into `properties`.
/// Absent values are written as 0.
pub fn overlay_demographics(properties: &mut Map<String, Value>, record: &DemographicRecord) {
    let fields = [
        ("population", json!(record.population())),
        ("povertyPopulation", json!(record.poverty_population())),
        ("povertyRate", json!(record.poverty_rate())),
        ("medianIncome", json!(record.median_income.unwrap_or(0.0))),
        ("renterPopulation", json!(record.renter_population.unwrap_or(0))),
        ("renterRate", json!(record.renter_rate())),
        ("housingBurden", json!(record.median_gross_rent.unwrap_or(0.0))),
        ("veteranPopulation", json!(record.veteran_population.unwrap_or(0))),
        (
            "disabilityPopulation",
            json!(record.disability_population.unwrap_or(0)),
        ),
        ("seniorPopulation", json!(record.senior_population.unwrap_or(0))),
        ("youthPopulation", json!(record.youth_population.unwrap_or(0))),
    ];

    for (name, value) in fields {
        properties.insert(name.to_string(), value);
    }
}

/// Returns the output feature for one scored area.
#[must_use]
pub fn scored_feature(scored: &ScoredArea) -> Feature {
    let mut feature = scored.merged.area.feature.clone();
    let mut properties = feature.properties.take().unwrap_or_default();

    if let Some(record) = &scored.merged.demographics {
        overlay_demographics(&mut properties, record);
    }
    if let Some(key) = scored.key() {
        properties.insert("zipCode".to_string(), json!(key));
    }

    let metrics = &scored.metrics;
    properties.insert("serviceCount".to_string(), json!(metrics.service_count));
    properties.insert(
        "nearestServiceDistance".to_string(),
        metrics.nearest_service_distance.map_or(Value::Null, |d| json!(d)),
    );
    properties.insert(
        "serviceGapScore".to_string(),
        json!(metrics.service_gap_score),
    );

    feature.properties = Some(properties);
    feature
}

/// Assembles the scored collection, keeping the input collection's
/// `bbox` and foreign members.
#[must_use]
pub fn scored_collection(
    scored: &[ScoredArea],
    bbox: Option<Bbox>,
    foreign_members: Option<JsonObject>,
) -> FeatureCollection {
    FeatureCollection {
        bbox,
        features: scored.iter().map(scored_feature).collect(),
        foreign_members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aliases::FieldAliases;
    use crate::merge::test_support::square_feature;
    use crate::merge::{Area, MergedArea};
    use service_gap_fusion_models::AreaMetrics;

    fn scored(properties: Value, demographics: Option<DemographicRecord>) -> ScoredArea {
        ScoredArea {
            merged: MergedArea {
                area: Area::from_feature(
                    square_feature(-117.16, 32.72, 0.05, properties),
                    &FieldAliases::default().area,
                ),
                demographics,
            },
            metrics: AreaMetrics {
                service_count: 2,
                nearest_service_distance: None,
                service_gap_score: 42.0,
            },
        }
    }

    #[test]
    fn demographic_fields_take_precedence() {
        let mut record = DemographicRecord::new("92101");
        record.population = Some(10_000);
        let feature = scored_feature(&scored(
            json!({ "zip": 92101, "population": "stale", "name": "Downtown" }),
            Some(record),
        ));
        let props = feature.properties.unwrap();
        assert_eq!(props["population"], json!(10_000));
        assert_eq!(props["name"], json!("Downtown"));
        assert_eq!(props["zipCode"], json!("92101"));
        assert_eq!(props["medianIncome"], json!(0.0));
    }

    #[test]
    fn metrics_always_present() {
        let feature = scored_feature(&scored(json!({ "zip": "92101" }), None));
        let props = feature.properties.unwrap();
        assert_eq!(props["serviceCount"], json!(2));
        assert_eq!(props["nearestServiceDistance"], Value::Null);
        assert_eq!(props["serviceGapScore"], json!(42.0));
        assert!(!props.contains_key("population"));
    }

    #[test]
    fn keyless_area_has_no_zip_code() {
        let feature = scored_feature(&scored(json!({ "name": "unknown" }), None));
        assert!(!feature.properties.unwrap().contains_key("zipCode"));
    }

    #[test]
    fn geometry_is_preserved() {
        let area = scored(json!({ "zip": "92101" }), None);
        let feature = scored_feature(&area);
        assert_eq!(feature.geometry, area.merged.area.feature.geometry);
    }
}
