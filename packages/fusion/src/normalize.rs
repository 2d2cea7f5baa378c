//! Normalizes raw demographic rows into [`DemographicRecord`] values.
//!
//! Uses the [`DemographicAliases`] table to find each canonical field
//! regardless of how the source names it. Rows are never rejected: a
//! field that is missing or not numeric is left absent and reads as 0.

use serde_json::{Map, Value};
use service_gap_fusion_models::DemographicRecord;

use crate::aliases::{DemographicAliases, DemographicField};
use crate::keys::{canonical_key, first_present};

/// Normalizes a list of raw rows.
#[must_use]
pub fn normalize_rows(
    rows: &[Map<String, Value>],
    aliases: &DemographicAliases,
) -> Vec<DemographicRecord> {
    let records: Vec<DemographicRecord> =
        rows.iter().map(|row| normalize_row(row, aliases)).collect();

    let keyless = records.iter().filter(|r| r.zip_code.is_empty()).count();
    if keyless > 0 {
        log::warn!("{keyless} of {} demographic rows have no postal code", rows.len());
    }

    records
}

/// Normalizes a single row.
#[must_use]
pub fn normalize_row(row: &Map<String, Value>, aliases: &DemographicAliases) -> DemographicRecord {
    let zip_code = first_present(row, &aliases.key)
        .and_then(canonical_key)
        .unwrap_or_default();

    let mut record = DemographicRecord::new(zip_code);

    for (field, names) in &aliases.fields {
        let value = first_present(row, names);
        match field {
            DemographicField::Population => record.population = value.and_then(coerce_count),
            DemographicField::PovertyPopulation => {
                record.poverty_population = value.and_then(coerce_count);
            }
            DemographicField::MedianIncome => record.median_income = value.and_then(coerce_amount),
            DemographicField::RenterPopulation => {
                record.renter_population = value.and_then(coerce_count);
            }
            DemographicField::MedianGrossRent => {
                record.median_gross_rent = value.and_then(coerce_amount);
            }
            DemographicField::VeteranPopulation => {
                record.veteran_population = value.and_then(coerce_count);
            }
            DemographicField::DisabilityPopulation => {
                record.disability_population = value.and_then(coerce_count);
            }
            DemographicField::SeniorPopulation => {
                record.senior_population = value.and_then(coerce_count);
            }
            DemographicField::YouthPopulation => {
                record.youth_population = value.and_then(coerce_count);
            }
        }
    }

    record
}

/// Reads a non-negative finite amount from a number or numeric text.
///
/// Thousands separators are ignored (`"1,234"` is 1234). Anything else
/// is treated as absent.
#[must_use]
pub fn coerce_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }?;

    if amount.is_finite() && amount >= 0.0 {
        Some(amount)
    } else {
        log::debug!("Ignoring out-of-range demographic value {value}");
        None
    }
}

/// Reads a non-negative count, rounding fractional values.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn coerce_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    coerce_amount(value).map(|amount| amount.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aliases::FieldAliases;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn aliases() -> DemographicAliases {
        FieldAliases::default().demographics
    }

    #[test]
    fn normalizes_census_row() {
        let record = normalize_row(
            &row(json!({
                "Zip Code": "92101",
                "Population": "10000",
                "Population in Poverty": "3000",
                "Median Income": "65,000",
                "Renter Population": "7500",
                "Median Gross Rent": "2100",
                "Veteran Population": "800",
                "Population with Disability": "1200",
                "Senior Population (60y+)": "1500",
                "Youth Population": "900"
            })),
            &aliases(),
        );

        assert_eq!(record.zip_code, "92101");
        assert_eq!(record.population, Some(10_000));
        assert_eq!(record.poverty_population, Some(3_000));
        assert_eq!(record.median_income, Some(65_000.0));
        assert_eq!(record.median_gross_rent, Some(2_100.0));
        assert_eq!(record.youth_population, Some(900));
        assert!((record.poverty_rate() - 30.0).abs() < 1e-9);
        assert!((record.renter_rate() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn numeric_zip_has_no_decimal_artifacts() {
        let record = normalize_row(&row(json!({ "Zip Code": 92101.0 })), &aliases());
        assert_eq!(record.zip_code, "92101");
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let record = normalize_row(&row(json!({ "Zip Code": "92101" })), &aliases());
        assert_eq!(record.population, None);
        assert_eq!(record.population(), 0);
        assert!(record.poverty_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn textual_values_are_absent_not_errors() {
        let record = normalize_row(
            &row(json!({ "Zip Code": "92101", "Population": "n/a", "Median Income": "-" })),
            &aliases(),
        );
        assert_eq!(record.population, None);
        assert_eq!(record.median_income, None);
    }

    #[test]
    fn zero_population_guards_ratios() {
        let record = normalize_row(
            &row(json!({ "Zip Code": "92101", "Population": 0, "Population in Poverty": 50 })),
            &aliases(),
        );
        assert_eq!(record.population, Some(0));
        assert!(record.poverty_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn first_alias_wins() {
        let record = normalize_row(
            &row(json!({ "Zip Code": "92101", "Population": 10, "population": 20 })),
            &aliases(),
        );
        assert_eq!(record.population, Some(10));
    }

    #[test]
    fn falls_back_to_later_alias() {
        let record = normalize_row(
            &row(json!({ "Zip Code": "92101", "Population": "", "population": 20 })),
            &aliases(),
        );
        assert_eq!(record.population, Some(20));
    }

    #[test]
    fn coerces_counts() {
        assert_eq!(coerce_count(&json!(12)), Some(12));
        assert_eq!(coerce_count(&json!("12.6")), Some(13));
        assert_eq!(coerce_count(&json!("1,234")), Some(1_234));
        assert_eq!(coerce_count(&json!(-4)), None);
        assert_eq!(coerce_count(&json!(true)), None);
    }

    #[test]
    fn keyless_rows_are_kept() {
        let records = normalize_rows(
            &[row(json!({ "Population": 5 })), row(json!({ "Zip Code": "92102" }))],
            &aliases(),
        );
        assert_eq!(records.len(), 2);
        assert!(records[0].zip_code.is_empty());
    }
}
