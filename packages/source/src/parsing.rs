//! Coordinate parsing shared by the point loaders.

use serde_json::Value;

/// Reads a coordinate from a number or numeric text.
#[must_use]
pub fn parse_coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Validates a lat/lng pair. Returns `None` if either is missing, not
/// finite, out of range, or zero (sources use 0 for "unknown").
#[must_use]
pub fn parse_lat_lng(lat: Option<f64>, lng: Option<f64>) -> Option<(f64, f64)> {
    let latitude = lat?;
    let longitude = lng?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some((latitude, longitude))
}

/// Reads and validates the lat/lng stored under `lat_field` and
/// `lng_field` of a record.
#[must_use]
pub fn record_lat_lng(
    record: &serde_json::Map<String, Value>,
    lat_field: &str,
    lng_field: &str,
) -> Option<(f64, f64)> {
    parse_lat_lng(
        record.get(lat_field).and_then(parse_coordinate),
        record.get(lng_field).and_then(parse_coordinate),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numbers_and_strings() {
        assert_eq!(parse_coordinate(&json!(32.7157)), Some(32.7157));
        assert_eq!(parse_coordinate(&json!(" -117.1611 ")), Some(-117.1611));
        assert_eq!(parse_coordinate(&json!("north")), None);
        assert_eq!(parse_coordinate(&Value::Null), None);
    }

    #[test]
    fn parses_lat_lng() {
        let (la, lo) = parse_lat_lng(Some(41.8781), Some(-87.6298)).unwrap();
        assert!((la - 41.8781).abs() < f64::EPSILON);
        assert!((lo - -87.6298).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_zero_lat_lng() {
        assert!(parse_lat_lng(Some(0.0), Some(-87.6298)).is_none());
    }

    #[test]
    fn rejects_missing_lat_lng() {
        assert!(parse_lat_lng(None, Some(-87.6298)).is_none());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(parse_lat_lng(Some(91.0), Some(10.0)).is_none());
        assert!(parse_lat_lng(Some(10.0), Some(-181.0)).is_none());
        assert!(parse_lat_lng(Some(f64::NAN), Some(10.0)).is_none());
    }

    #[test]
    fn reads_record_fields() {
        let record = json!({ "stop_lat": "32.71", "stop_lon": -117.16 });
        let (la, lo) = record_lat_lng(record.as_object().unwrap(), "stop_lat", "stop_lon").unwrap();
        assert!((la - 32.71).abs() < f64::EPSILON);
        assert!((lo - -117.16).abs() < f64::EPSILON);
    }
}
