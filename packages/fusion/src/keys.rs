//! Canonical area keys.
//!
//! Polygon properties and demographic rows name and type their postal
//! code differently (`zip` as a number, `"ZIPCODE"` as text, `"Zip Code"`
//! parsed from CSV). Both sides are reduced to the same string form here
//! so the merge is a plain string-equality lookup.

use serde_json::{Map, Value};

/// Returns the first value among `names` that is present on `record`.
///
/// Present means the field exists, is not `null`, and is not a blank
/// string.
#[must_use]
pub fn first_present<'a>(record: &'a Map<String, Value>, names: &[String]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| record.get(name))
        .find(|value| match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
}

/// Converts a key value to its canonical string form.
///
/// Text is trimmed and kept verbatim, so leading zeros survive. Integral
/// numbers are printed without a fractional part (`92101.0` becomes
/// `"92101"`). Booleans, arrays, objects, and blank text have no key.
#[must_use]
pub fn canonical_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                Some(i.to_string())
            } else if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().filter(|f| f.is_finite()).map(|f| {
                    if f.fract().abs() < f64::EPSILON && f.abs() < 1e15 {
                        format!("{f:.0}")
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Resolves an area key from polygon properties by probing `names` in
/// order. Returns `None` when no candidate yields a usable key; such an
/// area stays in the dataset unmatched.
#[must_use]
pub fn resolve_area_key(properties: &Map<String, Value>, names: &[String]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| properties.get(name))
        .find_map(canonical_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn props(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn keeps_leading_zeros() {
        assert_eq!(canonical_key(&json!("02134")), Some("02134".to_string()));
        assert_eq!(canonical_key(&json!(" 02134 ")), Some("02134".to_string()));
    }

    #[test]
    fn integral_floats_lose_decimal_artifacts() {
        assert_eq!(canonical_key(&json!(92101.0)), Some("92101".to_string()));
        assert_eq!(canonical_key(&json!(92101)), Some("92101".to_string()));
    }

    #[test]
    fn non_scalar_values_have_no_key() {
        assert_eq!(canonical_key(&json!(null)), None);
        assert_eq!(canonical_key(&json!(true)), None);
        assert_eq!(canonical_key(&json!("   ")), None);
        assert_eq!(canonical_key(&json!([92101])), None);
    }

    #[test]
    fn tries_aliases_in_order() {
        let aliases = names(&["zip", "ZIP", "ZIPCODE", "zipcode"]);
        let properties = props(json!({ "zipcode": "92102", "ZIP": 92101 }));
        assert_eq!(
            resolve_area_key(&properties, &aliases),
            Some("92101".to_string())
        );
    }

    #[test]
    fn skips_empty_candidates() {
        let aliases = names(&["zip", "ZIP", "ZIPCODE", "zipcode"]);
        let properties = props(json!({ "zip": "", "ZIP": null, "ZIPCODE": "92103" }));
        assert_eq!(
            resolve_area_key(&properties, &aliases),
            Some("92103".to_string())
        );
    }

    #[test]
    fn unresolvable_key_is_none() {
        let aliases = names(&["zip", "ZIP"]);
        let properties = props(json!({ "name": "Downtown" }));
        assert_eq!(resolve_area_key(&properties, &aliases), None);
    }

    #[test]
    fn first_present_ignores_blank_text() {
        let record = props(json!({ "a": "  ", "b": 0 }));
        assert_eq!(first_present(&record, &names(&["a", "b"])), Some(&json!(0)));
    }
}
