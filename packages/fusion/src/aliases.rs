//! Field-alias table: which source field names feed each canonical field.
//!
//! The default table is embedded at compile time from
//! `fields/aliases.toml`. A replacement table with the same shape can be
//! loaded from disk. Each canonical field maps to an ordered list of
//! accepted names; probing stops at the first name present on a record.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::FusionError;

const DEFAULT_ALIASES: &str = include_str!("../fields/aliases.toml");

/// Numeric demographic fields resolved through the alias table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DemographicField {
    /// Total population.
    Population,
    /// Population below the poverty line.
    PovertyPopulation,
    /// Median household income.
    MedianIncome,
    /// Renter population.
    RenterPopulation,
    /// Median gross rent.
    MedianGrossRent,
    /// Veteran population.
    VeteranPopulation,
    /// Population with a disability.
    DisabilityPopulation,
    /// Population aged 60 and over.
    SeniorPopulation,
    /// Youth population.
    YouthPopulation,
}

impl DemographicField {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Population,
            Self::PovertyPopulation,
            Self::MedianIncome,
            Self::RenterPopulation,
            Self::MedianGrossRent,
            Self::VeteranPopulation,
            Self::DisabilityPopulation,
            Self::SeniorPopulation,
            Self::YouthPopulation,
        ]
    }
}

/// Accepted key names on polygon properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AreaAliases {
    /// Candidate key fields, in lookup order.
    pub key: Vec<String>,
}

/// Accepted names for the demographic key and each numeric field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicAliases {
    /// Candidate postal-code fields, in lookup order.
    pub key: Vec<String>,
    /// Candidate names per numeric field, in lookup order.
    #[serde(flatten)]
    pub fields: BTreeMap<DemographicField, Vec<String>>,
}

/// The complete alias table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldAliases {
    /// Polygon property aliases.
    pub area: AreaAliases,
    /// Demographic row aliases.
    pub demographics: DemographicAliases,
}

impl FieldAliases {
    /// Parses and validates an alias table.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::Aliases`] if the TOML does not match the
    /// table shape, or [`FusionError::InvalidAliases`] if a canonical
    /// field has no accepted name.
    pub fn from_toml(toml_str: &str) -> Result<Self, FusionError> {
        let aliases: Self = toml::from_str(toml_str)?;
        aliases.validate()?;
        Ok(aliases)
    }

    /// Reads an alias table from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::Io`] if the file cannot be read, otherwise
    /// the errors of [`Self::from_toml`].
    pub fn from_path(path: &Path) -> Result<Self, FusionError> {
        let contents = std::fs::read_to_string(path)?;
        log::info!("Loaded field aliases from {}", path.display());
        Self::from_toml(&contents)
    }

    fn validate(&self) -> Result<(), FusionError> {
        let empty = |names: &[String]| names.iter().all(|n| n.trim().is_empty());

        if empty(&self.area.key) {
            return Err(FusionError::InvalidAliases {
                message: "area.key has no accepted names".to_string(),
            });
        }
        if empty(&self.demographics.key) {
            return Err(FusionError::InvalidAliases {
                message: "demographics.key has no accepted names".to_string(),
            });
        }
        for field in DemographicField::all() {
            if self.demographics.fields.get(field).is_none_or(|names| empty(names)) {
                return Err(FusionError::InvalidAliases {
                    message: format!("demographics.{field} has no accepted names"),
                });
            }
        }
        Ok(())
    }
}

impl Default for FieldAliases {
    /// Returns the embedded alias table.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. It is a compile-time
    /// constant, so a failure is a development error caught by tests.
    fn default() -> Self {
        Self::from_toml(DEFAULT_ALIASES)
            .unwrap_or_else(|e| panic!("Failed to parse embedded field aliases: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_covers_every_field() {
        let aliases = FieldAliases::default();
        for field in DemographicField::all() {
            let names = aliases.demographics.fields.get(field);
            assert!(
                names.is_some_and(|n| !n.is_empty()),
                "No aliases for demographic field {field}"
            );
        }
    }

    #[test]
    fn embedded_area_key_lookup_order() {
        let aliases = FieldAliases::default();
        assert_eq!(aliases.area.key, vec!["zip", "ZIP", "ZIPCODE", "zipcode"]);
        assert_eq!(aliases.demographics.key, vec!["Zip Code"]);
    }

    #[test]
    fn rejects_missing_field() {
        let toml_str = r#"
            [area]
            key = ["zip"]

            [demographics]
            key = ["Zip Code"]
            population = ["Population"]
        "#;
        let err = FieldAliases::from_toml(toml_str).unwrap_err();
        assert!(matches!(err, FusionError::InvalidAliases { .. }), "{err}");
    }

    #[test]
    fn rejects_blank_area_key() {
        let mut toml_str = DEFAULT_ALIASES.replace(
            r#"key = ["zip", "ZIP", "ZIPCODE", "zipcode"]"#,
            r#"key = [" "]"#,
        );
        toml_str.push('\n');
        let err = FieldAliases::from_toml(&toml_str).unwrap_err();
        assert!(err.to_string().contains("area.key"), "{err}");
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = FieldAliases::from_toml("[area\nkey = 1").unwrap_err();
        assert!(matches!(err, FusionError::Aliases(_)));
    }
}
