//! Joins area polygons to demographic records by canonical key.
//!
//! Records are indexed once into a hash map, so each area costs a single
//! lookup. When several rows share a key the first one is kept and the
//! rest are counted as duplicates.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use geojson::{Feature, FeatureCollection};
use service_gap_fusion_models::{DemographicRecord, FusionDiagnostics};
use service_gap_spatial::AreaShape;

use crate::aliases::AreaAliases;
use crate::keys::resolve_area_key;

/// An input polygon with its key and geometry resolved.
#[derive(Debug, Clone)]
pub struct Area {
    /// The source feature, untouched.
    pub feature: Feature,
    /// Canonical key, `None` when no alias yielded one.
    pub key: Option<String>,
    /// Evaluable geometry, `None` when the feature has no polygon.
    pub shape: Option<AreaShape>,
}

impl Area {
    /// Resolves the key and geometry of `feature`.
    #[must_use]
    pub fn from_feature(feature: Feature, aliases: &AreaAliases) -> Self {
        let key = feature
            .properties
            .as_ref()
            .and_then(|props| resolve_area_key(props, &aliases.key));
        let shape = feature.geometry.as_ref().and_then(AreaShape::from_geojson);

        Self {
            feature,
            key,
            shape,
        }
    }

    /// Whether the area must take the reserved score instead of being
    /// evaluated: it has no key or no usable geometry.
    #[must_use]
    pub const fn is_unverifiable(&self) -> bool {
        self.key.is_none() || self.shape.is_none()
    }
}

/// Resolves every feature of a collection into an [`Area`].
#[must_use]
pub fn areas_from_collection(collection: FeatureCollection, aliases: &AreaAliases) -> Vec<Area> {
    let areas: Vec<Area> = collection
        .features
        .into_iter()
        .map(|feature| Area::from_feature(feature, aliases))
        .collect();

    let keyless = areas.iter().filter(|a| a.key.is_none()).count();
    let shapeless = areas.iter().filter(|a| a.shape.is_none()).count();
    log::info!(
        "Resolved {} areas ({keyless} without a key, {shapeless} without usable geometry)",
        areas.len()
    );

    areas
}

/// An [`Area`] after the demographic join.
#[derive(Debug, Clone)]
pub struct MergedArea {
    /// The resolved area.
    pub area: Area,
    /// The matched demographic record, if any.
    pub demographics: Option<DemographicRecord>,
}

/// Demographic records indexed by canonical key.
#[derive(Debug, Clone, Default)]
pub struct DemographicIndex {
    by_key: HashMap<String, DemographicRecord>,
    duplicates: u64,
}

impl DemographicIndex {
    /// Indexes `records`, keeping the first record per key. Records with
    /// an empty key are not indexed.
    #[must_use]
    pub fn build(records: Vec<DemographicRecord>) -> Self {
        let mut by_key = HashMap::with_capacity(records.len());
        let mut duplicates = 0u64;

        for record in records {
            if record.zip_code.is_empty() {
                continue;
            }
            match by_key.entry(record.zip_code.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(existing) => {
                    log::debug!("Duplicate demographic row for {}; keeping first", existing.key());
                    duplicates += 1;
                }
            }
        }

        if duplicates > 0 {
            log::warn!("{duplicates} duplicate demographic rows ignored");
        }

        Self { by_key, duplicates }
    }

    /// Looks up the record for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DemographicRecord> {
        self.by_key.get(key)
    }

    /// Number of distinct keys indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether no records are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Rows ignored because their key was already indexed.
    #[must_use]
    pub const fn duplicates(&self) -> u64 {
        self.duplicates
    }
}

/// Joins each area to at most one demographic record.
///
/// Every input area appears in the output, in input order. Areas whose
/// key is missing or unmatched keep `demographics: None`.
#[must_use]
pub fn merge_areas(
    areas: Vec<Area>,
    index: &DemographicIndex,
) -> (Vec<MergedArea>, FusionDiagnostics) {
    let mut diagnostics = FusionDiagnostics {
        duplicate_demographic_keys: index.duplicates(),
        ..FusionDiagnostics::default()
    };

    let merged: Vec<MergedArea> = areas
        .into_iter()
        .map(|area| {
            let demographics = area.key.as_deref().and_then(|key| index.get(key)).cloned();
            match (&area.key, &demographics) {
                (Some(_), Some(_)) => diagnostics.matched_areas += 1,
                (Some(_), None) => diagnostics.unmatched_areas += 1,
                (None, _) => {}
            }
            MergedArea { area, demographics }
        })
        .collect();

    log::info!(
        "Merged demographics: {} matched, {} unmatched, {} keyless",
        diagnostics.matched_areas,
        diagnostics.unmatched_areas,
        merged.iter().filter(|m| m.area.key.is_none()).count()
    );

    (merged, diagnostics)
}
