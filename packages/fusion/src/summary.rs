//! Region-wide rollups over a scored run.

use std::collections::BTreeMap;

use service_gap_fusion_models::{
    GapTier, PointFeature, RankedArea, RegionSummary, ServiceCategory, percentage,
};

use crate::pipeline::ScoredArea;

/// Summarizes a scored run.
///
/// Population, poverty, mean score, and the highest-gap key only consider
/// areas with population above zero. Tier counts cover every area. The
/// ranking keeps the `top_n` keyed areas by descending score; equal
/// scores keep input order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(
    scored: &[ScoredArea],
    services: &[PointFeature],
    transit_stops: usize,
    top_n: usize,
) -> RegionSummary {
    let mut total_population = 0u64;
    let mut total_poverty = 0u64;
    let mut score_sum = 0.0;
    let mut populated = 0u64;
    let mut highest: Option<(&str, f64)> = None;

    for area in scored {
        let Some(record) = &area.merged.demographics else {
            continue;
        };
        if record.population() == 0 {
            continue;
        }

        total_population = total_population.saturating_add(record.population());
        total_poverty = total_poverty.saturating_add(record.poverty_population());
        score_sum += area.metrics.service_gap_score;
        populated += 1;

        if let Some(key) = area.key()
            && highest.is_none_or(|(_, best)| area.metrics.service_gap_score > best)
        {
            highest = Some((key, area.metrics.service_gap_score));
        }
    }

    let mut areas_by_tier: BTreeMap<GapTier, u64> = BTreeMap::new();
    for area in scored {
        *areas_by_tier.entry(area.metrics.tier()).or_default() += 1;
    }

    let mut services_by_category: BTreeMap<ServiceCategory, u64> = BTreeMap::new();
    for service in services {
        let category = service.category.unwrap_or(ServiceCategory::Other);
        *services_by_category.entry(category).or_default() += 1;
    }

    RegionSummary {
        total_population,
        average_poverty_rate: percentage(total_poverty, total_population),
        average_service_gap: if populated == 0 {
            0.0
        } else {
            score_sum / populated as f64
        },
        highest_gap_zip_code: highest.map(|(key, _)| key.to_string()),
        total_services: services.len() as u64,
        total_transit_stops: transit_stops as u64,
        services_by_category,
        areas_by_tier,
        top_gaps: top_gaps(scored, top_n),
    }
}

/// The `top_n` keyed areas by descending score, ties in input order.
#[must_use]
pub fn top_gaps(scored: &[ScoredArea], top_n: usize) -> Vec<RankedArea> {
    let mut keyed: Vec<&ScoredArea> = scored.iter().filter(|a| a.key().is_some()).collect();
    keyed.sort_by(|a, b| {
        b.metrics
            .service_gap_score
            .total_cmp(&a.metrics.service_gap_score)
    });

    keyed
        .into_iter()
        .take(top_n)
        .filter_map(|area| {
            let demographics = area.merged.demographics.as_ref();
            Some(RankedArea {
                zip_code: area.key()?.to_string(),
                service_gap_score: area.metrics.service_gap_score,
                poverty_rate: demographics.map_or(0.0, |d| d.poverty_rate()),
                population: demographics.map_or(0, |d| d.population()),
                service_count: area.metrics.service_count,
            })
        })
        .collect()
}
