#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Point attribution and nearest-point lookups for area polygons.
//!
//! A [`ServiceLocator`] answers the two spatial questions asked for every
//! area: how many services lie inside it, and how far its centroid is
//! from the closest service anywhere. Two implementations are provided:
//! [`LinearScanLocator`], which tests every point, and [`RTreeLocator`],
//! which prunes candidates with an R-tree. Both return identical results.

pub mod distance;
pub mod index;
pub mod linear;
pub mod shape;

use service_gap_fusion_models::PointFeature;
use strum_macros::{AsRefStr, Display, EnumString};

pub use index::RTreeLocator;
pub use linear::LinearScanLocator;
pub use shape::{AreaShape, ShapeCentroid};

/// Result of attributing points to one area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Containment {
    /// Points strictly inside the area.
    pub count: u32,
    /// Point/member pairs not evaluated because the member polygon is
    /// degenerate.
    pub skipped: u64,
}

/// Spatial queries against a fixed, immutable set of points.
///
/// Implementations must be shareable across worker threads.
pub trait ServiceLocator: Send + Sync {
    /// Counts the points inside `shape`.
    fn count_within(&self, shape: &AreaShape) -> Containment;

    /// Great-circle miles from `(lng, lat)` to the closest point, or
    /// `None` when the point set is empty.
    fn nearest_miles(&self, lng: f64, lat: f64) -> Option<f64>;

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Whether no points are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which [`ServiceLocator`] implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LocatorKind {
    /// Test every point for every area.
    Linear,
    /// Prune candidates with an R-tree.
    #[default]
    #[strum(to_string = "rtree", serialize = "r-tree")]
    RTree,
}

/// Builds a locator of the requested kind over `points`.
#[must_use]
pub fn build_locator(kind: LocatorKind, points: &[PointFeature]) -> Box<dyn ServiceLocator> {
    let positions: Vec<[f64; 2]> = points.iter().map(|p| [p.longitude, p.latitude]).collect();

    log::debug!("Building {kind} locator over {} points", positions.len());

    match kind {
        LocatorKind::Linear => Box::new(LinearScanLocator::new(positions)),
        LocatorKind::RTree => Box::new(RTreeLocator::new(positions)),
    }
}

/// Pairs skipped when `points` are tested against a shape's degenerate
/// members.
pub(crate) fn skipped_pairs(shape: &AreaShape, points: usize) -> u64 {
    (shape.degenerate_members() as u64).saturating_mul(points as u64)
}

#[cfg(test)]
pub(crate) mod test_support {
    use geo::{MultiPolygon, Polygon};

    use crate::AreaShape;

    pub fn rect(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> AreaShape {
        let ring = vec![
            (min_lng, min_lat),
            (max_lng, min_lat),
            (max_lng, max_lat),
            (min_lng, max_lat),
            (min_lng, min_lat),
        ];
        AreaShape::new(MultiPolygon(vec![Polygon::new(ring.into(), vec![])]))
    }

    /// A deterministic scatter of points around San Diego.
    #[allow(clippy::cast_precision_loss)]
    pub fn scatter(n: usize) -> Vec<[f64; 2]> {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 1_000_000) as f64 / 1_000_000.0
        };
        (0..n)
            .map(|_| [-117.4 + next() * 0.6, 32.5 + next() * 0.6])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{rect, scatter};
    use service_gap_fusion_models::PointKind;

    #[test]
    fn parses_locator_kind() {
        assert_eq!("linear".parse::<LocatorKind>().unwrap(), LocatorKind::Linear);
        assert_eq!("rtree".parse::<LocatorKind>().unwrap(), LocatorKind::RTree);
        assert_eq!("r-tree".parse::<LocatorKind>().unwrap(), LocatorKind::RTree);
        assert!("kdtree".parse::<LocatorKind>().is_err());
        assert_eq!(LocatorKind::RTree.to_string(), "rtree");
    }

    #[test]
    fn locators_agree_on_counts_and_distances() {
        let positions = scatter(500);
        let features: Vec<PointFeature> = positions
            .iter()
            .map(|[lng, lat]| PointFeature::new(*lat, *lng, PointKind::HomelessService))
            .collect();

        let linear = build_locator(LocatorKind::Linear, &features);
        let rtree = build_locator(LocatorKind::RTree, &features);
        assert_eq!(linear.len(), 500);
        assert_eq!(rtree.len(), 500);

        for (i, [lng, lat]) in scatter(40).into_iter().enumerate() {
            let (lng, lat) = (lng + 0.0031, lat - 0.0027);
            #[allow(clippy::cast_precision_loss)]
            let half = 0.01 + (i as f64) * 0.002;
            let shape = rect(lng - half, lat - half, lng + half, lat + half);
            assert_eq!(linear.count_within(&shape), rtree.count_within(&shape));

            let a = linear.nearest_miles(lng, lat).unwrap();
            let b = rtree.nearest_miles(lng, lat).unwrap();
            assert!((a - b).abs() < 1e-9, "linear {a} vs rtree {b}");
        }
    }

    #[test]
    fn empty_locators_have_no_nearest() {
        for kind in [LocatorKind::Linear, LocatorKind::RTree] {
            let locator = build_locator(kind, &[]);
            assert!(locator.is_empty());
            assert_eq!(locator.nearest_miles(-117.0, 32.7), None);
            assert_eq!(
                locator.count_within(&rect(-118.0, 32.0, -116.0, 33.0)).count,
                0
            );
        }
    }
}
