//! Brute-force locator: every query visits every point.

use crate::distance::great_circle_miles;
use crate::{AreaShape, Containment, ServiceLocator, skipped_pairs};

/// Tests every point for every query. `O(points)` per call.
pub struct LinearScanLocator {
    /// `[lng, lat]` positions.
    points: Vec<[f64; 2]>,
}

impl LinearScanLocator {
    /// Creates a locator over `[lng, lat]` positions.
    #[must_use]
    pub const fn new(points: Vec<[f64; 2]>) -> Self {
        Self { points }
    }
}

impl ServiceLocator for LinearScanLocator {
    fn count_within(&self, shape: &AreaShape) -> Containment {
        let count = self
            .points
            .iter()
            .filter(|[lng, lat]| shape.contains(*lng, *lat))
            .count();

        Containment {
            count: u32::try_from(count).unwrap_or(u32::MAX),
            skipped: skipped_pairs(shape, self.points.len()),
        }
    }

    fn nearest_miles(&self, lng: f64, lat: f64) -> Option<f64> {
        self.points
            .iter()
            .map(|[p_lng, p_lat]| great_circle_miles(lat, lng, *p_lat, *p_lng))
            .min_by(f64::total_cmp)
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::rect;

    #[test]
    fn counts_points_inside() {
        let locator = LinearScanLocator::new(vec![[0.5, 0.5], [1.5, 1.5], [5.0, 5.0]]);
        let containment = locator.count_within(&rect(0.0, 0.0, 2.0, 2.0));
        assert_eq!(containment.count, 2);
        assert_eq!(containment.skipped, 0);
    }

    #[test]
    fn nearest_is_minimum_over_all_points() {
        let locator = LinearScanLocator::new(vec![[-117.0, 33.0], [-117.0, 32.8], [-116.0, 32.0]]);
        let nearest = locator.nearest_miles(-117.0, 32.7).unwrap();
        assert!((nearest - great_circle_miles(32.7, -117.0, 32.8, -117.0)).abs() < 1e-12);
    }
}
