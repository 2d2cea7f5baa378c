//! R-tree backed locator.
//!
//! Containment only tests points inside the area's bounding box.
//! Nearest lookups take the planar nearest neighbor as a first guess,
//! then rescan every point inside a box guaranteed to hold all points at
//! or below that guess's great-circle distance, so the answer matches a
//! full linear scan.

use rstar::{AABB, RTree};

use crate::distance::{great_circle_miles, search_radius_degrees};
use crate::{AreaShape, Containment, ServiceLocator, skipped_pairs};

/// Point locator built on a bulk-loaded [`RTree`].
pub struct RTreeLocator {
    tree: RTree<[f64; 2]>,
}

impl RTreeLocator {
    /// Bulk-loads `[lng, lat]` positions into an R-tree.
    #[must_use]
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    fn min_distance<'a>(
        lng: f64,
        lat: f64,
        candidates: impl Iterator<Item = &'a [f64; 2]>,
    ) -> Option<f64> {
        candidates
            .map(|[p_lng, p_lat]| great_circle_miles(lat, lng, *p_lat, *p_lng))
            .min_by(f64::total_cmp)
    }
}

impl ServiceLocator for RTreeLocator {
    fn count_within(&self, shape: &AreaShape) -> Containment {
        let skipped = skipped_pairs(shape, self.tree.size());

        let Some(envelope) = shape.envelope() else {
            return Containment { count: 0, skipped };
        };

        let count = self
            .tree
            .locate_in_envelope(&envelope)
            .filter(|[lng, lat]| shape.contains(*lng, *lat))
            .count();

        Containment {
            count: u32::try_from(count).unwrap_or(u32::MAX),
            skipped,
        }
    }

    fn nearest_miles(&self, lng: f64, lat: f64) -> Option<f64> {
        let guess = self.tree.nearest_neighbor(&[lng, lat])?;
        let guess_miles = great_circle_miles(lat, lng, guess[1], guess[0]);

        let bounded = search_radius_degrees(lat, guess_miles).filter(|(d_lng, _)| {
            lng - d_lng >= -180.0 && lng + d_lng <= 180.0
        });

        match bounded {
            Some((d_lng, d_lat)) => {
                let window = AABB::from_corners(
                    [lng - d_lng, lat - d_lat],
                    [lng + d_lng, lat + d_lat],
                );
                Self::min_distance(lng, lat, self.tree.locate_in_envelope(&window))
            }
            // Window wraps the antimeridian or reaches a pole.
            None => Self::min_distance(lng, lat, self.tree.iter()),
        }
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::rect;

    #[test]
    fn counts_only_points_inside_polygon() {
        let locator = RTreeLocator::new(vec![[0.5, 0.5], [1.5, 1.5], [2.0, 1.0], [5.0, 5.0]]);
        let containment = locator.count_within(&rect(0.0, 0.0, 2.0, 2.0));
        // [2.0, 1.0] sits on the boundary.
        assert_eq!(containment.count, 2);
    }

    #[test]
    fn nearest_corrects_planar_guess() {
        // At high latitude a degree of longitude is much shorter than a
        // degree of latitude, so the planar nearest point is not the
        // great-circle nearest one.
        let north = [10.0, 60.9];
        let east = [10.95, 60.0];
        let locator = RTreeLocator::new(vec![north, east]);

        let expected = great_circle_miles(60.0, 10.0, east[1], east[0]);
        assert!(expected < great_circle_miles(60.0, 10.0, north[1], north[0]));

        let nearest = locator.nearest_miles(10.0, 60.0).unwrap();
        assert!((nearest - expected).abs() < 1e-12);
    }

    #[test]
    fn nearest_across_antimeridian() {
        let locator = RTreeLocator::new(vec![[-179.9, 0.0], [170.0, 0.0]]);
        let nearest = locator.nearest_miles(179.9, 0.0).unwrap();
        let expected = great_circle_miles(0.0, 179.9, 0.0, -179.9);
        assert!((nearest - expected).abs() < 1e-12);
    }
}
