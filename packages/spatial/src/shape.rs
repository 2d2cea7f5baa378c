//! Validated area geometry.
//!
//! An [`AreaShape`] splits an area's polygons into members that can be
//! evaluated and members that cannot (non-finite coordinates, rings with
//! fewer than four positions, zero area). Degenerate members never
//! contain anything; they are only counted so callers can report them.

use geo::{Area, BoundingRect, Centroid, Contains, Coord, MultiPolygon, Point, Polygon};
use rstar::AABB;

/// The reference point of an area used for distance lookups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeCentroid {
    /// Centroid as `(longitude, latitude)`.
    pub point: Point<f64>,
    /// `true` when no member had positive area and the centroid is the
    /// mean of the finite exterior vertices instead.
    pub fallback: bool,
}

/// Area geometry ready for containment and centroid queries.
#[derive(Debug, Clone)]
pub struct AreaShape {
    polygons: MultiPolygon<f64>,
    degenerate_members: usize,
    envelope: Option<AABB<[f64; 2]>>,
    centroid: Option<ShapeCentroid>,
}

impl AreaShape {
    /// Validates every member polygon and precomputes the envelope and
    /// centroid.
    #[must_use]
    pub fn new(multi_polygon: MultiPolygon<f64>) -> Self {
        let mut valid = Vec::with_capacity(multi_polygon.0.len());
        let mut degenerate = Vec::new();

        for polygon in multi_polygon.0 {
            if is_evaluable(&polygon) {
                valid.push(polygon);
            } else {
                degenerate.push(polygon);
            }
        }

        if !degenerate.is_empty() {
            log::debug!(
                "{} degenerate polygon member(s) excluded from evaluation",
                degenerate.len()
            );
        }

        let polygons = MultiPolygon(valid);
        let envelope = compute_envelope(&polygons);
        let centroid = match outer_ring_centroid(&polygons) {
            Some(point) => Some(ShapeCentroid {
                point,
                fallback: false,
            }),
            None => vertex_mean(polygons.iter().chain(degenerate.iter())).map(|point| {
                ShapeCentroid {
                    point,
                    fallback: true,
                }
            }),
        };

        Self {
            polygons,
            degenerate_members: degenerate.len(),
            envelope,
            centroid,
        }
    }

    /// Converts a `GeoJSON` geometry into a shape.
    ///
    /// Accepts `Polygon` and `MultiPolygon`. Returns `None` for any other
    /// geometry type, for conversion failures, and for geometries with no
    /// finite vertex at all.
    #[must_use]
    pub fn from_geojson(geometry: &geojson::Geometry) -> Option<Self> {
        let converted: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
        let multi_polygon = match converted {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
            _ => return None,
        };

        let shape = Self::new(multi_polygon);
        shape.centroid.is_some().then_some(shape)
    }

    /// Whether `(lng, lat)` lies strictly inside one of the evaluable
    /// members. Points on a ring, including hole rings, are outside.
    #[must_use]
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        self.polygons.contains(&Point::new(lng, lat))
    }

    /// Bounding box of the evaluable members.
    #[must_use]
    pub const fn envelope(&self) -> Option<AABB<[f64; 2]>> {
        self.envelope
    }

    /// Number of member polygons excluded from evaluation.
    #[must_use]
    pub const fn degenerate_members(&self) -> usize {
        self.degenerate_members
    }

    /// Reference point for nearest-service lookups.
    #[must_use]
    pub const fn centroid(&self) -> Option<ShapeCentroid> {
        self.centroid
    }
}

fn is_evaluable(polygon: &Polygon<f64>) -> bool {
    let rings_finite = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .all(|ring| ring.0.iter().all(|c| c.x.is_finite() && c.y.is_finite()));

    rings_finite
        && polygon.exterior().0.len() >= 4
        && Polygon::new(polygon.exterior().clone(), vec![]).unsigned_area() > 0.0
}

/// Area-weighted centroid of the exterior rings, ignoring holes.
fn outer_ring_centroid(polygons: &MultiPolygon<f64>) -> Option<Point<f64>> {
    if polygons.0.is_empty() {
        return None;
    }
    let exteriors: MultiPolygon<f64> = polygons
        .iter()
        .map(|p| Polygon::new(p.exterior().clone(), vec![]))
        .collect();
    exteriors.centroid()
}

#[allow(clippy::cast_precision_loss)]
fn vertex_mean<'a>(polygons: impl Iterator<Item = &'a Polygon<f64>>) -> Option<Point<f64>> {
    let mut sum = Coord { x: 0.0, y: 0.0 };
    let mut count = 0usize;

    for polygon in polygons {
        for c in &polygon.exterior().0 {
            if c.x.is_finite() && c.y.is_finite() {
                sum.x += c.x;
                sum.y += c.y;
                count += 1;
            }
        }
    }

    (count > 0).then(|| Point::new(sum.x / count as f64, sum.y / count as f64))
}

fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
