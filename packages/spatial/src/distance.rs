//! Great-circle distance on a spherical Earth.

use geo::{Distance, Haversine, Point};

/// Meters per statute mile.
const METERS_PER_MILE: f64 = 1_609.344;

/// Mean Earth radius in miles, as used by [`Haversine`].
pub const EARTH_RADIUS_MILES: f64 = Haversine.radius() / METERS_PER_MILE;

/// Haversine distance in miles between two `(lat, lng)` positions given
/// in decimal degrees.
#[must_use]
pub fn great_circle_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    Haversine.distance(Point::new(lng1, lat1), Point::new(lng2, lat2)) / METERS_PER_MILE
}

/// Degree offsets `(d_lng, d_lat)` of a box around `(lat, lng)` that holds
/// every position within `miles` of it.
///
/// Returns `None` when the box would reach a pole, where no longitude
/// bound exists.
#[must_use]
pub fn search_radius_degrees(lat: f64, miles: f64) -> Option<(f64, f64)> {
    // Pad for rounding so the box never clips a point at exactly `miles`.
    let angular = miles / EARTH_RADIUS_MILES + 1e-9;
    let lat_rad = lat.to_radians();

    if lat_rad + angular >= std::f64::consts::FRAC_PI_2
        || lat_rad - angular <= -std::f64::consts::FRAC_PI_2
    {
        return None;
    }

    let ratio = (angular.sin() / lat_rad.cos()).min(1.0);
    Some((ratio.asin().to_degrees(), angular.to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert!(great_circle_miles(32.7157, -117.1611, 32.7157, -117.1611).abs() < 1e-12);
    }

    #[test]
    fn one_degree_of_latitude_is_about_69_miles() {
        let miles = great_circle_miles(32.0, -117.0, 33.0, -117.0);
        assert!((miles - 69.09).abs() < 0.01, "got {miles}");
    }

    #[test]
    fn known_city_pair() {
        // San Diego to Los Angeles, roughly 111 miles.
        let miles = great_circle_miles(32.7157, -117.1611, 34.0522, -118.2437);
        assert!((miles - 111.5).abs() < 0.5, "got {miles}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = great_circle_miles(32.7, -117.1, 32.9, -116.8);
        let b = great_circle_miles(32.9, -116.8, 32.7, -117.1);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let miles = great_circle_miles(0.0, 0.0, 0.0, 180.0);
        assert!(miles.is_finite());
        assert!((miles - std::f64::consts::PI * EARTH_RADIUS_MILES).abs() < 1e-6);
    }

    #[test]
    fn search_box_covers_the_radius() {
        let (d_lng, d_lat) = search_radius_degrees(32.7, 5.0).unwrap();
        assert!(great_circle_miles(32.7, -117.0, 32.7 + d_lat, -117.0) >= 5.0);
        assert!(great_circle_miles(32.7, -117.0, 32.7, -117.0 + d_lng) >= 5.0);
    }

    #[test]
    fn search_box_unbounded_near_poles() {
        assert!(search_radius_degrees(89.99, 10.0).is_none());
    }
}
