//! Haversine distance and bounding-box approximation.

use serde::{Deserialize, Serialize};

use crate::models::Location;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate length of one degree of latitude in kilometers.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Great-circle distance in kilometers between two points given in degrees.
///
/// # Examples
///
/// ```
/// use u_dispatch::geo::haversine;
///
/// let d = haversine(40.7128, -74.0060, 40.7580, -73.9855);
/// assert!((d - 5.2).abs() < 0.2);
/// assert_eq!(haversine(40.7128, -74.0060, 40.7128, -74.0060), 0.0);
/// ```
pub fn haversine(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push `a` marginally above 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// An axis-aligned latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its edges.
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        }
    }

    /// Returns `true` if the location lies inside or on the edge of this box.
    pub fn contains(&self, location: Location) -> bool {
        location.lat >= self.min_lat
            && location.lat <= self.max_lat
            && location.lng >= self.min_lng
            && location.lng <= self.max_lng
    }

    /// Center point of the box.
    pub fn center(&self) -> Location {
        Location::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Approximate bounding box of a circle of `radius_km` around a center.
///
/// Uses 1° latitude ≈ 111 km and scales the longitude width by the cosine
/// of the center latitude. Good enough for pre-filtering only.
///
/// # Examples
///
/// ```
/// use u_dispatch::geo::bounding_box;
///
/// let bb = bounding_box(0.0, 0.0, 111.0);
/// assert!((bb.max_lat - 1.0).abs() < 1e-10);
/// assert!((bb.min_lng + 1.0).abs() < 1e-10);
/// ```
pub fn bounding_box(center_lat: f64, center_lng: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let lng_delta = radius_km / (KM_PER_DEGREE * center_lat.to_radians().cos());

    BoundingBox::new(
        center_lat - lat_delta,
        center_lng - lng_delta,
        center_lat + lat_delta,
        center_lng + lng_delta,
    )
}

/// Linear scan for points within `radius_km` of `center`.
///
/// Returns `(index, distance_km)` pairs in input order.
pub fn points_in_radius(
    center: Location,
    radius_km: f64,
    points: &[Location],
) -> Vec<(usize, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let d = center.distance_to(p);
            (d <= radius_km).then_some((i, d))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_identical_points() {
        assert_eq!(haversine(40.7128, -74.0060, 40.7128, -74.0060), 0.0);
    }

    #[test]
    fn test_haversine_manhattan() {
        // Lower Manhattan to Times Square
        let d = haversine(40.7128, -74.0060, 40.7580, -73.9855);
        assert!((d - 5.2).abs() < 0.2, "got {d}");
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = haversine(48.8566, 2.3522, 51.5074, -0.1278);
        let b = haversine(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((a - b).abs() < 1e-9);
        // Paris to London is roughly 344 km
        assert!((a - 344.0).abs() < 5.0);
    }

    #[test]
    fn test_haversine_triangle_inequality() {
        let ab = haversine(0.0, 0.0, 1.0, 1.0);
        let bc = haversine(1.0, 1.0, 2.0, 0.5);
        let ac = haversine(0.0, 0.0, 2.0, 0.5);
        assert!(ac <= ab + bc + 1e-9);
    }

    #[test]
    fn test_haversine_antipodal() {
        let d = haversine(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box_equator() {
        let bb = bounding_box(0.0, 10.0, 55.5);
        assert!((bb.min_lat + 0.5).abs() < 1e-10);
        assert!((bb.max_lat - 0.5).abs() < 1e-10);
        assert!((bb.min_lng - 9.5).abs() < 1e-10);
        assert!((bb.max_lng - 10.5).abs() < 1e-10);
    }

    #[test]
    fn test_bounding_box_widens_with_latitude() {
        let equator = bounding_box(0.0, 0.0, 10.0);
        let north = bounding_box(60.0, 0.0, 10.0);
        let eq_width = equator.max_lng - equator.min_lng;
        let north_width = north.max_lng - north.min_lng;
        // cos(60°) = 0.5, so the box is twice as wide in degrees
        assert!((north_width - 2.0 * eq_width).abs() < 1e-9);
        assert!((north.max_lat - north.min_lat - (equator.max_lat - equator.min_lat)).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box_contains() {
        let bb = BoundingBox::new(40.0, -75.0, 41.0, -73.0);
        assert!(bb.contains(Location::new(40.5, -74.0)));
        assert!(bb.contains(Location::new(40.0, -75.0)));
        assert!(!bb.contains(Location::new(41.5, -74.0)));
        assert!(!bb.contains(Location::new(40.5, -72.9)));
        let c = bb.center();
        assert!((c.lat - 40.5).abs() < 1e-10);
        assert!((c.lng + 74.0).abs() < 1e-10);
    }

    #[test]
    fn test_points_in_radius() {
        let center = Location::new(40.7128, -74.0060);
        let points = vec![
            Location::new(40.7128, -74.0060),
            Location::new(40.7580, -73.9855),
            Location::new(40.7138, -74.0060),
        ];
        let hits = points_in_radius(center, 1.0, &points);
        let ids: Vec<usize> = hits.iter().map(|&(i, _)| i).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(hits[0].1, 0.0);
    }
}
