//! Dense great-circle distance matrix.

use crate::geo::{bounding_box, haversine};
use crate::models::Location;

/// A dense n×n distance matrix in kilometers, stored in row-major order.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
/// use u_dispatch::distance::DistanceMatrix;
///
/// let locations = vec![
///     Location::new(40.7128, -74.0060),
///     Location::new(40.7580, -73.9855),
///     Location::new(40.6892, -74.0445),
/// ];
/// let dm = DistanceMatrix::from_locations(&locations);
/// assert_eq!(dm.size(), 3);
/// assert_eq!(dm.get(0, 0), 0.0);
/// assert_eq!(dm.get(0, 1), dm.get(1, 0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes the haversine distance matrix over `locations`.
    ///
    /// Only the upper triangle is computed; it is mirrored below the
    /// diagonal, which stays zero.
    pub fn from_locations(locations: &[Location]) -> Self {
        let n = locations.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = locations[i].distance_to(&locations[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Great-circle distance in kilometers between two locations, without a
/// matrix.
pub fn distance_between(a: Location, b: Location) -> f64 {
    haversine(a.lat, a.lng, b.lat, b.lng)
}

/// Indices of `locations` inside the approximate bounding box of a circle
/// of `radius_km` around `center`.
///
/// This is a coarse pre-filter: corners of the box lie farther than
/// `radius_km` from the center and are still returned. Use
/// [`crate::geo::GridIndex::query_radius`] for an exact radius query.
pub fn bounding_box_query(locations: &[Location], center: Location, radius_km: f64) -> Vec<usize> {
    let bounds = bounding_box(center.lat, center.lng, radius_km);
    locations
        .iter()
        .enumerate()
        .filter(|&(_, &l)| bounds.contains(l))
        .map(|(i, _)| i)
        .collect()
}
