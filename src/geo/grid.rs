//! Uniform-grid spatial index.
//!
//! # Algorithm
//!
//! The plane is cut into cells roughly `cell_size_km` on a side. A point's
//! cell row is `floor(lat / cell_height)` with `cell_height = cell_size / 111`;
//! its column is `floor(lng / cell_width)` where `cell_width` is scaled by the
//! cosine of the point's own latitude. Queries enumerate every cell that can
//! intersect the search area and then filter candidates exactly.
//!
//! # Complexity
//!
//! Insertion is O(1). A query visits O(cells in the search area + candidates).

use std::collections::HashMap;

use super::haversine::{bounding_box, BoundingBox, KM_PER_DEGREE};
use crate::models::Location;

type CellKey = (i64, i64);

/// Grid-based spatial index for proximity queries.
///
/// # Examples
///
/// ```
/// use u_dispatch::geo::GridIndex;
/// use u_dispatch::models::Location;
///
/// let mut index = GridIndex::new(1.0);
/// index.add_points(&[
///     Location::new(40.7128, -74.0060),
///     Location::new(40.7138, -74.0050),
///     Location::new(40.7580, -73.9855),
/// ]);
///
/// let near = index.query_radius(Location::new(40.7128, -74.0060), 0.5);
/// let ids: Vec<usize> = near.iter().map(|&(id, _)| id).collect();
/// assert_eq!(ids, vec![0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size_km: f64,
    cells: HashMap<CellKey, Vec<(usize, Location)>>,
    len: usize,
}

impl GridIndex {
    /// Creates an empty index with cells of `cell_size_km` on a side.
    pub fn new(cell_size_km: f64) -> Self {
        Self {
            cell_size_km,
            cells: HashMap::new(),
            len: 0,
        }
    }

    /// Cell edge length in kilometers.
    pub fn cell_size_km(&self) -> f64 {
        self.cell_size_km
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no points are indexed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a point under the given identifier.
    pub fn add_point(&mut self, id: usize, location: Location) {
        let key = self.cell_key(location);
        self.cells.entry(key).or_default().push((id, location));
        self.len += 1;
    }

    /// Adds points, identifying each by its position in `locations`.
    pub fn add_points(&mut self, locations: &[Location]) {
        for (i, &location) in locations.iter().enumerate() {
            self.add_point(i, location);
        }
    }

    /// Returns `(id, distance_km)` for every point within `radius_km` of
    /// `center`, sorted by id.
    pub fn query_radius(&self, center: Location, radius_km: f64) -> Vec<(usize, f64)> {
        let bounds = bounding_box(center.lat, center.lng, radius_km);
        let mut result: Vec<(usize, f64)> = self
            .candidates(&bounds)
            .filter_map(|&(id, location)| {
                let d = center.distance_to(&location);
                (d <= radius_km).then_some((id, d))
            })
            .collect();
        result.sort_by_key(|&(id, _)| id);
        result
    }

    /// Returns `(id, location)` for every point inside `bounds`, sorted by id.
    pub fn query_bounding_box(&self, bounds: &BoundingBox) -> Vec<(usize, Location)> {
        let mut result: Vec<(usize, Location)> = self
            .candidates(bounds)
            .filter(|&&(_, location)| bounds.contains(location))
            .copied()
            .collect();
        result.sort_by_key(|&(id, _)| id);
        result
    }

    /// Removes all points.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    fn cell_key(&self, location: Location) -> CellKey {
        (
            self.column(location.lng, location.lat),
            self.row(location.lat),
        )
    }

    fn row(&self, lat: f64) -> i64 {
        (lat * KM_PER_DEGREE / self.cell_size_km).floor() as i64
    }

    fn column(&self, lng: f64, lat: f64) -> i64 {
        (lng * KM_PER_DEGREE * lat.to_radians().cos() / self.cell_size_km).floor() as i64
    }

    /// Column range a row can occupy for longitudes in `[min_lng, max_lng]`
    /// and latitudes in `[lat_lo, lat_hi]`.
    fn column_span(&self, min_lng: f64, max_lng: f64, lat_lo: f64, lat_hi: f64) -> (i64, i64) {
        let mut cos_lo = lat_lo.to_radians().cos().min(lat_hi.to_radians().cos());
        let mut cos_hi = lat_lo.to_radians().cos().max(lat_hi.to_radians().cos());
        if lat_lo <= 0.0 && lat_hi >= 0.0 {
            cos_hi = 1.0;
        }
        cos_lo = cos_lo.max(0.0);
        cos_hi = cos_hi.max(0.0);

        let scale = KM_PER_DEGREE / self.cell_size_km;
        let corners = [
            min_lng * cos_lo * scale,
            min_lng * cos_hi * scale,
            max_lng * cos_lo * scale,
            max_lng * cos_hi * scale,
        ];
        let lo = corners.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lo.floor() as i64, hi.floor() as i64)
    }

    /// Points stored in cells that may intersect `bounds`.
    fn candidates<'a>(
        &'a self,
        bounds: &BoundingBox,
    ) -> Box<dyn Iterator<Item = &'a (usize, Location)> + 'a> {
        if self.cells.is_empty() || !bounds.min_lat.is_finite() || !bounds.max_lat.is_finite() {
            return Box::new(std::iter::empty());
        }

        let row_lo = self.row(bounds.min_lat);
        let row_hi = self.row(bounds.max_lat);
        let row_height = self.cell_size_km / KM_PER_DEGREE;

        let mut keys = Vec::new();
        let mut visited: u64 = 0;
        for row in row_lo..=row_hi {
            let lat_lo = (row as f64 * row_height).max(bounds.min_lat);
            let lat_hi = ((row + 1) as f64 * row_height).min(bounds.max_lat);
            let (col_lo, col_hi) = self.column_span(bounds.min_lng, bounds.max_lng, lat_lo, lat_hi);
            visited = visited.saturating_add((col_hi - col_lo + 1).max(0) as u64);
            if visited > self.cells.len() as u64 {
                // Search area covers more cells than are occupied: scan them all.
                return Box::new(self.cells.values().flatten());
            }
            keys.extend((col_lo..=col_hi).map(|col| (col, row)));
        }

        Box::new(
            keys.into_iter()
                .filter_map(move |key| self.cells.get(&key))
                .flatten(),
        )
    }
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::new(1.0)
    }
}
