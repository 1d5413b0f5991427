//! Deduplicated location list.

use std::collections::HashMap;

use crate::models::Location;

/// An order-preserving set of locations.
///
/// Each distinct location gets the index at which it was first inserted;
/// those indices address rows and columns of a [`super::DistanceMatrix`].
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
/// use u_dispatch::distance::LocationIndex;
///
/// let mut index = LocationIndex::new();
/// assert_eq!(index.insert(Location::new(1.0, 1.0)), 0);
/// assert_eq!(index.insert(Location::new(2.0, 2.0)), 1);
/// assert_eq!(index.insert(Location::new(1.0, 1.0)), 0);
/// assert_eq!(index.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    locations: Vec<Location>,
    positions: HashMap<(u64, u64), usize>,
}

impl LocationIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a location if unseen and returns its index.
    pub fn insert(&mut self, location: Location) -> usize {
        let next = self.locations.len();
        let idx = *self.positions.entry(location.key()).or_insert(next);
        if idx == next {
            self.locations.push(location);
        }
        idx
    }

    /// Index of a previously inserted location.
    pub fn index_of(&self, location: Location) -> Option<usize> {
        self.positions.get(&location.key()).copied()
    }

    /// Location stored at `index`.
    pub fn get(&self, index: usize) -> Option<Location> {
        self.locations.get(index).copied()
    }

    /// Distinct locations in first-seen order.
    pub fn as_slice(&self) -> &[Location] {
        &self.locations
    }

    /// Number of distinct locations.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if no location was inserted.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
