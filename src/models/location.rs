//! Geographic location type.

use serde::{Deserialize, Serialize};

use crate::geo::haversine;

/// A point given as latitude and longitude in degrees.
///
/// Serializes as a `[lat, lng]` pair.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Location;
///
/// let a = Location::new(40.7128, -74.0060);
/// let b = Location::new(40.7580, -73.9855);
/// assert!(a.distance_to(&b) > 5.0);
/// assert_eq!(a.distance_to(&a), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Location {
    /// Creates a location from latitude and longitude.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in kilometers.
    pub fn distance_to(&self, other: &Location) -> f64 {
        haversine(self.lat, self.lng, other.lat, other.lng)
    }

    /// Bitwise key consistent with `==` (signed zeros collapse to one key).
    pub(crate) fn key(&self) -> (u64, u64) {
        ((self.lat + 0.0).to_bits(), (self.lng + 0.0).to_bits())
    }
}

impl From<(f64, f64)> for Location {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl From<Location> for (f64, f64) {
    fn from(location: Location) -> Self {
        (location.lat, location.lng)
    }
}
