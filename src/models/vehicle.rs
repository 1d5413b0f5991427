//! Vehicle type with weight and volume capacity.

use serde::{Deserialize, Serialize};

use super::Location;

/// A delivery vehicle.
///
/// A vehicle starts at its depot and, if an end location is set, finishes
/// there. Without an end location the route has no return leg.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Location, Vehicle};
///
/// let depot = Location::new(40.7128, -74.0060);
/// let v = Vehicle::new("v1", 500.0, 10.0, depot).with_end_location(depot);
/// assert_eq!(v.id(), "v1");
/// assert_eq!(v.max_weight_kg(), 500.0);
/// assert_eq!(v.end_location(), Some(depot));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    id: String,
    max_weight_kg: f64,
    max_volume_m3: f64,
    start_location: Location,
    #[serde(default)]
    end_location: Option<Location>,
}

impl Vehicle {
    /// Creates a vehicle that starts at `start_location` and does not return.
    pub fn new(
        id: impl Into<String>,
        max_weight_kg: f64,
        max_volume_m3: f64,
        start_location: Location,
    ) -> Self {
        Self {
            id: id.into(),
            max_weight_kg,
            max_volume_m3,
            start_location,
            end_location: None,
        }
    }

    /// Sets the location the vehicle returns to after its last delivery.
    pub fn with_end_location(mut self, end: Location) -> Self {
        self.end_location = Some(end);
        self
    }

    /// Vehicle identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Maximum load weight in kilograms.
    pub fn max_weight_kg(&self) -> f64 {
        self.max_weight_kg
    }

    /// Maximum load volume in cubic meters.
    pub fn max_volume_m3(&self) -> f64 {
        self.max_volume_m3
    }

    /// Depot the vehicle starts from.
    pub fn start_location(&self) -> Location {
        self.start_location
    }

    /// Where the vehicle ends its route, if it returns anywhere.
    pub fn end_location(&self) -> Option<Location> {
        self.end_location
    }
}
