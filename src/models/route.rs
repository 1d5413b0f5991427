//! Route, stop and visit types.

use serde::{Deserialize, Serialize};

use super::Location;

/// An order served by a route.
///
/// Carries both the stable order identifier and the order's position in the
/// input slice of the optimization call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    /// Identifier of the served order.
    pub order_id: String,
    /// Position of the order in the optimizer's input.
    pub order_index: usize,
}

/// Whether a visit collects or drops off an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitKind {
    /// Goods are loaded.
    Pickup,
    /// Goods are unloaded.
    Delivery,
}

/// A single call at a location, with timing relative to route start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Position of the order in the optimizer's input.
    pub order_index: usize,
    /// Pickup or delivery.
    pub kind: VisitKind,
    /// Where the visit happens.
    pub location: Location,
    /// Minutes from route start at which the vehicle arrives.
    pub arrival_minutes: f64,
    /// Minutes from route start at which service ends.
    pub departure_minutes: f64,
}

/// An ordered sequence of orders served by a single vehicle.
///
/// Each order contributes two visits: its pickup, then its delivery.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Route, Stop};
///
/// let mut route = Route::new("v1");
/// route.push_stop(Stop { order_id: "o1".into(), order_index: 0 }, 50.0, 1.0);
/// assert_eq!(route.len(), 1);
/// assert_eq!(route.vehicle_id(), "v1");
/// assert_eq!(route.weight_used(), 50.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    vehicle_id: String,
    stops: Vec<Stop>,
    visits: Vec<Visit>,
    total_distance: f64,
    total_time: f64,
    weight_used: f64,
    volume_used: f64,
}

impl Route {
    /// Creates an empty route for the given vehicle.
    pub fn new(vehicle_id: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            stops: Vec::new(),
            visits: Vec::new(),
            total_distance: 0.0,
            total_time: 0.0,
            weight_used: 0.0,
            volume_used: 0.0,
        }
    }

    /// Appends an order and adds its load to the route totals.
    pub fn push_stop(&mut self, stop: Stop, weight_kg: f64, volume_m3: f64) {
        self.weight_used += weight_kg;
        self.volume_used += volume_m3;
        self.stops.push(stop);
    }

    /// Appends a visit to the route timeline.
    pub fn push_visit(&mut self, visit: Visit) {
        self.visits.push(visit);
    }

    /// Vehicle serving this route.
    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Orders in visiting order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Pickup and delivery visits in time order.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Number of orders served.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the route serves no orders.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Order identifiers in visiting order.
    pub fn order_ids(&self) -> Vec<&str> {
        self.stops.iter().map(|s| s.order_id.as_str()).collect()
    }

    /// Input positions of the served orders in visiting order.
    pub fn order_indices(&self) -> Vec<usize> {
        self.stops.iter().map(|s| s.order_index).collect()
    }

    /// Returns the delivery visit for the order at `order_index`, if served.
    pub fn delivery_visit(&self, order_index: usize) -> Option<&Visit> {
        self.visits
            .iter()
            .find(|v| v.order_index == order_index && v.kind == VisitKind::Delivery)
    }

    /// Total travelled distance in kilometers.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Total route time in minutes, travel and service included.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Sum of served order weights in kilograms.
    pub fn weight_used(&self) -> f64 {
        self.weight_used
    }

    /// Sum of served order volumes in cubic meters.
    pub fn volume_used(&self) -> f64 {
        self.volume_used
    }

    /// Sets the total distance (used by evaluator).
    pub fn set_total_distance(&mut self, d: f64) {
        self.total_distance = d;
    }

    /// Sets the total time (used by evaluator).
    pub fn set_total_time(&mut self, t: f64) {
        self.total_time = t;
    }
}
