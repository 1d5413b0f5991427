//! Dispatch problem instance.

use std::sync::Arc;

use super::{Location, Order, Vehicle};
use crate::distance::{DistanceMatrix, LocationIndex, MatrixCache};

/// Matrix indices of an order's pickup and delivery locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderNodes {
    /// Row/column of the pickup location.
    pub pickup: usize,
    /// Row/column of the delivery location.
    pub delivery: usize,
}

/// One optimization call's view of its input.
///
/// Extracts the distinct locations (vehicle starts first, in vehicle order,
/// then each order's pickup and delivery, in order sequence), builds the
/// distance matrix over them, and remembers which matrix index each vehicle
/// and order maps to.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_dispatch::models::{DispatchProblem, Location, Order, TimeWindow, Vehicle};
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
/// let tw = TimeWindow::new(now, now + Duration::hours(12)).unwrap();
/// let depot = Location::new(40.7128, -74.0060);
/// let orders = vec![Order::new("o1", depot, Location::new(40.72, -74.015), tw, 50.0, 1.0)];
/// let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot)];
///
/// let problem = DispatchProblem::new(&orders, &vehicles, None);
/// // The pickup shares the depot location, so only two distinct points exist.
/// assert_eq!(problem.locations().len(), 2);
/// assert_eq!(problem.order_nodes(0).pickup, problem.start_node(0));
/// ```
#[derive(Debug, Clone)]
pub struct DispatchProblem<'a> {
    orders: &'a [Order],
    vehicles: &'a [Vehicle],
    locations: LocationIndex,
    distances: Arc<DistanceMatrix>,
    start_nodes: Vec<usize>,
    order_nodes: Vec<OrderNodes>,
}

impl<'a> DispatchProblem<'a> {
    /// Builds the location index and distance matrix for the given input.
    ///
    /// When a cache is supplied the matrix is looked up there first.
    pub fn new(
        orders: &'a [Order],
        vehicles: &'a [Vehicle],
        cache: Option<&mut MatrixCache>,
    ) -> Self {
        let mut locations = LocationIndex::new();
        let start_nodes = vehicles
            .iter()
            .map(|v| locations.insert(v.start_location()))
            .collect();
        let order_nodes = orders
            .iter()
            .map(|o| OrderNodes {
                pickup: locations.insert(o.pickup_location()),
                delivery: locations.insert(o.delivery_location()),
            })
            .collect();

        let distances = match cache {
            Some(cache) => cache.get_or_compute(locations.as_slice()),
            None => Arc::new(DistanceMatrix::from_locations(locations.as_slice())),
        };

        Self {
            orders,
            vehicles,
            locations,
            distances,
            start_nodes,
            order_nodes,
        }
    }

    /// Orders of this call, in input order.
    pub fn orders(&self) -> &'a [Order] {
        self.orders
    }

    /// Vehicles of this call, in input order.
    pub fn vehicles(&self) -> &'a [Vehicle] {
        self.vehicles
    }

    /// Distinct locations backing the matrix.
    pub fn locations(&self) -> &LocationIndex {
        &self.locations
    }

    /// The distance matrix over [`Self::locations`].
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Matrix distance between two location indices.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// Matrix index of a vehicle's start location.
    pub fn start_node(&self, vehicle_index: usize) -> usize {
        self.start_nodes[vehicle_index]
    }

    /// Matrix indices of an order's pickup and delivery.
    pub fn order_nodes(&self, order_index: usize) -> OrderNodes {
        self.order_nodes[order_index]
    }

    /// Location stored at a matrix index.
    pub fn location(&self, node: usize) -> Location {
        self.locations.as_slice()[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;
    use chrono::{Duration, TimeZone, Utc};

    fn tw() -> TimeWindow {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        TimeWindow::new(now, now + Duration::hours(12)).expect("valid")
    }

    #[test]
    fn test_location_extraction_order() {
        let depot_a = Location::new(0.0, 0.0);
        let depot_b = Location::new(0.0, 1.0);
        let vehicles = vec![
            Vehicle::new("v1", 100.0, 1.0, depot_a),
            Vehicle::new("v2", 100.0, 1.0, depot_b),
            Vehicle::new("v3", 100.0, 1.0, depot_a),
        ];
        let orders = vec![
            Order::new("o1", Location::new(1.0, 0.0), Location::new(1.0, 1.0), tw(), 1.0, 0.1),
            Order::new("o2", depot_b, Location::new(1.0, 0.0), tw(), 1.0, 0.1),
            Order::new("o3", Location::new(2.0, 2.0), Location::new(1.0, 1.0), tw(), 1.0, 0.1),
        ];

        let p = DispatchProblem::new(&orders, &vehicles, None);
        assert_eq!(
            p.locations().as_slice(),
            &[
                depot_a,
                depot_b,
                Location::new(1.0, 0.0),
                Location::new(1.0, 1.0),
                Location::new(2.0, 2.0),
            ]
        );
        assert_eq!(p.start_node(0), 0);
        assert_eq!(p.start_node(1), 1);
        assert_eq!(p.start_node(2), 0);
        assert_eq!(p.order_nodes(0), OrderNodes { pickup: 2, delivery: 3 });
        assert_eq!(p.order_nodes(1), OrderNodes { pickup: 1, delivery: 2 });
        assert_eq!(p.order_nodes(2), OrderNodes { pickup: 4, delivery: 3 });
        assert_eq!(p.distances().size(), 5);
        assert_eq!(p.location(4), Location::new(2.0, 2.0));
    }

    #[test]
    fn test_matrix_matches_haversine() {
        let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, Location::new(40.7128, -74.0060))];
        let orders = vec![Order::new(
            "o1",
            Location::new(40.7130, -74.0060),
            Location::new(40.7200, -74.0150),
            tw(),
            50.0,
            1.0,
        )];
        let p = DispatchProblem::new(&orders, &vehicles, None);
        let n = p.order_nodes(0);
        let expected = orders[0].direct_distance();
        assert!((p.distance(n.pickup, n.delivery) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_uses_cache() {
        let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, Location::new(0.0, 0.0))];
        let orders = vec![Order::new(
            "o1",
            Location::new(0.0, 0.1),
            Location::new(0.0, 0.2),
            tw(),
            1.0,
            0.1,
        )];
        let mut cache = MatrixCache::new();
        let _ = DispatchProblem::new(&orders, &vehicles, Some(&mut cache));
        let _ = DispatchProblem::new(&orders, &vehicles, Some(&mut cache));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }
}
