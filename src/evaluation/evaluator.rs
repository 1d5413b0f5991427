//! Route evaluator that computes distance, timing and load.

use crate::config::OptimizerConfig;
use crate::constraints::RouteData;
use crate::distance::distance_between;
use crate::models::{DispatchProblem, Route, Stop, Visit, VisitKind};

/// Evaluates order sequences for one vehicle.
///
/// A route starts at the vehicle's depot, visits each order's pickup and
/// then its delivery, and, if the vehicle has an end location, returns
/// there. Travel legs come from the problem's distance matrix; the return
/// leg, whose end location is not part of the matrix, uses a direct
/// haversine lookup.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_dispatch::OptimizerConfig;
/// use u_dispatch::models::{DispatchProblem, Location, Order, TimeWindow, Vehicle};
/// use u_dispatch::evaluation::RouteEvaluator;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
/// let tw = TimeWindow::new(now, now + Duration::hours(12)).unwrap();
/// let depot = Location::new(40.7128, -74.0060);
/// let orders = vec![Order::new("o1", depot, Location::new(40.72, -74.015), tw, 50.0, 1.0)];
/// let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot)];
/// let problem = DispatchProblem::new(&orders, &vehicles, None);
/// let config = OptimizerConfig::default();
///
/// let evaluator = RouteEvaluator::new(&problem, 0, &config);
/// let route = evaluator.build_route(&[0]);
/// assert_eq!(route.len(), 1);
/// assert_eq!(route.visits().len(), 2);
/// // 15 min pickup + 30 min delivery service on top of travel
/// assert!(route.total_time() > 45.0);
/// ```
pub struct RouteEvaluator<'p, 'a> {
    problem: &'p DispatchProblem<'a>,
    vehicle_index: usize,
    config: &'p OptimizerConfig,
}

impl<'p, 'a> RouteEvaluator<'p, 'a> {
    /// Creates an evaluator for the vehicle at `vehicle_index`.
    pub fn new(
        problem: &'p DispatchProblem<'a>,
        vehicle_index: usize,
        config: &'p OptimizerConfig,
    ) -> Self {
        Self {
            problem,
            vehicle_index,
            config,
        }
    }

    /// Index of the evaluated vehicle.
    pub fn vehicle_index(&self) -> usize {
        self.vehicle_index
    }

    /// Total distance of visiting `order_indices` in sequence, return leg
    /// included.
    pub fn route_distance(&self, order_indices: &[usize]) -> f64 {
        let mut node = self.problem.start_node(self.vehicle_index);
        let mut total = 0.0;
        for &oi in order_indices {
            let nodes = self.problem.order_nodes(oi);
            total += self.problem.distance(node, nodes.pickup);
            total += self.problem.distance(nodes.pickup, nodes.delivery);
            node = nodes.delivery;
        }
        total + self.return_distance(node, order_indices.is_empty())
    }

    /// Builds a route from a sequence of order indices.
    ///
    /// Computes the visit timeline, total distance, total time and load.
    pub fn build_route(&self, order_indices: &[usize]) -> Route {
        let vehicle = &self.problem.vehicles()[self.vehicle_index];
        let orders = self.problem.orders();
        let mut route = Route::new(vehicle.id());

        let mut node = self.problem.start_node(self.vehicle_index);
        let mut clock = 0.0;
        let mut total_distance = 0.0;

        for &oi in order_indices {
            let order = &orders[oi];
            let nodes = self.problem.order_nodes(oi);

            for (kind, target, service) in [
                (VisitKind::Pickup, nodes.pickup, self.config.pickup_service_minutes),
                (VisitKind::Delivery, nodes.delivery, self.config.delivery_service_minutes),
            ] {
                let leg = self.problem.distance(node, target);
                total_distance += leg;
                let arrival = clock + self.config.travel_minutes(leg);
                clock = arrival + service;
                route.push_visit(Visit {
                    order_index: oi,
                    kind,
                    location: self.problem.location(target),
                    arrival_minutes: arrival,
                    departure_minutes: clock,
                });
                node = target;
            }

            route.push_stop(
                Stop {
                    order_id: order.id().to_string(),
                    order_index: oi,
                },
                order.weight_kg(),
                order.volume_m3(),
            );
        }

        let back = self.return_distance(node, order_indices.is_empty());
        total_distance += back;
        clock += self.config.travel_minutes(back);

        route.set_total_distance(total_distance);
        route.set_total_time(clock);
        route
    }

    /// Collects the constraint inputs for a built route.
    ///
    /// Zones are left empty: orders carry no zone information.
    pub fn route_data(&self, route: &Route) -> RouteData {
        let orders = self.problem.orders();
        let mut data = RouteData {
            start_minutes: self.config.shift_start_minutes,
            total_minutes: route.total_time(),
            ..RouteData::default()
        };

        let mut service = 0.0;
        for stop in route.stops() {
            let order = &orders[stop.order_index];
            data.loads.push((order.weight_kg(), order.volume_m3()));
            data.time_windows.push(*order.time_window());
            if let Some(visit) = route.delivery_visit(stop.order_index) {
                data.arrival_minutes.push(visit.arrival_minutes.round() as i64);
            }
            service += self.config.pickup_service_minutes + self.config.delivery_service_minutes;
        }
        data.driving_minutes = (route.total_time() - service).max(0.0);
        data
    }

    fn return_distance(&self, from: usize, empty: bool) -> f64 {
        if empty {
            return 0.0;
        }
        match self.problem.vehicles()[self.vehicle_index].end_location() {
            Some(end) => distance_between(self.problem.location(from), end),
            None => 0.0,
        }
    }
}
