//! Route optimizer entry point.

use log::{debug, info, warn};

use crate::config::{is_valid_speed, OptimizerConfig};
use crate::constraints::{
    CapacityConstraint, ConstraintChecker, DriverHoursConstraint, TimeWindowConstraint,
};
use crate::constructive::{nearest_neighbor, salvage_leftovers};
use crate::distance::MatrixCache;
use crate::evaluation::RouteEvaluator;
use crate::local_search::two_opt_improve;
use crate::models::{DispatchProblem, Order, Route, Solution, Vehicle};

/// Assigns orders to vehicles and sequences each vehicle's stops.
///
/// The pipeline is: location extraction and distance matrix, nearest-neighbor
/// construction, leftover salvage, optional 2-opt per route, then route
/// metrics. Results are deterministic for identical input.
///
/// The optimizer owns its distance matrix cache, which is consulted only when
/// [`OptimizerConfig::use_distance_cache`] is set.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_dispatch::RouteOptimizer;
/// use u_dispatch::models::{Location, Order, TimeWindow, Vehicle};
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
/// let tw = TimeWindow::new(now, now + Duration::hours(4)).unwrap();
/// let depot = Location::new(40.7128, -74.0060);
/// let orders = vec![Order::new(
///     "o1",
///     Location::new(40.7150, -74.0100),
///     Location::new(40.7300, -73.9950),
///     tw,
///     50.0,
///     1.0,
/// )];
/// let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot)];
///
/// let mut optimizer = RouteOptimizer::default();
/// let solution = optimizer.optimize(&orders, &vehicles, true);
/// assert_eq!(solution.num_routes(), 1);
/// assert_eq!(solution.routes()[0].weight_used(), 50.0);
/// assert!(solution.unassigned().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteOptimizer {
    config: OptimizerConfig,
    cache: MatrixCache,
}

impl RouteOptimizer {
    /// Creates an optimizer with the given configuration and an empty cache.
    ///
    /// An average speed that is not finite and positive falls back to the
    /// default speed.
    pub fn new(mut config: OptimizerConfig) -> Self {
        if !is_valid_speed(config.average_speed_kmh) {
            let fallback = OptimizerConfig::default().average_speed_kmh;
            warn!(
                "average speed {} km/h is unusable, using {} km/h",
                config.average_speed_kmh, fallback
            );
            config.average_speed_kmh = fallback;
        }
        Self {
            config,
            cache: MatrixCache::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// The distance matrix cache.
    pub fn cache(&self) -> &MatrixCache {
        &self.cache
    }

    /// Optimizes routes for `orders` over `vehicles`.
    ///
    /// Orders that fit no vehicle are listed in [`Solution::unassigned`] in
    /// input order. Vehicles that receive no order produce no route.
    pub fn optimize(
        &mut self,
        orders: &[Order],
        vehicles: &[Vehicle],
        improve_with_2opt: bool,
    ) -> Solution {
        if orders.is_empty() {
            return Solution::new();
        }

        let cache = if self.config.use_distance_cache {
            Some(&mut self.cache)
        } else {
            None
        };
        let problem = DispatchProblem::new(orders, vehicles, cache);
        debug!(
            "{} orders, {} vehicles, {} unique locations",
            orders.len(),
            vehicles.len(),
            problem.locations().len()
        );

        let mut construction = nearest_neighbor(&problem);
        let salvaged = salvage_leftovers(&problem, &mut construction);
        if salvaged > 0 {
            debug!("salvage placed {} leftover orders", salvaged);
        }

        let mut solution = Solution::new();
        for assignment in &construction.assignments {
            let evaluator = RouteEvaluator::new(&problem, assignment.vehicle_index, &self.config);
            let sequence = if improve_with_2opt {
                let before = evaluator.route_distance(&assignment.orders);
                let (improved, after) =
                    two_opt_improve(&assignment.orders, &evaluator, self.config.max_two_opt_passes);
                debug!(
                    "vehicle {}: 2-opt {:.3} -> {:.3} km",
                    vehicles[assignment.vehicle_index].id(),
                    before,
                    after
                );
                improved
            } else {
                assignment.orders.clone()
            };

            let route = evaluator.build_route(&sequence);
            self.report_violations(&problem, &evaluator, &route);
            solution.add_route(route);
        }

        for &oi in &construction.unassigned {
            solution.add_unassigned(orders[oi].id());
        }
        if solution.num_unassigned() > 0 {
            warn!(
                "{} of {} orders could not be assigned: {:?}",
                solution.num_unassigned(),
                orders.len(),
                solution.unassigned()
            );
        }

        info!(
            "optimized {} orders into {} routes: {:.2} km, {:.2} vehicle hours",
            solution.num_served(),
            solution.num_routes(),
            solution.total_distance(),
            solution.total_vehicle_hours()
        );
        solution
    }

    /// Runs the advisory checks on a finished route and logs any violation.
    fn report_violations(
        &self,
        problem: &DispatchProblem,
        evaluator: &RouteEvaluator,
        route: &Route,
    ) {
        let vehicle = &problem.vehicles()[evaluator.vehicle_index()];
        let mut checker = ConstraintChecker::new();
        checker.add_constraint(CapacityConstraint::new(
            vehicle.max_weight_kg(),
            vehicle.max_volume_m3(),
        ));
        checker.add_constraint(TimeWindowConstraint::new(
            self.config.delivery_service_minutes.round() as i64,
        ));
        checker.add_constraint(DriverHoursConstraint::default());

        let violations = checker.violations(&evaluator.route_data(route));
        if !violations.is_empty() {
            debug!("vehicle {} route violates {:?}", vehicle.id(), violations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, TimeWindow};
    use chrono::{Duration, TimeZone, Utc};

    fn tw() -> TimeWindow {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        TimeWindow::new(now, now + Duration::hours(8)).expect("valid")
    }

    fn depot() -> Location {
        Location::new(40.7128, -74.0060)
    }

    fn grid_orders(n: usize, weight: f64, volume: f64) -> Vec<Order> {
        (0..n)
            .map(|i| {
                let f = i as f64;
                Order::new(
                    format!("o{i}"),
                    Location::new(40.70 + 0.003 * f, -74.02 + 0.004 * ((i * 7) % 5) as f64),
                    Location::new(40.72 - 0.002 * f, -73.98 - 0.003 * ((i * 3) % 4) as f64),
                    tw(),
                    weight,
                    volume,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_orders() {
        let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot())];
        let mut opt = RouteOptimizer::default();
        let sol = opt.optimize(&[], &vehicles, true);
        assert!(sol.is_empty());
        assert!(opt.optimize(&[], &[], false).is_empty());
    }

    #[test]
    fn test_single_order() {
        let orders = vec![Order::new(
            "o1",
            Location::new(40.7150, -74.0100),
            Location::new(40.7300, -73.9950),
            tw(),
            50.0,
            1.0,
        )];
        let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot())];
        let sol = RouteOptimizer::default().optimize(&orders, &vehicles, true);
        assert_eq!(sol.num_routes(), 1);
        let route = &sol.routes()[0];
        assert_eq!(route.len(), 1);
        assert_eq!(route.order_ids(), vec!["o1"]);
        assert!((route.weight_used() - 50.0).abs() < 1e-10);
        assert!((route.volume_used() - 1.0).abs() < 1e-10);
        assert!(route.total_distance() > 0.0);
        assert!(route.total_time() > 45.0);
    }

    #[test]
    fn test_capacity_split() {
        let orders = grid_orders(5, 120.0, 2.0);
        let vehicles: Vec<_> = (0..3)
            .map(|i| Vehicle::new(format!("v{i}"), 250.0, 5.0, depot()))
            .collect();
        let sol = RouteOptimizer::default().optimize(&orders, &vehicles, true);
        assert_eq!(sol.num_served(), 5);
        assert!(sol.unassigned().is_empty());
        for route in sol.routes() {
            assert!(route.weight_used() <= 250.0);
            assert!(route.volume_used() <= 5.0);
            assert!(route.len() <= 2);
        }
    }

    #[test]
    fn test_unassigned_in_input_order() {
        let mut orders = grid_orders(4, 10.0, 0.1);
        orders[3] = Order::new("huge_b", depot(), depot(), tw(), 900.0, 0.1);
        orders[1] = Order::new("huge_a", depot(), depot(), tw(), 900.0, 0.1);
        let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot())];
        let sol = RouteOptimizer::default().optimize(&orders, &vehicles, true);
        assert_eq!(sol.unassigned(), ["huge_a", "huge_b"]);
        assert_eq!(sol.num_served(), 2);
    }

    #[test]
    fn test_no_vehicles_leaves_everything_unassigned() {
        let orders = grid_orders(3, 10.0, 0.1);
        let sol = RouteOptimizer::default().optimize(&orders, &[], true);
        assert_eq!(sol.num_routes(), 0);
        assert_eq!(sol.unassigned(), ["o0", "o1", "o2"]);
    }

    #[test]
    fn test_two_opt_not_worse() {
        let orders = grid_orders(12, 10.0, 0.1);
        let vehicles = vec![
            Vehicle::new("v1", 80.0, 10.0, depot()),
            Vehicle::new("v2", 80.0, 10.0, depot()),
        ];
        let plain = RouteOptimizer::default().optimize(&orders, &vehicles, false);
        let improved = RouteOptimizer::default().optimize(&orders, &vehicles, true);
        assert_eq!(plain.num_routes(), improved.num_routes());
        for (a, b) in plain.routes().iter().zip(improved.routes()) {
            assert_eq!(a.vehicle_id(), b.vehicle_id());
            assert!(b.total_distance() <= a.total_distance() + 1e-9);
        }
    }

    #[test]
    fn test_deterministic() {
        let orders = grid_orders(15, 20.0, 0.5);
        let vehicles = vec![
            Vehicle::new("v1", 100.0, 3.0, depot()),
            Vehicle::new("v2", 120.0, 3.0, depot()).with_end_location(depot()),
        ];
        let mut opt = RouteOptimizer::default();
        let a = opt.optimize(&orders, &vehicles, true);
        let b = opt.optimize(&orders, &vehicles, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_used_when_enabled() {
        let orders = grid_orders(4, 10.0, 0.1);
        let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot())];

        let mut cached = RouteOptimizer::new(OptimizerConfig::default().with_distance_cache(true));
        let first = cached.optimize(&orders, &vehicles, true);
        let second = cached.optimize(&orders, &vehicles, true);
        assert_eq!(first, second);
        assert_eq!(cached.cache().len(), 1);
        assert_eq!(cached.cache().hits(), 1);

        let mut uncached = RouteOptimizer::default();
        uncached.optimize(&orders, &vehicles, true);
        assert!(uncached.cache().is_empty());
    }

    #[test]
    fn test_zero_speed_config_falls_back() {
        let orders = grid_orders(3, 10.0, 0.1);
        let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot())];
        let config = OptimizerConfig {
            average_speed_kmh: 0.0,
            ..OptimizerConfig::default()
        };
        let mut opt = RouteOptimizer::new(config);
        assert_eq!(opt.config().average_speed_kmh, 40.0);
        let sol = opt.optimize(&orders, &vehicles, true);
        assert_eq!(sol, RouteOptimizer::default().optimize(&orders, &vehicles, true));
        for visit in sol.routes()[0].visits() {
            assert!(visit.arrival_minutes.is_finite());
        }
    }

    #[test]
    fn test_end_location_lengthens_route() {
        let orders = grid_orders(3, 10.0, 0.1);
        let open = vec![Vehicle::new("v1", 500.0, 10.0, depot())];
        let closed = vec![Vehicle::new("v1", 500.0, 10.0, depot()).with_end_location(depot())];
        let a = RouteOptimizer::default().optimize(&orders, &open, false);
        let b = RouteOptimizer::default().optimize(&orders, &closed, false);
        assert!(b.total_distance() > a.total_distance());
    }
}
