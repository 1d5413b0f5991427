//! Nearest-neighbor constructive heuristic.
//!
//! Vehicles are filled one after another, in input order. Each vehicle
//! starts at its depot and repeatedly takes the unassigned order whose
//! pickup is closest to where it currently stands, among the orders that
//! still fit its remaining weight and volume. After an order is taken the
//! vehicle stands at that order's delivery location. A vehicle is done when
//! nothing left fits; the next vehicle works on whatever remains.
//!
//! # Complexity
//!
//! O(V·n²) where V = vehicles and n = orders.

use std::collections::BTreeSet;

use log::debug;

use crate::constraints::CapacityConstraint;
use crate::distance::distance_between;
use crate::models::DispatchProblem;

/// Orders taken by one vehicle during construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Index of the vehicle in the problem's input.
    pub vehicle_index: usize,
    /// Order indices in visiting order.
    pub orders: Vec<usize>,
    /// Sum of assigned order weights.
    pub weight_kg: f64,
    /// Sum of assigned order volumes.
    pub volume_m3: f64,
}

impl Assignment {
    fn new(vehicle_index: usize) -> Self {
        Self {
            vehicle_index,
            orders: Vec::new(),
            weight_kg: 0.0,
            volume_m3: 0.0,
        }
    }

    fn push(&mut self, order_index: usize, weight_kg: f64, volume_m3: f64) {
        self.orders.push(order_index);
        self.weight_kg += weight_kg;
        self.volume_m3 += volume_m3;
    }
}

/// Result of the construction phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Construction {
    /// Non-empty assignments, in vehicle input order.
    pub assignments: Vec<Assignment>,
    /// Order indices no vehicle took, ascending.
    pub unassigned: BTreeSet<usize>,
}

/// Builds initial assignments with the nearest-neighbor heuristic.
///
/// Distance ties are broken in favor of the lowest order index.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_dispatch::models::{DispatchProblem, Location, Order, TimeWindow, Vehicle};
/// use u_dispatch::constructive::nearest_neighbor;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
/// let tw = TimeWindow::new(now, now + Duration::hours(12)).unwrap();
/// let at = |lng: f64| Location::new(0.0, lng);
/// let orders = vec![
///     Order::new("far", at(0.5), at(0.6), tw, 10.0, 0.1),
///     Order::new("near", at(0.1), at(0.2), tw, 10.0, 0.1),
/// ];
/// let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, at(0.0))];
/// let problem = DispatchProblem::new(&orders, &vehicles, None);
///
/// let construction = nearest_neighbor(&problem);
/// assert_eq!(construction.assignments[0].orders, vec![1, 0]);
/// assert!(construction.unassigned.is_empty());
/// ```
pub fn nearest_neighbor(problem: &DispatchProblem) -> Construction {
    let mut unassigned: BTreeSet<usize> = (0..problem.orders().len()).collect();
    let mut assignments = Vec::new();

    for vehicle_index in 0..problem.vehicles().len() {
        if unassigned.is_empty() {
            break;
        }
        let assignment = fill_vehicle(problem, vehicle_index, &mut unassigned);
        debug!(
            "vehicle {} took {} orders ({:.1} kg, {:.2} m3)",
            problem.vehicles()[vehicle_index].id(),
            assignment.orders.len(),
            assignment.weight_kg,
            assignment.volume_m3
        );
        if !assignment.orders.is_empty() {
            assignments.push(assignment);
        }
    }

    Construction {
        assignments,
        unassigned,
    }
}

/// Greedily loads one vehicle from the shared pool.
fn fill_vehicle(
    problem: &DispatchProblem,
    vehicle_index: usize,
    unassigned: &mut BTreeSet<usize>,
) -> Assignment {
    let vehicle = &problem.vehicles()[vehicle_index];
    let orders = problem.orders();
    let capacity = CapacityConstraint::new(vehicle.max_weight_kg(), vehicle.max_volume_m3());
    let mut assignment = Assignment::new(vehicle_index);
    let mut current = vehicle.start_location();

    loop {
        let mut best: Option<(usize, f64)> = None;
        for &oi in unassigned.iter() {
            let order = &orders[oi];
            if !capacity.admits(
                assignment.weight_kg,
                assignment.volume_m3,
                order.weight_kg(),
                order.volume_m3(),
            ) {
                continue;
            }
            let d = distance_between(current, order.pickup_location());
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((oi, d));
            }
        }

        match best {
            Some((next, _)) => {
                unassigned.remove(&next);
                let order = &orders[next];
                assignment.push(next, order.weight_kg(), order.volume_m3());
                current = order.delivery_location();
            }
            None => break,
        }
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Order, TimeWindow, Vehicle};
    use chrono::{Duration, TimeZone, Utc};

    fn tw() -> TimeWindow {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        TimeWindow::new(now, now + Duration::hours(12)).expect("valid")
    }

    fn at(lng: f64) -> Location {
        Location::new(0.0, lng)
    }

    fn line_orders(weight: f64, volume: f64) -> Vec<Order> {
        (0..4)
            .map(|i| {
                let x = 0.1 * (i + 1) as f64;
                Order::new(format!("o{i}"), at(x), at(x + 0.01), tw(), weight, volume)
            })
            .collect()
    }

    #[test]
    fn test_nn_all_on_one_vehicle() {
        let orders = line_orders(10.0, 0.1);
        let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, at(0.0))];
        let problem = DispatchProblem::new(&orders, &vehicles, None);
        let c = nearest_neighbor(&problem);
        assert_eq!(c.assignments.len(), 1);
        assert_eq!(c.assignments[0].orders, vec![0, 1, 2, 3]);
        assert!((c.assignments[0].weight_kg - 40.0).abs() < 1e-10);
        assert!(c.unassigned.is_empty());
    }

    #[test]
    fn test_nn_moves_from_delivery_location() {
        // After o0 the vehicle stands at 0.5 where o1's pickup waits.
        let orders = vec![
            Order::new("o0", at(0.1), at(0.5), tw(), 1.0, 0.1),
            Order::new("o1", at(0.5), at(0.6), tw(), 1.0, 0.1),
            Order::new("o2", at(0.2), at(0.25), tw(), 1.0, 0.1),
        ];
        let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, at(0.0))];
        let problem = DispatchProblem::new(&orders, &vehicles, None);
        let c = nearest_neighbor(&problem);
        assert_eq!(c.assignments[0].orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_nn_split_across_vehicles() {
        let orders = line_orders(60.0, 0.1);
        let vehicles = vec![
            Vehicle::new("v1", 130.0, 1.0, at(0.0)),
            Vehicle::new("v2", 130.0, 1.0, at(0.0)),
        ];
        let problem = DispatchProblem::new(&orders, &vehicles, None);
        let c = nearest_neighbor(&problem);
        assert_eq!(c.assignments.len(), 2);
        assert_eq!(c.assignments[0].orders, vec![0, 1]);
        assert_eq!(c.assignments[1].orders, vec![2, 3]);
        assert!(c.unassigned.is_empty());
    }

    #[test]
    fn test_nn_skips_orders_that_do_not_fit() {
        let mut orders = line_orders(10.0, 0.1);
        orders[0] = Order::new("heavy", at(0.1), at(0.11), tw(), 500.0, 0.1);
        let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, at(0.0))];
        let problem = DispatchProblem::new(&orders, &vehicles, None);
        let c = nearest_neighbor(&problem);
        assert_eq!(c.assignments[0].orders, vec![1, 2, 3]);
        assert_eq!(c.unassigned.iter().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_nn_volume_limit() {
        let orders = line_orders(1.0, 0.4);
        let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, at(0.0))];
        let problem = DispatchProblem::new(&orders, &vehicles, None);
        let c = nearest_neighbor(&problem);
        assert_eq!(c.assignments[0].orders, vec![0, 1]);
        assert_eq!(c.unassigned.len(), 2);
    }

    #[test]
    fn test_nn_tie_goes_to_lowest_index() {
        let orders = vec![
            Order::new("east", at(0.1), at(0.1), tw(), 1.0, 0.1),
            Order::new("west", at(-0.1), at(-0.1), tw(), 1.0, 0.1),
        ];
        let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, at(0.0))];
        let problem = DispatchProblem::new(&orders, &vehicles, None);
        let c = nearest_neighbor(&problem);
        assert_eq!(c.assignments[0].orders, vec![0, 1]);
    }

    #[test]
    fn test_nn_empty_vehicle_produces_no_assignment() {
        let orders = line_orders(10.0, 0.1);
        let vehicles = vec![
            Vehicle::new("tiny", 1.0, 1.0, at(0.0)),
            Vehicle::new("big", 100.0, 1.0, at(0.0)),
        ];
        let problem = DispatchProblem::new(&orders, &vehicles, None);
        let c = nearest_neighbor(&problem);
        assert_eq!(c.assignments.len(), 1);
        assert_eq!(c.assignments[0].vehicle_index, 1);
    }

    #[test]
    fn test_nn_no_vehicles() {
        let orders = line_orders(10.0, 0.1);
        let problem = DispatchProblem::new(&orders, &[], None);
        let c = nearest_neighbor(&problem);
        assert!(c.assignments.is_empty());
        assert_eq!(c.unassigned.len(), 4);
    }
}
