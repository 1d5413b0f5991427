//! Intra-route 2-opt improvement over order sequences.
//!
//! # Algorithm
//!
//! For each pair of positions `(i, j)` with `j >= i + 2`, reverse the
//! orders at positions `i+1..=j` and evaluate the full route distance
//! (depot, each pickup then delivery, optional return). The first reversal
//! that shortens the route is kept and the scan restarts from the top
//! (first-improvement strategy). The order at position 0 never moves.
//!
//! Pickup and delivery of an order stay adjacent, so a reversal moves whole
//! orders and precedence always holds.
//!
//! # Complexity
//!
//! O(n³) per scan since every candidate is evaluated in full, bounded by
//! the pass budget.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use log::trace;

use crate::evaluation::RouteEvaluator;

/// Applies first-improvement 2-opt to one vehicle's order sequence.
///
/// At most `max_passes` scans are made. Returns the improved sequence and
/// its total distance; the distance is never above that of the input.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_dispatch::OptimizerConfig;
/// use u_dispatch::evaluation::RouteEvaluator;
/// use u_dispatch::local_search::two_opt_improve;
/// use u_dispatch::models::{DispatchProblem, Location, Order, TimeWindow, Vehicle};
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
/// let tw = TimeWindow::new(now, now + Duration::hours(12)).unwrap();
/// let at = |lng: f64| Location::new(0.0, lng);
/// let orders: Vec<Order> = [0.1, 0.3, 0.2, 0.4]
///     .iter()
///     .enumerate()
///     .map(|(i, &x)| Order::new(format!("o{i}"), at(x), at(x), tw, 1.0, 0.1))
///     .collect();
/// let vehicles = vec![Vehicle::new("v1", 100.0, 10.0, at(0.0))];
/// let problem = DispatchProblem::new(&orders, &vehicles, None);
/// let config = OptimizerConfig::default();
/// let evaluator = RouteEvaluator::new(&problem, 0, &config);
///
/// let (improved, dist) = two_opt_improve(&[0, 1, 2, 3], &evaluator, 100);
/// assert_eq!(improved, vec![0, 2, 1, 3]);
/// assert!(dist < evaluator.route_distance(&[0, 1, 2, 3]));
/// ```
pub fn two_opt_improve(
    sequence: &[usize],
    evaluator: &RouteEvaluator,
    max_passes: usize,
) -> (Vec<usize>, f64) {
    let mut current = sequence.to_vec();
    let mut best = evaluator.route_distance(&current);
    let n = current.len();
    if n < 3 {
        return (current, best);
    }

    let mut passes = 0;
    let mut improved = true;
    while improved && passes < max_passes {
        improved = false;
        passes += 1;

        'scan: for i in 0..n - 1 {
            for j in i + 2..n {
                current[i + 1..=j].reverse();
                let candidate = evaluator.route_distance(&current);
                if candidate < best - 1e-10 {
                    trace!(
                        "vehicle {}: 2-opt ({}, {}) {:.3} -> {:.3} km",
                        evaluator.vehicle_index(),
                        i,
                        j,
                        best,
                        candidate
                    );
                    best = candidate;
                    improved = true;
                    break 'scan;
                }
                current[i + 1..=j].reverse();
            }
        }
    }

    (current, best)
}
