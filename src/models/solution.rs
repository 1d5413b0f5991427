//! Solution type.

use serde::{Deserialize, Serialize};

use super::Route;

/// The outcome of one optimization call.
///
/// Holds one route per vehicle that received at least one order, plus the
/// identifiers of orders no vehicle could take.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Route, Solution};
///
/// let mut sol = Solution::new();
/// sol.add_route(Route::new("v1"));
/// sol.add_unassigned("o9");
/// assert_eq!(sol.num_routes(), 1);
/// assert_eq!(sol.unassigned(), ["o9"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
    unassigned: Vec<String>,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route to this solution.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Marks an order as unassigned.
    pub fn add_unassigned(&mut self, order_id: impl Into<String>) {
        self.unassigned.push(order_id.into());
    }

    /// Returns the routes in vehicle input order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Identifiers of orders not served by any route, in input order.
    pub fn unassigned(&self) -> &[String] {
        &self.unassigned
    }

    /// Number of unassigned orders.
    pub fn num_unassigned(&self) -> usize {
        self.unassigned.len()
    }

    /// Number of orders served across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// Returns `true` if there are no routes and nothing is unassigned.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.unassigned.is_empty()
    }

    /// Total distance across all routes in kilometers.
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance()).sum()
    }

    /// Total route time across all routes in hours.
    pub fn total_vehicle_hours(&self) -> f64 {
        self.routes.iter().map(|r| r.total_time()).sum::<f64>() / 60.0
    }
}
