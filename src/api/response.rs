//! Optimization result types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{Location, Route, Solution};

/// Name reported for the construction plus improvement pipeline.
pub const ALGORITHM: &str = "nearest_neighbor_2opt";

/// One delivery on a summarized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSummary {
    /// Id of the delivered order.
    pub order_id: String,
    /// Where the order is dropped off.
    pub location: Location,
    /// Projected delivery arrival, whole minutes from route start.
    pub arrival_minute: i64,
    /// Dwell time at the delivery.
    pub service_minutes: f64,
}

/// A route as reported at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// `route_` followed by the vehicle id.
    pub route_id: String,
    /// Vehicle driving the route.
    pub vehicle_id: String,
    /// Deliveries in visiting order.
    pub stops: Vec<StopSummary>,
    /// Route length including any return leg, in kilometers.
    pub total_distance_km: f64,
    /// Driving plus service time, in minutes.
    pub total_time_minutes: f64,
    /// Total weight carried.
    pub weight_used_kg: f64,
    /// Total volume carried.
    pub volume_used_m3: f64,
}

impl RouteSummary {
    /// Summarizes a route using its visit timeline.
    pub fn from_route(route: &Route, delivery_service_minutes: f64) -> Self {
        let stops = route
            .stops()
            .iter()
            .filter_map(|stop| {
                route.delivery_visit(stop.order_index).map(|visit| StopSummary {
                    order_id: stop.order_id.clone(),
                    location: visit.location,
                    arrival_minute: visit.arrival_minutes.round() as i64,
                    service_minutes: delivery_service_minutes,
                })
            })
            .collect();

        Self {
            route_id: format!("route_{}", route.vehicle_id()),
            vehicle_id: route.vehicle_id().to_string(),
            stops,
            total_distance_km: route.total_distance(),
            total_time_minutes: route.total_time(),
            weight_used_kg: route.weight_used(),
            volume_used_m3: route.volume_used(),
        }
    }
}

/// Response to an [`OptimizationRequest`](super::OptimizationRequest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// One summary per vehicle that received orders.
    pub routes: Vec<RouteSummary>,
    /// Ids of orders no vehicle could take, in request order.
    pub unassigned_orders: Vec<String>,
    /// Sum of route distances.
    pub total_distance_km: f64,
    /// Sum of route times, in hours.
    pub total_vehicle_hours: f64,
    /// Wall-clock time spent optimizing.
    pub optimization_time_seconds: f64,
    /// Always [`ALGORITHM`].
    pub algorithm: String,
}

impl OptimizationResult {
    /// Builds the response from a solution and the time spent producing it.
    pub fn from_solution(
        solution: &Solution,
        delivery_service_minutes: f64,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            routes: solution
                .routes()
                .iter()
                .map(|r| RouteSummary::from_route(r, delivery_service_minutes))
                .collect(),
            unassigned_orders: solution.unassigned().to_vec(),
            total_distance_km: solution.total_distance(),
            total_vehicle_hours: solution.total_vehicle_hours(),
            optimization_time_seconds: elapsed_seconds,
            algorithm: ALGORITHM.to_string(),
        }
    }

    /// Serializes the result as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize optimization result")
    }
}
