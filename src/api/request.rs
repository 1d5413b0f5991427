//! Optimization request parsing and validation.

use std::collections::HashSet;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{Order, Vehicle};

fn default_use_2opt() -> bool {
    true
}

/// Orders and vehicles to optimize, as received at the boundary.
///
/// # Examples
///
/// ```
/// use u_dispatch::api::OptimizationRequest;
///
/// let json = r#"{
///     "orders": [{
///         "id": "o1",
///         "pickup_location": [40.715, -74.010],
///         "delivery_location": [40.730, -73.995],
///         "time_window": {
///             "earliest": "2024-03-01T09:00:00Z",
///             "latest": "2024-03-01T11:00:00Z"
///         },
///         "weight_kg": 50.0,
///         "volume_m3": 1.0
///     }],
///     "vehicles": [{
///         "id": "v1",
///         "max_weight_kg": 500.0,
///         "max_volume_m3": 10.0,
///         "start_location": [40.7128, -74.0060]
///     }]
/// }"#;
/// let request = OptimizationRequest::from_json(json).unwrap();
/// assert!(request.use_2opt);
/// assert_eq!(request.orders.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Orders to dispatch; ids must be unique.
    pub orders: Vec<Order>,
    /// Available vehicles, used in this order by construction.
    pub vehicles: Vec<Vehicle>,
    /// Run 2-opt on every route. Defaults to `true` when absent.
    #[serde(default = "default_use_2opt")]
    pub use_2opt: bool,
}

impl OptimizationRequest {
    /// Creates a request with 2-opt enabled.
    pub fn new(orders: Vec<Order>, vehicles: Vec<Vehicle>) -> Self {
        Self {
            orders,
            vehicles,
            use_2opt: true,
        }
    }

    /// Parses and validates a JSON request.
    pub fn from_json(json: &str) -> Result<Self> {
        let request: Self =
            serde_json::from_str(json).context("Failed to parse optimization request")?;
        request.validate().context("Invalid optimization request")?;
        Ok(request)
    }

    /// Serializes the request as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize optimization request")
    }

    /// Checks quantities, identifiers and time windows.
    pub fn validate(&self) -> Result<()> {
        let mut order_ids = HashSet::new();
        for order in &self.orders {
            ensure!(order_ids.insert(order.id()), "Duplicate order id: {}", order.id());
            ensure!(
                order.weight_kg() > 0.0,
                "Order {} weight must be positive, got {}",
                order.id(),
                order.weight_kg()
            );
            ensure!(
                order.volume_m3() > 0.0,
                "Order {} volume must be positive, got {}",
                order.id(),
                order.volume_m3()
            );
            ensure!(
                order.time_window().is_valid(),
                "Order {} time window ends before it starts",
                order.id()
            );
        }

        let mut vehicle_ids = HashSet::new();
        for vehicle in &self.vehicles {
            ensure!(vehicle_ids.insert(vehicle.id()), "Duplicate vehicle id: {}", vehicle.id());
            ensure!(
                vehicle.max_weight_kg() > 0.0,
                "Vehicle {} weight capacity must be positive, got {}",
                vehicle.id(),
                vehicle.max_weight_kg()
            );
            ensure!(
                vehicle.max_volume_m3() > 0.0,
                "Vehicle {} volume capacity must be positive, got {}",
                vehicle.id(),
                vehicle.max_volume_m3()
            );
        }

        Ok(())
    }
}
