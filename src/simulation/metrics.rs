//! Run metrics: completion, punctuality, cost and utilization.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::SimulationState;

/// Operating cost per kilometer driven.
pub const COST_PER_KM: f64 = 1.50;

/// Operating cost per vehicle hour.
pub const COST_PER_HOUR: f64 = 20.0;

/// Raw totals of a simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    /// Orders in the run; zero means completed plus failed.
    pub total_orders: usize,
    /// Orders delivered.
    pub completed_orders: usize,
    /// Orders not delivered.
    pub failed_orders: usize,
    /// Lateness per completed delivery, in minutes.
    pub order_delays: Vec<f64>,
    /// Deliveries made within their window.
    pub on_time_count: usize,
    /// Kilometers driven.
    pub total_distance_km: f64,
    /// Vehicle hours used.
    pub total_vehicle_hours: f64,
    /// Vehicle id to utilization percentage.
    pub vehicle_utilization: BTreeMap<String, f64>,
}

impl RunOutcome {
    /// Collects the totals recorded in `state`.
    ///
    /// A delivery is on time when its recorded delay is not positive.
    pub fn from_state(state: &SimulationState, total_orders: usize) -> Self {
        Self {
            total_orders,
            completed_orders: state.orders_completed,
            failed_orders: state.orders_failed,
            order_delays: state.order_delays.clone(),
            on_time_count: state.order_delays.iter().filter(|&&d| d <= 0.0).count(),
            total_distance_km: state.total_distance_km,
            total_vehicle_hours: state.total_vehicle_hours,
            vehicle_utilization: state.vehicle_utilization.clone(),
        }
    }
}

/// Summary figures of a simulation run, rounded to two decimals.
///
/// `Display` renders the text report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Completed orders as a percentage of all orders.
    pub completion_rate: f64,
    /// Mean lateness over completed deliveries, in minutes.
    pub avg_delay_minutes: f64,
    /// Vehicle id to utilization percentage.
    pub vehicle_utilization: BTreeMap<String, f64>,
    /// Distance and labor cost divided by completed orders.
    pub cost_per_delivery: f64,
    /// On-time deliveries as a percentage of completed orders.
    pub on_time_percentage: f64,
    /// Kilometers driven.
    pub total_distance_km: f64,
    /// Vehicle hours used.
    pub total_vehicle_hours: f64,
    /// Completed orders per vehicle.
    pub avg_orders_per_vehicle: f64,
    /// Orders in the run.
    pub total_orders: usize,
    /// Orders delivered.
    pub completed_orders: usize,
    /// Orders not delivered.
    pub failed_orders: usize,
}

/// Derives rates, averages and cost from the raw totals of a run.
///
/// Rates with a zero denominator are zero. Without utilization entries the
/// fleet counts as one vehicle.
///
/// # Examples
///
/// ```
/// use u_dispatch::simulation::{calculate_metrics, RunOutcome};
///
/// let metrics = calculate_metrics(&RunOutcome {
///     total_orders: 100,
///     completed_orders: 100,
///     total_distance_km: 1000.0,
///     total_vehicle_hours: 100.0,
///     on_time_count: 100,
///     ..RunOutcome::default()
/// });
/// // 1000 km at 1.50 plus 100 h at 20.0, over 100 deliveries
/// assert_eq!(metrics.cost_per_delivery, 35.0);
/// ```
pub fn calculate_metrics(outcome: &RunOutcome) -> SimulationMetrics {
    let total_orders = if outcome.total_orders == 0 {
        outcome.completed_orders + outcome.failed_orders
    } else {
        outcome.total_orders
    };
    let completed = outcome.completed_orders;

    let avg_delay = if outcome.order_delays.is_empty() {
        0.0
    } else {
        outcome.order_delays.iter().sum::<f64>() / outcome.order_delays.len() as f64
    };

    let total_cost =
        outcome.total_distance_km * COST_PER_KM + outcome.total_vehicle_hours * COST_PER_HOUR;
    let cost_per_delivery = if completed > 0 {
        total_cost / completed as f64
    } else {
        0.0
    };

    let vehicles = outcome.vehicle_utilization.len().max(1);

    SimulationMetrics {
        completion_rate: round2(percentage(completed, total_orders)),
        avg_delay_minutes: round2(avg_delay),
        vehicle_utilization: outcome.vehicle_utilization.clone(),
        cost_per_delivery: round2(cost_per_delivery),
        on_time_percentage: round2(percentage(outcome.on_time_count, completed)),
        total_distance_km: round2(outcome.total_distance_km),
        total_vehicle_hours: round2(outcome.total_vehicle_hours),
        avg_orders_per_vehicle: round2(completed as f64 / vehicles as f64),
        total_orders,
        completed_orders: completed,
        failed_orders: outcome.failed_orders,
    }
}

/// Mean of weight and volume utilization in percent, capped at 100.
///
/// A dimension with non-positive capacity contributes zero.
pub fn vehicle_utilization(
    max_weight_kg: f64,
    max_volume_m3: f64,
    weight_kg: f64,
    volume_m3: f64,
) -> f64 {
    let share = |used: f64, capacity: f64| {
        if capacity > 0.0 {
            used / capacity * 100.0
        } else {
            0.0
        }
    };
    let mean = (share(weight_kg, max_weight_kg) + share(volume_m3, max_volume_m3)) / 2.0;
    mean.min(100.0)
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl fmt::Display for SimulationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "SIMULATION METRICS REPORT")?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "Orders Completed:         {}/{} ({}%)",
            self.completed_orders, self.total_orders, self.completion_rate
        )?;
        writeln!(f, "Failed Orders:            {}", self.failed_orders)?;
        writeln!(f, "On-Time Deliveries:       {}%", self.on_time_percentage)?;
        writeln!(f, "Average Delay:            {} minutes", self.avg_delay_minutes)?;
        writeln!(f)?;
        writeln!(f, "OPERATIONAL METRICS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total Distance:           {} km", self.total_distance_km)?;
        writeln!(f, "Total Vehicle Hours:      {} hours", self.total_vehicle_hours)?;
        writeln!(f, "Avg Orders per Vehicle:   {}", self.avg_orders_per_vehicle)?;
        writeln!(f, "Cost per Delivery:        ${}", self.cost_per_delivery)?;
        writeln!(f)?;
        writeln!(f, "VEHICLE UTILIZATION")?;
        writeln!(f, "{rule}")?;
        for (vehicle_id, utilization) in &self.vehicle_utilization {
            writeln!(f, "{vehicle_id}: {utilization:.1}%")?;
        }
        Ok(())
    }
}
