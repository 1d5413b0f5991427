//! Replays an optimized solution through the event engine.

use std::collections::HashMap;

use anyhow::Context;
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    calculate_metrics, vehicle_utilization, Event, EventKind, RunOutcome, SimulationEngine,
    SimulationMetrics, SimulationState,
};
use crate::config::OptimizerConfig;
use crate::models::{Order, Solution, Vehicle, VisitKind};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// How a solution is replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayOptions {
    /// Horizon in minutes from route start.
    pub end_minutes: f64,
    /// Seed of the engine's generator.
    pub seed: u64,
    /// Probability that a delivery fails on site, in `[0, 1]`.
    pub failure_rate: f64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            end_minutes: 12.0 * 60.0,
            seed: 42,
            failure_rate: 0.0,
        }
    }
}

/// Final state and metrics of a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Engine state when the horizon was reached.
    pub state: SimulationState,
    /// Metrics derived from the state.
    pub metrics: SimulationMetrics,
}

/// Plays every route of `solution` as timed pickup and delivery events.
///
/// `orders` must be the slice the solution was optimized from, since visits
/// refer to orders by index. All orders arrive at minute zero. Deliveries
/// are judged against their windows by minute of day from
/// [`OptimizerConfig::shift_start_minutes`], the same convention as the
/// advisory time-window check. A vehicle's distance, hours and utilization
/// count once its route ends within the horizon; vehicles without a route
/// report zero utilization. Unassigned orders count as failed; orders still
/// in progress at the horizon count as neither.
pub fn replay_solution(
    solution: &Solution,
    orders: &[Order],
    vehicles: &[Vehicle],
    config: &OptimizerConfig,
    options: &ReplayOptions,
) -> ReplayReport {
    let mut engine = SimulationEngine::new(options.seed)
        .with_service_minutes(config.pickup_service_minutes, config.delivery_service_minutes);

    let windows: HashMap<String, (i64, i64)> = orders
        .iter()
        .map(|o| {
            let tw = o.time_window();
            (o.id().to_string(), (tw.earliest_minute_of_day(), tw.latest_minute_of_day()))
        })
        .collect();
    subscribe_handlers(&mut engine, windows, config, options);

    for order in orders {
        engine.add_order_arrival(
            0.0,
            order.id(),
            order.delivery_location(),
            order.weight_kg(),
            order.volume_m3(),
        );
    }

    let mut finished: HashMap<String, (f64, f64, f64)> = HashMap::new();
    for vehicle in vehicles {
        finished.insert(vehicle.id().to_string(), (0.0, 0.0, 0.0));
    }
    for route in solution.routes() {
        for visit in route.visits() {
            let Some(order) = orders.get(visit.order_index) else {
                warn!("visit refers to unknown order index {}", visit.order_index);
                continue;
            };
            match visit.kind {
                VisitKind::Pickup => engine.add_pickup_event(
                    visit.arrival_minutes,
                    order.id(),
                    route.vehicle_id(),
                    visit.location,
                ),
                VisitKind::Delivery => engine.add_delivery_event(
                    visit.arrival_minutes,
                    order.id(),
                    route.vehicle_id(),
                    visit.location,
                ),
            }
        }

        let utilization = vehicles
            .iter()
            .find(|v| v.id() == route.vehicle_id())
            .map(|v| {
                vehicle_utilization(
                    v.max_weight_kg(),
                    v.max_volume_m3(),
                    route.weight_used(),
                    route.volume_used(),
                )
            })
            .unwrap_or(0.0);
        finished.insert(
            route.vehicle_id().to_string(),
            (route.total_distance(), route.total_time() / 60.0, utilization),
        );
        engine.schedule(Event::new(
            route.total_time(),
            EventKind::VehicleAvailable,
            route.vehicle_id(),
        ));
    }
    for vehicle in vehicles {
        if !solution.routes().iter().any(|r| r.vehicle_id() == vehicle.id()) {
            engine.schedule(Event::new(0.0, EventKind::VehicleAvailable, vehicle.id()));
        }
    }
    engine.subscribe(EventKind::VehicleAvailable, move |event, ctx| {
        let (distance, hours, utilization) = finished
            .get(&event.entity_id)
            .copied()
            .with_context(|| format!("unknown vehicle {}", event.entity_id))?;
        ctx.state.total_distance_km += distance;
        ctx.state.total_vehicle_hours += hours;
        ctx.state.vehicle_utilization.insert(event.entity_id.clone(), utilization);
        Ok(())
    });
    engine.schedule(Event::new(options.end_minutes, EventKind::SimulationEnd, "system"));

    let state = engine.run(options.end_minutes).clone();
    let mut outcome = RunOutcome::from_state(&state, orders.len());
    outcome.failed_orders += solution.num_unassigned();
    let metrics = calculate_metrics(&outcome);
    info!(
        "replayed {} routes over {:.0} min: {}/{} delivered, {} failed",
        solution.num_routes(),
        options.end_minutes,
        metrics.completed_orders,
        metrics.total_orders,
        metrics.failed_orders
    );
    ReplayReport { state, metrics }
}

fn subscribe_handlers(
    engine: &mut SimulationEngine,
    windows: HashMap<String, (i64, i64)>,
    config: &OptimizerConfig,
    options: &ReplayOptions,
) {
    let shift_start = config.shift_start_minutes;
    let delivery_service = config.delivery_service_minutes;
    let failure_rate = if options.failure_rate.is_finite() {
        options.failure_rate.clamp(0.0, 1.0)
    } else {
        0.0
    };

    engine.subscribe(EventKind::OrderArrival, |_, ctx| {
        ctx.state.orders_created += 1;
        Ok(())
    });

    let start_windows = windows.clone();
    engine.subscribe(EventKind::DeliveryStart, move |event, ctx| {
        let (earliest, _) = start_windows
            .get(&event.entity_id)
            .copied()
            .with_context(|| format!("unknown order {}", event.entity_id))?;
        let arrival = minute_of_day(shift_start, event.time);
        if arrival < earliest {
            ctx.state.total_wait_minutes += (earliest - arrival) as f64;
        }
        Ok(())
    });

    engine.subscribe(EventKind::DeliveryEnd, move |event, ctx| {
        let (_, latest) = windows
            .get(&event.entity_id)
            .copied()
            .with_context(|| format!("unknown order {}", event.entity_id))?;
        if ctx.rng.random_bool(failure_rate) {
            ctx.state.orders_failed += 1;
            return Ok(());
        }
        ctx.state.orders_completed += 1;
        let arrival = minute_of_day(shift_start, event.time - delivery_service);
        ctx.state.order_delays.push((arrival - latest).max(0) as f64);
        Ok(())
    });
}

fn minute_of_day(shift_start: i64, offset_minutes: f64) -> i64 {
    (shift_start + offset_minutes.round() as i64).rem_euclid(MINUTES_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, TimeWindow};
    use crate::RouteOptimizer;
    use chrono::{Duration, TimeZone, Utc};

    fn depot() -> Location {
        Location::new(40.7128, -74.0060)
    }

    fn window(from_minute: i64, to_minute: i64) -> TimeWindow {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        TimeWindow::new(
            midnight + Duration::minutes(from_minute),
            midnight + Duration::minutes(to_minute),
        )
        .expect("valid")
    }

    // Pickup and delivery at the depot: pickup at 0, delivery at minute 15.
    fn at_depot(id: &str, tw: TimeWindow) -> Order {
        Order::new(id, depot(), depot(), tw, 10.0, 0.1)
    }

    fn spread_orders(n: usize) -> Vec<Order> {
        (0..n)
            .map(|i| {
                let f = i as f64;
                Order::new(
                    format!("o{i}"),
                    Location::new(40.705 + 0.002 * f, -74.01),
                    Location::new(40.715 + 0.002 * f, -73.995),
                    window(0, 24 * 60 - 1),
                    60.0,
                    1.0,
                )
            })
            .collect()
    }

    fn run(
        orders: &[Order],
        vehicles: &[Vehicle],
        options: &ReplayOptions,
    ) -> (Solution, ReplayReport) {
        let config = OptimizerConfig::default();
        let solution = RouteOptimizer::new(config.clone()).optimize(orders, vehicles, true);
        let report = replay_solution(&solution, orders, vehicles, &config, options);
        (solution, report)
    }

    #[test]
    fn test_full_replay_delivers_every_assigned_order() {
        let orders = spread_orders(8);
        let vehicles = vec![
            Vehicle::new("v1", 250.0, 10.0, depot()),
            Vehicle::new("v2", 250.0, 10.0, depot()),
            Vehicle::new("v3", 250.0, 10.0, depot()),
        ];
        let options = ReplayOptions {
            end_minutes: 10_000.0,
            ..ReplayOptions::default()
        };
        let (solution, report) = run(&orders, &vehicles, &options);

        assert_eq!(report.state.orders_created, 8);
        assert_eq!(report.metrics.completed_orders, solution.num_served());
        assert_eq!(report.metrics.failed_orders, solution.num_unassigned());
        assert_eq!(report.metrics.total_orders, 8);
        assert!((report.state.total_distance_km - solution.total_distance()).abs() < 1e-9);
        assert!((report.state.total_vehicle_hours - solution.total_vehicle_hours()).abs() < 1e-9);
        assert_eq!(report.metrics.on_time_percentage, 100.0);
        let utilization = &report.metrics.vehicle_utilization;
        let ids: Vec<&str> = utilization.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["v1", "v2", "v3"]);
        assert_eq!(utilization["v3"], 0.0);
    }

    #[test]
    fn test_horizon_cuts_off_unfinished_work() {
        let orders = spread_orders(6);
        let vehicles = vec![Vehicle::new("v1", 1000.0, 10.0, depot())];
        let options = ReplayOptions {
            end_minutes: 60.0,
            ..ReplayOptions::default()
        };
        let (solution, report) = run(&orders, &vehicles, &options);
        assert!(solution.routes()[0].total_time() > 60.0);
        assert!(report.metrics.completed_orders < 6);
        assert_eq!(report.state.current_time, 60.0);
        // The only route has not finished, so nothing is booked for it.
        assert_eq!(report.state.total_distance_km, 0.0);
        assert!(report.state.vehicle_utilization.is_empty());
    }

    #[test]
    fn test_lateness_by_minute_of_day() {
        let orders = vec![at_depot("late", window(0, 10)), at_depot("fine", window(0, 600))];
        let vehicles = vec![
            Vehicle::new("v1", 10.0, 1.0, depot()),
            Vehicle::new("v2", 10.0, 1.0, depot()),
        ];
        let (_, report) = run(&orders, &vehicles, &ReplayOptions::default());
        assert_eq!(report.state.order_delays, vec![5.0, 0.0]);
        assert_eq!(report.metrics.on_time_percentage, 50.0);
        assert_eq!(report.metrics.avg_delay_minutes, 2.5);
    }

    #[test]
    fn test_early_arrival_waits() {
        let orders = vec![at_depot("early", window(60, 120))];
        let vehicles = vec![Vehicle::new("v1", 100.0, 1.0, depot())];
        let (_, report) = run(&orders, &vehicles, &ReplayOptions::default());
        assert_eq!(report.state.total_wait_minutes, 45.0);
        assert_eq!(report.state.order_delays, vec![0.0]);
    }

    #[test]
    fn test_unassigned_orders_count_as_failed() {
        let mut orders = spread_orders(3);
        orders.push(Order::new("huge", depot(), depot(), window(0, 600), 5000.0, 1.0));
        let vehicles = vec![Vehicle::new("v1", 500.0, 10.0, depot())];
        let (solution, report) = run(&orders, &vehicles, &ReplayOptions::default());
        assert_eq!(solution.unassigned(), ["huge"]);
        assert_eq!(report.metrics.failed_orders, 1);
        assert_eq!(report.metrics.completion_rate, 75.0);
    }

    #[test]
    fn test_failure_rate() {
        let orders = spread_orders(5);
        let vehicles = vec![Vehicle::new("v1", 1000.0, 10.0, depot())];
        let always = ReplayOptions {
            end_minutes: 10_000.0,
            failure_rate: 1.0,
            ..ReplayOptions::default()
        };
        let (_, report) = run(&orders, &vehicles, &always);
        assert_eq!(report.metrics.completed_orders, 0);
        assert_eq!(report.metrics.failed_orders, 5);

        let coin = ReplayOptions {
            end_minutes: 10_000.0,
            failure_rate: 0.5,
            seed: 9,
        };
        let (_, a) = run(&orders, &vehicles, &coin);
        let (_, b) = run(&orders, &vehicles, &coin);
        assert_eq!(a, b);
        assert_eq!(a.metrics.completed_orders + a.metrics.failed_orders, 5);
    }
}
