//! Seeded synthetic scenario generation.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::api::OptimizationRequest;
use crate::geo::BoundingBox;
use crate::models::{Location, Order, TimeWindow, Vehicle};

/// Length of every generated delivery window.
const WINDOW_HOURS: i64 = 2;

/// When during the day orders come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeDistribution {
    /// Anywhere in the simulated horizon.
    Uniform,
    /// 08:00-10:00 or 17:00-19:00, equally likely.
    RushHour,
    /// 17:00-22:00.
    Evening,
}

/// Weight and volume profile of generated orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeDistribution {
    /// 10-100 kg, 0.1-2 m³.
    Uniform,
    /// 50-150 kg, 0.1-0.5 m³.
    SmallHeavy,
    /// 5-30 kg, 1-5 m³.
    LargeLight,
}

impl SizeDistribution {
    fn ranges(self) -> ((f64, f64), (f64, f64)) {
        match self {
            SizeDistribution::Uniform => ((10.0, 100.0), (0.1, 2.0)),
            SizeDistribution::SmallHeavy => ((50.0, 150.0), (0.1, 0.5)),
            SizeDistribution::LargeLight => ((5.0, 30.0), (1.0, 5.0)),
        }
    }
}

/// Parameters of a synthetic dispatch scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Orders to generate.
    pub num_orders: usize,
    /// Vehicles to generate.
    pub num_vehicles: usize,
    /// Pickups and deliveries are drawn uniformly inside this box.
    pub area: BoundingBox,
    /// Arrival pattern of time windows.
    pub time_distribution: TimeDistribution,
    /// Weight and volume profile.
    pub size_distribution: SizeDistribution,
    /// Length of the simulated horizon in hours.
    pub simulation_hours: f64,
    /// Start and end location of every vehicle.
    pub depot: Location,
    /// Nominal vehicle capacity; each vehicle varies by up to ±10%.
    pub vehicle_weight_kg: f64,
    /// Nominal vehicle volume, varied like the weight.
    pub vehicle_volume_m3: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            num_orders: 50,
            num_vehicles: 5,
            area: BoundingBox::new(40.70, -74.02, 40.72, -73.98),
            time_distribution: TimeDistribution::Uniform,
            size_distribution: SizeDistribution::Uniform,
            simulation_hours: 12.0,
            depot: Location::new(40.7128, -74.0060),
            vehicle_weight_kg: 500.0,
            vehicle_volume_m3: 10.0,
        }
    }
}

impl Scenario {
    /// 20 rush-hour orders of small heavy items, 3 vehicles.
    pub fn small_peak() -> Self {
        Self {
            num_orders: 20,
            num_vehicles: 3,
            time_distribution: TimeDistribution::RushHour,
            size_distribution: SizeDistribution::SmallHeavy,
            ..Self::default()
        }
    }

    /// 50 uniformly spread orders, 5 vehicles.
    pub fn medium_uniform() -> Self {
        Self::default()
    }

    /// 100 evening orders of large light items, 10 vehicles.
    pub fn large_evening() -> Self {
        Self {
            num_orders: 100,
            num_vehicles: 10,
            time_distribution: TimeDistribution::Evening,
            size_distribution: SizeDistribution::LargeLight,
            ..Self::default()
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn random_location<R: Rng>(area: &BoundingBox, rng: &mut R) -> Location {
    Location::new(
        rng.random_range(area.min_lat..=area.max_lat),
        rng.random_range(area.min_lng..=area.max_lng),
    )
}

fn arrival_minutes<R: Rng>(scenario: &Scenario, rng: &mut R) -> f64 {
    match scenario.time_distribution {
        TimeDistribution::Uniform => rng.random_range(0.0..=scenario.simulation_hours * 60.0),
        TimeDistribution::RushHour => {
            if rng.random_bool(0.5) {
                rng.random_range(480.0..=600.0)
            } else {
                rng.random_range(1020.0..=1140.0)
            }
        }
        TimeDistribution::Evening => rng.random_range(1020.0..=1320.0),
    }
}

/// Generates orders for `scenario`, with windows offset from `base`.
///
/// Each order gets a two-hour delivery window starting at its arrival time.
/// Order ids are `order_00000`, `order_00001`, and so on.
pub fn generate_orders<R: Rng>(
    scenario: &Scenario,
    base: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Order> {
    let ((w_lo, w_hi), (v_lo, v_hi)) = scenario.size_distribution.ranges();
    let mut orders = Vec::with_capacity(scenario.num_orders);

    for i in 0..scenario.num_orders {
        let pickup = random_location(&scenario.area, rng);
        let delivery = random_location(&scenario.area, rng);
        let arrival = arrival_minutes(scenario, rng);
        let weight = round_to(rng.random_range(w_lo..=w_hi), 1);
        let volume = round_to(rng.random_range(v_lo..=v_hi), 2);

        let start = base + Duration::milliseconds((arrival * 60_000.0).round() as i64);
        let window = TimeWindow::from_start(start, Duration::hours(WINDOW_HOURS));
        orders.push(Order::new(format!("order_{i:05}"), pickup, delivery, window, weight, volume));
    }

    orders
}

/// Generates vehicles based at the scenario depot.
///
/// Capacities vary uniformly within ±10% of the nominal values. Vehicles
/// return to the depot.
pub fn generate_vehicles<R: Rng>(scenario: &Scenario, rng: &mut R) -> Vec<Vehicle> {
    (0..scenario.num_vehicles)
        .map(|i| {
            let weight = round_to(scenario.vehicle_weight_kg * rng.random_range(0.9..=1.1), 1);
            let volume = round_to(scenario.vehicle_volume_m3 * rng.random_range(0.9..=1.1), 2);
            Vehicle::new(format!("vehicle_{i:03}"), weight, volume, scenario.depot)
                .with_end_location(scenario.depot)
        })
        .collect()
}

/// Generates a complete request from a seed. Equal seeds give equal requests.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use u_dispatch::scenario::{generate, Scenario};
///
/// let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
/// let a = generate(&Scenario::small_peak(), 7, base);
/// let b = generate(&Scenario::small_peak(), 7, base);
/// assert_eq!(a, b);
/// assert_eq!(a.orders.len(), 20);
/// assert_eq!(a.vehicles.len(), 3);
/// ```
pub fn generate(scenario: &Scenario, seed: u64, base: DateTime<Utc>) -> OptimizationRequest {
    let mut rng = StdRng::seed_from_u64(seed);
    let orders = generate_orders(scenario, base, &mut rng);
    let vehicles = generate_vehicles(scenario, &mut rng);
    OptimizationRequest::new(orders, vehicles)
}
