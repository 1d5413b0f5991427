//! Optimizer configuration.

use log::warn;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the route optimizer.
///
/// Defaults reproduce the reference travel model: 40 km/h average speed,
/// 15 minutes at each pickup, 30 minutes at each delivery.
///
/// # Examples
///
/// ```
/// use u_dispatch::OptimizerConfig;
///
/// let config = OptimizerConfig::default()
///     .with_average_speed(30.0)
///     .with_distance_cache(true);
/// assert_eq!(config.average_speed_kmh, 30.0);
/// assert!(config.use_distance_cache);
/// assert_eq!(config.delivery_service_minutes, 30.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Average vehicle speed used to turn distance into travel time.
    pub average_speed_kmh: f64,
    /// Dwell time at each pickup, in minutes.
    pub pickup_service_minutes: f64,
    /// Dwell time at each delivery, in minutes.
    pub delivery_service_minutes: f64,
    /// Reuse distance matrices across calls with identical location lists.
    pub use_distance_cache: bool,
    /// Upper bound on 2-opt scans per route; each scan accepts at most one move.
    pub max_two_opt_passes: usize,
    /// Minute of day at which routes start, for the advisory time-window check.
    pub shift_start_minutes: i64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: 40.0,
            pickup_service_minutes: 15.0,
            delivery_service_minutes: 30.0,
            use_distance_cache: false,
            max_two_opt_passes: 10_000,
            shift_start_minutes: 0,
        }
    }
}

impl OptimizerConfig {
    /// Sets the average speed in km/h.
    ///
    /// A speed that is not finite and positive is ignored and the current
    /// one kept.
    pub fn with_average_speed(mut self, kmh: f64) -> Self {
        if is_valid_speed(kmh) {
            self.average_speed_kmh = kmh;
        } else {
            warn!("ignoring average speed {} km/h", kmh);
        }
        self
    }

    /// Sets pickup and delivery service times in minutes.
    pub fn with_service_minutes(mut self, pickup: f64, delivery: f64) -> Self {
        self.pickup_service_minutes = pickup;
        self.delivery_service_minutes = delivery;
        self
    }

    /// Enables or disables the distance matrix cache.
    pub fn with_distance_cache(mut self, enabled: bool) -> Self {
        self.use_distance_cache = enabled;
        self
    }

    /// Sets the 2-opt scan budget per route.
    pub fn with_max_two_opt_passes(mut self, passes: usize) -> Self {
        self.max_two_opt_passes = passes;
        self
    }

    /// Sets the route start as minutes past midnight.
    pub fn with_shift_start(mut self, minutes: i64) -> Self {
        self.shift_start_minutes = minutes;
        self
    }

    /// Minutes needed to drive `distance_km` at the average speed.
    pub fn travel_minutes(&self, distance_km: f64) -> f64 {
        distance_km / self.average_speed_kmh * 60.0
    }
}

/// Returns `true` if `kmh` can turn distances into finite travel times.
pub fn is_valid_speed(kmh: f64) -> bool {
    kmh.is_finite() && kmh > 0.0
}
