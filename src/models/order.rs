//! Delivery order and time window types.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::Location;

/// A delivery time window between two instants.
///
/// Only the upper bound is a hard limit: arriving early is allowed, arriving
/// after `latest` is not.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_dispatch::models::TimeWindow;
///
/// let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
/// let tw = TimeWindow::new(start, start + Duration::hours(2)).unwrap();
/// assert!(tw.contains(start + Duration::minutes(30)));
/// assert!(tw.is_feasible(start - Duration::minutes(30)));
/// assert!(!tw.is_feasible(start + Duration::hours(3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `earliest > latest`.
    pub fn new(earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Option<Self> {
        if earliest > latest {
            return None;
        }
        Some(Self { earliest, latest })
    }

    /// Earliest delivery instant.
    pub fn earliest(&self) -> DateTime<Utc> {
        self.earliest
    }

    /// Latest delivery instant.
    pub fn latest(&self) -> DateTime<Utc> {
        self.latest
    }

    /// Creates a window of `length` starting at `start`.
    ///
    /// A negative length collapses the window to a single instant.
    pub fn from_start(start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            earliest: start,
            latest: start + length.max(Duration::zero()),
        }
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.latest - self.earliest
    }

    /// Returns `true` if `time` lies within the window, bounds included.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.earliest <= time && time <= self.latest
    }

    /// Returns `true` if arriving at `arrival` does not miss the window.
    pub fn is_feasible(&self, arrival: DateTime<Utc>) -> bool {
        arrival <= self.latest
    }

    /// Returns `true` if `earliest <= latest`.
    ///
    /// Always holds for windows built with [`TimeWindow::new`]; deserialized
    /// windows are not checked on the way in.
    pub fn is_valid(&self) -> bool {
        self.earliest <= self.latest
    }

    /// Earliest bound as minutes past midnight (UTC).
    pub fn earliest_minute_of_day(&self) -> i64 {
        minute_of_day(self.earliest)
    }

    /// Latest bound as minutes past midnight (UTC).
    pub fn latest_minute_of_day(&self) -> i64 {
        minute_of_day(self.latest)
    }
}

fn minute_of_day(t: DateTime<Utc>) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

/// A delivery order: pick up goods at one location, deliver them to another.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_dispatch::models::{Location, Order, TimeWindow};
///
/// let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
/// let tw = TimeWindow::new(start, start + Duration::hours(12)).unwrap();
/// let order = Order::new(
///     "o1",
///     Location::new(40.7130, -74.0060),
///     Location::new(40.7200, -74.0150),
///     tw,
///     50.0,
///     1.0,
/// );
/// assert_eq!(order.id(), "o1");
/// assert_eq!(order.weight_kg(), 50.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: String,
    #[serde(rename = "pickup_location")]
    pickup: Location,
    #[serde(rename = "delivery_location")]
    delivery: Location,
    time_window: TimeWindow,
    weight_kg: f64,
    volume_m3: f64,
}

impl Order {
    /// Creates a new order.
    pub fn new(
        id: impl Into<String>,
        pickup: Location,
        delivery: Location,
        time_window: TimeWindow,
        weight_kg: f64,
        volume_m3: f64,
    ) -> Self {
        Self {
            id: id.into(),
            pickup,
            delivery,
            time_window,
            weight_kg,
            volume_m3,
        }
    }

    /// Order identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the goods are collected.
    pub fn pickup_location(&self) -> Location {
        self.pickup
    }

    /// Where the goods are dropped off.
    pub fn delivery_location(&self) -> Location {
        self.delivery
    }

    /// Delivery time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Weight in kilograms.
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    /// Volume in cubic meters.
    pub fn volume_m3(&self) -> f64 {
        self.volume_m3
    }

    /// Direct pickup-to-delivery distance in kilometers.
    pub fn direct_distance(&self) -> f64 {
        self.pickup.distance_to(&self.delivery)
    }
}
