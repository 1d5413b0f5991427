//! Vehicle positions, stop progress and ETA projection.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::is_valid_speed;
use crate::models::{Location, Route, VisitKind};

/// Progress of a tracked stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    /// Not reached yet; counted in ETA projections.
    Pending,
    /// Vehicle is at the stop.
    Arrived,
    /// Delivery done.
    Completed,
}

/// A delivery stop on a tracked route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedStop {
    /// Order delivered at this stop.
    pub order_id: String,
    /// Delivery location.
    pub location: Location,
    /// Current progress.
    pub status: StopStatus,
    /// When the vehicle reached the stop.
    pub arrived_at: Option<DateTime<Utc>>,
    /// When the delivery was completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TrackedStop {
    /// Creates a pending stop.
    pub fn new(order_id: impl Into<String>, location: Location) -> Self {
        Self {
            order_id: order_id.into(),
            location,
            status: StopStatus::Pending,
            arrived_at: None,
            completed_at: None,
        }
    }
}

/// Last reported position of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehiclePosition {
    /// Reported coordinates.
    pub location: Location,
    /// When the position was reported.
    pub timestamp: DateTime<Utc>,
    /// Reported speed; projections use the tracker's average speed instead.
    pub speed_kmh: f64,
    /// Degrees clockwise from north.
    pub heading: f64,
}

impl VehiclePosition {
    /// Creates a stationary position report.
    pub fn new(location: Location, timestamp: DateTime<Utc>) -> Self {
        Self {
            location,
            timestamp,
            speed_kmh: 0.0,
            heading: 0.0,
        }
    }
}

/// Tracks where vehicles are and projects when they finish.
///
/// Projections assume a constant average speed and a fixed service time at
/// every remaining stop. Positions are supplied by the caller.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use u_dispatch::models::Location;
/// use u_dispatch::tracking::{TrackedStop, VehiclePosition, VehicleTracker};
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
/// let mut tracker = VehicleTracker::new();
/// tracker.register_route("v1", vec![TrackedStop::new("o1", Location::new(0.0, 0.1))]);
/// assert!(tracker.eta("v1", now).is_none());
///
/// tracker.update_position("v1", VehiclePosition::new(Location::new(0.0, 0.0), now));
/// let eta = tracker.eta("v1", now).unwrap();
/// // ~11.1 km at 40 km/h plus 30 minutes of service
/// assert!((eta - now).num_minutes() >= 46);
/// ```
#[derive(Debug, Clone)]
pub struct VehicleTracker {
    positions: HashMap<String, VehiclePosition>,
    routes: HashMap<String, Vec<TrackedStop>>,
    average_speed_kmh: f64,
    service_minutes: f64,
}

impl Default for VehicleTracker {
    fn default() -> Self {
        Self {
            positions: HashMap::new(),
            routes: HashMap::new(),
            average_speed_kmh: 40.0,
            service_minutes: 30.0,
        }
    }
}

impl VehicleTracker {
    /// Creates a tracker at 40 km/h with 30 minutes of service per stop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the average speed used for projections.
    ///
    /// A speed that is not finite and positive is ignored.
    pub fn with_average_speed(mut self, kmh: f64) -> Self {
        if is_valid_speed(kmh) {
            self.average_speed_kmh = kmh;
        } else {
            warn!("ignoring tracker speed {} km/h", kmh);
        }
        self
    }

    /// Sets the service time spent at each stop.
    pub fn with_service_minutes(mut self, minutes: f64) -> Self {
        self.service_minutes = minutes;
        self
    }

    /// Registers (or replaces) the stops of a vehicle.
    pub fn register_route(&mut self, vehicle_id: impl Into<String>, stops: Vec<TrackedStop>) {
        self.routes.insert(vehicle_id.into(), stops);
    }

    /// Registers the deliveries of an optimized route, in visiting order.
    pub fn register_from_route(&mut self, route: &Route) {
        let stops = route
            .visits()
            .iter()
            .filter(|v| v.kind == VisitKind::Delivery)
            .filter_map(|v| {
                route
                    .stops()
                    .iter()
                    .find(|s| s.order_index == v.order_index)
                    .map(|s| TrackedStop::new(s.order_id.clone(), v.location))
            })
            .collect();
        self.register_route(route.vehicle_id(), stops);
    }

    /// Records the latest position of a vehicle.
    pub fn update_position(&mut self, vehicle_id: impl Into<String>, position: VehiclePosition) {
        let vehicle_id = vehicle_id.into();
        debug!(
            "vehicle {} at ({:.5}, {:.5})",
            vehicle_id, position.location.lat, position.location.lng
        );
        self.positions.insert(vehicle_id, position);
    }

    /// Last known position of a vehicle.
    pub fn position(&self, vehicle_id: &str) -> Option<&VehiclePosition> {
        self.positions.get(vehicle_id)
    }

    /// Stops registered for a vehicle; empty when none are.
    pub fn stops(&self, vehicle_id: &str) -> &[TrackedStop] {
        self.routes.get(vehicle_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Marks a stop as reached. Returns `false` if the stop is unknown.
    pub fn mark_stop_arrived(
        &mut self,
        vehicle_id: &str,
        order_id: &str,
        at: DateTime<Utc>,
    ) -> bool {
        match self.stop_mut(vehicle_id, order_id) {
            Some(stop) => {
                stop.status = StopStatus::Arrived;
                stop.arrived_at = Some(at);
                debug!("vehicle {} arrived at {}", vehicle_id, order_id);
                true
            }
            None => false,
        }
    }

    /// Marks a stop as served. Returns `false` if the stop is unknown.
    pub fn mark_stop_completed(
        &mut self,
        vehicle_id: &str,
        order_id: &str,
        at: DateTime<Utc>,
    ) -> bool {
        match self.stop_mut(vehicle_id, order_id) {
            Some(stop) => {
                stop.status = StopStatus::Completed;
                stop.arrived_at.get_or_insert(at);
                stop.completed_at = Some(at);
                debug!("vehicle {} completed {}", vehicle_id, order_id);
                true
            }
            None => false,
        }
    }

    /// Projected time at which the vehicle finishes every pending stop.
    ///
    /// Returns `None` without a registered route or a known position, or
    /// when the projection falls outside the representable time range.
    /// Returns `now` when nothing is pending.
    pub fn eta(&self, vehicle_id: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let stops = self.routes.get(vehicle_id)?;
        let position = self.positions.get(vehicle_id)?;

        let mut current = position.location;
        let mut minutes = 0.0;
        for stop in stops.iter().filter(|s| s.status == StopStatus::Pending) {
            minutes += self.travel_minutes(current, stop.location) + self.service_minutes;
            current = stop.location;
        }
        now.checked_add_signed(minutes_to_duration(minutes)?)
    }

    /// Projected arrival at the stop of `order_id`.
    ///
    /// Service is counted at every pending stop before the target but not at
    /// the target itself. For a stop already reached the recorded arrival is
    /// returned.
    pub fn eta_to_stop(
        &self,
        vehicle_id: &str,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let stops = self.routes.get(vehicle_id)?;
        let position = self.positions.get(vehicle_id)?;
        let target = stops.iter().position(|s| s.order_id == order_id)?;
        if stops[target].status != StopStatus::Pending {
            return stops[target].arrived_at;
        }

        let mut current = position.location;
        let mut minutes = 0.0;
        for stop in stops[..target].iter().filter(|s| s.status == StopStatus::Pending) {
            minutes += self.travel_minutes(current, stop.location) + self.service_minutes;
            current = stop.location;
        }
        minutes += self.travel_minutes(current, stops[target].location);
        now.checked_add_signed(minutes_to_duration(minutes)?)
    }

    fn stop_mut(&mut self, vehicle_id: &str, order_id: &str) -> Option<&mut TrackedStop> {
        self.routes
            .get_mut(vehicle_id)?
            .iter_mut()
            .find(|s| s.order_id == order_id)
    }

    fn travel_minutes(&self, from: Location, to: Location) -> f64 {
        from.distance_to(&to) / self.average_speed_kmh * 60.0
    }
}

fn minutes_to_duration(minutes: f64) -> Option<Duration> {
    let millis = (minutes * 60_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stop;
    use crate::models::Visit;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn at(lng: f64) -> Location {
        Location::new(0.0, lng)
    }

    fn leg_minutes() -> f64 {
        at(0.0).distance_to(&at(0.1)) / 40.0 * 60.0
    }

    fn tracker() -> VehicleTracker {
        let mut t = VehicleTracker::new();
        t.register_route(
            "v1",
            vec![
                TrackedStop::new("a", at(0.1)),
                TrackedStop::new("b", at(0.2)),
                TrackedStop::new("c", at(0.3)),
            ],
        );
        t.update_position("v1", VehiclePosition::new(at(0.0), now()));
        t
    }

    fn minutes_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
        (b - a).num_milliseconds() as f64 / 60_000.0
    }

    #[test]
    fn test_eta_requires_route_and_position() {
        let mut t = VehicleTracker::new();
        assert!(t.eta("v1", now()).is_none());
        t.update_position("v1", VehiclePosition::new(at(0.0), now()));
        assert!(t.eta("v1", now()).is_none());
        t.register_route("v2", vec![TrackedStop::new("a", at(0.1))]);
        assert!(t.eta("v2", now()).is_none());
        assert!(t.eta_to_stop("v2", "a", now()).is_none());
    }

    #[test]
    fn test_eta_all_pending() {
        let t = tracker();
        let eta = t.eta("v1", now()).expect("tracked");
        let expected = 3.0 * leg_minutes() + 3.0 * 30.0;
        assert!((minutes_between(now(), eta) - expected).abs() < 0.01);
    }

    #[test]
    fn test_eta_skips_completed() {
        let mut t = tracker();
        assert!(t.mark_stop_completed("v1", "a", now()));
        t.update_position("v1", VehiclePosition::new(at(0.1), now()));
        let eta = t.eta("v1", now()).expect("tracked");
        let expected = 2.0 * leg_minutes() + 2.0 * 30.0;
        assert!((minutes_between(now(), eta) - expected).abs() < 0.01);
    }

    #[test]
    fn test_eta_nothing_pending_is_now() {
        let mut t = tracker();
        for id in ["a", "b", "c"] {
            t.mark_stop_completed("v1", id, now());
        }
        assert_eq!(t.eta("v1", now()), Some(now()));
    }

    #[test]
    fn test_eta_to_stop_excludes_target_service() {
        let t = tracker();
        let eta = t.eta_to_stop("v1", "b", now()).expect("tracked");
        let expected = 2.0 * leg_minutes() + 30.0;
        assert!((minutes_between(now(), eta) - expected).abs() < 0.01);
        assert!(t.eta_to_stop("v1", "zzz", now()).is_none());
    }

    #[test]
    fn test_eta_to_reached_stop_is_recorded_arrival() {
        let mut t = tracker();
        let arrived = now() + Duration::minutes(17);
        assert!(t.mark_stop_arrived("v1", "a", arrived));
        assert_eq!(t.stops("v1")[0].status, StopStatus::Arrived);
        assert_eq!(t.eta_to_stop("v1", "a", now()), Some(arrived));
    }

    #[test]
    fn test_mark_unknown_stop() {
        let mut t = tracker();
        assert!(!t.mark_stop_arrived("v1", "zzz", now()));
        assert!(!t.mark_stop_completed("v9", "a", now()));
    }

    #[test]
    fn test_completed_keeps_first_arrival() {
        let mut t = tracker();
        let arrived = now() + Duration::minutes(5);
        let done = now() + Duration::minutes(35);
        t.mark_stop_arrived("v1", "a", arrived);
        t.mark_stop_completed("v1", "a", done);
        let stop = &t.stops("v1")[0];
        assert_eq!(stop.status, StopStatus::Completed);
        assert_eq!(stop.arrived_at, Some(arrived));
        assert_eq!(stop.completed_at, Some(done));
    }

    #[test]
    fn test_zero_speed_keeps_default() {
        let mut t = VehicleTracker::new().with_average_speed(0.0);
        t.register_route("v1", vec![TrackedStop::new("a", at(0.1))]);
        t.update_position("v1", VehiclePosition::new(at(0.0), now()));
        let eta = t.eta("v1", now()).expect("finite projection");
        assert!((minutes_between(now(), eta) - (leg_minutes() + 30.0)).abs() < 0.01);
        assert!(t.eta_to_stop("v1", "a", now()).is_some());
    }

    #[test]
    fn test_unrepresentable_projection_is_none() {
        assert!(minutes_to_duration(f64::INFINITY).is_none());
        assert!(minutes_to_duration(f64::NAN).is_none());
        assert!(minutes_to_duration(1e300).is_none());
        assert_eq!(minutes_to_duration(1.5), Some(Duration::seconds(90)));
    }

    #[test]
    fn test_register_from_route() {
        let mut route = Route::new("v3");
        for (i, id) in ["x", "y"].iter().enumerate() {
            let x = 0.1 * (i + 1) as f64;
            route.push_visit(Visit {
                order_index: i,
                kind: VisitKind::Pickup,
                location: at(x),
                arrival_minutes: 0.0,
                departure_minutes: 0.0,
            });
            route.push_visit(Visit {
                order_index: i,
                kind: VisitKind::Delivery,
                location: at(x + 0.05),
                arrival_minutes: 0.0,
                departure_minutes: 0.0,
            });
            route.push_stop(
                Stop {
                    order_id: id.to_string(),
                    order_index: i,
                },
                1.0,
                0.1,
            );
        }
        let mut t = VehicleTracker::new();
        t.register_from_route(&route);
        let stops = t.stops("v3");
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].order_id, "x");
        assert_eq!(stops[0].location, at(0.15));
        assert_eq!(stops[1].order_id, "y");
        assert!(t.stops("nobody").is_empty());
    }

    #[test]
    fn test_custom_speed() {
        let mut t = VehicleTracker::new().with_average_speed(80.0).with_service_minutes(0.0);
        t.register_route("v1", vec![TrackedStop::new("a", at(0.1))]);
        t.update_position("v1", VehiclePosition::new(at(0.0), now()));
        let eta = t.eta("v1", now()).expect("tracked");
        assert!((minutes_between(now(), eta) - leg_minutes() / 2.0).abs() < 0.01);
    }
}
