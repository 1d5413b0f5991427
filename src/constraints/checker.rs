//! Closed set of route constraints and the checker that applies them.

use crate::models::TimeWindow;

use super::{
    CapacityConstraint, DriverHoursConstraint, TimeWindowConstraint, ZoneRestrictionConstraint,
};

/// Everything a constraint may inspect about one route.
///
/// Each constraint reads only the fields it needs; unused fields may be left
/// at their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteData {
    /// `(weight_kg, volume_m3)` per order, in visiting order.
    pub loads: Vec<(f64, f64)>,
    /// Time window per order, in visiting order.
    pub time_windows: Vec<TimeWindow>,
    /// Delivery arrival per order, in minutes from route start.
    pub arrival_minutes: Vec<i64>,
    /// Route start as minutes past midnight.
    pub start_minutes: i64,
    /// Total route time in minutes.
    pub total_minutes: f64,
    /// Time spent driving in minutes.
    pub driving_minutes: f64,
    /// Zone identifier per visited location.
    pub zones: Vec<String>,
}

/// A route constraint.
///
/// Every variant answers the same question, `validate(route) -> bool`.
/// Infeasibility is a `false`, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Weight and volume limits.
    Capacity(CapacityConstraint),
    /// Delivery time windows.
    TimeWindow(TimeWindowConstraint),
    /// Shift length and breaks.
    DriverHours(DriverHoursConstraint),
    /// Excluded zones.
    Zone(ZoneRestrictionConstraint),
}

impl Constraint {
    /// Validates the route against this constraint.
    pub fn validate(&self, route: &RouteData) -> bool {
        match self {
            Constraint::Capacity(c) => c.validate(&route.loads),
            Constraint::TimeWindow(c) => {
                c.validate(&route.time_windows, &route.arrival_minutes, route.start_minutes)
            }
            Constraint::DriverHours(c) => c.validate(route.total_minutes, route.driving_minutes),
            Constraint::Zone(c) => c.validate(&route.zones),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Capacity(_) => "capacity",
            Constraint::TimeWindow(_) => "time_window",
            Constraint::DriverHours(_) => "driver_hours",
            Constraint::Zone(_) => "zone",
        }
    }
}

impl From<CapacityConstraint> for Constraint {
    fn from(c: CapacityConstraint) -> Self {
        Constraint::Capacity(c)
    }
}

impl From<TimeWindowConstraint> for Constraint {
    fn from(c: TimeWindowConstraint) -> Self {
        Constraint::TimeWindow(c)
    }
}

impl From<DriverHoursConstraint> for Constraint {
    fn from(c: DriverHoursConstraint) -> Self {
        Constraint::DriverHours(c)
    }
}

impl From<ZoneRestrictionConstraint> for Constraint {
    fn from(c: ZoneRestrictionConstraint) -> Self {
        Constraint::Zone(c)
    }
}

/// Applies constraints to routes.
///
/// Holds a list of registered constraints for [`ConstraintChecker::violations`]
/// and offers stateless one-shot checks that build a constraint from the
/// given parameters and validate immediately.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::{
///     CapacityConstraint, ConstraintChecker, DriverHoursConstraint, RouteData,
/// };
///
/// let mut checker = ConstraintChecker::new();
/// checker.add_constraint(CapacityConstraint::new(100.0, 2.0));
/// checker.add_constraint(DriverHoursConstraint::default());
///
/// let route = RouteData {
///     loads: vec![(60.0, 1.0), (50.0, 0.5)],
///     total_minutes: 120.0,
///     driving_minutes: 60.0,
///     ..RouteData::default()
/// };
/// assert!(!checker.validate_all(&route));
/// assert_eq!(checker.violations(&route), vec!["capacity"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstraintChecker {
    constraints: Vec<Constraint>,
}

impl ConstraintChecker {
    /// Creates a checker with no registered constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constraint.
    pub fn add_constraint(&mut self, constraint: impl Into<Constraint>) {
        self.constraints.push(constraint.into());
    }

    /// Registered constraints, in registration order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns `true` if the route satisfies every registered constraint.
    pub fn validate_all(&self, route: &RouteData) -> bool {
        self.constraints.iter().all(|c| c.validate(route))
    }

    /// Names of registered constraints the route violates.
    pub fn violations(&self, route: &RouteData) -> Vec<&'static str> {
        self.constraints
            .iter()
            .filter(|c| !c.validate(route))
            .map(Constraint::name)
            .collect()
    }

    /// One-shot capacity check.
    pub fn check_capacity(
        &self,
        max_weight_kg: f64,
        max_volume_m3: f64,
        loads: &[(f64, f64)],
    ) -> bool {
        CapacityConstraint::new(max_weight_kg, max_volume_m3).validate(loads)
    }

    /// One-shot time window check with the default service time.
    pub fn check_time_windows(
        &self,
        windows: &[TimeWindow],
        arrivals: &[i64],
        start_minutes: i64,
    ) -> bool {
        TimeWindowConstraint::default().validate(windows, arrivals, start_minutes)
    }

    /// One-shot driver hours check with default limits.
    pub fn check_driver_hours(&self, total_minutes: f64, driving_minutes: f64) -> bool {
        DriverHoursConstraint::default().validate(total_minutes, driving_minutes)
    }

    /// One-shot zone check.
    pub fn check_zones<S: AsRef<str>>(&self, zones: &[S], excluded: &[S]) -> bool {
        ZoneRestrictionConstraint::new(excluded.iter().map(|z| z.as_ref().to_string()))
            .validate(zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window(h1: u32, h2: u32) -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 3, 1, h1, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, h2, 0, 0).unwrap(),
        )
        .expect("valid")
    }

    fn sample_route() -> RouteData {
        RouteData {
            loads: vec![(50.0, 1.0), (30.0, 0.5)],
            time_windows: vec![window(9, 12), window(9, 12)],
            arrival_minutes: vec![45, 120],
            start_minutes: 540,
            total_minutes: 200.0,
            driving_minutes: 80.0,
            zones: vec!["north".into(), "center".into()],
        }
    }

    #[test]
    fn test_each_variant_dispatches() {
        let route = sample_route();
        assert!(Constraint::Capacity(CapacityConstraint::new(100.0, 2.0)).validate(&route));
        assert!(!Constraint::Capacity(CapacityConstraint::new(70.0, 2.0)).validate(&route));
        assert!(Constraint::TimeWindow(TimeWindowConstraint::default()).validate(&route));
        assert!(Constraint::DriverHours(DriverHoursConstraint::default()).validate(&route));
        assert!(!Constraint::Zone(ZoneRestrictionConstraint::new(["center"])).validate(&route));
    }

    #[test]
    fn test_checker_all_pass() {
        let mut checker = ConstraintChecker::new();
        checker.add_constraint(CapacityConstraint::new(100.0, 2.0));
        checker.add_constraint(TimeWindowConstraint::default());
        checker.add_constraint(DriverHoursConstraint::default());
        checker.add_constraint(ZoneRestrictionConstraint::new(["south"]));
        assert_eq!(checker.constraints().len(), 4);
        assert!(checker.validate_all(&sample_route()));
        assert!(checker.violations(&sample_route()).is_empty());
    }

    #[test]
    fn test_checker_reports_violations_in_order() {
        let mut checker = ConstraintChecker::new();
        checker.add_constraint(ZoneRestrictionConstraint::new(["north"]));
        checker.add_constraint(CapacityConstraint::new(10.0, 2.0));
        checker.add_constraint(DriverHoursConstraint::new(2.0, 0.5, 5.0));
        assert_eq!(
            checker.violations(&sample_route()),
            vec!["zone", "capacity", "driver_hours"]
        );
    }

    #[test]
    fn test_empty_checker_passes() {
        assert!(ConstraintChecker::new().validate_all(&RouteData::default()));
    }

    #[test]
    fn test_one_shot_checks() {
        let checker = ConstraintChecker::new();
        assert!(checker.check_capacity(100.0, 2.0, &[(50.0, 1.0)]));
        assert!(!checker.check_capacity(40.0, 2.0, &[(50.0, 1.0)]));
        assert!(checker.check_time_windows(&[window(9, 12)], &[30], 540));
        assert!(!checker.check_time_windows(&[window(9, 12)], &[300], 540));
        assert!(checker.check_driver_hours(300.0, 200.0));
        assert!(!checker.check_driver_hours(700.0, 200.0));
        assert!(checker.check_zones(&["a", "b"], &["c"]));
        assert!(!checker.check_zones(&["a", "b"], &["b"]));
    }
}
