//! Time window constraint.

use crate::models::TimeWindow;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Checks delivery arrivals against their time windows by minute of day.
///
/// Arrival offsets are added to the route start, wrapped into a single day
/// (modulo 1440) and compared with the windows' hour/minute bounds. Windows
/// spanning midnight or several days are therefore not represented
/// faithfully.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use u_dispatch::constraints::TimeWindowConstraint;
/// use u_dispatch::models::TimeWindow;
///
/// let tw = TimeWindow::new(
///     Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap(),
/// )
/// .unwrap();
/// let c = TimeWindowConstraint::default();
/// // Route starts at 08:00, arrival 90 minutes in is 09:30.
/// assert!(c.validate(&[tw], &[90], 480));
/// assert!(!c.validate(&[tw], &[200], 480));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindowConstraint {
    service_time_minutes: i64,
}

impl TimeWindowConstraint {
    /// Creates a time window constraint with the given service time.
    pub fn new(service_time_minutes: i64) -> Self {
        Self {
            service_time_minutes,
        }
    }

    /// Service time at each location in minutes.
    pub fn service_time_minutes(&self) -> i64 {
        self.service_time_minutes
    }

    /// Validates arrivals (minutes from route start) against windows.
    ///
    /// `windows` and `arrivals` are paired positionally; surplus entries in
    /// the longer list are ignored.
    pub fn validate(&self, windows: &[TimeWindow], arrivals: &[i64], start_minutes: i64) -> bool {
        windows.iter().zip(arrivals).all(|(tw, &arrival)| {
            let minute_of_day = (start_minutes + arrival).rem_euclid(MINUTES_PER_DAY);
            minute_of_day >= tw.earliest_minute_of_day()
                && minute_of_day <= tw.latest_minute_of_day()
        })
    }
}

impl Default for TimeWindowConstraint {
    fn default() -> Self {
        Self::new(30)
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

    #[test]
    fn test_within_window() {
        let c = TimeWindowConstraint::default();
        assert!(c.validate(&[window(9, 17), window(9, 17)], &[60, 300], 540));
    }

    #[test]
    fn test_bounds_inclusive() {
        let c = TimeWindowConstraint::default();
        assert!(c.validate(&[window(9, 17)], &[0], 540));
        assert!(c.validate(&[window(9, 17)], &[480], 540));
        assert!(!c.validate(&[window(9, 17)], &[481], 540));
    }

    #[test]
    fn test_too_early_fails() {
        let c = TimeWindowConstraint::default();
        assert!(!c.validate(&[window(9, 17)], &[30], 480));
    }

    #[test]
    fn test_wraps_past_midnight() {
        let c = TimeWindowConstraint::default();
        // 23:00 start + 11 hours = 10:00 next day, inside 09:00-17:00
        assert!(c.validate(&[window(9, 17)], &[660], 1380));
    }

    #[test]
    fn test_empty_passes() {
        assert!(TimeWindowConstraint::new(15).validate(&[], &[], 0));
    }

    #[test]
    fn test_service_time() {
        assert_eq!(TimeWindowConstraint::default().service_time_minutes(), 30);
        assert_eq!(TimeWindowConstraint::new(15).service_time_minutes(), 15);
    }
}
