//! Driver hours and mandatory break constraint.

/// Limits shift length and enforces a break after long driving stretches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverHoursConstraint {
    max_shift_hours: f64,
    mandatory_break_hours: f64,
    break_after_hours: f64,
}

impl DriverHoursConstraint {
    /// Creates a driver hours constraint.
    pub fn new(max_shift_hours: f64, mandatory_break_hours: f64, break_after_hours: f64) -> Self {
        Self {
            max_shift_hours,
            mandatory_break_hours,
            break_after_hours,
        }
    }

    /// Maximum shift length in hours.
    pub fn max_shift_hours(&self) -> f64 {
        self.max_shift_hours
    }

    /// Break length in hours.
    pub fn mandatory_break_hours(&self) -> f64 {
        self.mandatory_break_hours
    }

    /// Driving hours after which a break is required.
    pub fn break_after_hours(&self) -> f64 {
        self.break_after_hours
    }

    /// Validates a route's total and driving minutes.
    ///
    /// Fails if the shift is too long, or if driving exceeds the break
    /// threshold and the route leaves no room for the break.
    pub fn validate(&self, total_minutes: f64, driving_minutes: f64) -> bool {
        let total_hours = total_minutes / 60.0;
        let driving_hours = driving_minutes / 60.0;

        if total_hours > self.max_shift_hours {
            return false;
        }
        if driving_hours > self.break_after_hours {
            let min_total_with_break = (driving_hours + self.mandatory_break_hours) * 60.0;
            if total_minutes < min_total_with_break {
                return false;
            }
        }
        true
    }
}

impl Default for DriverHoursConstraint {
    fn default() -> Self {
        Self::new(10.0, 0.5, 5.0)
    }
}
