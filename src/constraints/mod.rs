//! Route constraint validation.
//!
//! Four independent constraints share one contract: given route data, say
//! yes or no. Constraints are advisory filters for the optimizer, so a
//! violation is reported as `false` rather than raised as an error.
//!
//! - [`CapacityConstraint`] — Cumulative weight and volume limits
//! - [`TimeWindowConstraint`] — Delivery arrival within minute-of-day bounds
//! - [`DriverHoursConstraint`] — Shift length and mandatory breaks
//! - [`ZoneRestrictionConstraint`] — Excluded geographic zones

mod capacity;
mod checker;
mod driver_hours;
mod time_window;
mod zone;

pub use capacity::CapacityConstraint;
pub use checker::{Constraint, ConstraintChecker, RouteData};
pub use driver_hours::DriverHoursConstraint;
pub use time_window::TimeWindowConstraint;
pub use zone::ZoneRestrictionConstraint;
