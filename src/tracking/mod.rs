//! Vehicle progress tracking and ETA projection.

mod tracker;

pub use tracker::{StopStatus, TrackedStop, VehiclePosition, VehicleTracker};
