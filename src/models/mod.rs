//! Domain model types for delivery dispatch.
//!
//! Provides the core abstractions: geographic locations, delivery orders
//! with weight, volume and a time window, capacity-limited vehicles, routes
//! as ordered sequences of orders, and the per-call problem instance that
//! ties them to a distance matrix.

mod location;
mod order;
mod problem;
mod route;
mod solution;
mod vehicle;

pub use location::Location;
pub use order::{Order, TimeWindow};
pub use problem::{DispatchProblem, OrderNodes};
pub use route::{Route, Stop, Visit, VisitKind};
pub use solution::Solution;
pub use vehicle::Vehicle;
