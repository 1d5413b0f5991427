//! # u-dispatch
//!
//! Delivery dispatch optimization: assigns pickup-and-delivery orders to
//! capacity-limited vehicles and sequences each vehicle's stops, using a
//! nearest-neighbor construction improved by 2-opt.
//!
//! ## Modules
//!
//! - [`geo`] — Haversine distance, bounding boxes and a grid spatial index
//! - [`models`] — Domain model types (Location, Order, Vehicle, Route, Solution)
//! - [`distance`] — Distance matrix, location index and matrix cache
//! - [`constraints`] — Capacity, time window, driver hours and zone checks
//! - [`evaluation`] — Route timeline and metrics
//! - [`constructive`] — Nearest-neighbor construction and leftover salvage
//! - [`local_search`] — 2-opt improvement
//! - [`optimizer`] — End-to-end [`RouteOptimizer`]
//! - [`api`] — JSON request/response boundary
//! - [`scenario`] — Seeded synthetic scenarios
//! - [`simulation`] — Discrete-event replay and run metrics
//! - [`tracking`] — Vehicle tracking and ETA projection

pub mod api;
pub mod config;
pub mod constraints;
pub mod constructive;
pub mod distance;
pub mod evaluation;
pub mod geo;
pub mod local_search;
pub mod models;
pub mod optimizer;
pub mod scenario;
pub mod simulation;
pub mod tracking;

pub use config::OptimizerConfig;
pub use optimizer::RouteOptimizer;
