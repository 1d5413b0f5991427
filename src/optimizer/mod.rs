//! End-to-end route optimization.

mod route_optimizer;

pub use route_optimizer::RouteOptimizer;
