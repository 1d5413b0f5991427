//! JSON request/response boundary around the optimizer.
//!
//! Input is validated here, so the core can stay infallible. Errors carry
//! context via [`anyhow`].

mod handler;
mod request;
mod response;

pub use handler::handle_request;
pub use request::OptimizationRequest;
pub use response::{OptimizationResult, RouteSummary, StopSummary, ALGORITHM};
