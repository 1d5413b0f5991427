//! Discrete-event simulation of dispatch operations.
//!
//! - [`SimulationEngine`] — Time-ordered event queue with per-kind handlers
//! - [`calculate_metrics`] — Completion, punctuality, cost and utilization figures
//! - [`replay_solution`] — Plays an optimized solution through the engine

mod engine;
mod metrics;
mod replay;

pub use engine::{Event, EventContext, EventKind, EventPayload, SimulationEngine, SimulationState};
pub use metrics::{
    calculate_metrics, vehicle_utilization, RunOutcome, SimulationMetrics, COST_PER_HOUR,
    COST_PER_KM,
};
pub use replay::{replay_solution, ReplayOptions, ReplayReport};
