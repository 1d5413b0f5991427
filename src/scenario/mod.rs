//! Synthetic dispatch scenarios for demos and benchmarks.
//!
//! Presets mirror typical demand shapes: a small rush-hour day, a medium
//! uniform day and a large evening peak.

mod generator;

pub use generator::{
    generate, generate_orders, generate_vehicles, Scenario, SizeDistribution, TimeDistribution,
};
