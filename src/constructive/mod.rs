//! Constructive heuristics for building initial dispatch assignments.
//!
//! - [`nearest_neighbor`] — Greedy nearest-pickup loading per vehicle, O(V·n²)
//! - [`salvage_leftovers`] — First-fit placement of orders construction left over

mod nearest_neighbor;
mod salvage;

pub use nearest_neighbor::{nearest_neighbor, Assignment, Construction};
pub use salvage::salvage_leftovers;
