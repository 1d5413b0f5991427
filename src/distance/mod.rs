//! Distance matrices over geographic locations.
//!
//! Provides a dense haversine distance matrix, a content-addressed matrix
//! cache, the deduplicated location list that fixes the matrix index space,
//! and stateless single-pair helpers.

mod cache;
mod locations;
mod matrix;

pub use cache::MatrixCache;
pub use locations::LocationIndex;
pub use matrix::{bounding_box_query, distance_between, DistanceMatrix};
