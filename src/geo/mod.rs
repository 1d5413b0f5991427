//! Geographic primitives.
//!
//! Great-circle distance on a spherical Earth, approximate bounding boxes,
//! and a uniform-grid spatial index for proximity queries over
//! (latitude, longitude) points.

mod grid;
mod haversine;

pub use grid::GridIndex;
pub use haversine::{
    bounding_box, haversine, points_in_radius, BoundingBox, EARTH_RADIUS_KM, KM_PER_DEGREE,
};
