//! Request handling.

use std::time::Instant;

use anyhow::Result;
use log::info;

use super::{OptimizationRequest, OptimizationResult};
use crate::RouteOptimizer;

/// Validates a request, runs the optimizer and times it.
///
/// # Examples
///
/// ```
/// use u_dispatch::RouteOptimizer;
/// use u_dispatch::api::{handle_request, OptimizationRequest};
///
/// let mut optimizer = RouteOptimizer::default();
/// let request = OptimizationRequest::new(vec![], vec![]);
/// let result = handle_request(&mut optimizer, &request).unwrap();
/// assert!(result.routes.is_empty());
/// assert_eq!(result.algorithm, "nearest_neighbor_2opt");
/// ```
pub fn handle_request(
    optimizer: &mut RouteOptimizer,
    request: &OptimizationRequest,
) -> Result<OptimizationResult> {
    request.validate()?;

    let start = Instant::now();
    let solution = optimizer.optimize(&request.orders, &request.vehicles, request.use_2opt);
    let elapsed = start.elapsed().as_secs_f64();
    info!("request handled in {:.3} s", elapsed);

    Ok(OptimizationResult::from_solution(
        &solution,
        optimizer.config().delivery_service_minutes,
        elapsed,
    ))
}
