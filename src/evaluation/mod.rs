//! Route metrics and timeline evaluation.

mod evaluator;

pub use evaluator::RouteEvaluator;
