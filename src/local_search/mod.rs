//! Local search operators for improving dispatch routes.
//!
//! - [`two_opt_improve`] — Intra-route first-improvement 2-opt over orders

mod two_opt;

pub use two_opt::two_opt_improve;
