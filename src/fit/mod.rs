//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - validate that each country has enough non-null observations
//! - fit the optimistic and baseline models by Levenberg–Marquardt
//! - extrapolate both fits day by day to the horizon

pub mod fitter;

pub use fitter::*;
