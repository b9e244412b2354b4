//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration (`RunConfig`, `Country`)
//! - loaded observations (`Observation`, `Dataset`)
//! - fit outputs (`FitResult`, `FittedCurve`) and summary facts (`SummaryFact`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
