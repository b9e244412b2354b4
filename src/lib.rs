//! `vactrend` library crate.
//!
//! The binary (`vactrend`) is a thin wrapper around this library so that:
//!
//! - every stage is testable without network access or spawning processes
//! - components take an explicit `RunConfig` instead of reading globals

pub mod app;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
