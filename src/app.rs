//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - builds the run configuration
//! - runs the pipeline and reports where the outputs went

use tracing::info;

use crate::domain::RunConfig;

pub mod pipeline;

pub use pipeline::{Stage, StageError};

/// Entry point for the `vactrend` binary.
pub fn run() -> Result<(), StageError> {
    crate::logging::init_tracing();

    let config = RunConfig::default();
    let output = pipeline::run(&config)?;

    info!(
        countries = output.facts.len(),
        image = %output.image_path.display(),
        html = %output.html_path.display(),
        "run complete"
    );
    Ok(())
}
