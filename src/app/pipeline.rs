//! The batch pipeline: download → load → fit → chart → summary.
//!
//! Stages run strictly in sequence. The first failure aborts the run and is
//! tagged with the stage it came from; side effects of earlier stages (the
//! cached dataset, a written chart) are left in place.

use std::path::{Path, PathBuf};

use chrono::Utc;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::info;

use crate::domain::{Dataset, FittedCurve, RunConfig, SummaryFact};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Load,
    Fit,
    Chart,
    Summary,
}

impl Stage {
    /// Progress marker printed when the stage starts.
    pub fn marker(self) -> &'static str {
        match self {
            Stage::Download => "Downloading data",
            Stage::Load => "Reading data",
            Stage::Fit => "Computing extrapolations",
            Stage::Chart => "Creating graph",
            Stage::Summary => "Creating html",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Download => "download",
            Stage::Load => "load",
            Stage::Fit => "fit",
            Stage::Chart => "chart",
            Stage::Summary => "summary",
        };
        f.write_str(name)
    }
}

/// A pipeline failure tagged with the stage that produced it.
#[derive(Debug, Clone, Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: AppError,
}

impl StageError {
    pub fn exit_code(&self) -> u8 {
        self.source.exit_code()
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub curves: IndexMap<String, FittedCurve>,
    pub facts: IndexMap<String, SummaryFact>,
    pub image_path: PathBuf,
    pub html_path: PathBuf,
}

fn stage<T>(stage: Stage, f: impl FnOnce() -> Result<T, AppError>) -> Result<T, StageError> {
    info!("[ ] {}", stage.marker());
    f().map_err(|source| StageError { stage, source })
}

/// Execute the full pipeline, starting with the dataset download.
pub fn run(config: &RunConfig) -> Result<RunOutput, StageError> {
    let csv_path = stage(Stage::Download, || crate::data::fetch_dataset(config))?;
    run_offline(config, &csv_path)
}

/// Execute every stage after the download against an existing CSV file.
pub fn run_offline(config: &RunConfig, csv_path: &Path) -> Result<RunOutput, StageError> {
    let dataset = stage(Stage::Load, || crate::io::load_observations(csv_path, config))?;

    let curves = stage(Stage::Fit, || crate::fit::fit_all(&dataset, config))?;

    stage(Stage::Chart, || crate::plot::render_chart(&dataset, &curves, config))?;

    let facts = stage(Stage::Summary, || {
        let facts = crate::report::summarize(&dataset, &curves, config)?;
        let html = crate::report::render_html(&facts, config, Utc::now())?;
        crate::io::write_html(&config.html_path, &html)?;
        info!(path = %config.html_path.display(), "wrote summary page");
        Ok(facts)
    })?;

    info!("[+] Done");

    Ok(RunOutput {
        dataset,
        curves,
        facts,
        image_path: config.image_path.clone(),
        html_path: config.html_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_names_the_stage() {
        let err = StageError {
            stage: Stage::Load,
            source: AppError::DataFormat("Missing required column: `date`".into()),
        };
        assert_eq!(err.to_string(), "load stage failed: Missing required column: `date`");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_input_fails_in_the_load_stage() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            image_path: dir.path().join("vactrend.png"),
            html_path: dir.path().join("index.html"),
            ..RunConfig::default()
        };

        let err = run_offline(&config, &dir.path().join("missing.csv")).unwrap_err();
        assert_eq!(err.stage, Stage::Load);
        assert!(matches!(err.source, AppError::DataAccess(_)));
        assert!(!config.image_path.exists());
    }
}
