//! Error type shared by every pipeline stage.
//!
//! Each variant maps to a distinct process exit code so that schedulers can
//! tell a network outage apart from a schema change or a bad fit.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    /// The dataset could not be fetched or read.
    #[error("{0}")]
    DataAccess(String),

    /// The dataset was readable but does not have the expected shape.
    #[error("{0}")]
    DataFormat(String),

    /// A country has fewer usable observations than a computation needs
    /// (model parameters for a fit, two values for a daily rate).
    #[error("Not enough data for {country}: {points} non-null observation(s), {required} required ({model}).")]
    InsufficientData {
        country: String,
        model: &'static str,
        points: usize,
        required: usize,
    },

    /// The optimizer did not reach a minimum.
    #[error("{model} fit for {country} did not converge: {reason}")]
    FitDivergence {
        country: String,
        model: &'static str,
        reason: String,
    },

    /// An output artifact (image or HTML) could not be produced or written.
    #[error("{0}")]
    Render(String),

    /// The HTML template failed to render.
    #[error("{0}")]
    Template(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::DataAccess(_) => 2,
            AppError::DataFormat(_) => 3,
            AppError::InsufficientData { .. } | AppError::FitDivergence { .. } => 4,
            AppError::Render(_) => 5,
            AppError::Template(_) => 6,
        }
    }
}
