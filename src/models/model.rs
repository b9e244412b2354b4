//! Model evaluation for the optimistic (quadratic) and baseline (linear) curves.
//!
//! The fitter relies on two primitive operations:
//! - fill the Jacobian row `∂y/∂p` for a given day offset (for Levenberg–Marquardt)
//! - predict `y(x)` given parameters (for extrapolation and residuals)

use crate::domain::ModelKind;

/// Fill `∂y/∂p` at `x`.
///
/// Both models are linear in their parameters, so the row does not depend on
/// the current parameter values.
///
/// # Panics
/// Panics if `out` is shorter than `model.param_count()`.
pub fn fill_jacobian_row(model: ModelKind, x: f64, out: &mut [f64]) {
    match model {
        ModelKind::Optimistic => {
            out[0] = x * x;
            out[1] = x;
            out[2] = 1.0;
        }
        ModelKind::Baseline => {
            out[0] = x;
            out[1] = 1.0;
        }
    }
}

/// Predict `y(x)` for the given model kind.
pub fn predict(model: ModelKind, x: f64, params: &[f64]) -> f64 {
    match model {
        ModelKind::Optimistic => params[0] * x * x + params[1] * x + params[2],
        ModelKind::Baseline => params[0] * x + params[1],
    }
}
