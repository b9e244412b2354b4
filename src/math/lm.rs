//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ (y_i - f(x_i; p))²` starting from a caller-supplied guess.
//! The model and its Jacobian row are passed as closures, so the solver knows
//! nothing about polynomials or vaccination data.
//!
//! Termination follows the usual MINPACK conventions:
//! - relative SSE reduction of an accepted step ≤ `ftol`
//! - relative step length ≤ `xtol`
//! - no damped step reduces SSE any more (we are sitting on the minimum)
//!
//! Running out of iterations is reported as a failure rather than returning
//! whatever parameters we happened to reach.

use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

/// Guards the Marquardt scaling against all-zero Jacobian columns.
const SCALE_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct LmOptions {
    pub max_iterations: usize,
    pub ftol: f64,
    pub xtol: f64,
    pub lambda_init: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-12,
            lambda_init: 1e-3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LmReport {
    pub params: Vec<f64>,
    pub sse: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LmFailure {
    /// The model produced NaN/inf for the initial guess or the final parameters.
    NonFinite,
    /// Convergence criteria not met within the iteration budget.
    MaxIterations(usize),
}

impl std::fmt::Display for LmFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LmFailure::NonFinite => write!(f, "model evaluation produced non-finite values"),
            LmFailure::MaxIterations(n) => write!(f, "no convergence after {n} iterations"),
        }
    }
}

/// Fit `model` to `(xs, ys)` from `initial`.
///
/// `jacobian_row(x, p, out)` must write `∂f(x; p)/∂p_j` into `out[j]`.
pub fn levenberg_marquardt<F, J>(
    xs: &[f64],
    ys: &[f64],
    initial: &[f64],
    model: F,
    jacobian_row: J,
    opts: &LmOptions,
) -> Result<LmReport, LmFailure>
where
    F: Fn(f64, &[f64]) -> f64,
    J: Fn(f64, &[f64], &mut [f64]),
{
    let n = xs.len().min(ys.len());
    let p = initial.len();

    let mut params = initial.to_vec();
    let mut sse = sum_squares(&xs[..n], &ys[..n], &params, &model);
    if !sse.is_finite() {
        return Err(LmFailure::NonFinite);
    }

    let mut lambda = opts.lambda_init;
    let mut jac = DMatrix::<f64>::zeros(n, p);
    let mut resid = DVector::<f64>::zeros(n);
    let mut row = vec![0.0; p];

    for iteration in 1..=opts.max_iterations {
        if sse == 0.0 {
            return finish(params, sse, iteration - 1);
        }

        for i in 0..n {
            jacobian_row(xs[i], &params, &mut row);
            for j in 0..p {
                jac[(i, j)] = row[j];
            }
            resid[i] = ys[i] - model(xs[i], &params);
        }

        // Marquardt scaling: damp each direction relative to its own column norm.
        let scale: Vec<f64> = (0..p)
            .map(|j| jac.column(j).norm().max(SCALE_FLOOR))
            .collect();

        loop {
            // Stack √λ·D under J and solve the tall system [J; √λ·D] δ = [r; 0].
            let mut aug = DMatrix::<f64>::zeros(n + p, p);
            let mut rhs = DVector::<f64>::zeros(n + p);
            for i in 0..n {
                for j in 0..p {
                    aug[(i, j)] = jac[(i, j)];
                }
                rhs[i] = resid[i];
            }
            let damping = lambda.sqrt();
            for j in 0..p {
                aug[(n + j, j)] = damping * scale[j];
            }

            let trial = solve_least_squares(&aug, &rhs).map(|step| {
                let candidate: Vec<f64> = params.iter().zip(step.iter()).map(|(a, d)| a + d).collect();
                let candidate_sse = sum_squares(&xs[..n], &ys[..n], &candidate, &model);
                (candidate, candidate_sse, step.norm())
            });

            match trial {
                Some((candidate, candidate_sse, step_norm))
                    if candidate_sse.is_finite() && candidate_sse < sse =>
                {
                    let reduction = sse - candidate_sse;
                    let previous = sse;
                    let param_norm = candidate.iter().map(|v| v * v).sum::<f64>().sqrt();

                    params = candidate;
                    sse = candidate_sse;
                    lambda = (lambda / 10.0).max(LAMBDA_MIN);

                    if reduction <= opts.ftol * previous || step_norm <= opts.xtol * (param_norm + opts.xtol) {
                        return finish(params, sse, iteration);
                    }
                    break;
                }
                _ => {
                    lambda *= 10.0;
                    if lambda > LAMBDA_MAX {
                        return finish(params, sse, iteration);
                    }
                }
            }
        }
    }

    Err(LmFailure::MaxIterations(opts.max_iterations))
}

fn finish(params: Vec<f64>, sse: f64, iterations: usize) -> Result<LmReport, LmFailure> {
    if !sse.is_finite() || params.iter().any(|v| !v.is_finite()) {
        return Err(LmFailure::NonFinite);
    }
    Ok(LmReport { params, sse, iterations })
}

fn sum_squares<F>(xs: &[f64], ys: &[f64], params: &[f64], model: &F) -> f64
where
    F: Fn(f64, &[f64]) -> f64,
{
    xs.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| {
            let r = y - model(x, params);
            r * r
        })
        .sum()
}
