//! Least squares solver.
//!
//! Each Levenberg–Marquardt iteration solves a small damped problem of the form:
//!
//! ```text
//! minimize ‖J δ - r‖² + λ ‖D δ‖²
//! ```
//!
//! which we express as one tall ordinary least squares system by stacking
//! `√λ·D` under the Jacobian. SVD handles the tall shape directly and copes
//! with the poor column scaling of `[x², x, 1]` when `x` runs into the hundreds.
//! (Nalgebra's `QR::solve` is intended for square systems and will panic for
//! non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_handles_badly_scaled_columns() {
        // Columns [x², x, 1] for x in the hundreds, exact y = 0.001x² + 0.5x + 3.
        let xs = [100.0, 200.0, 300.0, 400.0, 500.0];
        let mut data = Vec::new();
        let mut ys = Vec::new();
        for &x in &xs {
            data.extend_from_slice(&[x * x, x, 1.0]);
            ys.push(0.001 * x * x + 0.5 * x + 3.0);
        }
        let x = DMatrix::from_row_slice(xs.len(), 3, &data);
        let y = DVector::from_vec(ys);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 0.001).abs() < 1e-9);
        assert!((beta[1] - 0.5).abs() < 1e-6);
        assert!((beta[2] - 3.0).abs() < 1e-4);
    }
}
