//! Per-country curve fitting and extrapolation.
//!
//! Given a country's non-null `(day offset, value)` history we:
//! - fit the optimistic quadratic and the baseline line by Levenberg–Marquardt,
//!   starting every parameter at 0.5
//! - evaluate both fits once per calendar day from epoch to horizon
//!
//! Point counts are checked before the optimizer runs: an under-determined fit
//! is an error, not a degenerate curve.

use chrono::Days;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::domain::{CurvePoint, Dataset, FitQuality, FitResult, FittedCurve, ModelKind, RunConfig};
use crate::error::AppError;
use crate::math::{LmOptions, levenberg_marquardt};
use crate::models::{fill_jacobian_row, predict};

/// Starting value for every free parameter.
pub const INITIAL_GUESS: f64 = 0.5;

/// Fit a single model to `(xs, ys)`.
///
/// A model with `k` parameters needs observations on at least `k` distinct
/// days; repeated rows for the same day do not add information.
pub fn fit_model(model: ModelKind, country: &str, xs: &[f64], ys: &[f64]) -> Result<FitResult, AppError> {
    let required = model.param_count();
    let n = xs.len().min(ys.len());
    let days = distinct_count(&xs[..n]);
    if days < required {
        return Err(AppError::InsufficientData {
            country: country.to_string(),
            model: model.display_name(),
            points: days,
            required,
        });
    }

    let initial = vec![INITIAL_GUESS; required];
    let report = levenberg_marquardt(
        xs,
        ys,
        &initial,
        |x, p| predict(model, x, p),
        |x, _, out| fill_jacobian_row(model, x, out),
        &LmOptions::default(),
    )
    .map_err(|e| AppError::FitDivergence {
        country: country.to_string(),
        model: model.display_name(),
        reason: e.to_string(),
    })?;

    let rmse = (report.sse / n as f64).sqrt();
    Ok(FitResult {
        model,
        params: report.params,
        quality: FitQuality {
            sse: report.sse,
            rmse,
            n,
            iterations: report.iterations,
        },
    })
}

fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

/// Fit both models for one country and extrapolate them to the horizon.
pub fn fit_country(dataset: &Dataset, code: &str, config: &RunConfig) -> Result<FittedCurve, AppError> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = dataset
        .history(code)
        .map(|(obs, value)| (obs.day as f64, value))
        .unzip();

    let optimistic = fit_model(ModelKind::Optimistic, code, &xs, &ys)?;
    let baseline = fit_model(ModelKind::Baseline, code, &xs, &ys)?;

    for fit in [&optimistic, &baseline] {
        debug!(
            country = code,
            model = fit.model.display_name(),
            params = ?fit.params,
            sse = fit.quality.sse,
            iterations = fit.quality.iterations,
            "fit converged"
        );
    }

    let points = extrapolate(&optimistic, &baseline, config);
    Ok(FittedCurve {
        country_code: code.to_string(),
        optimistic,
        baseline,
        points,
    })
}

/// Evaluate both fits at every day from `config.epoch` to `config.horizon` inclusive.
///
/// No clamping: values may go negative or far above 100.
pub fn extrapolate(optimistic: &FitResult, baseline: &FitResult, config: &RunConfig) -> Vec<CurvePoint> {
    let len = config.horizon_len();
    let mut points = Vec::with_capacity(len);

    for offset in 0..len as u64 {
        let Some(date) = config.epoch.checked_add_days(Days::new(offset)) else {
            break;
        };
        let x = offset as f64;
        points.push(CurvePoint {
            date,
            optimistic: predict(optimistic.model, x, &optimistic.params),
            baseline: predict(baseline.model, x, &baseline.params),
        });
    }

    points
}

/// Fit every tracked country, in configuration order.
pub fn fit_all(dataset: &Dataset, config: &RunConfig) -> Result<IndexMap<String, FittedCurve>, AppError> {
    let mut curves = IndexMap::with_capacity(config.countries.len());
    for country in &config.countries {
        let curve = fit_country(dataset, &country.code, config)?;
        info!(
            country = %country.code,
            points = curve.optimistic.quality.n,
            optimistic_rmse = curve.optimistic.quality.rmse,
            baseline_rmse = curve.baseline.quality.rmse,
            "fitted curves"
        );
        curves.insert(country.code.clone(), curve);
    }
    Ok(curves)
}
