//! Per-country summary facts: current level, daily rate, threshold crossings.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::domain::{Dataset, FittedCurve, RunConfig, SummaryFact, ThresholdCrossing};
use crate::error::AppError;

/// Highest non-null observed value.
///
/// The feed is cumulative, so this is normally also the latest value. A data
/// revision that lowers a later row would make the two disagree; we keep the
/// maximum.
pub fn current_value(dataset: &Dataset, code: &str) -> Option<f64> {
    dataset.history(code).map(|(_, v)| v).reduce(f64::max)
}

/// Difference between the last two non-null values in input order.
///
/// Rows are not re-sorted by date and gaps are not normalised, so with a
/// missing day this is a multi-day delta.
pub fn daily_rate(dataset: &Dataset, code: &str) -> Option<f64> {
    let mut last = None;
    let mut prev = None;
    for (_, value) in dataset.history(code) {
        prev = last;
        last = Some(value);
    }
    Some(last? - prev?)
}

/// First curve date whose optimistic value is strictly above `target`.
///
/// Falls back to `horizon` when the curve never gets there.
pub fn crossing_date(curve: &FittedCurve, target: f64, horizon: NaiveDate) -> ThresholdCrossing {
    match curve.points.iter().find(|p| p.optimistic > target) {
        Some(point) => ThresholdCrossing {
            target,
            date: point.date,
            reached: true,
        },
        None => ThresholdCrossing {
            target,
            date: horizon,
            reached: false,
        },
    }
}

pub fn summarize_country(dataset: &Dataset, curve: &FittedCurve, config: &RunConfig) -> Result<SummaryFact, AppError> {
    let code = curve.country_code.as_str();
    let points = dataset.history(code).count();
    let insufficient = |required: usize| AppError::InsufficientData {
        country: code.to_string(),
        model: "daily rate",
        points,
        required,
    };

    let current = current_value(dataset, code).ok_or_else(|| insufficient(1))?;
    let daily_rate = daily_rate(dataset, code).ok_or_else(|| insufficient(2))?;
    let crossings = config
        .targets
        .iter()
        .map(|&target| crossing_date(curve, target, config.horizon))
        .collect();

    Ok(SummaryFact {
        country_code: code.to_string(),
        current,
        daily_rate,
        crossings,
    })
}

/// Summaries for every fitted country, in configuration order.
pub fn summarize(
    dataset: &Dataset,
    curves: &IndexMap<String, FittedCurve>,
    config: &RunConfig,
) -> Result<IndexMap<String, SummaryFact>, AppError> {
    let mut facts = IndexMap::with_capacity(curves.len());
    for country in &config.countries {
        let Some(curve) = curves.get(&country.code) else {
            continue;
        };
        facts.insert(country.code.clone(), summarize_country(dataset, curve, config)?);
    }
    Ok(facts)
}

/// Observed values as shown on the page, e.g. `30.00`.
pub fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

/// Signed two-decimal rate, e.g. `+10.00`, `+0.00`, `-1.50`.
pub fn format_daily_rate(rate: f64) -> String {
    // Avoid printing `-0.00` for a flat series.
    let rate = if rate == 0.0 { 0.0 } else { rate };
    format!("{rate:+.2}")
}
