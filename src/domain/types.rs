//! Shared domain types.
//!
//! Everything here is transient: built once per run, read by later stages,
//! dropped when the process exits.

use chrono::NaiveDate;

/// 24-bit display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Rgb(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    /// CSS form, e.g. `#007bff`.
    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// A tracked country.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    /// ISO 3166 alpha-3 code as used by the dataset (`iso_code` column).
    pub code: String,
    pub name: String,
    pub color: Rgb,
    /// Optional flag emoji shown next to the name in the HTML summary.
    pub emblem: Option<String>,
}

impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>, color: Rgb) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            color,
            emblem: None,
        }
    }

    pub fn with_emblem(mut self, emblem: impl Into<String>) -> Self {
        self.emblem = Some(emblem.into());
        self
    }
}

/// One dataset row for a tracked country.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country_code: String,
    pub date: NaiveDate,
    /// Whole days since the configured epoch (negative before it).
    pub day: i64,
    /// Cumulative vaccinations per hundred people; `None` when the feed has no value.
    pub value: Option<f64>,
}

/// Row counts reported by the loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_with_value: usize,
}

/// Loader output: observations in input order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    pub stats: LoadStats,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>) -> Self {
        let rows_with_value = observations.iter().filter(|o| o.value.is_some()).count();
        let stats = LoadStats {
            rows_read: observations.len(),
            rows_kept: observations.len(),
            rows_with_value,
        };
        Self { observations, stats }
    }

    /// Non-null `(observation, value)` pairs for one country, in input order.
    pub fn history<'a>(&'a self, code: &'a str) -> impl Iterator<Item = (&'a Observation, f64)> + 'a {
        self.observations
            .iter()
            .filter(move |o| o.country_code == code)
            .filter_map(|o| o.value.map(|v| (o, v)))
    }
}

/// Which extrapolation model a fit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// `y = a·x² + b·x + c`: accelerating rollout.
    Optimistic,
    /// `y = b·x + c`: constant rollout rate.
    Baseline,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Optimistic, ModelKind::Baseline];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Optimistic => "optimistic",
            ModelKind::Baseline => "baseline",
        }
    }

    /// Number of free parameters.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Optimistic => 3,
            ModelKind::Baseline => 2,
        }
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    pub iterations: usize,
}

/// Fitted parameters for one model.
///
/// Parameters are ordered from the highest power down, so the optimistic model
/// stores `[a, b, c]` and the baseline model `[b, c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub quality: FitQuality,
}

/// One extrapolated day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub optimistic: f64,
    pub baseline: f64,
}

/// Both fits for one country plus their daily extrapolation from epoch to horizon.
#[derive(Debug, Clone)]
pub struct FittedCurve {
    pub country_code: String,
    pub optimistic: FitResult,
    pub baseline: FitResult,
    pub points: Vec<CurvePoint>,
}

impl FittedCurve {
    /// Points whose date falls inside `[start, end]`.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &CurvePoint> {
        self.points
            .iter()
            .filter(move |p| p.date >= start && p.date <= end)
    }
}

/// When the optimistic curve first passes a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdCrossing {
    pub target: f64,
    pub date: NaiveDate,
    /// `false` when the curve never passes the target and `date` is the horizon sentinel.
    pub reached: bool,
}

/// Derived per-country facts for the summary page.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFact {
    pub country_code: String,
    /// Highest non-null observed value.
    pub current: f64,
    /// Difference between the last two non-null values in input order.
    pub daily_rate: f64,
    pub crossings: Vec<ThresholdCrossing>,
}
