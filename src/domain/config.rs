//! Run configuration.
//!
//! The job has no CLI flags and reads no config files: `RunConfig::default()`
//! holds the production constants and every component receives the config by
//! reference. Tests build their own configs with different countries, dates and
//! output paths.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::domain::{Country, Rgb};

const DATASET_URL: &str =
    "https://raw.githubusercontent.com/owid/covid-19-data/master/public/data/vaccinations/vaccinations.csv";

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Tracked countries in legend/summary order.
    pub countries: Vec<Country>,

    /// Day-offset origin for fitting; also the left edge of the chart.
    pub epoch: NaiveDate,
    /// Right edge of the chart.
    pub display_end: NaiveDate,
    /// Last extrapolated day (inclusive).
    pub horizon: NaiveDate,

    pub dataset_url: String,
    /// Local copy of the downloaded dataset.
    pub cache_path: PathBuf,
    pub fetch_timeout: Duration,

    pub image_path: PathBuf,
    /// Multiplier on a 16x9 inch canvas.
    pub image_scale: f64,
    pub image_dpi: f64,

    pub html_path: PathBuf,

    /// Values whose optimistic crossing date is reported per country.
    pub targets: Vec<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            countries: vec![
                Country::new("GBR", "United Kingdom", Rgb::from_hex(0x007bff)).with_emblem("🇬🇧"),
                Country::new("DEU", "Germany", Rgb::from_hex(0x28a745)).with_emblem("🇩🇪"),
            ],
            epoch: ymd(2021, 1, 1),
            display_end: ymd(2021, 7, 1),
            horizon: ymd(2022, 12, 31),
            dataset_url: DATASET_URL.to_string(),
            cache_path: PathBuf::from("vaccinations.csv"),
            fetch_timeout: Duration::from_secs(120),
            image_path: PathBuf::from("public/vactrend.png"),
            image_scale: 0.6,
            image_dpi: 240.0,
            html_path: PathBuf::from("public/index.html"),
            targets: vec![100.0, 200.0],
        }
    }
}

impl RunConfig {
    pub fn tracks(&self, code: &str) -> bool {
        self.countries.iter().any(|c| c.code == code)
    }

    /// Whole days from `epoch` to `date`.
    pub fn day_offset(&self, date: NaiveDate) -> i64 {
        (date - self.epoch).num_days()
    }

    /// Number of points in every fitted curve.
    pub fn horizon_len(&self) -> usize {
        usize::try_from(self.day_offset(self.horizon) + 1).unwrap_or(0)
    }

    /// Output image size in pixels (16:9).
    pub fn image_size(&self) -> (u32, u32) {
        let px = |inches: f64| (inches * self.image_scale * self.image_dpi).round().max(1.0) as u32;
        (px(16.0), px(9.0))
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("hard-coded calendar date is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_inside_horizon() {
        let cfg = RunConfig::default();
        assert!(cfg.epoch < cfg.display_end);
        assert!(cfg.display_end < cfg.horizon);
        assert!(cfg.tracks("GBR"));
        assert!(!cfg.tracks("FRA"));
    }

    #[test]
    fn horizon_len_counts_both_ends() {
        let cfg = RunConfig::default();
        // 2021 has 365 days, 2022 has 365 days.
        assert_eq!(cfg.horizon_len(), 730);
    }

    #[test]
    fn image_size_is_16_by_9_at_scale_and_dpi() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.image_size(), (2304, 1296));
    }
}
