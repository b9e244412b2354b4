//! CSV ingest and normalization.
//!
//! This module turns the vaccinations CSV into `Observation`s for the tracked
//! countries.
//!
//! Design goals:
//! - **Strict schema**: missing columns or unparseable dates fail the load
//! - **No imputation**: empty values stay `None` for consumers to drop
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::info;

use crate::domain::{Dataset, LoadStats, Observation, RunConfig};
use crate::error::AppError;

pub const COL_COUNTRY: &str = "iso_code";
pub const COL_DATE: &str = "date";
pub const COL_VALUE: &str = "total_vaccinations_per_hundred";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    country: usize,
    date: usize,
    value: usize,
}

/// Load the dataset file at `path`.
pub fn load_observations(path: &Path, config: &RunConfig) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::DataAccess(format!("Failed to open dataset '{}': {e}", path.display())))?;
    let dataset = read_observations(file, config)?;

    info!(
        path = %path.display(),
        rows_read = dataset.stats.rows_read,
        rows_kept = dataset.stats.rows_kept,
        rows_with_value = dataset.stats.rows_with_value,
        "loaded dataset"
    );
    Ok(dataset)
}

/// Read observations from any CSV source.
pub fn read_observations<R: Read>(source: R, config: &RunConfig) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = resolve_columns(&build_header_map(&headers))?;

    let mut observations = Vec::new();
    let mut stats = LoadStats::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = idx + 2;
        stats.rows_read += 1;

        let record = result.map_err(csv_error)?;
        let code = field(&record, columns.country, line)?;
        if !config.tracks(code) {
            continue;
        }

        let date = parse_date(field(&record, columns.date, line)?)
            .map_err(|e| AppError::DataFormat(format!("Line {line}: {e}")))?;
        let value = parse_opt_f64(record.get(columns.value));

        stats.rows_kept += 1;
        if value.is_some() {
            stats.rows_with_value += 1;
        }
        observations.push(Observation {
            country_code: code.to_string(),
            date,
            day: config.day_offset(date),
            value,
        });
    }

    Ok(Dataset { observations, stats })
}

fn csv_error(e: csv::Error) -> AppError {
    if e.is_io_error() {
        AppError::DataAccess(format!("Failed to read dataset: {e}"))
    } else {
        AppError::DataFormat(format!("Malformed CSV: {e}"))
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM;
    // left in place it would make `iso_code` look missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, AppError> {
    let require = |name: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| AppError::DataFormat(format!("Missing required column: `{name}`")))
    };

    Ok(Columns {
        country: require(COL_COUNTRY)?,
        date: require(COL_DATE)?,
        value: require(COL_VALUE)?,
    })
}

fn field(record: &StringRecord, idx: usize, line: usize) -> Result<&str, AppError> {
    record
        .get(idx)
        .ok_or_else(|| AppError::DataFormat(format!("Line {line}: missing field {}", idx + 1)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| format!("invalid date '{raw}': {e}"))
}

fn parse_opt_f64(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
