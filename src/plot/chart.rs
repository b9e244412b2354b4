//! Plotters-powered PNG chart of observed history and fitted curves.
//!
//! Layout:
//! - legend strip across the top, right-aligned, two columns per country row
//! - date x-axis over the display window with monthly ticks
//! - fixed 0–200 y-axis with a reference line at 100
//!
//! Sizes are specified in points and converted with the configured DPI, so the
//! image scales the same way a 16x9 inch figure would.

use std::sync::OnceLock;

use chrono::{Datelike, Days, Months, NaiveDate};
use indexmap::IndexMap;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::register_font;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, info};

use super::clip::{clip_band, clip_polyline};
use crate::domain::{Dataset, FittedCurve, Rgb, RunConfig};
use crate::error::AppError;
use crate::io::ensure_parent_dir;

const FONT_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const FONT_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

const Y_MAX: f64 = 200.0;
const REFERENCE_Y: f64 = 100.0;
const Y_AXIS_LABEL: &str = "Total vaccinations per 100 adults";

const GRID: RGBColor = RGBColor(0xbb, 0xbb, 0xbb);
const SCATTER_ALPHA: f64 = 0.75;
const BAND_ALPHA: f64 = 0.25;

static FONTS: OnceLock<Result<(), String>> = OnceLock::new();

/// Register the bundled DejaVu Sans faces as `sans-serif` (once per process).
fn register_fonts() -> Result<(), AppError> {
    FONTS
        .get_or_init(|| {
            register_font("sans-serif", FontStyle::Normal, FONT_REGULAR)
                .map_err(|_| "bundled regular font is not a valid TTF".to_string())?;
            register_font("sans-serif", FontStyle::Bold, FONT_BOLD)
                .map_err(|_| "bundled bold font is not a valid TTF".to_string())?;
            Ok(())
        })
        .clone()
        .map_err(AppError::Render)
}

/// Render the comparative chart to `config.image_path`.
pub fn render_chart(
    dataset: &Dataset,
    curves: &IndexMap<String, FittedCurve>,
    config: &RunConfig,
) -> Result<(), AppError> {
    register_fonts()?;
    ensure_parent_dir(&config.image_path)?;

    let size = config.image_size();
    let root = BitMapBackend::new(&config.image_path, size).into_drawing_area();
    let frame = draw(&root, dataset, curves, config).map_err(|e| {
        AppError::Render(format!("Failed to render chart '{}': {e}", config.image_path.display()))
    })?;

    debug!(?frame, "plot frame");
    info!(path = %config.image_path.display(), width = size.0, height = size.1, "wrote chart");
    Ok(())
}

/// Point-to-pixel conversion for the configured resolution.
#[derive(Debug, Clone, Copy)]
struct Scale {
    px_per_pt: f64,
}

impl Scale {
    fn new(config: &RunConfig) -> Self {
        Self {
            px_per_pt: config.image_dpi / 72.0,
        }
    }

    fn px(self, points: f64) -> f64 {
        points * self.px_per_pt
    }

    fn px_i32(self, points: f64) -> i32 {
        self.px(points).round() as i32
    }

    fn stroke(self, points: f64) -> u32 {
        self.px(points).round().max(1.0) as u32
    }
}

/// Pixel rectangle of the data area: `top` is the `Y_MAX` row, `bottom` the 0 row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlotFrame {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

fn draw<DB>(
    root: &DrawingArea<DB, Shift>,
    dataset: &Dataset,
    curves: &IndexMap<String, FittedCurve>,
    config: &RunConfig,
) -> Result<PlotFrame, Box<dyn std::error::Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let scale = Scale::new(config);
    root.fill(&WHITE)?;

    let legend_rows = config.countries.len() as f64;
    let legend_height = scale.px_i32(8.0 + 14.0 * legend_rows);
    let (legend_area, plot_area) = root.split_vertically(legend_height);

    let start = config.epoch;
    let end = config.display_end;
    let span = config.day_offset(end) as f64;
    let ticks = month_starts(start, end);

    let label_font = FontDesc::new(FontFamily::SansSerif, scale.px(9.0), FontStyle::Normal);
    let desc_font = FontDesc::new(FontFamily::SansSerif, scale.px(10.0), FontStyle::Bold);
    let label_style = label_font.color(&BLACK);

    // The last tick label is centred on the right edge of the data area.
    let margin = scale.px_i32(6.0);
    let tail = match ticks.last() {
        Some(&last) => {
            let (width, _) = root.estimate_text_size(&month_tick_label(last), &label_style)?;
            width as i32 / 2 + scale.px_i32(4.0)
        }
        None => 0,
    };

    let key_points: Vec<f64> = ticks.iter().map(|&d| config.day_offset(d) as f64).collect();
    let mut chart = ChartBuilder::on(&plot_area)
        .margin(margin)
        .margin_right(margin.max(tail))
        .x_label_area_size(scale.px_i32(40.0))
        .y_label_area_size(scale.px_i32(44.0))
        .build_cartesian_2d((0f64..span).with_key_points(key_points), 0f64..Y_MAX)?;

    // Grid first so every series draws on top of it.
    chart
        .configure_mesh()
        .x_labels(ticks.len().max(1))
        .y_labels(11)
        .x_label_formatter(&|x: &f64| date_at(start, *x).map(month_tick_label).unwrap_or_default())
        .y_label_formatter(&|v: &f64| format!("{v:.0}"))
        .x_desc(x_axis_label(start, end))
        .y_desc(Y_AXIS_LABEL)
        .label_style(label_style.clone())
        .axis_desc_style(desc_font.color(&BLACK))
        .bold_line_style(GRID.stroke_width(scale.stroke(1.0)))
        .light_line_style(WHITE.mix(0.0))
        .axis_style(BLACK.stroke_width(scale.stroke(0.8)))
        .draw()?;

    chart.draw_series(LineSeries::new(
        [(0.0, REFERENCE_Y), (span, REFERENCE_Y)],
        BLACK.stroke_width(scale.stroke(0.75)),
    ))?;

    let line_width = scale.stroke(1.0);
    let marker_arm = scale.px_i32(3.0);

    for country in &config.countries {
        let color = rgb(country.color);

        if let Some(curve) = curves.get(&country.code) {
            let window: Vec<(f64, f64, f64)> = curve
                .window(start, end)
                .map(|p| (config.day_offset(p.date) as f64, p.optimistic, p.baseline))
                .collect();

            chart.draw_series(
                clip_band(&window, 0.0, Y_MAX)
                    .into_iter()
                    .map(|band| Polygon::new(band, color.mix(BAND_ALPHA).filled())),
            )?;

            let optimistic: Vec<(f64, f64)> = window.iter().map(|&(x, o, _)| (x, o)).collect();
            for run in clip_polyline(&optimistic, 0.0, Y_MAX) {
                chart.draw_series(LineSeries::new(run, color.stroke_width(line_width)))?;
            }

            let baseline: Vec<(f64, f64)> = window.iter().map(|&(x, _, b)| (x, b)).collect();
            for run in clip_polyline(&baseline, 0.0, Y_MAX) {
                chart.draw_series(DashedLineSeries::new(
                    run,
                    scale.stroke(3.7),
                    scale.stroke(1.6),
                    color.stroke_width(line_width),
                ))?;
            }
        }

        let marker = color.mix(SCATTER_ALPHA).stroke_width(line_width);
        chart.draw_series(
            dataset
                .history(&country.code)
                .filter(|(obs, value)| obs.date >= start && obs.date <= end && (0.0..=Y_MAX).contains(value))
                .map(|(obs, value)| {
                    EmptyElement::at((obs.day as f64, value))
                        + PathElement::new(vec![(-marker_arm, 0), (marker_arm, 0)], marker)
                        + PathElement::new(vec![(0, -marker_arm), (0, marker_arm)], marker)
                }),
        )?;
    }

    let (left, top) = chart.backend_coord(&(0.0, Y_MAX));
    let (right, bottom) = chart.backend_coord(&(span, 0.0));

    draw_legend(&legend_area, config, scale)?;

    root.present()?;
    Ok(PlotFrame {
        left,
        top,
        right,
        bottom,
    })
}

/// Two-column legend: `{name} (history)` | `{name} (optimistic)` per row.
fn draw_legend<DB>(
    area: &DrawingArea<DB, Shift>,
    config: &RunConfig,
    scale: Scale,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (width, _) = area.dim_in_pixel();
    let width = width as i32;

    let font = FontDesc::new(FontFamily::SansSerif, scale.px(9.0), FontStyle::Normal)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));

    let column = scale.px_i32(190.0);
    let glyph = scale.px_i32(20.0);
    let gap = scale.px_i32(6.0);
    let row_height = scale.px_i32(14.0);
    let right = width - scale.px_i32(10.0);
    let arm = scale.px_i32(3.0);
    let line_width = scale.stroke(1.0);

    for (row, country) in config.countries.iter().enumerate() {
        let color = rgb(country.color);
        let y = scale.px_i32(4.0) + row_height * row as i32 + row_height / 2;

        let history_x = right - 2 * column;
        let marker = color.mix(SCATTER_ALPHA).stroke_width(line_width);
        let cx = history_x + glyph / 2;
        area.draw(
            &(EmptyElement::at((cx, y))
                + PathElement::new(vec![(-arm, 0), (arm, 0)], marker)
                + PathElement::new(vec![(0, -arm), (0, arm)], marker)),
        )?;
        area.draw(&Text::new(
            format!("{} (history)", country.name),
            (history_x + glyph + gap, y),
            font.clone(),
        ))?;

        let fitted_x = right - column;
        area.draw(&PathElement::new(
            vec![(fitted_x, y), (fitted_x + glyph, y)],
            color.stroke_width(line_width),
        ))?;
        area.draw(&Text::new(
            format!("{} (optimistic)", country.name),
            (fitted_x + glyph + gap, y),
            font.clone(),
        ))?;
    }

    Ok(())
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// e.g. `Date: January 2021 to July 2021`.
fn x_axis_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("Date: {} to {}", start.format("%B %Y"), end.format("%B %Y"))
}

/// First-of-month dates in `start..=end`.
fn month_starts(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let Some(mut month) = start.with_day(1) else {
        return Vec::new();
    };
    if month < start {
        month = match month.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => return Vec::new(),
        };
    }

    let mut out = Vec::new();
    while month <= end {
        out.push(month);
        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }
    out
}

/// Calendar date `x` days after `start`, rounded to the nearest day.
fn date_at(start: NaiveDate, x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x < 0.0 {
        return None;
    }
    start.checked_add_days(Days::new(x.round() as u64))
}

/// e.g. `1st March`.
fn month_tick_label(date: NaiveDate) -> String {
    format!("{} {}", ordinal(date.day()), date.format("%B"))
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
