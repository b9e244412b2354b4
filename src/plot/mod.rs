//! Chart rendering.

pub mod chart;
mod clip;

pub use chart::render_chart;
