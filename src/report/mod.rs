//! Reporting: per-country summary facts and the HTML page built from them.
//!
//! Formatting lives here so the fitting code stays free of presentation concerns.

pub mod html;
pub mod summary;

pub use html::render_html;
pub use summary::*;
