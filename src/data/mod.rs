//! Remote dataset access.

pub mod fetch;

pub use fetch::{DatasetClient, fetch_dataset};
