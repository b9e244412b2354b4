//! File I/O: dataset ingest and output writers.
//!
//! These modules stay separate from fitting and rendering so the pipeline can be
//! tested against in-memory CSV sources and temporary output directories.

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
