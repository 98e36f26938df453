//! Data sources that load a [`Dataset`](crate::dataset::Dataset) into memory.
//!
//! The scanner works on a fully materialized dataset, so every source reads
//! its input to completion before analysis starts.

mod csv;

pub use csv::{CsvOptions, CsvSource, DEFAULT_NULL_VALUES};
