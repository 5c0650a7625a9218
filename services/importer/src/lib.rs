//! CityJSON importer.
//!
//! Validates CityJSON documents and loads them into a feature store, one
//! city model per file.

pub mod ingest;

pub use ingest::{load_file, model_name_for, ImportJob, ImportSummary, Importer};
