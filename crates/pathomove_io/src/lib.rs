//! # Pathomove IO
//!
//! Export layer for pathomove runs: the run lookup table, CSV tables for
//! traits, proximity networks and landscapes, and JSON helpers.

pub mod error;
/// CSV writers and the exporting generation observer
pub mod export;
/// Output layout, run identifiers and the lookup table
pub mod output;
pub mod serialization;

pub use error::{IoError, Result};
pub use export::CsvExporter;
pub use output::{generate_run_id, OutputLayout};
pub use serialization::{from_json, read_json_file, to_json, to_json_pretty, write_json_file};
