//! Core data records shared by the pathomove engine and its exporters.

pub mod data;

pub use data::agent::*;
pub use data::landscape::*;
pub use data::records::*;
