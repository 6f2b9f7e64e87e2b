//! Plain data structures for the pathomove simulation.

pub mod agent;
pub mod landscape;
pub mod records;
