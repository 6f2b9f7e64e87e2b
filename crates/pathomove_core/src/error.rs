//! Error types for the simulation engine.
//!
//! Every variant is a configuration problem detected before any simulation
//! work begins. Numeric degeneracies inside the loop (zero total fitness,
//! an exhausted landscape) have defined fallbacks and never surface here.

use thiserror::Error;

/// Invalid simulation parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count or duration was negative.
    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: i64 },

    /// A quantity that must be strictly positive was zero or negative.
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    /// A probability outside `[0, 1]`.
    #[error("{name} must be in [0.0, 1.0], got {value}")]
    Probability { name: &'static str, value: f64 },

    /// Any other out-of-range or inconsistent value.
    #[error("Invalid {name}: {reason}")]
    Range { name: &'static str, reason: String },

    /// The scenario code does not name a known scenario.
    #[error("Unknown scenario code {0}")]
    UnknownScenario(i32),

    /// More seed infections requested than agents exist.
    #[error("Cannot seed {requested} infections in a population of {population}")]
    TooManyInfected { requested: usize, population: usize },

    /// The configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    Parse(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    #[must_use]
    pub fn range<S: Into<String>>(name: &'static str, reason: S) -> Self {
        Self::Range {
            name,
            reason: reason.into(),
        }
    }
}

/// Converts a host-side signed count into `usize`, rejecting negatives.
pub fn non_negative(name: &'static str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| ConfigError::Negative { name, value })
}
