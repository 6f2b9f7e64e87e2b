//! Run metrics and structured logging.
//!
//! Counters are atomics so a shared reference can be handed to observers
//! while the run is in progress.

use pathomove_data::GenerationSummary;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

pub struct RunMetrics {
    generations: AtomicU64,
    timesteps: AtomicU64,
    items_consumed: AtomicU64,
    infections: AtomicU64,
    start_time: Instant,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generations: AtomicU64::new(0),
            timesteps: AtomicU64::new(0),
            items_consumed: AtomicU64::new(0),
            infections: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records one timestep's foraging and transmission outcome.
    pub fn record_timestep(&self, items_eaten: u64, new_infections: u64) {
        self.timesteps.fetch_add(1, Ordering::Relaxed);
        self.items_consumed.fetch_add(items_eaten, Ordering::Relaxed);
        self.infections.fetch_add(new_infections, Ordering::Relaxed);
    }

    /// Records a finished generation and logs its summary.
    pub fn record_generation(&self, summary: &GenerationSummary, duration: Duration) {
        self.generations.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            gen = summary.gen,
            mean_energy = summary.mean_energy,
            mean_trait = summary.mean_trait,
            sd_trait = summary.sd_trait,
            infected = summary.n_infected,
            items = summary.items_consumed,
            contacts = summary.total_contact_weight,
            components = summary.n_components,
            duration_ms = duration.as_millis() as u64,
            "Generation complete"
        );
    }

    #[must_use]
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn timesteps(&self) -> u64 {
        self.timesteps.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn items_consumed(&self) -> u64 {
        self.items_consumed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn infections(&self) -> u64 {
        self.infections.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}
