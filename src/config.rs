//! Engine configuration.
//!
//! Policy knobs that trade latency against downstream load: the dispatch
//! wait bound, the fan-out width used when querying many agents, the
//! durations handed to remote profiling commands, and the status thresholds.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::data::Thresholds;
use crate::error::Result;

/// Remote profiling durations, in milliseconds.
///
/// Passed to the agent as the option bag of the corresponding profiling
/// command; the agent stops the session by itself after this long.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfilingTime {
    pub cpu: u64,
    pub heap: u64,
    pub gc: u64,
}

impl Default for ProfilingTime {
    fn default() -> Self {
        Self {
            cpu: 300_000,
            heap: 300_000,
            gc: 300_000,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long a dispatch waits for an agent reply before giving up.
    pub dispatch_timeout_secs: u64,
    /// Concurrency limit for fan-out over agents or strategies.
    pub fanout_concurrency: usize,
    /// Durations for remote profiling sessions.
    pub profiling_time: ProfilingTime,
    /// Warning/critical thresholds for status classification.
    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch_timeout_secs: 15,
            fanout_concurrency: 2,
            profiling_time: ProfilingTime::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    /// Load configuration, layering an optional file over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let cfg = builder.build()?;
        let mut loaded: Config = cfg.try_deserialize()?;
        if loaded.fanout_concurrency == 0 {
            loaded.fanout_concurrency = 1;
        }
        Ok(loaded)
    }

    /// The dispatch wait bound as a `Duration`.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}
