use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, CoreResult};

/// Options shared by every scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Total number of alerts to attempt.
    pub count: usize,
    /// Delay between alerts in milliseconds; 0 means no delay.
    pub interval_ms: u64,
    /// Worker pool size for pooled scenarios.
    pub concurrency: usize,
    /// Free-form scenario parameters (e.g. `burst_size`, `pause_duration`).
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            count: 100,
            interval_ms: 100,
            concurrency: 10,
            params: HashMap::new(),
        }
    }
}

impl RunOptions {
    /// Creates options with no free-form parameters.
    #[must_use]
    pub fn new(count: usize, interval_ms: u64, concurrency: usize) -> Self {
        Self {
            count,
            interval_ms,
            concurrency,
            params: HashMap::new(),
        }
    }

    /// Adds a free-form parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Inter-alert delay as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reads a base-10 integer parameter, falling back to `default` when the
    /// key is absent or the value does not parse.
    pub fn int_param(&self, key: &str, default: u64) -> u64 {
        match self.params.get(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) => value,
                Err(_) => {
                    warn!(param = key, value = %raw, default, "unparsable scenario parameter, using default");
                    default
                }
            },
        }
    }

    /// Rejects options a worker pool cannot run with.
    pub fn validate_pooled(&self) -> CoreResult<()> {
        if self.concurrency == 0 {
            return Err(CoreError::ValidationError(
                "concurrency must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Aggregated outcome of a scenario run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Alerts the sink accepted.
    pub sent: usize,
    /// Alerts the sink rejected or that could not be delivered.
    pub failed: usize,
    /// Wall-clock time spent on the run.
    pub duration: Duration,
    /// Accepted alerts per second; 0 when no time elapsed.
    pub rate: f64,
}

impl ScenarioResult {
    /// Builds a result and derives its throughput.
    #[must_use]
    pub fn new(sent: usize, failed: usize, duration: Duration) -> Self {
        let secs = duration.as_secs_f64();
        let rate = if secs > 0.0 { sent as f64 / secs } else { 0.0 };
        Self {
            sent,
            failed,
            duration,
            rate,
        }
    }

    /// Result of a run that attempted nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Total delivery attempts.
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }
}
