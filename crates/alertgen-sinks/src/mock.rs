use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alertgen_core::{Alert, AlertSink, SinkError, SinkResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;

/// In-process sink for dry runs and tests.
///
/// Never touches the network. Can simulate latency and fail a random share of
/// alerts, and remembers the IDs of the alerts it accepted.
pub struct MockAlertSink {
    latency_ms: u64,
    failure_rate: f64,
    accepted: Mutex<Vec<String>>,
    rejected: AtomicUsize,
}

impl MockAlertSink {
    /// Creates a sink that accepts everything immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency_ms: 0,
            failure_rate: 0.0,
            accepted: Mutex::new(Vec::new()),
            rejected: AtomicUsize::new(0),
        }
    }

    /// Sets the simulated latency per alert.
    #[must_use]
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Sets the share of alerts to reject, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    /// IDs of accepted alerts in acceptance order.
    pub fn accepted_ids(&self) -> Vec<String> {
        self.accepted.lock().clone()
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.lock().len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    fn should_fail(&self) -> bool {
        self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate)
    }
}

impl Default for MockAlertSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertSink for MockAlertSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, alert: &Alert) -> SinkResult<()> {
        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }

        if self.should_fail() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(SinkError::Injected(format!("mock rejected {}", alert.id)));
        }

        self.accepted.lock().push(alert.id.clone());
        Ok(())
    }
}
