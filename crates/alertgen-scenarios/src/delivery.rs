//! Single-alert delivery and outcome aggregation shared by every procedure.

use alertgen_core::{Alert, AlertSink, CancelSignal, CoreError, ScenarioResult, SinkError};
use tokio::time::Instant;
use tracing::debug;

/// What happened to one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Sent,
    Failed,
    /// The attempt was abandoned because the run was cancelled.
    Interrupted,
}

/// Sends one alert, racing the sink against the cancellation signal.
///
/// Sink failures are logged and folded into the outcome; they never abort
/// the caller.
pub(crate) async fn deliver(sink: &dyn AlertSink, alert: &Alert, cancel: &CancelSignal) -> Outcome {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SinkError::Cancelled),
        result = sink.send(alert) => result,
    };

    match result {
        Ok(()) => Outcome::Sent,
        Err(SinkError::Cancelled) => {
            debug!(alert_id = %alert.id, sink = sink.name(), "delivery abandoned on cancellation");
            Outcome::Interrupted
        }
        Err(e) => {
            debug!(alert_id = %alert.id, sink = sink.name(), error = %e, "alert delivery failed");
            Outcome::Failed
        }
    }
}

/// Running sent/failed counters plus the run's start time.
#[derive(Debug)]
pub(crate) struct Tally {
    sent: usize,
    failed: usize,
    interrupted: bool,
    started: Instant,
}

impl Tally {
    pub(crate) fn start() -> Self {
        Self {
            sent: 0,
            failed: 0,
            interrupted: false,
            started: Instant::now(),
        }
    }

    /// Interrupted attempts count as failures.
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Sent => self.sent += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Interrupted => {
                self.failed += 1;
                self.interrupted = true;
            }
        }
    }

    pub(crate) fn interrupted(&self) -> bool {
        self.interrupted
    }

    pub(crate) fn attempted(&self) -> usize {
        self.sent + self.failed
    }

    pub(crate) fn finish(&self) -> ScenarioResult {
        ScenarioResult::new(self.sent, self.failed, self.started.elapsed())
    }

    /// Cancellation error carrying everything recorded so far.
    pub(crate) fn cancelled(&self) -> CoreError {
        CoreError::cancelled(self.finish())
    }
}
