use std::sync::Arc;
use std::time::Duration;

use alertgen_core::{
    Alert, AlertSink, CancelSignal, CoreResult, Priority, RunOptions, ScenarioResult, Severity,
};
use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use super::{alert_id, run_tag, source_label};
use crate::delivery::{deliver, Tally};
use crate::registry::Scenario;

/// Sequential run of fixed-size bursts separated by a longer pause.
pub struct Burst;

/// Where the burst scenario waits, derived from the free-form parameters
/// `burst_size` and `pause_duration` (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstPlan {
    pub burst_size: usize,
    pub pause: Duration,
}

impl BurstPlan {
    pub const DEFAULT_BURST_SIZE: usize = 10;
    pub const DEFAULT_PAUSE_MS: u64 = 2000;

    pub fn from_options(options: &RunOptions) -> Self {
        let requested = options.int_param("burst_size", Self::DEFAULT_BURST_SIZE as u64);
        let burst_size = match usize::try_from(requested) {
            Ok(0) | Err(_) => {
                warn!(burst_size = requested, "burst_size out of range, using default");
                Self::DEFAULT_BURST_SIZE
            }
            Ok(size) => size,
        };

        Self {
            burst_size,
            pause: Duration::from_millis(options.int_param("pause_duration", Self::DEFAULT_PAUSE_MS)),
        }
    }

    /// True when a burst boundary (other than the start) precedes `index`.
    pub fn pauses_before(&self, index: usize) -> bool {
        index > 0 && index % self.burst_size == 0
    }

    /// True when the regular interval follows `index`: inside a burst and
    /// not after the last alert of the run.
    pub fn waits_after(&self, index: usize, count: usize) -> bool {
        index % self.burst_size != self.burst_size - 1 && index + 1 < count
    }

    /// Indices preceded by a burst pause in a run of `count` alerts.
    pub fn pause_points(&self, count: usize) -> Vec<usize> {
        (0..count).filter(|&i| self.pauses_before(i)).collect()
    }
}

fn build_alert(run_tag: &str, index: usize, plan: &BurstPlan) -> Alert {
    let severity = Severity::ALL[rand::thread_rng().gen_range(0..Severity::ALL.len())];

    Alert::new(
        alert_id("burst", run_tag, index),
        format!("Burst alert #{index}"),
        severity,
        Priority::High,
        source_label("burst"),
    )
    .with_detail("scenario", "burst")
    .with_detail("index", index)
    .with_detail("burst_index", index % plan.burst_size)
}

#[async_trait]
impl Scenario for Burst {
    async fn run(
        &self,
        sink: Arc<dyn AlertSink>,
        options: &RunOptions,
        cancel: CancelSignal,
    ) -> CoreResult<ScenarioResult> {
        let count = options.count;
        if count == 0 {
            return Ok(ScenarioResult::empty());
        }

        let plan = BurstPlan::from_options(options);
        let tag = run_tag();
        let mut tally = Tally::start();

        for index in 0..count {
            if plan.pauses_before(index) {
                debug!(after = index, pause_ms = plan.pause.as_millis() as u64, "pausing between bursts");
                let _ = cancel.sleep(plan.pause).await;
            }
            if cancel.is_cancelled() {
                return Err(tally.cancelled());
            }

            let alert = build_alert(&tag, index, &plan);
            tally.record(deliver(sink.as_ref(), &alert, &cancel).await);
            if tally.interrupted() {
                return Err(tally.cancelled());
            }

            if plan.waits_after(index, count) {
                let _ = cancel.sleep(options.interval()).await;
            }
        }

        Ok(tally.finish())
    }
}
