use std::sync::Arc;

use alertgen_core::{
    Alert, AlertSink, CancelSignal, CoreResult, Priority, RunOptions, ScenarioResult, Severity,
};
use async_trait::async_trait;
use rand::Rng;

use super::{alert_id, run_tag, source_label};
use crate::pool::run_pooled;
use crate::registry::Scenario;

/// Pooled run with independently drawn severity and priority per alert.
pub struct RandomAlerts;

fn build_alert(run_tag: &str, index: usize) -> Alert {
    let mut rng = rand::thread_rng();
    let severity = Severity::ALL[rng.gen_range(0..Severity::ALL.len())];
    let priority = Priority::ALL[rng.gen_range(0..Priority::ALL.len())];

    Alert::new(
        alert_id("random", run_tag, index),
        format!("Random alert #{index}"),
        severity,
        priority,
        source_label("random"),
    )
    .with_detail("scenario", "random")
    .with_detail("index", index)
}

#[async_trait]
impl Scenario for RandomAlerts {
    async fn run(
        &self,
        sink: Arc<dyn AlertSink>,
        options: &RunOptions,
        cancel: CancelSignal,
    ) -> CoreResult<ScenarioResult> {
        let tag = run_tag();
        run_pooled(sink, options, cancel, move |index| build_alert(&tag, index)).await
    }
}
