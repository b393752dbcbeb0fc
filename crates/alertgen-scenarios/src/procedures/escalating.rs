use std::sync::Arc;

use alertgen_core::{
    Alert, AlertSink, CancelSignal, CoreResult, Priority, RunOptions, ScenarioResult, Severity,
};
use async_trait::async_trait;

use super::{alert_id, run_tag, source_label};
use crate::delivery::{deliver, Tally};
use crate::registry::Scenario;

/// Sequential run whose severity and priority climb from lowest to highest.
pub struct Escalating;

/// Bucket for the `index`-th of `total` alerts across `levels` levels.
///
/// Non-decreasing in `index` and never above `levels - 1`.
pub fn escalation_level(index: usize, total: usize, levels: usize) -> usize {
    if total == 0 || levels == 0 {
        return 0;
    }
    (index * levels / total).min(levels - 1)
}

fn build_alert(run_tag: &str, index: usize, total: usize) -> Alert {
    let severity = Severity::ALL[escalation_level(index, total, Severity::ALL.len())];
    let priority = Priority::ALL[escalation_level(index, total, Priority::ALL.len())];

    Alert::new(
        alert_id("escalating", run_tag, index),
        format!("Escalating alert #{index}"),
        severity,
        priority,
        source_label("escalating"),
    )
    .with_detail("scenario", "escalating")
    .with_detail("progress", index as f64 / total as f64)
    .with_detail("index", index)
}

#[async_trait]
impl Scenario for Escalating {
    async fn run(
        &self,
        sink: Arc<dyn AlertSink>,
        options: &RunOptions,
        cancel: CancelSignal,
    ) -> CoreResult<ScenarioResult> {
        let total = options.count;
        if total == 0 {
            return Ok(ScenarioResult::empty());
        }

        let tag = run_tag();
        let mut tally = Tally::start();

        for index in 0..total {
            if cancel.is_cancelled() {
                return Err(tally.cancelled());
            }

            let alert = build_alert(&tag, index, total);
            tally.record(deliver(sink.as_ref(), &alert, &cancel).await);
            if tally.interrupted() {
                return Err(tally.cancelled());
            }

            if index + 1 < total {
                // An interrupted pause is caught by the check at the top of the loop.
                let _ = cancel.sleep(options.interval()).await;
            }
        }

        Ok(tally.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_alerts_climb_two_per_level() {
        let levels: Vec<usize> = (0..8).map(|i| escalation_level(i, 8, 4)).collect();
        assert_eq!(levels, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_levels_non_decreasing_and_bounded() {
        for total in [1, 2, 3, 5, 7, 13, 100] {
            let mut previous = 0;
            for index in 0..total {
                let level = escalation_level(index, total, 4);
                assert!(level >= previous);
                assert!(level <= 3);
                previous = level;
            }
        }
    }

    #[test]
    fn test_zero_total_does_not_divide() {
        assert_eq!(escalation_level(0, 0, 4), 0);
    }

    #[test]
    fn test_last_alert_is_critical() {
        let alert = build_alert("feedface", 9, 10);
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.priority, Priority::Critical);
        assert_eq!(alert.id, "escalating-feedface-9");
        assert_eq!(alert.details["progress"], 0.9);
    }
}
