//! Bounded worker pool used by the pooled scenarios.
//!
//! producer -> work queue -> N workers -> result queue -> aggregator
//!
//! On cancellation the producer stops and closes the work queue, workers stop
//! taking indices, in-flight deliveries are abandoned, and the aggregator
//! drains whatever outcomes arrive before every worker has exited.

use std::sync::Arc;
use std::time::Duration;

use alertgen_core::{Alert, AlertSink, CancelSignal, CoreError, CoreResult, RunOptions, ScenarioResult};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::delivery::{deliver, Outcome, Tally};

/// Runs `options.count` deliveries over `options.concurrency` workers,
/// building each alert from its index with `build`.
pub(crate) async fn run_pooled<F>(
    sink: Arc<dyn AlertSink>,
    options: &RunOptions,
    cancel: CancelSignal,
    build: F,
) -> CoreResult<ScenarioResult>
where
    F: Fn(usize) -> Alert + Send + Sync + 'static,
{
    options.validate_pooled()?;
    let count = options.count;
    if count == 0 {
        return Ok(ScenarioResult::empty());
    }

    let workers = options.concurrency.min(count);
    let build = Arc::new(build);
    let (job_tx, job_rx) = mpsc::channel::<usize>(workers);
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<Outcome>(workers);

    let mut tally = Tally::start();
    let mut tasks = JoinSet::new();

    for worker_id in 0..workers {
        let jobs = Arc::clone(&job_rx);
        let outcomes = outcome_tx.clone();
        let sink = Arc::clone(&sink);
        let build = Arc::clone(&build);
        let cancel = cancel.clone();

        tasks.spawn(async move {
            let mut handled = 0usize;
            loop {
                let next = jobs.lock().await.recv().await;
                let Some(index) = next else { break };
                if cancel.is_cancelled() {
                    break;
                }

                let alert = (*build)(index);
                let outcome = deliver(sink.as_ref(), &alert, &cancel).await;
                handled += 1;
                if outcomes.send(outcome).await.is_err() {
                    break;
                }
            }
            debug!(worker_id, handled, "worker finished");
        });
    }
    // Workers hold the only senders; the queue closes once they all exit.
    drop(outcome_tx);

    let producer = tokio::spawn(produce(job_tx, count, options.interval(), cancel.clone()));

    while let Some(outcome) = outcome_rx.recv().await {
        tally.record(outcome);
    }

    let emitted = producer
        .await
        .map_err(|e| CoreError::internal(format!("producer task failed: {e}")))?;
    while let Some(joined) = tasks.join_next().await {
        joined.map_err(|e| CoreError::internal(format!("worker task failed: {e}")))?;
    }

    if tally.interrupted() || tally.attempted() < count {
        if cancel.is_cancelled() {
            warn!(emitted, attempted = tally.attempted(), count, "worker pool cancelled");
            return Err(tally.cancelled());
        }
        return Err(CoreError::internal(format!(
            "worker pool drained {} of {} outcomes",
            tally.attempted(),
            count
        )));
    }

    Ok(tally.finish())
}

/// Feeds `0..count` into the work queue, one index per `interval` tick.
///
/// Returns how many indices were emitted. Dropping `jobs` on return closes
/// the queue.
async fn produce(
    jobs: mpsc::Sender<usize>,
    count: usize,
    interval: Duration,
    cancel: CancelSignal,
) -> usize {
    let mut ticker = (!interval.is_zero()).then(|| {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    for index in 0..count {
        if let Some(ticker) = ticker.as_mut() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.cancelled() => return index,
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return index,
            sent = jobs.send(index) => {
                if sent.is_err() {
                    return index;
                }
            }
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgen_core::{CancelHandle, Priority, Severity};

    #[tokio::test(start_paused = true)]
    async fn test_producer_releases_one_index_per_tick() {
        let (tx, mut rx) = mpsc::channel(16);
        let start = tokio::time::Instant::now();
        let producer = tokio::spawn(produce(tx, 4, Duration::from_millis(100), CancelSignal::never()));

        let mut arrivals = Vec::new();
        while let Some(index) = rx.recv().await {
            arrivals.push((index, start.elapsed()));
        }

        assert_eq!(producer.await.unwrap(), 4);
        let expected: Vec<(usize, Duration)> =
            (0..4).map(|i| (i, Duration::from_millis(100 * i as u64))).collect();
        assert_eq!(arrivals, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_stops_on_cancel() {
        let (handle, signal) = CancelHandle::new();
        let (tx, mut rx) = mpsc::channel(16);
        let producer = tokio::spawn(produce(tx, 1_000, Duration::from_millis(10), signal));

        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        handle.cancel();

        let emitted = producer.await.unwrap();
        assert!(emitted < 1_000);
        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected_before_any_send() {
        let sink: Arc<dyn AlertSink> = Arc::new(alertgen_sinks::MockAlertSink::new());
        let err = run_pooled(sink, &RunOptions::new(3, 0, 0), CancelSignal::never(), |i| {
            Alert::new(i.to_string(), "m", Severity::Info, Priority::Low, "tests")
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}
