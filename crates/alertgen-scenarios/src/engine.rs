//! Scenario Engine - resolves a scenario by name and drives it against a sink
//!
//! The engine owns no per-run state; concurrent runs against the same
//! engine are independent.

use std::sync::Arc;

use alertgen_core::{AlertSink, CancelSignal, CoreResult, RunOptions, ScenarioResult};
use tracing::{info, warn};

use crate::registry::{ScenarioDescriptor, ScenarioRegistry};

/// Runs registered scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    registry: Arc<ScenarioRegistry>,
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl ScenarioEngine {
    pub fn new(registry: ScenarioRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Engine over the four stock scenarios.
    pub fn with_builtin() -> Self {
        Self::new(ScenarioRegistry::builtin())
    }

    pub fn registry(&self) -> &ScenarioRegistry {
        &self.registry
    }

    /// Registered scenarios, ordered by name.
    pub fn list_scenarios(&self) -> Vec<&ScenarioDescriptor> {
        self.registry.list_all()
    }

    /// Runs scenario `name` against `sink`.
    ///
    /// # Errors
    ///
    /// - [`alertgen_core::CoreError::NotFound`] if `name` is not registered;
    ///   the sink is never called.
    /// - [`alertgen_core::CoreError::ValidationError`] for options the
    ///   scenario cannot run with.
    /// - [`alertgen_core::CoreError::Cancelled`] carrying the partial result
    ///   when `cancel` fires before the run completes.
    pub async fn run(
        &self,
        name: &str,
        sink: Arc<dyn AlertSink>,
        options: &RunOptions,
        cancel: CancelSignal,
    ) -> CoreResult<ScenarioResult> {
        let descriptor = self.registry.lookup(name)?;

        info!(
            scenario = %descriptor.name,
            sink = sink.name(),
            count = options.count,
            interval_ms = options.interval_ms,
            concurrency = options.concurrency,
            "starting scenario"
        );

        match descriptor.procedure().run(sink, options, cancel).await {
            Ok(result) => {
                info!(
                    scenario = %descriptor.name,
                    sent = result.sent,
                    failed = result.failed,
                    duration_ms = result.duration.as_millis() as u64,
                    rate = result.rate,
                    "scenario completed"
                );
                Ok(result)
            }
            Err(e) => {
                match e.partial_result() {
                    Some(partial) => warn!(
                        scenario = %descriptor.name,
                        sent = partial.sent,
                        failed = partial.failed,
                        "scenario cancelled"
                    ),
                    None => warn!(scenario = %descriptor.name, error = %e, "scenario failed"),
                }
                Err(e)
            }
        }
    }
}

/// An engine bound to a single sink.
#[derive(Clone)]
pub struct AlertGenerator {
    engine: ScenarioEngine,
    sink: Arc<dyn AlertSink>,
}

impl AlertGenerator {
    pub fn new(engine: ScenarioEngine, sink: Arc<dyn AlertSink>) -> Self {
        Self { engine, sink }
    }

    pub fn sink(&self) -> &Arc<dyn AlertSink> {
        &self.sink
    }

    pub async fn run_scenario(
        &self,
        name: &str,
        options: &RunOptions,
        cancel: CancelSignal,
    ) -> CoreResult<ScenarioResult> {
        self.engine
            .run(name, Arc::clone(&self.sink), options, cancel)
            .await
    }

    pub fn list_scenarios(&self) -> Vec<&ScenarioDescriptor> {
        self.engine.list_scenarios()
    }
}
