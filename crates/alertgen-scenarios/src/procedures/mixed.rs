use std::sync::Arc;

use alertgen_core::{
    Alert, AlertSink, CancelSignal, CoreResult, Priority, RunOptions, ScenarioResult, Severity,
};
use async_trait::async_trait;
use rand::Rng;

use super::{alert_id, run_tag, source_label};
use crate::pool::run_pooled;
use crate::registry::Scenario;

/// Pooled run drawing each alert uniformly from [`TEMPLATES`].
pub struct Mixed;

/// One entry of the fixed template table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertTemplate {
    pub severity: Severity,
    pub priority: Priority,
    pub message: &'static str,
    pub category: &'static str,
}

const fn template(
    severity: Severity,
    priority: Priority,
    message: &'static str,
    category: &'static str,
) -> AlertTemplate {
    AlertTemplate {
        severity,
        priority,
        message,
        category,
    }
}

pub const TEMPLATES: [AlertTemplate; 8] = [
    template(Severity::Info, Priority::Low, "System startup complete", "system"),
    template(Severity::Info, Priority::Low, "User logged in", "user"),
    template(Severity::Warning, Priority::Medium, "High CPU usage detected", "performance"),
    template(Severity::Warning, Priority::Medium, "Low disk space", "system"),
    template(Severity::Error, Priority::High, "Database connection failed", "database"),
    template(Severity::Error, Priority::High, "Authentication failure", "security"),
    template(Severity::Critical, Priority::Critical, "Service unavailable", "service"),
    template(Severity::Critical, Priority::Critical, "Security breach detected", "security"),
];

impl AlertTemplate {
    /// Picks a template uniformly at random.
    pub fn random() -> &'static AlertTemplate {
        &TEMPLATES[rand::thread_rng().gen_range(0..TEMPLATES.len())]
    }

    fn to_alert(&self, run_tag: &str, index: usize) -> Alert {
        Alert::new(
            alert_id("mixed", run_tag, index),
            format!("{} ({index})", self.message),
            self.severity,
            self.priority,
            source_label("mixed"),
        )
        .with_detail("scenario", "mixed")
        .with_detail("category", self.category)
        .with_detail("index", index)
    }
}

fn build_alert(run_tag: &str, index: usize) -> Alert {
    AlertTemplate::random().to_alert(run_tag, index)
}

#[async_trait]
impl Scenario for Mixed {
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
