//! Alert sink adapters for alertgen.
//!
//! Each adapter is a one-shot request builder behind [`AlertSink`]: no retry,
//! backoff or rate limiting. Use [`get_sink`] to construct one by provider name.

mod http;
mod mock;
mod opsgenie;
mod pagerduty;

use std::sync::Arc;
use std::time::Duration;

use alertgen_core::{AlertSink, CoreError, CoreResult};
use tracing::info;

pub use mock::MockAlertSink;
pub use opsgenie::{map_priority, OpsGenieAlert, OpsGenieSink};
pub use pagerduty::{map_severity, PagerDutyEvent, PagerDutyPayload, PagerDutySink};

/// Provider names accepted by [`get_sink`].
pub const PROVIDERS: [&str; 3] = ["opsgenie", "pagerduty", "mock"];

pub fn available_providers() -> &'static [&'static str] {
    &PROVIDERS
}

/// Builds the sink for `provider`.
///
/// `endpoint` replaces the provider's default endpoint verbatim. The mock
/// provider ignores both credential and endpoint.
///
/// # Errors
///
/// Returns [`CoreError::NotFound`] for an unknown provider name, or an internal
/// error if the HTTP client cannot be built.
pub fn get_sink(
    provider: &str,
    credential: &str,
    endpoint: Option<&str>,
    timeout: Duration,
) -> CoreResult<Arc<dyn AlertSink>> {
    let endpoint = endpoint.filter(|e| !e.is_empty()).map(str::to_string);

    let sink: Arc<dyn AlertSink> = match provider.trim().to_ascii_lowercase().as_str() {
        "opsgenie" => Arc::new(OpsGenieSink::new(credential, endpoint, timeout)?),
        "pagerduty" => Arc::new(PagerDutySink::new(credential, endpoint, timeout)?),
        "mock" => Arc::new(MockAlertSink::new()),
        _ => return Err(CoreError::not_found("provider", provider)),
    };

    info!(provider = sink.name(), "alert sink initialized");
    Ok(sink)
}
