//! PagerDuty Events API v2 adapter.

use std::time::Duration;

use alertgen_core::{Alert, AlertDetails, AlertSink, CoreResult, Severity, SinkResult};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Serialize;
use tracing::debug;

use crate::http::{build_client, check_status, classify};

/// Sends alerts as `trigger` events to the PagerDuty Events API.
pub struct PagerDutySink {
    client: reqwest::Client,
    routing_key: String,
    endpoint: String,
}

/// Event envelope for `POST /v2/enqueue`.
#[derive(Debug, Serialize)]
pub struct PagerDutyEvent<'a> {
    pub routing_key: &'a str,
    pub event_action: &'static str,
    pub payload: PagerDutyPayload<'a>,
}

#[derive(Debug, Serialize)]
pub struct PagerDutyPayload<'a> {
    pub summary: &'a str,
    pub source: &'a str,
    pub severity: &'static str,
    pub timestamp: String,
    pub component: &'static str,
    pub group: &'static str,
    pub class: &'static str,
    #[serde(skip_serializing_if = "AlertDetails::is_empty")]
    pub custom_details: &'a AlertDetails,
}

impl<'a> PagerDutyEvent<'a> {
    pub fn trigger(routing_key: &'a str, alert: &'a Alert) -> Self {
        Self {
            routing_key,
            event_action: "trigger",
            payload: PagerDutyPayload {
                summary: &alert.message,
                source: &alert.source,
                severity: map_severity(alert.severity),
                timestamp: alert.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                component: "alertgen",
                group: "testing",
                class: "stress-test",
                custom_details: &alert.details,
            },
        }
    }
}

impl PagerDutySink {
    pub const DEFAULT_ENDPOINT: &'static str = "https://events.pagerduty.com/v2/enqueue";

    /// Creates a sink; `endpoint` replaces [`Self::DEFAULT_ENDPOINT`] verbatim.
    pub fn new(
        routing_key: impl Into<String>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> CoreResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            routing_key: routing_key.into(),
            endpoint: endpoint.unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AlertSink for PagerDutySink {
    fn name(&self) -> &str {
        "pagerduty"
    }

    async fn send(&self, alert: &Alert) -> SinkResult<()> {
        let event = PagerDutyEvent::trigger(&self.routing_key, alert);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&event)
            .send()
            .await
            .map_err(classify)?;

        debug!(alert_id = %alert.id, status = %response.status(), "pagerduty responded");
        // PagerDuty explains rejections (bad routing key, invalid payload) in the body.
        check_status(response, true).await
    }
}

/// PagerDuty accepts the same four severities alertgen uses.
pub fn map_severity(severity: Severity) -> &'static str {
    severity.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgen_core::Priority;

    #[test]
    fn test_severity_mapping_is_identity() {
        for severity in Severity::ALL {
            assert_eq!(map_severity(severity), severity.as_str());
        }
    }

    #[test]
    fn test_trigger_event_shape() {
        let alert = Alert::new("mixed-7", "Low disk space (7)", Severity::Warning, Priority::Medium, "scenario-mixed")
            .with_detail("category", "system");
        let json = serde_json::to_value(PagerDutyEvent::trigger("routing-123", &alert)).unwrap();

        assert_eq!(json["routing_key"], "routing-123");
        assert_eq!(json["event_action"], "trigger");
        assert_eq!(json["payload"]["summary"], "Low disk space (7)");
        assert_eq!(json["payload"]["severity"], "warning");
        assert_eq!(json["payload"]["class"], "stress-test");
        assert_eq!(json["payload"]["custom_details"]["category"], "system");
        assert!(json["payload"]["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
