//! OpsGenie Alert API adapter.

use std::time::Duration;

use alertgen_core::{Alert, AlertDetails, AlertSink, CoreResult, Priority, SinkResult};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::debug;

use crate::http::{build_client, check_status, classify};

/// Sends alerts to the OpsGenie v2 alerts endpoint.
pub struct OpsGenieSink {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

/// Request body accepted by `POST /v2/alerts`.
#[derive(Debug, Serialize)]
pub struct OpsGenieAlert<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub priority: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub source: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub entity: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub alias: &'a str,
    #[serde(skip_serializing_if = "AlertDetails::is_empty")]
    pub details: &'a AlertDetails,
}

impl<'a> OpsGenieAlert<'a> {
    pub fn from_alert(alert: &'a Alert) -> Self {
        Self {
            message: &alert.message,
            description: format!(
                "Alert generated via alertgen at {}",
                alert.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            priority: map_priority(alert.priority),
            source: &alert.source,
            entity: &alert.source,
            alias: &alert.id,
            details: &alert.details,
        }
    }
}

impl OpsGenieSink {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.opsgenie.com/v2/alerts";

    /// Creates a sink; `endpoint` replaces [`Self::DEFAULT_ENDPOINT`] verbatim.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> CoreResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.into(),
            endpoint: endpoint.unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AlertSink for OpsGenieSink {
    fn name(&self) -> &str {
        "opsgenie"
    }

    async fn send(&self, alert: &Alert) -> SinkResult<()> {
        let body = OpsGenieAlert::from_alert(alert);

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("GenieKey {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        debug!(alert_id = %alert.id, status = %response.status(), "opsgenie responded");
        check_status(response, false).await
    }
}

/// Maps a generic priority onto OpsGenie's P1..P4 scale.
pub fn map_priority(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "P1",
        Priority::High => "P2",
        Priority::Medium => "P3",
        Priority::Low => "P4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertgen_core::Severity;

    #[test]
    fn test_priority_mapping() {
        assert_eq!(map_priority(Priority::Critical), "P1");
        assert_eq!(map_priority(Priority::High), "P2");
        assert_eq!(map_priority(Priority::Medium), "P3");
        assert_eq!(map_priority(Priority::Low), "P4");
    }

    #[test]
    fn test_payload_uses_id_as_alias() {
        let alert = Alert::new("burst-1", "Burst alert #1", Severity::Error, Priority::High, "scenario-burst")
            .with_detail("index", 1);
        let json = serde_json::to_value(OpsGenieAlert::from_alert(&alert)).unwrap();

        assert_eq!(json["alias"], "burst-1");
        assert_eq!(json["entity"], "scenario-burst");
        assert_eq!(json["priority"], "P2");
        assert_eq!(json["details"]["index"], 1);
        assert!(json["description"]
            .as_str()
            .unwrap()
            .starts_with("Alert generated via alertgen at "));
    }

    #[test]
    fn test_payload_omits_empty_details() {
        let alert = Alert::new("a", "m", Severity::Info, Priority::Low, "s");
        let json = serde_json::to_value(OpsGenieAlert::from_alert(&alert)).unwrap();
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_endpoint_override_is_verbatim() {
        let sink = OpsGenieSink::new(
            "key",
            Some("http://127.0.0.1:9/custom".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(sink.endpoint(), "http://127.0.0.1:9/custom");

        let default = OpsGenieSink::new("key", None, Duration::from_secs(1)).unwrap();
        assert_eq!(default.endpoint(), OpsGenieSink::DEFAULT_ENDPOINT);
    }
}
