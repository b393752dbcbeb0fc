//! HTTP adapter tests against an in-process provider stub.
//!
//! Each test binds an axum server on an ephemeral local port and points the
//! sink at it through the endpoint override.

use std::sync::Arc;
use std::time::Duration;

use alertgen_core::{Alert, AlertSink, Priority, Severity, SinkError};
use alertgen_sinks::{get_sink, OpsGenieSink, PagerDutySink};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

impl Stub {
    fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

async fn capture(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    stub.requests.lock().push((headers, body));
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    (stub.status, stub.body)
}

/// Starts the stub and returns the URL of its single endpoint.
async fn serve(stub: Stub) -> String {
    let app = Router::new()
        .route("/ingest", post(capture))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/ingest")
}

fn sample_alert() -> Alert {
    Alert::new(
        "random-abc123-4",
        "Random alert #4",
        Severity::Critical,
        Priority::High,
        "scenario-random",
    )
    .with_detail("scenario", "random")
    .with_detail("index", 4)
}

#[tokio::test]
async fn test_opsgenie_sends_genie_key_and_payload() {
    let stub = Stub::new(StatusCode::ACCEPTED, "{}");
    let requests = stub.requests.clone();
    let url = serve(stub).await;

    let sink = OpsGenieSink::new("secret-key", Some(url), Duration::from_secs(5)).unwrap();
    sink.send(&sample_alert()).await.unwrap();

    let requests = requests.lock();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["authorization"], "GenieKey secret-key");
    assert_eq!(body["message"], "Random alert #4");
    assert_eq!(body["alias"], "random-abc123-4");
    assert_eq!(body["priority"], "P2");
    assert_eq!(body["details"]["index"], 4);
}

#[tokio::test]
async fn test_opsgenie_error_status_is_rejected() {
    let url = serve(Stub::new(StatusCode::INTERNAL_SERVER_ERROR, "boom")).await;

    let sink = OpsGenieSink::new("key", Some(url), Duration::from_secs(5)).unwrap();
    let err = sink.send(&sample_alert()).await.unwrap_err();

    match err {
        SinkError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert!(body.is_empty());
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pagerduty_rejection_includes_body() {
    let stub = Stub::new(StatusCode::BAD_REQUEST, "Invalid routing key");
    let requests = stub.requests.clone();
    let url = serve(stub).await;

    let sink = PagerDutySink::new("routing-key", Some(url), Duration::from_secs(5)).unwrap();
    let err = sink.send(&sample_alert()).await.unwrap_err();

    match err {
        SinkError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Invalid routing key");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    let requests = requests.lock();
    let (_, body) = &requests[0];
    assert_eq!(body["routing_key"], "routing-key");
    assert_eq!(body["event_action"], "trigger");
    assert_eq!(body["payload"]["severity"], "critical");
    assert_eq!(body["payload"]["source"], "scenario-random");
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let url = serve(Stub::new(StatusCode::OK, "").with_delay(Duration::from_secs(3))).await;

    let sink = get_sink("pagerduty", "key", Some(&url), Duration::from_millis(200)).unwrap();
    let err = sink.send(&sample_alert()).await.unwrap_err();

    assert!(matches!(err, SinkError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let sink = get_sink(
        "opsgenie",
        "key",
        Some("http://127.0.0.1:1/v2/alerts"),
        Duration::from_secs(2),
    )
    .unwrap();
    let err = sink.send(&sample_alert()).await.unwrap_err();

    assert!(
        matches!(err, SinkError::Transport(_) | SinkError::Timeout),
        "got {err:?}"
    );
}
