use async_trait::async_trait;
use thiserror::Error;

use crate::alert::Alert;

/// Failure delivering a single alert.
///
/// Scenarios count these as failed attempts and keep going.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded the client timeout.
    #[error("request timed out")]
    Timeout,

    /// The remote service answered with an error status.
    #[error("request failed with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The alert could not be encoded for the provider.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The caller cancelled the delivery.
    #[error("delivery cancelled")]
    Cancelled,

    /// Failure produced on purpose by a test or mock sink.
    #[error("injected failure: {0}")]
    Injected(String),
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination capable of accepting one alert per call.
///
/// Implementations must not panic on transport or remote failures; every such
/// failure is reported as a [`SinkError`]. Callers cancel an in-flight `send`
/// by dropping its future, so implementations should hold no state that a
/// dropped call would leave inconsistent.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Provider name, e.g. `"opsgenie"`.
    fn name(&self) -> &str;

    /// Delivers one alert.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert could not be encoded, the transport
    /// failed, or the remote service rejected it.
    async fn send(&self, alert: &Alert) -> SinkResult<()>;
}
