use thiserror::Error;

use crate::result::ScenarioResult;

/// Canonical error type for scenario configuration and execution.
///
/// Per-alert delivery failures are not represented here; they are reported as
/// [`SinkError`](crate::SinkError) and only ever counted.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Named entity (scenario, provider) is not known.
    #[error("unknown {entity}: `{id}`")]
    NotFound {
        /// Entity type name (e.g. `"scenario"`).
        entity: &'static str,
        /// Name that failed to resolve.
        id: String,
    },

    /// Run options or user input are out of range or unparsable.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The run was cancelled before completing.
    #[error("run cancelled after {} of its alerts were attempted", .partial.attempted())]
    Cancelled {
        /// Counts aggregated up to the moment of cancellation.
        partial: ScenarioResult,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Unexpected internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable details for debugging purposes.
        message: String,
    },
}

impl CoreError {
    /// Creates a `NotFound` variant.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a `Cancelled` variant carrying the partial result.
    #[must_use]
    pub fn cancelled(partial: ScenarioResult) -> Self {
        Self::Cancelled { partial }
    }

    /// Creates an `Internal` variant.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true for the `Cancelled` variant.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Partial result of a cancelled run, if any.
    #[must_use]
    pub fn partial_result(&self) -> Option<&ScenarioResult> {
        match self {
            Self::Cancelled { partial } => Some(partial),
            _ => None,
        }
    }
}

/// Convenient result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_not_found_names_the_entity() {
        let err = CoreError::not_found("scenario", "storm");
        assert_eq!(err.to_string(), "unknown scenario: `storm`");
        assert!(err.partial_result().is_none());
    }

    #[test]
    fn test_cancelled_exposes_partial_result() {
        let partial = ScenarioResult::new(3, 1, Duration::from_secs(2));
        let err = CoreError::cancelled(partial.clone());

        assert!(err.is_cancelled());
        assert_eq!(err.partial_result(), Some(&partial));
        assert!(err.to_string().contains("4 of its alerts"));
    }
}
