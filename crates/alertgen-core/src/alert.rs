use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Loosely-typed key/value details attached to an alert.
pub type AlertDetails = BTreeMap<String, Value>;

/// Alert severity, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// All severities in escalation order.
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Position of this severity inside [`Severity::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "invalid severity '{s}', expected one of: info, warning, error, critical"
                ))
            })
    }
}

/// Alert priority, ordered from lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// All priorities in escalation order.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Position of this priority inside [`Priority::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "invalid priority '{s}', expected one of: low, medium, high, critical"
                ))
            })
    }
}

/// A single synthetic alert handed to an [`AlertSink`](crate::AlertSink).
///
/// Alerts are built once by a scenario and only ever lent to sinks by shared
/// reference, so they cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Identifier, unique per send attempt.
    pub id: String,
    /// Human-readable message text.
    pub message: String,
    pub severity: Severity,
    pub priority: Priority,
    /// Label describing what produced the alert.
    pub source: String,
    #[serde(default)]
    pub details: AlertDetails,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Creates an alert stamped with the current time and no details.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        priority: Priority,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            severity,
            priority,
            source: source.into(),
            details: AlertDetails::new(),
            timestamp: Utc::now(),
        }
    }

    /// Adds one detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}
