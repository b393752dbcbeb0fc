//! Core domain types and seams for the alertgen load generator.
//!
//! Scenario procedures build [`Alert`]s and hand them to an [`AlertSink`];
//! everything provider-specific lives behind that trait.

pub mod alert;
pub mod cancel;
pub mod config;
pub mod error;
pub mod result;
pub mod sink;

pub use alert::{Alert, AlertDetails, Priority, Severity};
pub use cancel::{CancelHandle, CancelSignal, Interrupted};
pub use crate::config::{AlertgenConfig, ProviderConfig, RunDefaults};
pub use error::{CoreError, CoreResult};
pub use result::{RunOptions, ScenarioResult};
pub use sink::{AlertSink, SinkError, SinkResult};
