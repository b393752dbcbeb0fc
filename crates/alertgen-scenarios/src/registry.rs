use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use alertgen_core::{AlertSink, CancelSignal, CoreError, CoreResult, RunOptions, ScenarioResult};
use async_trait::async_trait;

use crate::procedures::{Burst, Escalating, Mixed, RandomAlerts};

/// A traffic-generation procedure.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Drives `sink` according to `options` until done or cancelled.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unusable options before touching the
    /// sink, and [`CoreError::Cancelled`] with the partial result when
    /// `cancel` fires mid-run. Individual delivery failures are only counted.
    async fn run(
        &self,
        sink: Arc<dyn AlertSink>,
        options: &RunOptions,
        cancel: CancelSignal,
    ) -> CoreResult<ScenarioResult>;
}

/// Registry entry: a named, described procedure.
#[derive(Clone)]
pub struct ScenarioDescriptor {
    pub name: String,
    pub description: String,
    procedure: Arc<dyn Scenario>,
}

impl ScenarioDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        procedure: Arc<dyn Scenario>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            procedure,
        }
    }

    pub fn procedure(&self) -> &Arc<dyn Scenario> {
        &self.procedure
    }
}

impl fmt::Debug for ScenarioDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Immutable name → scenario table.
///
/// Built once through [`RegistryBuilder`] (or [`ScenarioRegistry::builtin`])
/// and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ScenarioRegistry {
    entries: BTreeMap<String, ScenarioDescriptor>,
}

/// Collects descriptors before freezing them into a [`ScenarioRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<String, ScenarioDescriptor>,
}

impl RegistryBuilder {
    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is already registered.
    pub fn register(mut self, descriptor: ScenarioDescriptor) -> CoreResult<Self> {
        if self.entries.contains_key(&descriptor.name) {
            return Err(CoreError::ValidationError(format!(
                "scenario `{}` is already registered",
                descriptor.name
            )));
        }
        self.entries.insert(descriptor.name.clone(), descriptor);
        Ok(self)
    }

    pub fn build(self) -> ScenarioRegistry {
        ScenarioRegistry {
            entries: self.entries,
        }
    }
}

impl ScenarioRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding the four stock scenarios.
    pub fn builtin() -> Self {
        let entries = [
            ScenarioDescriptor::new(
                "escalating",
                "Gradually increases alert severity over time",
                Arc::new(Escalating),
            ),
            ScenarioDescriptor::new(
                "random",
                "Generates alerts with random severities and priorities",
                Arc::new(RandomAlerts),
            ),
            ScenarioDescriptor::new(
                "burst",
                "Sends alerts in bursts with pauses in between",
                Arc::new(Burst),
            ),
            ScenarioDescriptor::new(
                "mixed",
                "Mix of different alert types and severities",
                Arc::new(Mixed),
            ),
        ]
        .into_iter()
        .map(|descriptor| (descriptor.name.clone(), descriptor))
        .collect();

        Self { entries }
    }

    /// Resolves a scenario by name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] naming the unknown scenario.
    pub fn lookup(&self, name: &str) -> CoreResult<&ScenarioDescriptor> {
        self.entries
            .get(name)
            .ok_or_else(|| CoreError::not_found("scenario", name))
    }

    /// All descriptors, ordered by name.
    pub fn list_all(&self) -> Vec<&ScenarioDescriptor> {
        self.entries.values().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl Scenario for Noop {
        async fn run(
            &self,
            _sink: Arc<dyn AlertSink>,
            _options: &RunOptions,
            _cancel: CancelSignal,
        ) -> CoreResult<ScenarioResult> {
            Ok(ScenarioResult::empty())
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = ScenarioRegistry::builtin();
        let names: Vec<&str> = registry.list_all().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["burst", "escalating", "mixed", "random"]);
    }

    #[test]
    fn test_lookup_unknown_scenario() {
        let registry = ScenarioRegistry::builtin();
        let err = registry.lookup("thundering-herd").unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "scenario", ref id } if id == "thundering-herd"));
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let result = ScenarioRegistry::builder()
            .register(ScenarioDescriptor::new("noop", "does nothing", Arc::new(Noop)))
            .and_then(|b| b.register(ScenarioDescriptor::new("noop", "again", Arc::new(Noop))));
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_registry_is_isolated() {
        let registry = ScenarioRegistry::builder()
            .register(ScenarioDescriptor::new("noop", "does nothing", Arc::new(Noop)))
            .unwrap()
            .build();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("noop").unwrap().description, "does nothing");
        assert!(registry.lookup("escalating").is_err());
    }
}
