//! Scenario registry, engine and the stock traffic-generation procedures.
//!
//! ```text
//! ScenarioEngine::run(name) -> ScenarioRegistry::lookup -> Scenario::run -> AlertSink::send
//! ```
//!
//! `escalating` and `burst` send sequentially; `random` and `mixed` fan out
//! over a bounded worker pool.

mod delivery;
mod engine;
mod pool;
pub mod procedures;
mod registry;

pub use engine::{AlertGenerator, ScenarioEngine};
pub use procedures::{
    escalation_level, AlertTemplate, Burst, BurstPlan, Escalating, Mixed, RandomAlerts, TEMPLATES,
};
pub use registry::{RegistryBuilder, Scenario, ScenarioDescriptor, ScenarioRegistry};
