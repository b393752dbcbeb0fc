//! The stock traffic-generation procedures.

mod burst;
mod escalating;
mod mixed;
mod random;

pub use burst::{Burst, BurstPlan};
pub use escalating::{escalation_level, Escalating};
pub use mixed::{AlertTemplate, Mixed, TEMPLATES};
pub use random::RandomAlerts;

use uuid::Uuid;

/// Short tag drawn once per run so alert IDs stay unique across runs.
pub(crate) fn run_tag() -> String {
    let mut tag = Uuid::new_v4().simple().to_string();
    tag.truncate(8);
    tag
}

pub(crate) fn alert_id(scenario: &str, run_tag: &str, index: usize) -> String {
    format!("{scenario}-{run_tag}-{index}")
}

pub(crate) fn source_label(scenario: &str) -> String {
    format!("scenario-{scenario}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_tags_differ() {
        let a = run_tag();
        let b = run_tag();
        assert_eq!(a.len(), 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_alert_id_layout() {
        assert_eq!(alert_id("burst", "0badf00d", 12), "burst-0badf00d-12");
        assert_eq!(source_label("mixed"), "scenario-mixed");
    }
}
