use serde::{Deserialize, Serialize};

/// Severity levels for activity events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Authority changes and denied attempts
    Critical,
    #[default]
    Important,
}

/// Trait for entities that can be published as activity events.
pub trait Loggable: Serialize + Send + Sync {
    /// Prefix of event names, e.g. `role` in `role.switched`.
    fn entity_type() -> &'static str;

    /// Principal the event is about.
    fn subject_id(&self) -> String;

    fn severity(&self) -> Severity {
        Severity::Important
    }

    fn severity_for_action(&self, action: &str) -> Severity {
        match action {
            "switch_denied" => Severity::Critical,
            "started" | "ended" | "switched" => self.severity(),
            _ => Severity::Important,
        }
    }
}
