//! Per-step outcomes.

use serde::Serialize;

/// Terminal status of a step after a run. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The probe reported the target state already holds.
    Skipped,

    /// The action ran and succeeded.
    Applied,

    /// The action ran and raised an error.
    Failed { error: String },

    /// Not attempted: a prerequisite failed fatally, the run aborted, or
    /// the run was interrupted.
    Blocked { by: String },
}

/// Outcome without its payload, for counting and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Skipped,
    Applied,
    Failed,
    Blocked,
}

impl Outcome {
    /// The payload-free kind of this outcome.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Skipped => OutcomeKind::Skipped,
            Self::Applied => OutcomeKind::Applied,
            Self::Failed { .. } => OutcomeKind::Failed,
            Self::Blocked { .. } => OutcomeKind::Blocked,
        }
    }

    /// Whether the step's target state holds after the run.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Skipped | Self::Applied)
    }

    /// Whether this outcome stops dependents of a Fatal step.
    pub fn is_unsatisfied(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Blocked { .. })
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Skipped => "skipped",
            Self::Applied => "applied",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed { error } => write!(f, "failed: {}", error),
            Self::Blocked { by } => write!(f, "blocked by {}", by),
            other => write!(f, "{}", other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strips_payload() {
        assert_eq!(
            Outcome::Failed {
                error: "x".into()
            }
            .kind(),
            OutcomeKind::Failed
        );
        assert_eq!(Outcome::Blocked { by: "a".into() }.kind(), OutcomeKind::Blocked);
    }

    #[test]
    fn satisfied_outcomes() {
        assert!(Outcome::Skipped.is_satisfied());
        assert!(Outcome::Applied.is_satisfied());
        assert!(!Outcome::Blocked { by: "a".into() }.is_satisfied());
        assert!(Outcome::Failed { error: "e".into() }.is_unsatisfied());
    }

    #[test]
    fn display_includes_detail() {
        let failed = Outcome::Failed {
            error: "exit 1".into(),
        };
        assert_eq!(failed.to_string(), "failed: exit 1");
        assert_eq!(
            Outcome::Blocked { by: "base".into() }.to_string(),
            "blocked by base"
        );
        assert_eq!(Outcome::Skipped.to_string(), "skipped");
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(Outcome::Failed {
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");

        let json = serde_json::to_value(Outcome::Applied).unwrap();
        assert_eq!(json["status"], "applied");
    }
}
