//! Run reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::steps::{Outcome, OutcomeKind, Severity};

/// Exit code when the run completed (Advisory failures allowed).
pub const EXIT_OK: i32 = 0;
/// Exit code when a Fatal step failed.
pub const EXIT_FATAL: i32 = 1;
/// Exit code when the run was interrupted.
pub const EXIT_INTERRUPTED: i32 = 130;

/// The recorded result of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub skipped: usize,
    pub applied: usize,
    pub failed: usize,
    pub blocked: usize,
}

impl OutcomeCounts {
    fn add(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Applied => self.applied += 1,
            OutcomeKind::Failed => self.failed += 1,
            OutcomeKind::Blocked => self.blocked += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.skipped + self.applied + self.failed + self.blocked
    }
}

/// Ordered step outcomes for one run. Read-only once the run completes.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub interrupted: bool,
    counts: OutcomeCounts,
    steps: Vec<StepRecord>,
}

impl RunReport {
    /// Begin a report.
    pub fn start(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            interrupted: false,
            counts: OutcomeCounts::default(),
            steps: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, record: StepRecord) {
        self.counts.add(record.outcome.kind());
        self.steps.push(record);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Step records in execution order.
    pub fn entries(&self) -> &[StepRecord] {
        &self.steps
    }

    /// `(name, outcome)` pairs in execution order.
    pub fn outcomes(&self) -> Vec<(&str, &Outcome)> {
        self.steps
            .iter()
            .map(|r| (r.name.as_str(), &r.outcome))
            .collect()
    }

    /// The outcome recorded for a step.
    pub fn outcome_of(&self, name: &str) -> Option<&Outcome> {
        self.steps
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.outcome)
    }

    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    /// Steps whose action raised an error.
    pub fn failures(&self) -> Vec<&StepRecord> {
        self.steps
            .iter()
            .filter(|r| r.outcome.kind() == OutcomeKind::Failed)
            .collect()
    }

    /// Steps that were not attempted.
    pub fn blocked(&self) -> Vec<&StepRecord> {
        self.steps
            .iter()
            .filter(|r| r.outcome.kind() == OutcomeKind::Blocked)
            .collect()
    }

    /// Fatal steps that failed.
    pub fn fatal_failures(&self) -> Vec<&StepRecord> {
        self.failures()
            .into_iter()
            .filter(|r| r.severity == Severity::Fatal)
            .collect()
    }

    /// Whether every step ended Skipped or Applied.
    pub fn is_converged(&self) -> bool {
        self.steps.iter().all(|r| r.outcome.is_satisfied())
    }

    /// Process exit code for this run.
    ///
    /// Advisory failures never make the run fail.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            EXIT_INTERRUPTED
        } else if !self.fatal_failures().is_empty() {
            EXIT_FATAL
        } else {
            EXIT_OK
        }
    }

    /// Total wall-clock time, once finished.
    pub fn duration(&self) -> Option<std::time::Duration> {
        self.finished_at
            .and_then(|end| (end - self.started_at).to_std().ok())
    }
}
