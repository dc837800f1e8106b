//! Mock reporter for testing.
//!
//! `MockReporter` implements [`Reporter`] and captures every event for
//! later assertion.
//!
//! # Example
//!
//! ```
//! use outpost::runner::{Plan, Runner};
//! use outpost::steps::Step;
//! use outpost::ui::MockReporter;
//!
//! let plan = Plan::build(vec![Step::from_fn("hello", || Ok(()))]).unwrap();
//! let mut reporter = MockReporter::new();
//! Runner::default().run(&plan, &mut reporter);
//!
//! assert_eq!(reporter.finished(), vec!["hello"]);
//! assert!(reporter.saw_finish());
//! ```

use crate::runner::{RunEvent, RunReport};
use crate::steps::Outcome;

use super::Reporter;

/// Captures reporter calls.
#[derive(Debug, Default)]
pub struct MockReporter {
    run_started: Option<(usize, bool)>,
    started: Vec<String>,
    finished: Vec<(String, Outcome)>,
    finish_calls: usize,
    final_exit_code: Option<i32>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(total, dry_run)` from the run-starting event.
    pub fn run_started(&self) -> Option<(usize, bool)> {
        self.run_started
    }

    /// Names of steps that started, in order.
    pub fn started(&self) -> Vec<&str> {
        self.started.iter().map(String::as_str).collect()
    }

    /// Names of steps that finished, in order.
    pub fn finished(&self) -> Vec<&str> {
        self.finished.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Outcomes in the order they were reported.
    pub fn outcomes(&self) -> &[(String, Outcome)] {
        &self.finished
    }

    /// Whether `on_finish` was called exactly once.
    pub fn saw_finish(&self) -> bool {
        self.finish_calls == 1
    }

    /// Exit code of the report passed to `on_finish`.
    pub fn exit_code(&self) -> Option<i32> {
        self.final_exit_code
    }
}

impl Reporter for MockReporter {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        match event {
            RunEvent::RunStarting { total, dry_run } => {
                self.run_started = Some((*total, *dry_run));
            }
            RunEvent::StepStarting { name, .. } => self.started.push(name.to_string()),
            RunEvent::StepFinished { record, .. } => self
                .finished
                .push((record.name.clone(), record.outcome.clone())),
        }
    }

    fn on_finish(&mut self, report: &RunReport) {
        self.finish_calls += 1;
        self.final_exit_code = Some(report.exit_code());
    }
}
