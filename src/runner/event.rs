//! Status events emitted by the runner.

use serde::Serialize;

use super::report::StepRecord;

/// Progress events emitted synchronously during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent<'a> {
    /// The plan is about to execute.
    RunStarting { total: usize, dry_run: bool },
    /// A step is about to be probed and, if needed, applied.
    StepStarting {
        name: &'a str,
        index: usize,
        total: usize,
    },
    /// A step reached its outcome.
    StepFinished {
        #[serde(flatten)]
        record: &'a StepRecord,
        index: usize,
        total: usize,
    },
}
