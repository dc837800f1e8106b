//! Sequential plan execution.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::steps::{Outcome, Severity, Step};
use crate::ui::Reporter;

use super::event::RunEvent;
use super::interrupt::InterruptFlag;
use super::plan::Plan;
use super::report::{RunReport, StepRecord};

/// Reason recorded on steps skipped after an interrupt.
pub const INTERRUPTED: &str = "interrupted";

/// What a Fatal failure does to the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FatalPolicy {
    /// Block every step that transitively depends on the failed step.
    /// Independent steps still run.
    #[default]
    BlockDependents,
    /// Block every remaining step.
    AbortRun,
}

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Evaluate probes but never apply.
    pub dry_run: bool,
    /// Fatal failure handling.
    pub fatal_policy: FatalPolicy,
}

/// Executes a [`Plan`] one step at a time, in plan order.
#[derive(Debug, Default)]
pub struct Runner {
    options: RunOptions,
    interrupt: InterruptFlag,
}

impl Runner {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            interrupt: InterruptFlag::new(),
        }
    }

    /// Use the given interrupt flag for cancellation.
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run every step in the plan.
    ///
    /// Action errors never escape: each one becomes a `Failed` outcome on
    /// its step. The reporter is called synchronously and cannot change
    /// what happens next.
    pub fn run(&self, plan: &Plan, reporter: &mut dyn Reporter) -> RunReport {
        let total = plan.len();
        let mut report = RunReport::start(self.options.dry_run);
        let mut aborted_by: Option<String> = None;

        info!(steps = total, dry_run = self.options.dry_run, "Starting run");
        reporter.on_event(&RunEvent::RunStarting {
            total,
            dry_run: self.options.dry_run,
        });

        for (index, step) in plan.steps().iter().enumerate() {
            let started = Instant::now();

            let blocked_by = if self.interrupt.is_set() {
                report.interrupted = true;
                Some(INTERRUPTED.to_string())
            } else if let Some(by) = &aborted_by {
                Some(by.clone())
            } else {
                self.blocking_prerequisite(step, plan, &report)
            };

            let (outcome, detail) = match blocked_by {
                Some(by) => {
                    debug!(step = step.name(), by = %by, "Blocked");
                    (Outcome::Blocked { by }, None)
                }
                None => {
                    reporter.on_event(&RunEvent::StepStarting {
                        name: step.name(),
                        index,
                        total,
                    });
                    self.evaluate(step, &mut report)
                }
            };

            if matches!(outcome, Outcome::Failed { .. })
                && step.severity() == Severity::Fatal
                && self.options.fatal_policy == FatalPolicy::AbortRun
            {
                warn!(step = step.name(), "Fatal step failed, aborting run");
                aborted_by = Some(step.name().to_string());
            }

            report.record(StepRecord {
                name: step.name().to_string(),
                severity: step.severity(),
                outcome,
                duration_ms: started.elapsed().as_millis() as u64,
                detail,
            });

            if let Some(record) = report.entries().last() {
                reporter.on_event(&RunEvent::StepFinished {
                    record,
                    index,
                    total,
                });
            }
        }

        report.finish();
        reporter.on_finish(&report);
        report
    }

    /// Probe, then apply if needed.
    fn evaluate(&self, step: &Step, report: &mut RunReport) -> (Outcome, Option<String>) {
        if step.check() {
            debug!(step = step.name(), "Probe satisfied");
            return (Outcome::Skipped, None);
        }

        if self.options.dry_run {
            return (Outcome::Applied, Some("would apply".to_string()));
        }

        // An interrupt during the probe still stops the apply.
        if self.interrupt.is_set() {
            report.interrupted = true;
            return (
                Outcome::Blocked {
                    by: INTERRUPTED.to_string(),
                },
                None,
            );
        }

        debug!(step = step.name(), action = %step.describe_action(), "Applying");
        match step.apply() {
            Ok(()) => (Outcome::Applied, None),
            Err(e) => {
                warn!(step = step.name(), error = %e, "Step failed");
                (
                    Outcome::Failed {
                        error: e.to_string(),
                    },
                    None,
                )
            }
        }
    }

    /// The first prerequisite whose outcome blocks this step.
    ///
    /// A Failed prerequisite blocks only when it is Fatal. A Blocked one
    /// blocks whatever its own severity, Advisory included: Blocked only
    /// ever starts at a Fatal failure or an interrupt, and it carries
    /// through every dependent below that point.
    fn blocking_prerequisite(&self, step: &Step, plan: &Plan, report: &RunReport) -> Option<String> {
        step.prerequisites().iter().find_map(|name| {
            let outcome = report.outcome_of(name)?;
            let fatal = plan
                .get(name)
                .is_some_and(|p| p.severity() == Severity::Fatal);
            match outcome {
                Outcome::Blocked { .. } => Some(name.clone()),
                Outcome::Failed { .. } if fatal => Some(name.clone()),
                _ => None,
            }
        })
    }
}
