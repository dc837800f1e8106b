//! Run reporting.
//!
//! A [`Reporter`] observes a run. The runner calls it synchronously after
//! each step completes and once at the end; reporters never influence
//! control flow.
//!
//! - [`TerminalReporter`] for interactive terminals
//! - [`PlainReporter`] for CI and piped output
//! - [`JsonLinesReporter`] for machine-readable logs
//! - [`FanOut`] to drive several at once
//! - [`MockReporter`] for tests

pub mod json;
pub mod mock;
pub mod output;
pub mod plain;
pub mod prompts;
pub mod summary;
pub mod terminal;
pub mod theme;

pub use json::JsonLinesReporter;
pub use mock::MockReporter;
pub use output::OutputMode;
pub use plain::PlainReporter;
pub use prompts::confirm;
pub use summary::{format_duration, summary_lines};
pub use terminal::TerminalReporter;
pub use theme::{should_use_colors, Level, OutpostTheme};

use crate::runner::{RunEvent, RunReport};

/// Observer of a run.
pub trait Reporter {
    /// Called for each progress event, in order.
    fn on_event(&mut self, event: &RunEvent<'_>);

    /// Called once with the completed report.
    fn on_finish(&mut self, report: &RunReport);
}

/// Forwards every call to each inner reporter in turn.
#[derive(Default)]
pub struct FanOut {
    reporters: Vec<Box<dyn Reporter>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reporter.
    pub fn with(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    pub fn push(&mut self, reporter: Box<dyn Reporter>) {
        self.reporters.push(reporter);
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl Reporter for FanOut {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        for reporter in &mut self.reporters {
            reporter.on_event(event);
        }
    }

    fn on_finish(&mut self, report: &RunReport) {
        for reporter in &mut self.reporters {
            reporter.on_finish(report);
        }
    }
}

/// Pick the human-facing reporter for this process.
///
/// Interactive terminals get [`TerminalReporter`]; CI and pipes get
/// [`PlainReporter`].
pub fn create_reporter(mode: OutputMode, color: bool) -> Box<dyn Reporter> {
    let interactive = console::Term::stdout().is_term() && !crate::shell::is_ci();
    if interactive {
        Box::new(TerminalReporter::new(mode, color))
    } else {
        Box::new(PlainReporter::stdout(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Plan, Runner};
    use crate::steps::Step;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Shared(Rc<RefCell<MockReporter>>);

    impl Reporter for Shared {
        fn on_event(&mut self, event: &RunEvent<'_>) {
            self.0.borrow_mut().on_event(event);
        }

        fn on_finish(&mut self, report: &RunReport) {
            self.0.borrow_mut().on_finish(report);
        }
    }

    #[test]
    fn fan_out_forwards_to_all() {
        let a = Rc::new(RefCell::new(MockReporter::new()));
        let b = Rc::new(RefCell::new(MockReporter::new()));
        let mut fan = FanOut::new()
            .with(Shared(a.clone()))
            .with(Shared(b.clone()));
        assert_eq!(fan.len(), 2);

        let plan = Plan::build(vec![Step::from_fn("x", || Ok(()))]).unwrap();
        Runner::default().run(&plan, &mut fan);

        for mock in [a, b] {
            let mock = mock.borrow();
            assert_eq!(mock.finished(), vec!["x"]);
            assert!(mock.saw_finish());
            assert_eq!(mock.exit_code(), Some(0));
        }
    }
}
