//! Integration tests for planning and running steps through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use outpost::error::OutpostError;
use outpost::runner::{FatalPolicy, Plan, RunOptions, Runner};
use outpost::steps::{OutcomeKind, Step};
use outpost::ui::MockReporter;

type Log = Rc<RefCell<Vec<String>>>;

fn recording(name: &str, log: &Log, fail: bool) -> Step {
    let log = log.clone();
    let label = name.to_string();
    Step::from_fn(name, move || {
        log.borrow_mut().push(label.clone());
        if fail {
            Err(OutpostError::CommandFailed {
                command: label.clone(),
                code: Some(1),
            })
        } else {
            Ok(())
        }
    })
}

#[test]
fn base_then_tools_converges() {
    let log: Log = Rc::default();
    let plan = Plan::build(vec![
        recording("toolA", &log, false).after("base"),
        recording("base", &log, false)
            .fatal()
            .probe_fn("base present", || true),
        recording("toolB", &log, true).after("base"),
    ])
    .unwrap();

    let mut reporter = MockReporter::new();
    let report = Runner::new(RunOptions::default()).run(&plan, &mut reporter);

    assert_eq!(*log.borrow(), ["toolA", "toolB"]);
    assert_eq!(report.outcome_of("base").unwrap().kind(), OutcomeKind::Skipped);
    assert_eq!(report.outcome_of("toolA").unwrap().kind(), OutcomeKind::Applied);
    assert_eq!(report.outcome_of("toolB").unwrap().kind(), OutcomeKind::Failed);
    assert_eq!(report.exit_code(), 0);
    assert!(reporter.saw_finish());
}

#[test]
fn fatal_failure_policies() {
    let build = |log: &Log| {
        Plan::build(vec![
            recording("base", log, true).fatal(),
            recording("dependent", log, false).after("base"),
            recording("independent", log, false),
        ])
        .unwrap()
    };

    let log: Log = Rc::default();
    let report = Runner::new(RunOptions::default()).run(&build(&log), &mut MockReporter::new());
    assert_eq!(*log.borrow(), ["base", "independent"]);
    assert_eq!(
        report.outcome_of("dependent").unwrap().kind(),
        OutcomeKind::Blocked
    );
    assert_eq!(report.exit_code(), 1);

    let log: Log = Rc::default();
    let options = RunOptions {
        fatal_policy: FatalPolicy::AbortRun,
        ..Default::default()
    };
    let report = Runner::new(options).run(&build(&log), &mut MockReporter::new());
    assert_eq!(*log.borrow(), ["base"]);
    assert_eq!(report.blocked().len(), 2);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn malformed_plans_are_rejected_before_running() {
    let cycle = Plan::build(vec![
        Step::from_fn("a", || Ok(())).after("b"),
        Step::from_fn("b", || Ok(())).after("a"),
    ]);
    assert!(matches!(cycle, Err(OutpostError::CycleDetected { .. })));

    let duplicate = Plan::build(vec![
        Step::from_fn("a", || Ok(())),
        Step::from_fn("a", || Ok(())),
    ]);
    assert!(matches!(duplicate, Err(OutpostError::DuplicateName { .. })));

    let unknown = Plan::build(vec![Step::from_fn("a", || Ok(())).after("ghost")]);
    assert!(matches!(
        unknown,
        Err(OutpostError::UnknownPrerequisite { .. })
    ));
}
