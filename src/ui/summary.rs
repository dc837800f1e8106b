//! Rendering of run events and the final summary as leveled lines.

use std::time::Duration;

use crate::runner::{RunEvent, RunReport, StepRecord};
use crate::steps::{Outcome, Severity};

use super::theme::Level;

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// The line to show when a step starts.
pub fn starting_line(name: &str, index: usize, total: usize) -> String {
    format!("[{}/{}] {}", index + 1, total, name)
}

/// The line to show when a step reaches its outcome.
pub fn finished_line(record: &StepRecord) -> (Level, String) {
    match &record.outcome {
        Outcome::Skipped => (
            Level::Success,
            format!("{} already satisfied", record.name),
        ),
        Outcome::Applied => match &record.detail {
            Some(detail) => (Level::Info, format!("{} {}", record.name, detail)),
            None => (
                Level::Success,
                format!(
                    "{} done ({})",
                    record.name,
                    format_duration(Duration::from_millis(record.duration_ms))
                ),
            ),
        },
        Outcome::Failed { error } => (Level::Error, format!("{} failed: {}", record.name, error)),
        Outcome::Blocked { by } => (
            Level::Warning,
            format!("{} blocked by {}", record.name, by),
        ),
    }
}

/// The line for an event, if it has one.
pub fn event_line(event: &RunEvent<'_>) -> Option<(Level, String)> {
    match event {
        RunEvent::RunStarting { total, dry_run } => Some((
            Level::Info,
            if *dry_run {
                format!("Dry run: evaluating {} steps", total)
            } else {
                format!("Running {} steps", total)
            },
        )),
        RunEvent::StepStarting { name, index, total } => {
            Some((Level::Info, starting_line(name, *index, *total)))
        }
        RunEvent::StepFinished { record, .. } => Some(finished_line(record)),
    }
}

/// Summary lines separating successes from failures.
pub fn summary_lines(report: &RunReport) -> Vec<(Level, String)> {
    let counts = report.counts();
    let mut lines = Vec::new();

    let applied_label = if report.dry_run { "would apply" } else { "applied" };
    lines.push((
        Level::Success,
        format!(
            "{} {}, {} already satisfied",
            counts.applied, applied_label, counts.skipped
        ),
    ));

    for record in report.failures() {
        let tag = if record.severity == Severity::Fatal {
            " (fatal)"
        } else {
            ""
        };
        if let Outcome::Failed { error } = &record.outcome {
            lines.push((Level::Error, format!("{}{}: {}", record.name, tag, error)));
        }
    }

    let blocked = report.blocked();
    if !blocked.is_empty() {
        let names: Vec<_> = blocked.iter().map(|r| r.name.as_str()).collect();
        lines.push((
            Level::Warning,
            format!("{} blocked: {}", blocked.len(), names.join(", ")),
        ));
    }

    lines.push(verdict(report));
    lines
}

fn verdict(report: &RunReport) -> (Level, String) {
    if report.interrupted {
        return (Level::Warning, "Interrupted; re-run to resume".to_string());
    }
    if let Some(fatal) = report.fatal_failures().first() {
        return (
            Level::Error,
            format!("Provisioning stopped: {} failed", fatal.name),
        );
    }
    let failed = report.counts().failed;
    if failed > 0 {
        (
            Level::Warning,
            format!("Provisioning finished with {} failed step(s)", failed),
        )
    } else {
        (Level::Success, "Provisioning complete".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Plan, Runner};
    use crate::ui::MockReporter;
    use crate::error::OutpostError;
    use crate::steps::Step;

    fn report_for(steps: Vec<Step>) -> RunReport {
        let plan = Plan::build(steps).unwrap();
        Runner::default().run(&plan, &mut MockReporter::new())
    }

    fn boom() -> crate::error::Result<()> {
        Err(OutpostError::InstallFailed {
            target: "x".into(),
            attempts: vec!["official".into()],
        })
    }

    #[test]
    fn format_duration_ranges() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs_f64(5.3)), "5.3s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
        assert_eq!(format_duration(Duration::ZERO), "0ms");
    }

    #[test]
    fn starting_line_is_one_based() {
        assert_eq!(starting_line("pkg:git", 0, 3), "[1/3] pkg:git");
    }

    #[test]
    fn finished_lines_use_levels() {
        let report = report_for(vec![
            Step::from_fn("a", || Ok(())),
            Step::from_fn("b", boom),
            Step::from_fn("c", || Ok(())).probe_fn("yes", || true),
        ]);
        let levels: Vec<_> = report
            .entries()
            .iter()
            .map(|r| finished_line(r).0)
            .collect();
        assert_eq!(levels, vec![Level::Success, Level::Error, Level::Success]);
    }

    #[test]
    fn summary_separates_failures() {
        let report = report_for(vec![
            Step::from_fn("good", || Ok(())),
            Step::from_fn("bad", boom),
        ]);
        let lines = summary_lines(&report);

        assert_eq!(lines[0], (Level::Success, "1 applied, 0 already satisfied".into()));
        assert!(lines
            .iter()
            .any(|(l, m)| *l == Level::Error && m.starts_with("bad:")));
        assert_eq!(
            lines.last().unwrap(),
            &(
                Level::Warning,
                "Provisioning finished with 1 failed step(s)".into()
            )
        );
    }

    #[test]
    fn summary_names_fatal_cause() {
        let report = report_for(vec![
            Step::from_fn("privilege", boom).fatal(),
            Step::from_fn("tool", || Ok(())).after("privilege"),
        ]);
        let lines = summary_lines(&report);

        assert!(lines
            .iter()
            .any(|(_, m)| m == "1 blocked: tool"));
        assert_eq!(
            lines.last().unwrap(),
            &(Level::Error, "Provisioning stopped: privilege failed".into())
        );
    }

    #[test]
    fn clean_run_is_complete() {
        let report = report_for(vec![Step::from_fn("a", || Ok(()))]);
        assert_eq!(
            summary_lines(&report).last().unwrap(),
            &(Level::Success, "Provisioning complete".into())
        );
    }
}
