//! JSON Lines reporter.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::error::Result;
use crate::runner::{RunEvent, RunReport};

use super::Reporter;

/// Writes one JSON object per event, then a final `run_finished` object
/// carrying the whole report.
pub struct JsonLinesReporter<W: Write> {
    out: W,
}

impl JsonLinesReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl JsonLinesReporter<std::fs::File> {
    /// Append to a log file, creating it if needed.
    pub fn to_file(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, mut value: Value) {
        if let Value::Object(map) = &mut value {
            map.insert(
                "timestamp".to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }
        writeln!(self.out, "{}", value).ok();
    }
}

impl<W: Write> Reporter for JsonLinesReporter<W> {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        match serde_json::to_value(event) {
            Ok(value) => self.emit(value),
            Err(e) => tracing::warn!(error = %e, "Could not serialize run event"),
        }
    }

    fn on_finish(&mut self, report: &RunReport) {
        self.emit(json!({
            "event": "run_finished",
            "exit_code": report.exit_code(),
            "report": report,
        }));
        self.out.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Plan, Runner};
    use crate::steps::Step;

    fn lines() -> Vec<Value> {
        let plan = Plan::build(vec![
            Step::from_fn("sync", || Ok(())).fatal(),
            Step::from_fn("pkg:git", || Ok(()))
                .after("sync")
                .probe_fn("present", || true),
        ])
        .unwrap();
        let mut reporter = JsonLinesReporter::new(Vec::new());
        Runner::default().run(&plan, &mut reporter);
        String::from_utf8(reporter.into_inner())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn one_object_per_event() {
        let lines = lines();
        let events: Vec<_> = lines.iter().map(|v| v["event"].as_str().unwrap()).collect();
        assert_eq!(
            events,
            vec![
                "run_starting",
                "step_starting",
                "step_finished",
                "step_starting",
                "step_finished",
                "run_finished"
            ]
        );
    }

    #[test]
    fn finished_events_carry_outcome() {
        let lines = lines();
        assert_eq!(lines[2]["name"], "sync");
        assert_eq!(lines[2]["status"], "applied");
        assert_eq!(lines[2]["severity"], "fatal");
        assert_eq!(lines[4]["status"], "skipped");
    }

    #[test]
    fn timestamps_are_rfc3339() {
        for line in lines() {
            let ts = line["timestamp"].as_str().unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        }
    }

    #[test]
    fn final_line_holds_report() {
        let last = lines().pop().unwrap();
        assert_eq!(last["exit_code"], 0);
        assert_eq!(last["report"]["counts"]["applied"], 1);
        assert_eq!(last["report"]["steps"][1]["name"], "pkg:git");
    }

    #[test]
    fn to_file_appends() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("logs/run.jsonl");
        let plan = Plan::build(vec![Step::from_fn("a", || Ok(()))]).unwrap();

        for _ in 0..2 {
            let mut reporter = JsonLinesReporter::to_file(&path).unwrap();
            Runner::default().run(&plan, &mut reporter);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let finished = content
            .lines()
            .filter(|l| l.contains("run_finished"))
            .count();
        assert_eq!(finished, 2);
    }
}
