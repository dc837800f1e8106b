//! Line-oriented reporter for CI and non-TTY output.

use std::io::Write;

use crate::runner::{RunEvent, RunReport};

use super::summary::{event_line, summary_lines};
use super::{OutpostTheme, OutputMode, Reporter};

/// Writes one bracketed line per event (`[*] [+] [-] [!]`), no colors or
/// spinners.
pub struct PlainReporter<W: Write> {
    out: W,
    theme: OutpostTheme,
    mode: OutputMode,
}

impl PlainReporter<std::io::Stdout> {
    /// Create a reporter on stdout.
    pub fn stdout(mode: OutputMode) -> Self {
        Self::new(std::io::stdout(), mode)
    }
}

impl<W: Write> PlainReporter<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            theme: OutpostTheme::ascii(),
            mode,
        }
    }

    /// Consume the reporter and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for PlainReporter<W> {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        let show = match event {
            RunEvent::StepFinished { record, .. } => {
                self.mode.shows_progress() || record.outcome.is_unsatisfied()
            }
            _ => self.mode.shows_progress(),
        };
        if !show {
            return;
        }
        if let Some((level, text)) = event_line(event) {
            writeln!(self.out, "{}", self.theme.format(level, &text)).ok();
        }
    }

    fn on_finish(&mut self, report: &RunReport) {
        writeln!(self.out, "--- Summary ---").ok();
        for (level, text) in summary_lines(report) {
            writeln!(self.out, "{}", self.theme.format(level, &text)).ok();
        }
        self.out.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutpostError;
    use crate::runner::{Plan, Runner};
    use crate::steps::Step;

    fn render(mode: OutputMode) -> String {
        let plan = Plan::build(vec![
            Step::from_fn("pkg:git", || Ok(())),
            Step::from_fn("pkg:nmap", || {
                Err(OutpostError::InstallFailed {
                    target: "nmap".into(),
                    attempts: vec!["official".into(), "community".into()],
                })
            }),
        ])
        .unwrap();
        let mut reporter = PlainReporter::new(Vec::new(), mode);
        Runner::default().run(&plan, &mut reporter);
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn normal_mode_shows_each_phase() {
        let out = render(OutputMode::Normal);
        assert!(out.contains("[*] [1/2] pkg:git"));
        assert!(out.contains("[+] pkg:git done"));
        assert!(out.contains("[-] pkg:nmap failed"));
        assert!(out.contains("--- Summary ---"));
    }

    #[test]
    fn quiet_mode_keeps_failures_and_summary() {
        let out = render(OutputMode::Quiet);
        assert!(!out.contains("[1/2]"));
        assert!(!out.contains("pkg:git done"));
        assert!(out.contains("[-] pkg:nmap failed"));
        assert!(out.contains("[!] Provisioning finished with 1 failed step(s)"));
    }
}
