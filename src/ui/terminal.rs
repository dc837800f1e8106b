//! Interactive terminal reporter.

use std::io::Write;
use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};

use crate::runner::{RunEvent, RunReport};

use super::summary::{event_line, format_duration, summary_lines};
use super::{should_use_colors, OutpostTheme, OutputMode, Reporter};

/// Themed reporter for a TTY, with a spinner while each step runs.
pub struct TerminalReporter {
    term: Term,
    theme: OutpostTheme,
    mode: OutputMode,
    spinner: Option<ProgressBar>,
}

impl TerminalReporter {
    /// Create a reporter on stdout.
    pub fn new(mode: OutputMode, color: bool) -> Self {
        let theme = if color && should_use_colors() {
            OutpostTheme::new()
        } else {
            OutpostTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
            spinner: None,
        }
    }

    fn start_spinner(&mut self, message: String) {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(bar);
    }

    fn stop_spinner(&mut self) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }
    }

    fn line(&mut self, text: &str) {
        writeln!(self.term, "{}", text).ok();
    }
}

impl Reporter for TerminalReporter {
    fn on_event(&mut self, event: &RunEvent<'_>) {
        let Some((level, text)) = event_line(event) else {
            return;
        };

        match event {
            RunEvent::RunStarting { .. } => {
                if self.mode.shows_progress() {
                    let header = self.theme.format_header(&text);
                    self.line(&header);
                }
            }
            RunEvent::StepStarting { .. } => {
                if self.mode.shows_spinners() {
                    self.start_spinner(text);
                }
            }
            RunEvent::StepFinished { record, .. } => {
                self.stop_spinner();
                let failed = record.outcome.is_unsatisfied();
                if self.mode.shows_progress() || failed {
                    let formatted = self.theme.format(level, &text);
                    self.line(&formatted);
                }
            }
        }
    }

    fn on_finish(&mut self, report: &RunReport) {
        self.stop_spinner();
        let b = self.theme.border.clone();

        self.line("");
        self.line(&format!(
            "  {} {}",
            b.apply_to("┌─"),
            b.apply_to("Summary ──────────────────────────")
        ));
        for (level, text) in summary_lines(report) {
            let formatted = self.theme.format(level, &text);
            self.line(&format!("  {} {}", b.apply_to("│"), formatted));
        }
        if let Some(total) = report.duration() {
            let total = self.theme.duration.apply_to(format_duration(total)).to_string();
            self.line(&format!("  {} Total: {}", b.apply_to("│"), total));
        }
        self.line(&format!(
            "  {}",
            b.apply_to("└──────────────────────────────────")
        ));
    }
}
