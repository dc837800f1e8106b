//! Check command implementation.
//!
//! The `outpost check` command evaluates every probe without changing the
//! system. Exit code 0 means the target is fully converged.

use std::io::Write;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use crate::cli::args::CheckArgs;
use crate::error::Result;
use crate::provision::SystemRunner;
use crate::runner::{Plan, EXIT_FATAL};
use crate::steps::Severity;
use crate::ui::{Level, OutpostTheme};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Probe result for one step.
#[derive(Debug, Clone, Serialize)]
pub struct CheckEntry {
    pub name: String,
    pub severity: Severity,
    pub satisfied: bool,
    pub probe: String,
}

/// Evaluate every probe in plan order.
pub fn check_plan(plan: &Plan) -> Vec<CheckEntry> {
    plan.steps()
        .iter()
        .map(|step| {
            let satisfied = step.check();
            debug!(step = step.name(), satisfied, "Probed");
            CheckEntry {
                name: step.name().to_string(),
                severity: step.severity(),
                satisfied,
                probe: step.describe_probe(),
            }
        })
        .collect()
}

pub fn render_check(
    entries: &[CheckEntry],
    theme: &OutpostTheme,
    quiet: bool,
    out: &mut impl Write,
) -> Result<()> {
    let satisfied = entries.iter().filter(|e| e.satisfied).count();
    for entry in entries {
        if entry.satisfied {
            if !quiet {
                writeln!(out, "{}", theme.format_success(&entry.name))?;
            }
        } else {
            writeln!(
                out,
                "{}",
                theme.format(
                    Level::Warning,
                    &format!("{} missing ({})", entry.name, entry.probe)
                )
            )?;
        }
    }
    writeln!(out, "{} of {} step(s) satisfied", satisfied, entries.len())?;
    Ok(())
}

/// The check command implementation.
pub struct CheckCommand {
    args: CheckArgs,
}

impl CheckCommand {
    pub fn new(args: CheckArgs) -> Self {
        Self { args }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        let config = ctx.load_config()?;
        let plan = ctx.build_plan(&config, Rc::new(SystemRunner), &self.args.only)?;
        let entries = check_plan(&plan);
        let mut out = std::io::stdout().lock();

        if self.args.json {
            let json = serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?;
            writeln!(out, "{}", json)?;
        } else {
            render_check(&entries, &ctx.theme(), ctx.mode == crate::ui::OutputMode::Quiet, &mut out)?;
        }

        if entries.iter().all(|e| e.satisfied) {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(EXIT_FATAL))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::Step;
    use std::cell::Cell;

    #[test]
    fn check_probes_every_step_and_applies_nothing() {
        let applied = Rc::new(Cell::new(0));
        let a = applied.clone();
        let b = applied.clone();
        let plan = Plan::build(vec![
            Step::from_fn("base", move || {
                a.set(a.get() + 1);
                Ok(())
            })
            .fatal()
            .probe_fn("base present", || false),
            Step::from_fn("tool", move || {
                b.set(b.get() + 1);
                Ok(())
            })
            .after("base")
            .probe_fn("tool present", || true),
        ])
        .unwrap();

        let entries = check_plan(&plan);
        assert_eq!(applied.get(), 0);
        assert!(!entries[0].satisfied);
        assert!(entries[1].satisfied);
    }

    #[test]
    fn render_reports_missing_steps() {
        let entries = vec![
            CheckEntry {
                name: "pkg:zsh".into(),
                severity: Severity::Fatal,
                satisfied: true,
                probe: "package installed: zsh".into(),
            },
            CheckEntry {
                name: "tool:sqlmap".into(),
                severity: Severity::Advisory,
                satisfied: false,
                probe: "path exists: /opt/sqlmap/.git".into(),
            },
        ];
        let mut out = Vec::new();
        render_check(&entries, &OutpostTheme::ascii(), false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("[+] pkg:zsh"));
        assert!(text.contains("[!] tool:sqlmap missing (path exists: /opt/sqlmap/.git)"));
        assert!(text.contains("1 of 2 step(s) satisfied"));
    }

    #[test]
    fn quiet_hides_satisfied_steps() {
        let entries = vec![CheckEntry {
            name: "pkg:zsh".into(),
            severity: Severity::Fatal,
            satisfied: true,
            probe: "p".into(),
        }];
        let mut out = Vec::new();
        render_check(&entries, &OutpostTheme::ascii(), true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("[+]"));
        assert!(text.contains("1 of 1"));
    }
}
