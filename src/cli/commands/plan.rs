//! Plan command implementation.
//!
//! The `outpost plan` command prints the ordered plan. Nothing is probed.

use std::io::Write;
use std::rc::Rc;

use serde::Serialize;

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::provision::SystemRunner;
use crate::runner::Plan;
use crate::steps::Severity;
use crate::ui::{Level, OutpostTheme};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// One step of the plan as shown to the user.
#[derive(Debug, Serialize)]
pub struct PlanEntry<'a> {
    pub index: usize,
    pub name: &'a str,
    pub title: &'a str,
    pub severity: Severity,
    pub after: &'a [String],
    pub probe: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

pub fn plan_entries(plan: &Plan) -> Vec<PlanEntry<'_>> {
    plan.steps()
        .iter()
        .enumerate()
        .map(|(i, step)| PlanEntry {
            index: i + 1,
            name: step.name(),
            title: step.display_title(),
            severity: step.severity(),
            after: step.prerequisites(),
            probe: step.describe_probe(),
            action: step.describe_action(),
            timeout_secs: step.timeout().map(|t| t.as_secs()),
        })
        .collect()
}

/// Write the plan as text.
pub fn render_plan(
    plan: &Plan,
    theme: &OutpostTheme,
    verbose: bool,
    out: &mut impl Write,
) -> Result<()> {
    for entry in plan_entries(plan) {
        let level = match entry.severity {
            Severity::Fatal => Level::Warning,
            Severity::Advisory => Level::Info,
        };
        let mut line = format!(
            "{:>3}. {} ({})",
            entry.index,
            theme.highlight.apply_to(entry.name),
            entry.severity
        );
        if !entry.after.is_empty() {
            line.push_str(&format!(" after {}", entry.after.join(", ")));
        }
        writeln!(out, "{}", theme.format(level, &line))?;
        if verbose {
            writeln!(out, "       probe:  {}", theme.dim.apply_to(&entry.probe))?;
            writeln!(out, "       action: {}", theme.dim.apply_to(&entry.action))?;
        }
    }
    writeln!(out, "{} step(s)", plan.len())?;
    Ok(())
}

/// The plan command implementation.
pub struct PlanCommand {
    args: PlanArgs,
}

impl PlanCommand {
    pub fn new(args: PlanArgs) -> Self {
        Self { args }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        let config = ctx.load_config()?;
        let plan = ctx.build_plan(&config, Rc::new(SystemRunner), &self.args.only)?;
        let mut out = std::io::stdout().lock();

        if self.args.json {
            let json = serde_json::to_string_pretty(&plan_entries(&plan))
                .map_err(anyhow::Error::from)?;
            writeln!(out, "{}", json)?;
        } else {
            render_plan(&plan, &ctx.theme(), ctx.mode.shows_details(), &mut out)?;
        }
        Ok(CommandResult::success())
    }
}
