//! Run command implementation.
//!
//! The `outpost run` command provisions the target account.

use std::io::Write;
use std::rc::Rc;

use console::Term;
use tracing::info;

use crate::cli::args::RunArgs;
use crate::config::ResolvedConfig;
use crate::error::Result;
use crate::provision::{SharedRunner, SystemRunner};
use crate::runner::{FatalPolicy, InterruptFlag, Plan, RunOptions, Runner};
use crate::shell::is_ci;
use crate::ui::{confirm, create_reporter, FanOut, JsonLinesReporter, OutputMode};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    args: RunArgs,
}

impl RunCommand {
    pub fn new(args: RunArgs) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Build run options from args.
    fn build_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.args.dry_run,
            fatal_policy: if self.args.fail_fast {
                FatalPolicy::AbortRun
            } else {
                FatalPolicy::BlockDependents
            },
        }
    }

    /// Load the manifest and build the plan the run will execute.
    pub fn prepare(
        &self,
        ctx: &CommandContext,
        runner: SharedRunner,
    ) -> Result<(ResolvedConfig, Plan)> {
        let config = ctx.load_config()?;
        let plan = ctx.build_plan(&config, runner, &self.args.only)?;
        Ok((config, plan))
    }

    /// Everything the run reports to: stdout (human or JSON) and the log file.
    fn reporters(&self, ctx: &CommandContext) -> Result<FanOut> {
        let mut reporters = FanOut::new();
        if self.args.json {
            reporters.push(Box::new(JsonLinesReporter::stdout()));
        } else {
            reporters.push(create_reporter(ctx.mode, ctx.color));
        }
        if let Some(path) = &self.args.log_file {
            reporters.push(Box::new(JsonLinesReporter::to_file(path)?));
        }
        Ok(reporters)
    }

    fn needs_confirmation(&self) -> bool {
        !self.args.yes
            && !self.args.dry_run
            && !self.args.json
            && Term::stdout().is_term()
            && Term::stderr().is_term()
            && !is_ci()
    }
}

impl Command for RunCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<CommandResult> {
        let (config, plan) = self.prepare(ctx, Rc::new(SystemRunner))?;

        if !self.args.json && ctx.mode != OutputMode::Quiet {
            let theme = ctx.theme();
            let name = config.manifest.name.as_deref().unwrap_or("workstation");
            let mut out = Term::stdout();
            writeln!(
                out,
                "{}",
                theme.format_header(&format!(
                    "Provisioning {} for {}",
                    name, config.target.user
                ))
            )?;
            if ctx.mode.shows_details() {
                writeln!(out, "  Manifest: {}", config.sources.join(" + "))?;
                writeln!(out, "  Home: {}", config.target.home.display())?;
            }
            if self.args.dry_run {
                writeln!(
                    out,
                    "{}",
                    theme.format_info("Dry run: probes only, nothing will be changed")
                )?;
            }
        }

        if self.needs_confirmation() {
            let question = format!(
                "Provision {} step(s) for {}?",
                plan.len(),
                config.target.user
            );
            if !confirm(&question, true, &Term::stderr())? {
                info!("Run cancelled at confirmation");
                return Ok(CommandResult::success());
            }
        }

        let mut reporters = self.reporters(ctx)?;
        let runner = Runner::new(self.build_options()).with_interrupt(InterruptFlag::sigint());
        let report = runner.run(&plan, &mut reporters);

        info!(
            applied = report.counts().applied,
            failed = report.counts().failed,
            blocked = report.counts().blocked,
            "Run finished"
        );
        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}
