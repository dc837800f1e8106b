//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for the settings every command shares
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::{load_config, LoadOptions, ResolvedConfig, TargetOverrides};
use crate::error::{OutpostError, Result};
use crate::provision::{build_steps, SharedRunner};
use crate::runner::{Plan, EXIT_FATAL, EXIT_INTERRUPTED, EXIT_OK};
use crate::shell::current_user;
use crate::ui::{should_use_colors, OutpostTheme, OutputMode};

/// Exit code for an unusable manifest or plan.
pub const EXIT_CONFIG: i32 = 2;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: EXIT_OK,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    pub fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == EXIT_OK {
            Self::success()
        } else {
            Self::failure(exit_code)
        }
    }
}

/// Exit code for an error that escaped a command.
pub fn exit_code_for(error: &OutpostError) -> i32 {
    match error {
        e if e.is_config_error() || e.is_plan_error() => EXIT_CONFIG,
        OutpostError::Interrupted => EXIT_INTERRUPTED,
        _ => EXIT_FATAL,
    }
}

/// Settings shared by every command, taken from the global flags.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub load: LoadOptions,
    pub overrides: TargetOverrides,
    pub mode: OutputMode,
    pub color: bool,
}

impl CommandContext {
    /// Build the context from parsed arguments. `cwd` is used when
    /// `--root` is absent.
    pub fn from_cli(cli: &Cli, cwd: PathBuf) -> Self {
        Self {
            load: LoadOptions {
                root: cli.root.clone().unwrap_or(cwd),
                manifest: cli.manifest.clone(),
                variant: cli.variant.clone(),
            },
            overrides: TargetOverrides {
                user: cli.user.clone(),
                home: cli.home.clone(),
            },
            mode: OutputMode::from_flags(cli.verbose, cli.quiet),
            color: !cli.no_color,
        }
    }

    pub fn root(&self) -> &Path {
        &self.load.root
    }

    /// Load, interpolate and validate the manifest for the target account.
    pub fn load_config(&self) -> Result<ResolvedConfig> {
        let config = load_config(&self.load, &self.overrides, current_user())?;
        info!(
            user = %config.target.user,
            sources = %config.sources.join(", "),
            "Loaded manifest"
        );
        Ok(config)
    }

    /// Turn a resolved manifest into a plan, optionally restricted to
    /// `only` and its prerequisites.
    pub fn build_plan(
        &self,
        config: &ResolvedConfig,
        runner: SharedRunner,
        only: &[String],
    ) -> Result<Plan> {
        let steps = build_steps(&config.manifest, &config.target, runner)?;
        let plan = Plan::build(steps)?.select(only)?;
        debug!(steps = plan.len(), "Plan built");
        Ok(plan)
    }

    /// Theme for human output on stdout.
    pub fn theme(&self) -> OutpostTheme {
        if !console::Term::stdout().is_term() {
            OutpostTheme::ascii()
        } else if self.color && should_use_colors() {
            OutpostTheme::new()
        } else {
            OutpostTheme::plain()
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: CommandContext,
}

impl CommandDispatcher {
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Run(args)) => super::run::RunCommand::new(args.clone()).execute(&self.context),
            Some(Commands::Plan(args)) => {
                super::plan::PlanCommand::new(args.clone()).execute(&self.context)
            }
            Some(Commands::Check(args)) => {
                super::check::CheckCommand::new(args.clone()).execute(&self.context)
            }
            Some(Commands::Schema) => super::schema::SchemaCommand.execute(&self.context),
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(&self.context)
            }
            None => super::run::RunCommand::new(RunArgs::default()).execute(&self.context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn from_exit_code_maps_zero_to_success() {
        assert!(CommandResult::from_exit_code(0).success);
        assert!(!CommandResult::from_exit_code(130).success);
    }

    #[test]
    fn errors_map_to_exit_codes() {
        let cycle = OutpostError::CycleDetected {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        let invalid = OutpostError::ConfigValidationError {
            message: "x".into(),
        };
        let io = OutpostError::Io(std::io::Error::other("disk"));

        assert_eq!(exit_code_for(&cycle), 2);
        assert_eq!(exit_code_for(&invalid), 2);
        assert_eq!(exit_code_for(&OutpostError::Interrupted), 130);
        assert_eq!(exit_code_for(&io), 1);
    }

    #[test]
    fn context_defaults_root_to_cwd() {
        let cli = Cli::parse_from(["outpost", "--user", "kali", "--quiet"]);
        let ctx = CommandContext::from_cli(&cli, PathBuf::from("/work"));
        assert_eq!(ctx.root(), Path::new("/work"));
        assert_eq!(ctx.overrides.user.as_deref(), Some("kali"));
        assert_eq!(ctx.mode, OutputMode::Quiet);
        assert!(ctx.color);
    }

    #[test]
    fn context_prefers_root_flag() {
        let cli = Cli::parse_from(["outpost", "--root", "/srv", "--no-color", "plan"]);
        let ctx = CommandContext::from_cli(&cli, PathBuf::from("/work"));
        assert_eq!(ctx.root(), Path::new("/srv"));
        assert!(!ctx.color);
    }
}
