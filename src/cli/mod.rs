//! Command-line interface for outpost.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Commands, CompletionsArgs, PlanArgs, RunArgs};
pub use commands::{
    exit_code_for, Command, CommandContext, CommandDispatcher, CommandResult, EXIT_CONFIG,
};
