//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]. A bare `outpost` runs the provisioning.

pub mod check;
pub mod completions;
pub mod dispatcher;
pub mod plan;
pub mod run;
pub mod schema;

pub use dispatcher::{
    exit_code_for, Command, CommandContext, CommandDispatcher, CommandResult, EXIT_CONFIG,
};
