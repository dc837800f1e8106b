//! Shell command execution and platform queries.

pub mod command;
pub mod platform;

pub use command::{execute, CommandOptions, CommandResult};
pub use platform::{current_user, is_ci, is_elevated};
