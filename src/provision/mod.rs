//! Provisioning capabilities and the manifest-to-steps builder.
//!
//! Every capability is built on a [`CommandRunner`], so tests inject a
//! [`MockRunner`] and never touch the real system:
//!
//! - [`PackageRepository`] - query, install and sync via command templates
//! - [`HelperBuilder`] - bootstrap the third-party helper from source
//! - [`SourceControl`] / [`EnvironmentBuilder`] - clone tools, build environments
//! - [`ProfileEditor`] - idempotent marker-fenced profile blocks
//! - [`OwnershipNormalizer`] - hand files to the target user
//!
//! [`build_steps`] wires them into [`Step`](crate::steps::Step)s.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use outpost::provision::{CommandRunner, MockRunner};
//! use outpost::shell::CommandOptions;
//!
//! let mock = Rc::new(MockRunner::new());
//! mock.fail_when("missing");
//!
//! assert!(mock.succeeds("pacman -Qi zsh", &CommandOptions::captured()));
//! assert!(!mock.succeeds("pacman -Qi missing", &CommandOptions::captured()));
//! assert_eq!(mock.commands().len(), 2);
//! ```

pub mod actions;
pub mod builder;
pub mod command;
pub mod install;
pub mod ownership;
pub mod packages;
pub mod profile;
pub mod source;

pub use builder::{
    build_steps, package_step, profile_step, tool_step, HELPER_STEP, PRIVILEGE_STEP, SYNC_STEP,
    WORKSPACE_STEP,
};
pub use command::{
    fill_template, shell_quote, CommandRunner, MockRunner, RecordedCommand, SharedRunner,
    SystemRunner,
};
pub use install::{HelperInstall, InstallChain, InstallStrategy, Precheck, RepositoryInstall};
pub use ownership::OwnershipNormalizer;
pub use packages::{HelperBuilder, PackageInstalled, PackageRepository};
pub use profile::{ProfileBlockPresent, ProfileEditor};
pub use source::{EnvironmentBuilder, SourceControl};
