//! Outpost - declarative, idempotent workstation provisioning.
//!
//! A manifest describes the desired state of a workstation: packages,
//! tools cloned from source, shell profile lines and a workspace. Outpost
//! turns it into a plan of [`steps`], each a probe plus an idempotent
//! action, and runs the plan in dependency order. Steps already satisfied
//! are skipped, so a second run changes nothing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Manifest loading, interpolation, and validation
//! - [`error`] - Error types and result aliases
//! - [`probe`] - Side-effect-free checks of the target state
//! - [`provision`] - Capabilities and the manifest-to-steps builder
//! - [`runner`] - Plan construction and execution
//! - [`shell`] - Shell command execution
//! - [`steps`] - Step definition and outcomes
//! - [`ui`] - Reporters, themes, and prompts
//!
//! # Example
//!
//! ```
//! use outpost::runner::{Plan, RunOptions, Runner};
//! use outpost::steps::Step;
//! use outpost::ui::MockReporter;
//!
//! let plan = Plan::build(vec![
//!     Step::from_fn("toolA", || Ok(())).after("base"),
//!     Step::from_fn("base", || Ok(())).fatal(),
//! ])
//! .unwrap();
//! assert_eq!(plan.names(), vec!["base", "toolA"]);
//!
//! let mut reporter = MockReporter::new();
//! let report = Runner::new(RunOptions::default()).run(&plan, &mut reporter);
//! assert_eq!(report.exit_code(), 0);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod probe;
pub mod provision;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{OutpostError, Result};
