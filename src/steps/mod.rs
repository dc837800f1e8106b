//! Steps: named, idempotent units of provisioning work.
//!
//! This module provides:
//!
//! - [`Step`] - name, prerequisites, severity, probe, and action
//! - [`Action`] - the mutation a step performs when its probe fails
//! - [`Severity`] - Fatal (abort on failure) or Advisory (record and continue)
//! - [`Outcome`] - terminal status of a step after a run
//!
//! # Example
//!
//! ```
//! use outpost::steps::{Severity, Step};
//!
//! let step = Step::from_fn("hello", || Ok(()))
//!     .after("base")
//!     .probe_fn("never done", || false);
//!
//! assert_eq!(step.name(), "hello");
//! assert_eq!(step.severity(), Severity::Advisory);
//! assert_eq!(step.prerequisites(), ["base".to_string()]);
//! ```

pub mod outcome;
pub mod step;

pub use outcome::{Outcome, OutcomeKind};
pub use step::{action_fn, Action, ApplyContext, FnAction, Severity, Step};
