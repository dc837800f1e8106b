//! Plan construction and execution.

pub mod dependency;
pub mod engine;
pub mod event;
pub mod interrupt;
pub mod plan;
pub mod report;

pub use dependency::{DependencyGraph, DependencyGraphBuilder};
pub use engine::{FatalPolicy, RunOptions, Runner, INTERRUPTED};
pub use event::RunEvent;
pub use interrupt::{install_sigint_handler, InterruptFlag};
pub use plan::Plan;
pub use report::{OutcomeCounts, RunReport, StepRecord, EXIT_FATAL, EXIT_INTERRUPTED, EXIT_OK};
