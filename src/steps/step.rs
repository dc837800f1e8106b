//! Step definition.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::probe::{probe_fn, Never, Probe};

/// How a step's failure affects the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A precondition: failure blocks everything that depends on it.
    Fatal,
    /// An individual install: failure is recorded and the run continues.
    #[default]
    Advisory,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal => write!(f, "fatal"),
            Self::Advisory => write!(f, "advisory"),
        }
    }
}

/// Per-invocation context handed to an [`Action`].
#[derive(Debug, Clone, Default)]
pub struct ApplyContext {
    /// Name of the step being applied.
    pub step: String,
    /// Time limit for each external command the action spawns.
    pub timeout: Option<Duration>,
}

/// The mutation a step performs. Must be idempotent.
pub trait Action {
    /// Bring the target into the desired state.
    fn apply(&self, ctx: &ApplyContext) -> Result<()>;

    /// Human-readable description shown by `plan`.
    fn describe(&self) -> String;
}

/// A closure used as an action.
pub struct FnAction<F> {
    apply: F,
    description: String,
}

impl<F: Fn() -> Result<()>> Action for FnAction<F> {
    fn apply(&self, _ctx: &ApplyContext) -> Result<()> {
        (self.apply)()
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Wrap a closure as an action.
pub fn action_fn<F: Fn() -> Result<()>>(description: impl Into<String>, apply: F) -> FnAction<F> {
    FnAction {
        apply,
        description: description.into(),
    }
}

/// A named unit of work with prerequisites, a probe, and an action.
///
/// Steps are immutable once handed to a [`Plan`](crate::runner::Plan).
pub struct Step {
    name: String,
    title: Option<String>,
    prerequisites: Vec<String>,
    severity: Severity,
    probe: Box<dyn Probe>,
    action: Box<dyn Action>,
    timeout: Option<Duration>,
}

impl Step {
    /// Create an Advisory step whose probe never passes.
    pub fn new(name: impl Into<String>, action: impl Action + 'static) -> Self {
        Self {
            name: name.into(),
            title: None,
            prerequisites: Vec::new(),
            severity: Severity::Advisory,
            probe: Box::new(Never),
            action: Box::new(action),
            timeout: None,
        }
    }

    /// Create a step from a closure action.
    pub fn from_fn<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn() -> Result<()> + 'static,
    {
        let name = name.into();
        let action = action_fn(name.clone(), apply);
        Self::new(name, action)
    }

    /// Set a display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a prerequisite by name. Duplicates are ignored; a self-reference
    /// is rejected as a cycle when the plan is built.
    pub fn after(mut self, prerequisite: impl Into<String>) -> Self {
        let prerequisite = prerequisite.into();
        if !self.prerequisites.contains(&prerequisite) {
            self.prerequisites.push(prerequisite);
        }
        self
    }

    /// Add several prerequisites.
    pub fn after_all<I, S>(self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        prerequisites.into_iter().fold(self, |step, p| step.after(p))
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Mark as Fatal.
    pub fn fatal(self) -> Self {
        self.with_severity(Severity::Fatal)
    }

    /// Set the probe.
    pub fn probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Set a boxed probe.
    pub fn boxed_probe(mut self, probe: Box<dyn Probe>) -> Self {
        self.probe = probe;
        self
    }

    /// Set a closure probe.
    pub fn probe_fn<F>(self, description: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.probe(probe_fn(description, check))
    }

    /// Set a per-command time limit for this step's action.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title, falling back to the name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn prerequisites(&self) -> &[String] {
        &self.prerequisites
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the probe.
    pub fn check(&self) -> bool {
        self.probe.check()
    }

    /// Run the action.
    pub fn apply(&self) -> Result<()> {
        let ctx = ApplyContext {
            step: self.name.clone(),
            timeout: self.timeout,
        };
        self.action.apply(&ctx)
    }

    pub fn describe_probe(&self) -> String {
        self.probe.describe()
    }

    pub fn describe_action(&self) -> String {
        self.action.describe()
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .field("severity", &self.severity)
            .field("probe", &self.probe.describe())
            .field("action", &self.action.describe())
            .finish()
    }
}
