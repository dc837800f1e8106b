//! Ordered install strategies.
//!
//! An [`InstallChain`] tries each strategy in turn and stops at the first
//! success. When every strategy fails the step fails with
//! [`OutpostError::InstallFailed`] naming each attempt. A timeout or an
//! interrupt ends the chain at once with that error.

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::error::{OutpostError, Result};
use crate::steps::{Action, ApplyContext};

use super::packages::{HelperBuilder, PackageRepository};

/// One way of installing a package.
pub trait InstallStrategy {
    /// Short label used in logs and failure messages.
    fn label(&self) -> String;

    fn install(&self, ctx: &ApplyContext) -> Result<()>;
}

/// Install from a repository under a fixed name.
pub struct RepositoryInstall {
    repository: Rc<PackageRepository>,
    name: String,
}

impl RepositoryInstall {
    /// Install `package` from the official repository.
    pub fn official(repository: Rc<PackageRepository>, package: &str) -> Self {
        Self {
            repository,
            name: package.to_string(),
        }
    }

    /// Install from the community repository. Uses `explicit` when given,
    /// otherwise the namespace-qualified name, exactly once.
    pub fn community(
        repository: Rc<PackageRepository>,
        package: &str,
        explicit: Option<&str>,
    ) -> Self {
        let name = explicit
            .map(str::to_string)
            .unwrap_or_else(|| repository.qualified_name(package));
        Self { repository, name }
    }
}

impl InstallStrategy for RepositoryInstall {
    fn label(&self) -> String {
        format!("{} ({})", self.repository.label(), self.name)
    }

    fn install(&self, ctx: &ApplyContext) -> Result<()> {
        self.repository.install(&self.name, ctx.timeout)
    }
}

/// Install with the third-party helper.
pub struct HelperInstall {
    helper: Rc<HelperBuilder>,
    package: String,
}

impl HelperInstall {
    pub fn new(helper: Rc<HelperBuilder>, package: &str) -> Self {
        Self {
            helper,
            package: package.to_string(),
        }
    }
}

impl InstallStrategy for HelperInstall {
    fn label(&self) -> String {
        format!("{} ({})", self.helper.name(), self.package)
    }

    fn install(&self, ctx: &ApplyContext) -> Result<()> {
        if !self.helper.is_available() {
            return Err(OutpostError::CommandFailed {
                command: format!("{} is not installed", self.helper.name()),
                code: None,
            });
        }
        self.helper.install(&self.package, ctx.timeout)
    }
}

/// Sequential fallback over install strategies.
pub struct InstallChain {
    target: String,
    strategies: Vec<Box<dyn InstallStrategy>>,
}

impl InstallChain {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            strategies: Vec::new(),
        }
    }

    /// Append a strategy, tried after those already added.
    pub fn then(mut self, strategy: impl InstallStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn labels(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.label()).collect()
    }
}

impl Action for InstallChain {
    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        let mut attempts = Vec::new();

        for strategy in &self.strategies {
            let label = strategy.label();
            match strategy.install(ctx) {
                Ok(()) => {
                    info!(package = %self.target, via = %label, "Installed");
                    return Ok(());
                }
                Err(e @ (OutpostError::CommandTimedOut { .. } | OutpostError::Interrupted)) => {
                    warn!(package = %self.target, via = %label, error = %e, "Install stopped");
                    return Err(e);
                }
                Err(e) => {
                    debug!(package = %self.target, via = %label, error = %e, "Install attempt failed");
                    attempts.push(label);
                }
            }
        }

        Err(OutpostError::InstallFailed {
            target: self.target.clone(),
            attempts,
        })
    }

    fn describe(&self) -> String {
        format!("install {} via {}", self.target, self.labels().join(", then "))
    }
}

/// Wraps a foundational action so its failure reads as a failed precheck.
pub struct Precheck<A> {
    inner: A,
}

impl<A: Action> Precheck<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<A: Action> Action for Precheck<A> {
    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        self.inner
            .apply(ctx)
            .map_err(|e| OutpostError::PrecheckFailed {
                step: ctx.step.clone(),
                message: e.to_string(),
            })
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}
