//! Package repositories and the third-party helper.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::config::{CommunityConfig, HelperConfig, PackageManagerConfig};
use crate::error::Result;
use crate::probe::{CommandOnPath, Probe};
use crate::shell::CommandOptions;

use super::command::{fill_template, SharedRunner};
use super::source::SourceControl;

/// A package repository driven by command templates.
pub struct PackageRepository {
    runner: SharedRunner,
    label: &'static str,
    query: String,
    install: String,
    sync: Option<String>,
    namespace: Option<String>,
}

impl PackageRepository {
    /// The system's primary repository.
    pub fn official(runner: SharedRunner, config: &PackageManagerConfig) -> Self {
        Self {
            runner,
            label: "official",
            query: config.query.clone(),
            install: config.install.clone(),
            sync: Some(config.sync.clone()),
            namespace: None,
        }
    }

    /// The community repository, installing `<repo>/<name>`.
    pub fn community(
        runner: SharedRunner,
        manager: &PackageManagerConfig,
        config: &CommunityConfig,
    ) -> Self {
        Self {
            runner,
            label: "community",
            query: manager.query.clone(),
            install: config
                .install
                .clone()
                .unwrap_or_else(|| manager.install.clone()),
            sync: None,
            namespace: Some(config.repo.clone()),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The name this repository installs a package under.
    pub fn qualified_name(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) if !name.contains('/') => format!("{}/{}", ns, name),
            _ => name.to_string(),
        }
    }

    /// Whether the package manager records the package as installed.
    /// A failing query counts as "not installed".
    pub fn query(&self, name: &str) -> bool {
        let cmd = fill_template(&self.query, &[("package", name)]);
        let installed = self.runner.succeeds(&cmd, &CommandOptions::captured());
        debug!(package = name, installed, "package query");
        installed
    }

    /// Install a package. `name` is used exactly as given.
    pub fn install(&self, name: &str, timeout: Option<Duration>) -> Result<()> {
        let cmd = fill_template(&self.install, &[("package", name)]);
        self.runner
            .run_checked(&cmd, &CommandOptions::captured().with_timeout(timeout))?;
        Ok(())
    }

    /// Refresh the package database.
    pub fn sync(&self, timeout: Option<Duration>) -> Result<()> {
        if let Some(sync) = &self.sync {
            self.runner
                .run_checked(sync, &CommandOptions::captured().with_timeout(timeout))?;
        }
        Ok(())
    }

    pub fn describe_sync(&self) -> String {
        self.sync.clone().unwrap_or_default()
    }
}

/// A package recorded as installed by a repository.
pub struct PackageInstalled {
    repository: Rc<PackageRepository>,
    package: String,
}

impl PackageInstalled {
    pub fn new(repository: Rc<PackageRepository>, package: impl Into<String>) -> Self {
        Self {
            repository,
            package: package.into(),
        }
    }
}

impl Probe for PackageInstalled {
    fn check(&self) -> bool {
        self.repository.query(&self.package)
    }

    fn describe(&self) -> String {
        format!("package installed: {}", self.package)
    }
}

/// Bootstraps a package helper from source and installs packages with it
/// as the target user.
pub struct HelperBuilder {
    runner: SharedRunner,
    source: SourceControl,
    config: HelperConfig,
    user: String,
    build_dir: PathBuf,
}

impl HelperBuilder {
    pub fn new(runner: SharedRunner, config: HelperConfig, user: impl Into<String>) -> Self {
        let build_dir = std::env::temp_dir().join(format!("outpost-build-{}", config.name));
        Self {
            source: SourceControl::new(runner.clone()),
            runner,
            config,
            user: user.into(),
            build_dir,
        }
    }

    /// Build in this directory instead of the temp dir.
    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = dir.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn build_dir(&self) -> &PathBuf {
        &self.build_dir
    }

    /// Probe for the helper's executable.
    pub fn probe(&self) -> CommandOnPath {
        CommandOnPath::new(self.config.name.clone())
    }

    /// Whether the helper's executable is on `PATH`.
    pub fn is_available(&self) -> bool {
        self.probe().check()
    }

    /// Fetch the helper's sources and build them as the target user.
    pub fn build(&self, timeout: Option<Duration>) -> Result<()> {
        let opts = CommandOptions::captured()
            .as_user(Some(&self.user))
            .with_timeout(timeout);
        self.source
            .clone_or_pull(&self.config.url, &self.build_dir, &opts)?;

        let build_opts = CommandOptions {
            cwd: Some(self.build_dir.clone()),
            ..opts
        };
        self.runner.run_checked(&self.config.build, &build_opts)?;
        Ok(())
    }

    /// Install a package with the helper as the target user.
    pub fn install(&self, package: &str, timeout: Option<Duration>) -> Result<()> {
        let cmd = fill_template(&self.config.install, &[("package", package)]);
        let opts = CommandOptions::captured()
            .as_user(Some(&self.user))
            .with_timeout(timeout);
        self.runner.run_checked(&cmd, &opts)?;
        Ok(())
    }

    pub fn describe(&self) -> String {
        format!("build {} from {}", self.config.name, self.config.url)
    }
}
