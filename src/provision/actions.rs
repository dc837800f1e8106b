//! Actions behind each manifest step kind.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::ToolConfig;
use crate::error::{OutpostError, Result};
use crate::shell::CommandOptions;
use crate::steps::{Action, ApplyContext};

use super::command::SharedRunner;
use super::ownership::OwnershipNormalizer;
use super::packages::{HelperBuilder, PackageRepository};
use super::profile::ProfileEditor;
use super::source::{EnvironmentBuilder, SourceControl};

/// Fails unless the probe found root privileges.
pub struct RequirePrivilege;

impl Action for RequirePrivilege {
    fn apply(&self, _ctx: &ApplyContext) -> Result<()> {
        Err(OutpostError::PrivilegeError {
            message: "root privileges are required; re-run with sudo".to_string(),
        })
    }

    fn describe(&self) -> String {
        "require root".to_string()
    }
}

/// Refreshes the package database.
pub struct SyncDatabase {
    pub repository: Rc<PackageRepository>,
}

impl Action for SyncDatabase {
    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        self.repository.sync(ctx.timeout)
    }

    fn describe(&self) -> String {
        self.repository.describe_sync()
    }
}

/// Bootstraps the package helper.
pub struct BuildHelper {
    pub helper: Rc<HelperBuilder>,
}

impl Action for BuildHelper {
    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        self.helper.build(ctx.timeout)
    }

    fn describe(&self) -> String {
        self.helper.describe()
    }
}

/// Everything a tool needs after its repository is fetched.
pub struct ToolLayout {
    pub dest: PathBuf,
    pub venv: Option<PathBuf>,
    pub requirements: Option<PathBuf>,
}

impl ToolLayout {
    /// Resolve paths for a tool under `tools_dir`.
    pub fn new(tool: &ToolConfig, tools_dir: &std::path::Path) -> Self {
        let dest = tool
            .dest
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| tools_dir.join(&tool.name));
        let venv = tool.venv.then(|| dest.join("venv"));
        let requirements = tool.requirements.as_ref().map(|r| dest.join(r));
        Self {
            dest,
            venv,
            requirements,
        }
    }
}

/// Clone or pull a tool, set up its environment, run its post-install
/// commands, then hand the tree to the target user.
pub struct FetchTool {
    pub url: String,
    pub layout: ToolLayout,
    pub post_install: Vec<String>,
    pub user: String,
    pub runner: SharedRunner,
    pub source: Rc<SourceControl>,
    pub environments: Rc<EnvironmentBuilder>,
    pub ownership: Rc<OwnershipNormalizer>,
}

impl Action for FetchTool {
    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        let opts = CommandOptions::captured().with_timeout(ctx.timeout);
        self.source.clone_or_pull(&self.url, &self.layout.dest, &opts)?;

        if let Some(env) = &self.layout.venv {
            self.environments.create_env(env, &opts)?;
            if let Some(requirements) = &self.layout.requirements {
                self.environments
                    .install_requirements(env, requirements, &opts)?;
            }
        }

        self.ownership.normalize(&self.layout.dest, ctx.timeout)?;

        let user_opts = CommandOptions {
            cwd: Some(self.layout.dest.clone()),
            ..opts.as_user(Some(&self.user))
        };
        for command in &self.post_install {
            self.runner.run_checked(command, &user_opts)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("fetch {} into {}", self.url, self.layout.dest.display())
    }
}

/// Writes a named profile block, then hands the file to the target user.
pub struct AppendProfile {
    pub file: PathBuf,
    pub name: String,
    pub lines: Vec<String>,
    pub ownership: Rc<OwnershipNormalizer>,
}

impl Action for AppendProfile {
    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        ProfileEditor.ensure_block(&self.file, &self.name, &self.lines)?;
        self.ownership.normalize(&self.file, ctx.timeout)
    }

    fn describe(&self) -> String {
        format!(
            "write block '{}' ({} line(s)) to {}",
            self.name,
            self.lines.len(),
            self.file.display()
        )
    }
}

/// Creates the workspace tree owned by the target user.
pub struct PrepareWorkspace {
    pub root: PathBuf,
    pub dirs: Vec<String>,
    pub ownership: Rc<OwnershipNormalizer>,
}

impl PrepareWorkspace {
    pub fn paths(&self) -> Vec<PathBuf> {
        std::iter::once(self.root.clone())
            .chain(self.dirs.iter().map(|d| self.root.join(d)))
            .collect()
    }
}

impl Action for PrepareWorkspace {
    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        for path in self.paths() {
            fs::create_dir_all(&path)?;
        }
        self.ownership.normalize(&self.root, ctx.timeout)
    }

    fn describe(&self) -> String {
        format!("create {}", self.root.display())
    }
}
