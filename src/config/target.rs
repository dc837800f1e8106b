//! The account being provisioned.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{OutpostError, Result};

use super::interpolation::{resolve_string, InterpolationContext};
use super::schema::TargetConfig;

/// Explicit target account, resolved once and passed to every capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub user: String,
    pub home: PathBuf,
    pub workspace: PathBuf,
    pub tools_dir: PathBuf,
}

/// Command-line overrides for the target.
#[derive(Debug, Clone, Default)]
pub struct TargetOverrides {
    pub user: Option<String>,
    pub home: Option<PathBuf>,
}

impl Target {
    /// Resolve the target account.
    ///
    /// The user comes from the command line, then the manifest, then
    /// `detected` (normally `SUDO_USER`/`USER`). Paths may use `${user}`,
    /// `${home}` and `${workspace}` as they become known.
    pub fn resolve(
        overrides: &TargetOverrides,
        config: &TargetConfig,
        detected: Option<String>,
    ) -> Result<Self> {
        let mut ctx = InterpolationContext::new();

        let user = match (&overrides.user, &config.user) {
            (Some(user), _) => user.clone(),
            (None, Some(user)) => resolve_string(user, &ctx)?,
            (None, None) => detected.ok_or_else(|| OutpostError::ConfigValidationError {
                message: "could not determine the target user; pass --user".to_string(),
            })?,
        };
        if user.trim().is_empty() {
            return Err(OutpostError::ConfigValidationError {
                message: "target user is empty".to_string(),
            });
        }
        ctx = ctx.with_builtin("user", user.clone());

        let home = match (&overrides.home, &config.home) {
            (Some(home), _) => home.clone(),
            (None, Some(home)) => PathBuf::from(resolve_string(home, &ctx)?),
            (None, None) => default_home(&user),
        };
        ctx = ctx.with_builtin("home", path_str(&home));

        let workspace = match &config.workspace {
            Some(ws) => PathBuf::from(resolve_string(ws, &ctx)?),
            None => home.join("workspace"),
        };
        ctx = ctx.with_builtin("workspace", path_str(&workspace));

        let tools_dir = match &config.tools_dir {
            Some(dir) => PathBuf::from(resolve_string(dir, &ctx)?),
            None => workspace.join("tools"),
        };

        let target = Self {
            user,
            home,
            workspace,
            tools_dir,
        };
        debug!(?target, "Resolved target");
        Ok(target)
    }

    /// Built-in interpolation variables for this target.
    pub fn interpolation_context(&self) -> InterpolationContext {
        InterpolationContext::new()
            .with_builtin("user", self.user.clone())
            .with_builtin("home", path_str(&self.home))
            .with_builtin("workspace", path_str(&self.workspace))
            .with_builtin("tools_dir", path_str(&self.tools_dir))
    }

    /// Whether the target is the superuser.
    pub fn is_root(&self) -> bool {
        self.user == "root"
    }
}

fn default_home(user: &str) -> PathBuf {
    if user == "root" {
        PathBuf::from("/root")
    } else {
        Path::new("/home").join(user)
    }
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}
