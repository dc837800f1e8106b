//! Source control and isolated tool environments.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::EnvironmentConfig;
use crate::error::Result;
use crate::shell::CommandOptions;

use super::command::{fill_template, shell_quote, SharedRunner};

/// Fetches repositories with git.
pub struct SourceControl {
    runner: SharedRunner,
}

impl SourceControl {
    pub fn new(runner: SharedRunner) -> Self {
        Self { runner }
    }

    /// Clone `url` into `dest`, or pull if `dest` is already a clone.
    pub fn clone_or_pull(&self, url: &str, dest: &Path, options: &CommandOptions) -> Result<()> {
        let dest_str = dest.display().to_string();

        if dest.join(".git").is_dir() {
            debug!(dest = %dest_str, "already cloned, pulling");
            let cmd = format!("git -C {} pull --ff-only", shell_quote(&dest_str));
            self.runner.run_checked(&cmd, options)?;
            return Ok(());
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let cmd = format!(
            "git clone --depth 1 {} {}",
            shell_quote(url),
            shell_quote(&dest_str)
        );
        self.runner.run_checked(&cmd, options)?;
        Ok(())
    }
}

/// Creates per-tool environments and installs their requirements.
pub struct EnvironmentBuilder {
    runner: SharedRunner,
    config: EnvironmentConfig,
}

impl EnvironmentBuilder {
    pub fn new(runner: SharedRunner, config: EnvironmentConfig) -> Self {
        Self { runner, config }
    }

    /// Create an environment at `path` unless one is already there.
    pub fn create_env(&self, path: &Path, options: &CommandOptions) -> Result<()> {
        if path.join("bin").is_dir() {
            debug!(env = %path.display(), "environment exists");
            return Ok(());
        }
        let path_str = path.display().to_string();
        let cmd = fill_template(&self.config.create, &[("env", &path_str)]);
        self.runner.run_checked(&cmd, options)?;
        Ok(())
    }

    /// Install a requirements file into an environment.
    pub fn install_requirements(
        &self,
        env: &Path,
        requirements: &Path,
        options: &CommandOptions,
    ) -> Result<()> {
        let env_str = env.display().to_string();
        let req_str = requirements.display().to_string();
        let cmd = fill_template(
            &self.config.install_requirements,
            &[("env", &env_str), ("requirements", &req_str)],
        );
        self.runner.run_checked(&cmd, options)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::command::MockRunner;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    fn clones_when_missing() {
        let temp = TempDir::new().unwrap();
        let mock = Rc::new(MockRunner::new());
        let dest = temp.path().join("tools/sqlmap");

        SourceControl::new(mock.clone())
            .clone_or_pull("https://example.com/sqlmap.git", &dest, &CommandOptions::captured())
            .unwrap();

        assert_eq!(
            mock.commands(),
            vec![format!(
                "git clone --depth 1 https://example.com/sqlmap.git {}",
                dest.display()
            )]
        );
        assert!(temp.path().join("tools").is_dir());
    }

    #[test]
    fn pulls_when_cloned() {
        let temp = TempDir::new().unwrap();
        let mock = Rc::new(MockRunner::new());
        fs::create_dir_all(temp.path().join(".git")).unwrap();

        SourceControl::new(mock.clone())
            .clone_or_pull("https://example.com/x.git", temp.path(), &CommandOptions::captured())
            .unwrap();

        assert!(mock.commands()[0].ends_with("pull --ff-only"));
    }

    #[test]
    fn create_env_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mock = Rc::new(MockRunner::new());
        let builder = EnvironmentBuilder::new(mock.clone(), EnvironmentConfig::default());
        let env = temp.path().join("venv");

        builder.create_env(&env, &CommandOptions::captured()).unwrap();
        fs::create_dir_all(env.join("bin")).unwrap();
        builder.create_env(&env, &CommandOptions::captured()).unwrap();

        assert_eq!(mock.commands().len(), 1);
        assert!(mock.commands()[0].starts_with("python3 -m venv"));
    }

    #[test]
    fn install_requirements_fills_template() {
        let mock = Rc::new(MockRunner::new());
        let builder = EnvironmentBuilder::new(mock.clone(), EnvironmentConfig::default());
        builder
            .install_requirements(
                Path::new("/t/venv"),
                Path::new("/t/requirements.txt"),
                &CommandOptions::captured(),
            )
            .unwrap();
        assert_eq!(
            mock.commands(),
            vec!["/t/venv/bin/pip install -r /t/requirements.txt"]
        );
    }
}
