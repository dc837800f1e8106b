//! Ownership normalization for files created on a user's behalf.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::shell::CommandOptions;

use super::command::{shell_quote, SharedRunner};

/// Recursively hands paths to the target user.
pub struct OwnershipNormalizer {
    runner: SharedRunner,
    user: String,
}

impl OwnershipNormalizer {
    pub fn new(runner: SharedRunner, user: impl Into<String>) -> Self {
        Self {
            runner,
            user: user.into(),
        }
    }

    /// `chown -R user: path`. Missing paths are left alone.
    pub fn normalize(&self, path: &Path, timeout: Option<Duration>) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let cmd = format!(
            "chown -R {}: {}",
            shell_quote(&self.user),
            shell_quote(&path.display().to_string())
        );
        self.runner
            .run_checked(&cmd, &CommandOptions::captured().with_timeout(timeout))?;
        Ok(())
    }
}
