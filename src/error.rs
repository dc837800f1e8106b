//! Error types for outpost operations.
//!
//! This module defines [`OutpostError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Plan construction errors (`DuplicateName`, `CycleDetected`,
//!   `UnknownPrerequisite`) are reported before any step executes
//! - Errors raised by a step's action are caught by the runner and turned
//!   into a `Failed` outcome; they never escape a run
//! - Use `anyhow::Error` (via `OutpostError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for outpost operations.
#[derive(Debug, Error)]
pub enum OutpostError {
    /// Manifest file not found at expected location.
    #[error("Manifest not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a manifest file.
    #[error("Failed to parse manifest at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid manifest structure or values.
    #[error("Invalid manifest: {message}")]
    ConfigValidationError { message: String },

    /// Two steps share a name.
    #[error("Duplicate step name: {name}")]
    DuplicateName { name: String },

    /// The prerequisite graph contains a cycle.
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    /// A step lists a prerequisite that is not part of the plan.
    #[error("Step '{step}' depends on unknown step '{prerequisite}'")]
    UnknownPrerequisite { step: String, prerequisite: String },

    /// Not running with the rights the run requires.
    #[error("Insufficient privileges: {message}")]
    PrivilegeError { message: String },

    /// A foundational dependency could not be installed.
    #[error("Precheck '{step}' failed: {message}")]
    PrecheckFailed { step: String, message: String },

    /// Every install source was tried and none succeeded.
    #[error("Failed to install '{target}' (tried: {})", attempts.join(", "))]
    InstallFailed {
        target: String,
        attempts: Vec<String>,
    },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Shell command exceeded its time limit and was killed.
    #[error("Command timed out after {seconds}s: {command}")]
    CommandTimedOut { command: String, seconds: u64 },

    /// The run was interrupted before the step could start.
    #[error("Interrupted")]
    Interrupted,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OutpostError {
    /// Whether this error comes from building a plan (malformed step set).
    pub fn is_plan_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName { .. }
                | Self::CycleDetected { .. }
                | Self::UnknownPrerequisite { .. }
        )
    }

    /// Whether this error means the manifest itself is unusable.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
        )
    }
}

/// Result type alias for outpost operations.
pub type Result<T> = std::result::Result<T, OutpostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = OutpostError::ConfigNotFound {
            path: PathBuf::from("/foo/manifest.yml"),
        };
        assert!(err.to_string().contains("/foo/manifest.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = OutpostError::ConfigParseError {
            path: PathBuf::from("/manifest.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/manifest.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn cycle_detected_joins_members() {
        let err = OutpostError::CycleDetected {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
    }

    #[test]
    fn duplicate_name_displays_name() {
        let err = OutpostError::DuplicateName {
            name: "pkg:zsh".into(),
        };
        assert!(err.to_string().contains("pkg:zsh"));
    }

    #[test]
    fn install_failed_lists_attempts() {
        let err = OutpostError::InstallFailed {
            target: "nmap".into(),
            attempts: vec!["official".into(), "community".into(), "helper".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("nmap"));
        assert!(msg.contains("official, community, helper"));
    }

    #[test]
    fn command_timed_out_displays_seconds() {
        let err = OutpostError::CommandTimedOut {
            command: "git clone".into(),
            seconds: 30,
        };
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn plan_errors_are_classified() {
        assert!(OutpostError::DuplicateName { name: "a".into() }.is_plan_error());
        assert!(OutpostError::CycleDetected { cycle: vec![] }.is_plan_error());
        assert!(OutpostError::UnknownPrerequisite {
            step: "a".into(),
            prerequisite: "b".into()
        }
        .is_plan_error());
        assert!(!OutpostError::Interrupted.is_plan_error());
    }

    #[test]
    fn config_errors_are_classified() {
        assert!(OutpostError::ConfigValidationError {
            message: "x".into()
        }
        .is_config_error());
        assert!(!OutpostError::PrivilegeError {
            message: "x".into()
        }
        .is_config_error());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: OutpostError = io_err.into();
        assert!(matches!(err, OutpostError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts() {
        let err: OutpostError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
