//! Read-only checks for whether a step's target state already holds.
//!
//! A [`Probe`] never mutates the system. A probe that cannot determine
//! status (missing query tool, unreadable file) answers `false`, so the
//! runner always attempts forward progress.
//!
//! # Example
//!
//! ```
//! use outpost::probe::{FileContains, PathExists, Probe};
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let rc = temp.path().join(".zshrc");
//! std::fs::write(&rc, "alias ll='ls -la'\n").unwrap();
//!
//! assert!(PathExists::new(&rc).check());
//! assert!(FileContains::new(&rc, "alias ll=").check());
//! assert!(!FileContains::new(&rc, "alias gs=").check());
//! ```

pub mod path;

pub use path::{parse_system_path, resolve_tool_path};

use std::fs;
use std::path::PathBuf;

use crate::shell::is_elevated;

/// A side-effect-free query: does the target state already hold?
pub trait Probe {
    /// Report whether the target is already present.
    fn check(&self) -> bool;

    /// Human-readable description shown by `plan` and `check`.
    fn describe(&self) -> String;
}

/// Never satisfied; the step's action always runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl Probe for Never {
    fn check(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "always runs".to_string()
    }
}

/// A command resolvable on the execution path.
#[derive(Debug, Clone)]
pub struct CommandOnPath {
    command: String,
    path_entries: Option<Vec<PathBuf>>,
}

impl CommandOnPath {
    /// Probe the process `PATH` for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            path_entries: None,
        }
    }

    /// Probe explicit directories instead of the process `PATH`.
    pub fn with_path(command: impl Into<String>, entries: Vec<PathBuf>) -> Self {
        Self {
            command: command.into(),
            path_entries: Some(entries),
        }
    }
}

impl Probe for CommandOnPath {
    fn check(&self) -> bool {
        let found = match &self.path_entries {
            Some(entries) => resolve_tool_path(&self.command, entries),
            None => resolve_tool_path(&self.command, &parse_system_path()),
        };
        tracing::debug!(command = %self.command, found = ?found, "command probe");
        found.is_some()
    }

    fn describe(&self) -> String {
        format!("command on PATH: {}", self.command)
    }
}

/// A filesystem path exists.
#[derive(Debug, Clone)]
pub struct PathExists {
    path: PathBuf,
}

impl PathExists {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Probe for PathExists {
    fn check(&self) -> bool {
        self.path.exists()
    }

    fn describe(&self) -> String {
        format!("path exists: {}", self.path.display())
    }
}

/// A file contains a marker string.
///
/// Used to avoid appending the same configuration twice.
#[derive(Debug, Clone)]
pub struct FileContains {
    path: PathBuf,
    marker: String,
}

impl FileContains {
    pub fn new(path: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            marker: marker.into(),
        }
    }
}

impl Probe for FileContains {
    fn check(&self) -> bool {
        fs::read_to_string(&self.path)
            .map(|content| content.contains(&self.marker))
            .unwrap_or(false)
    }

    fn describe(&self) -> String {
        format!("{} contains {:?}", self.path.display(), truncate(&self.marker, 40))
    }
}

/// The process runs with root privileges.
#[derive(Debug, Clone, Copy, Default)]
pub struct Elevated;

impl Probe for Elevated {
    fn check(&self) -> bool {
        is_elevated()
    }

    fn describe(&self) -> String {
        "running as root".to_string()
    }
}

/// Every inner probe must pass. An empty set never passes.
#[derive(Default)]
pub struct AllOf {
    probes: Vec<Box<dyn Probe>>,
}

impl AllOf {
    pub fn new(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }
}

impl Probe for AllOf {
    fn check(&self) -> bool {
        !self.probes.is_empty() && self.probes.iter().all(|p| p.check())
    }

    fn describe(&self) -> String {
        self.probes
            .iter()
            .map(|p| p.describe())
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

/// A closure used as a probe.
pub struct FnProbe<F> {
    check: F,
    description: String,
}

impl<F: Fn() -> bool> Probe for FnProbe<F> {
    fn check(&self) -> bool {
        (self.check)()
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Wrap a closure as a probe.
pub fn probe_fn<F: Fn() -> bool>(description: impl Into<String>, check: F) -> FnProbe<F> {
    FnProbe {
        check,
        description: description.into(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn never_is_never_satisfied() {
        assert!(!Never.check());
    }

    #[test]
    fn path_exists_tracks_filesystem() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("tools");

        let probe = PathExists::new(&target);
        assert!(!probe.check());

        fs::create_dir(&target).unwrap();
        assert!(probe.check());
    }

    #[test]
    fn file_contains_finds_marker() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");
        fs::write(&rc, "export PATH=$PATH:/opt/bin\n# outpost:aliases\n").unwrap();

        assert!(FileContains::new(&rc, "# outpost:aliases").check());
        assert!(!FileContains::new(&rc, "# outpost:workspace").check());
    }

    #[test]
    fn file_contains_missing_file_is_false() {
        let temp = TempDir::new().unwrap();
        let probe = FileContains::new(temp.path().join("nope"), "x");
        assert!(!probe.check());
    }

    #[cfg(unix)]
    #[test]
    fn command_on_path_resolves_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("mytool");
        fs::write(&tool, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let entries = vec![temp.path().to_path_buf()];
        assert!(CommandOnPath::with_path("mytool", entries.clone()).check());
        assert!(!CommandOnPath::with_path("othertool", entries).check());
    }

    #[test]
    fn all_of_requires_every_probe() {
        let yes: Box<dyn Probe> = Box::new(probe_fn("yes", || true));
        let no: Box<dyn Probe> = Box::new(probe_fn("no", || false));

        assert!(!AllOf::new(vec![yes, no]).check());
        assert!(AllOf::new(vec![Box::new(probe_fn("a", || true))]).check());
        assert!(!AllOf::new(vec![]).check());
    }

    #[test]
    fn all_of_describes_members() {
        let probe = AllOf::new(vec![
            Box::new(PathExists::new("/opt/a")),
            Box::new(PathExists::new("/opt/b")),
        ]);
        assert_eq!(
            probe.describe(),
            "path exists: /opt/a and path exists: /opt/b"
        );
    }

    #[test]
    fn fn_probe_uses_closure() {
        let probe = probe_fn("custom", || true);
        assert!(probe.check());
        assert_eq!(probe.describe(), "custom");
    }

    #[test]
    fn long_markers_are_truncated_in_description() {
        let marker = "x".repeat(100);
        let desc = FileContains::new("/f", marker).describe();
        assert!(desc.contains("..."));
    }
}
