//! Idempotent edits to shell profile files.
//!
//! Profile content is written as named blocks fenced by marker comments:
//!
//! ```text
//! # outpost:begin aliases
//! alias ll='ls -lah'
//! # outpost:end aliases
//! ```
//!
//! A block is the unit of idempotence. Its body is written verbatim, so
//! repeated lines such as `}` or `fi` survive, and lines outside the
//! markers are never consulted or touched.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{OutpostError, Result};
use crate::probe::Probe;

fn begin_marker(name: &str) -> String {
    format!("# outpost:begin {name}")
}

fn end_marker(name: &str) -> String {
    format!("# outpost:end {name}")
}

/// Location of a block inside a file, as line indices of its markers.
struct Span {
    begin: usize,
    end: usize,
}

fn find_block(content: &str, name: &str) -> Option<Span> {
    let begin_marker = begin_marker(name);
    let end_marker = end_marker(name);
    let lines: Vec<&str> = content.lines().collect();

    let begin = lines.iter().position(|l| l.trim_end() == begin_marker)?;
    let end = lines[begin + 1..]
        .iter()
        .position(|l| l.trim_end() == end_marker)
        .map(|offset| begin + 1 + offset)?;
    Some(Span { begin, end })
}

/// Body lines with trailing whitespace and trailing blank lines removed.
fn normalize(lines: &[String]) -> Vec<String> {
    let mut body: Vec<String> = lines.iter().map(|l| l.trim_end().to_string()).collect();
    while body.last().is_some_and(|l| l.is_empty()) {
        body.pop();
    }
    body
}

/// Writes named marker-fenced blocks into configuration files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileEditor;

impl ProfileEditor {
    /// Body of block `name` in `path`, if the file holds a complete one.
    /// Unreadable files hold nothing.
    pub fn read_block(&self, path: &Path, name: &str) -> Option<Vec<String>> {
        let content = fs::read_to_string(path).ok()?;
        let span = find_block(&content, name)?;
        let body = content
            .lines()
            .skip(span.begin + 1)
            .take(span.end - span.begin - 1)
            .map(|l| l.trim_end().to_string())
            .collect::<Vec<_>>();
        Some(normalize(&body))
    }

    /// Whether `path` holds block `name` with exactly `lines` as its body.
    pub fn has_block(&self, path: &Path, name: &str, lines: &[String]) -> bool {
        self.read_block(path, name)
            .is_some_and(|body| body == normalize(lines))
    }

    /// Make `path` hold block `name` with body `lines`.
    ///
    /// An identical block leaves the file untouched. A block with a
    /// different body is replaced in place. A missing block is appended
    /// whole. Returns whether the file changed.
    pub fn ensure_block(&self, path: &Path, name: &str, lines: &[String]) -> Result<bool> {
        if self.has_block(path, name, lines) {
            return Ok(false);
        }

        let body = normalize(lines);
        let mut block = Vec::with_capacity(body.len() + 2);
        block.push(begin_marker(name));
        block.extend(body);
        block.push(end_marker(name));

        let existing = match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(content) = &existing {
            if let Some(span) = find_block(content, name) {
                let mut out: Vec<&str> = content.lines().take(span.begin).collect();
                out.extend(block.iter().map(String::as_str));
                out.extend(content.lines().skip(span.end + 1));
                fs::write(path, format!("{}\n", out.join("\n")))?;
                debug!(file = %path.display(), block = name, "replaced");
                return Ok(true);
            }
            if content.lines().any(|l| l.trim_end() == begin_marker(name)) {
                return Err(OutpostError::ConfigValidationError {
                    message: format!(
                        "{} has an unterminated block '{}'; add '{}' or remove it",
                        path.display(),
                        name,
                        end_marker(name)
                    ),
                });
            }
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let needs_newline = existing
            .as_deref()
            .is_some_and(|c| !c.is_empty() && !c.ends_with('\n'));

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if needs_newline {
            writeln!(file)?;
        }
        for line in &block {
            writeln!(file, "{}", line)?;
        }
        debug!(file = %path.display(), block = name, lines = block.len(), "appended");
        Ok(true)
    }
}

/// Passes when a profile file already holds a block with the wanted body.
///
/// Uses the same comparison [`ProfileEditor::ensure_block`] uses before
/// writing, so a passing check always means a write would be a no-op.
#[derive(Debug, Clone)]
pub struct ProfileBlockPresent {
    pub file: PathBuf,
    pub name: String,
    pub lines: Vec<String>,
}

impl Probe for ProfileBlockPresent {
    fn check(&self) -> bool {
        ProfileEditor.has_block(&self.file, &self.name, &self.lines)
    }

    fn describe(&self) -> String {
        format!("block '{}' in {}", self.name, self.file.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn ensure_creates_file() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join("nested/.zshrc");

        assert!(ProfileEditor
            .ensure_block(&rc, "aliases", &lines(&["alias ll='ls -lah'"]))
            .unwrap());
        assert_eq!(
            fs::read_to_string(&rc).unwrap(),
            "# outpost:begin aliases\nalias ll='ls -lah'\n# outpost:end aliases\n"
        );
    }

    #[test]
    fn ensure_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");
        let body = lines(&["export A=1"]);

        ProfileEditor.ensure_block(&rc, "env", &body).unwrap();
        let first = fs::read_to_string(&rc).unwrap();
        assert!(!ProfileEditor.ensure_block(&rc, "env", &body).unwrap());
        assert_eq!(fs::read_to_string(&rc).unwrap(), first);
    }

    #[test]
    fn ensure_adds_missing_newline() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");
        fs::write(&rc, "existing").unwrap();

        ProfileEditor.ensure_block(&rc, "b", &lines(&["new"])).unwrap();
        assert_eq!(
            fs::read_to_string(&rc).unwrap(),
            "existing\n# outpost:begin b\nnew\n# outpost:end b\n"
        );
    }

    #[test]
    fn commented_line_outside_block_does_not_count() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");
        fs::write(&rc, "# export A=1 (disabled)\n").unwrap();
        let body = lines(&["export A=1"]);

        let present = ProfileBlockPresent {
            file: rc.clone(),
            name: "env".into(),
            lines: body.clone(),
        };
        assert!(!present.check());

        assert!(ProfileEditor.ensure_block(&rc, "env", &body).unwrap());
        assert!(present.check());
        assert!(fs::read_to_string(&rc)
            .unwrap()
            .starts_with("# export A=1 (disabled)\n"));
    }

    #[test]
    fn indented_lines_settle_after_one_write() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");
        let body = lines(&["if [ -d ~/bin ]; then", "    export PATH=~/bin:$PATH", "fi"]);
        let present = ProfileBlockPresent {
            file: rc.clone(),
            name: "path".into(),
            lines: body.clone(),
        };

        assert!(ProfileEditor.ensure_block(&rc, "path", &body).unwrap());
        assert!(present.check());
        assert!(!ProfileEditor.ensure_block(&rc, "path", &body).unwrap());
        assert!(fs::read_to_string(&rc)
            .unwrap()
            .contains("\n    export PATH=~/bin:$PATH\n"));
    }

    #[test]
    fn repeated_lines_are_kept() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");
        let body = lines(&[
            "mkws() {",
            "  mkdir -p \"$1\"",
            "}",
            "",
            "cdws() {",
            "  cd \"$1\"",
            "}",
        ]);

        ProfileEditor.ensure_block(&rc, "functions", &body).unwrap();
        let content = fs::read_to_string(&rc).unwrap();
        assert_eq!(content.lines().filter(|l| *l == "}").count(), 2);
        assert_eq!(ProfileEditor.read_block(&rc, "functions").unwrap(), body);
    }

    #[test]
    fn changed_block_is_replaced_in_place() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");
        fs::write(
            &rc,
            "before\n# outpost:begin a\nold\n# outpost:end a\nafter\n",
        )
        .unwrap();

        assert!(ProfileEditor.ensure_block(&rc, "a", &lines(&["new", "newer"])).unwrap());
        assert_eq!(
            fs::read_to_string(&rc).unwrap(),
            "before\n# outpost:begin a\nnew\nnewer\n# outpost:end a\nafter\n"
        );
    }

    #[test]
    fn unterminated_block_is_an_error() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");
        fs::write(&rc, "# outpost:begin a\nhalf\n").unwrap();

        assert!(ProfileEditor.read_block(&rc, "a").is_none());
        assert!(ProfileEditor.ensure_block(&rc, "a", &lines(&["x"])).is_err());
        assert_eq!(fs::read_to_string(&rc).unwrap(), "# outpost:begin a\nhalf\n");
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let temp = TempDir::new().unwrap();
        let rc = temp.path().join(".zshrc");

        ProfileEditor.ensure_block(&rc, "a", &lines(&["x", ""])).unwrap();
        assert!(ProfileEditor.has_block(&rc, "a", &lines(&["x"])));
    }
}
