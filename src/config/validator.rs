//! Manifest validation rules.
//!
//! All problems are collected at once so they can be fixed together:
//! - Entry names must be non-empty and use `[A-Za-z0-9_.+-]`
//! - Git tools need a url
//! - Profile blocks need at least one non-empty line
//! - Helper and community sections need their required fields

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{OutpostError, Result};

use super::schema::Manifest;

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: &'static str,
    pub message: String,
}

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.+-]*$").unwrap());

/// Whether a manifest entry name is acceptable.
pub fn is_valid_name(name: &str) -> bool {
    NAME_REGEX.is_match(name)
}

fn check_name(section: &str, name: &str, errors: &mut Vec<ValidationError>) {
    if name.trim().is_empty() {
        errors.push(ValidationError {
            rule: "empty-name",
            message: format!("{} entry has an empty name", section),
        });
    } else if !is_valid_name(name) {
        errors.push(ValidationError {
            rule: "invalid-name",
            message: format!(
                "{} entry '{}' must match [A-Za-z0-9][A-Za-z0-9_.+-]*",
                section, name
            ),
        });
    }
}

/// Validate a manifest and return every problem found.
pub fn validate_manifest(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for entry in &manifest.base {
        check_name("base", entry.name(), &mut errors);
    }
    for entry in &manifest.packages {
        check_name("packages", entry.name(), &mut errors);
    }

    for tool in &manifest.tools {
        check_name("tools", &tool.name, &mut errors);
        if tool.url.trim().is_empty() {
            errors.push(ValidationError {
                rule: "missing-url",
                message: format!("tool '{}' has no url", tool.name),
            });
        }
        if tool.requirements.is_some() && !tool.venv {
            errors.push(ValidationError {
                rule: "requirements-without-venv",
                message: format!("tool '{}' lists requirements but venv is off", tool.name),
            });
        }
    }

    for block in &manifest.profile {
        check_name("profile", &block.name, &mut errors);
        if block.lines.iter().all(|l| l.trim().is_empty()) {
            errors.push(ValidationError {
                rule: "empty-profile",
                message: format!("profile block '{}' has no lines", block.name),
            });
        }
    }

    if let Some(helper) = &manifest.helper {
        check_name("helper", &helper.name, &mut errors);
        if helper.url.trim().is_empty() {
            errors.push(ValidationError {
                rule: "missing-url",
                message: "helper has no url".to_string(),
            });
        }
    }

    if let Some(community) = &manifest.community {
        if community.repo.trim().is_empty() {
            errors.push(ValidationError {
                rule: "missing-repo",
                message: "community section has an empty repo".to_string(),
            });
        }
    }

    errors
}

/// Validate a manifest, failing with every problem in one error.
pub fn validate(manifest: &Manifest) -> Result<()> {
    let errors = validate_manifest(manifest);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    Err(OutpostError::ConfigValidationError { message })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(yaml: &str) -> Manifest {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn rules(yaml: &str) -> Vec<&'static str> {
        validate_manifest(&manifest(yaml))
            .into_iter()
            .map(|e| e.rule)
            .collect()
    }

    #[test]
    fn valid_names() {
        for name in ["git", "python-pip", "lib32-glibc", "gtk+3", "python3.11", "a_b"] {
            assert!(is_valid_name(name), "{}", name);
        }
        for name in ["", "-git", "has space", "a/b", "pkg:git"] {
            assert!(!is_valid_name(name), "{}", name);
        }
    }

    #[test]
    fn clean_manifest_passes() {
        let m = manifest(
            r#"
packages: [git, nmap]
tools:
  - name: sqlmap
    url: https://example.com/sqlmap.git
profile:
  - name: aliases
    lines: ["alias ll='ls -l'"]
"#,
        );
        assert!(validate(&m).is_ok());
    }

    #[test]
    fn reports_all_problems_at_once() {
        let found = rules(
            r#"
packages: ["bad name", ""]
tools:
  - name: nourl
profile:
  - name: empty
    lines: ["  "]
"#,
        );
        assert_eq!(
            found,
            vec!["invalid-name", "empty-name", "missing-url", "empty-profile"]
        );
    }

    #[test]
    fn requirements_need_venv() {
        let found = rules(
            r#"
tools:
  - name: t
    url: https://example.com/t.git
    requirements: requirements.txt
"#,
        );
        assert_eq!(found, vec!["requirements-without-venv"]);
    }

    #[test]
    fn validate_joins_messages() {
        let m = manifest("tools:\n  - name: a\n  - name: b");
        let err = validate(&m).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("tool 'a' has no url"));
        assert!(msg.contains("tool 'b' has no url"));
        assert!(err.is_config_error());
    }
}
