//! Variable interpolation for manifest values.
//!
//! # Syntax
//!
//! - `${variable_name}` - replaced with the variable's value
//! - `$${escaped}` - produces literal `${escaped}` in output
//!
//! Built-in variables are `user`, `home`, `workspace` and `tools_dir`.
//! A manifest's `vars:` section adds more; they may refer to the
//! built-ins but not to each other.
//!
//! # Example
//!
//! ```yaml
//! profile:
//!   - name: path
//!     file: "${home}/.zshrc"
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_yaml::Value;

use crate::error::{OutpostError, Result};

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Parse a string containing ${var} interpolations.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut current_literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            current_literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} -> literal ${...}
                    chars.next();
                    current_literal.push_str("${");
                    for c in chars.by_ref() {
                        current_literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    current_literal.push('$');
                }
            }
            Some('{') => {
                chars.next();

                if !current_literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut current_literal)));
                }

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                segments.push(Segment::Variable(var_name.trim().to_string()));
            }
            _ => current_literal.push(c),
        }
    }

    if !current_literal.is_empty() {
        segments.push(Segment::Literal(current_literal));
    }

    segments
}

/// Extract all variable names from an interpolated string.
pub fn extract_variables(input: &str) -> HashSet<String> {
    parse_interpolation(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Variable(name) => Some(name),
            _ => None,
        })
        .collect()
}

/// Check if a string contains any interpolation.
pub fn has_interpolation(input: &str) -> bool {
    parse_interpolation(input)
        .iter()
        .any(|seg| matches!(seg, Segment::Variable(_)))
}

/// Variables available to a manifest.
///
/// Manifest `vars` win over built-ins of the same name.
#[derive(Debug, Clone, Default)]
pub struct InterpolationContext {
    pub builtins: HashMap<String, String>,
    pub vars: HashMap<String, String>,
}

impl InterpolationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a built-in variable.
    pub fn with_builtin(mut self, name: &str, value: impl Into<String>) -> Self {
        self.builtins.insert(name.to_string(), value.into());
        self
    }

    /// Add manifest variables, resolving each against the built-ins.
    pub fn with_vars(mut self, vars: &BTreeMap<String, String>) -> Result<Self> {
        let builtins_only = Self {
            builtins: self.builtins.clone(),
            vars: HashMap::new(),
        };
        for (name, raw) in vars {
            let value = resolve_string(raw, &builtins_only)?;
            self.vars.insert(name.clone(), value);
        }
        Ok(self)
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .or_else(|| self.builtins.get(name))
            .cloned()
    }
}

/// Resolve all variables in an interpolated string.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any variable is not in the context.
pub fn resolve_string(input: &str, context: &InterpolationContext) -> Result<String> {
    let mut result = String::new();

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value =
                    context
                        .resolve(&name)
                        .ok_or_else(|| OutpostError::ConfigValidationError {
                            message: format!("Unresolved variable: ${{{}}}", name),
                        })?;
                result.push_str(&value);
            }
        }
    }

    Ok(result)
}

/// Resolve every string inside a YAML tree, in place.
///
/// Mapping keys are left alone.
pub fn resolve_value(value: &mut Value, context: &InterpolationContext) -> Result<()> {
    match value {
        Value::String(s) => {
            *s = resolve_string(s, context)?;
        }
        Value::Sequence(items) => {
            for item in items {
                resolve_value(item, context)?;
            }
        }
        Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                resolve_value(item, context)?;
            }
        }
        Value::Tagged(tagged) => resolve_value(&mut tagged.value, context)?,
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}
