//! Process spawning behind a trait so capabilities can be tested.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{OutpostError, Result};
use crate::shell::{execute, CommandOptions, CommandResult};

/// Spawns external commands for the capabilities.
pub trait CommandRunner {
    /// Run a shell command line.
    fn run(&self, command: &str, options: &CommandOptions) -> Result<CommandResult>;

    /// Run and require a zero exit.
    fn run_checked(&self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        self.run(command, options)?.into_result(command)
    }

    /// Run quietly and report whether it exited zero. Spawn errors count
    /// as `false`.
    fn succeeds(&self, command: &str, options: &CommandOptions) -> bool {
        self.run(command, options)
            .map(|r| r.success)
            .unwrap_or(false)
    }
}

/// Shared handle to a runner. Steps are single-threaded.
pub type SharedRunner = Rc<dyn CommandRunner>;

/// Runs commands on the real system through `sh -c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        execute(command, options)
    }
}

/// One command seen by a [`MockRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub run_as: Option<String>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
enum Rule {
    Fail(String),
    TimeOut(String),
}

/// Records commands instead of running them.
///
/// Every command succeeds unless it contains a substring registered with
/// [`fail_when`](Self::fail_when) or [`time_out_when`](Self::time_out_when).
#[derive(Debug, Default)]
pub struct MockRunner {
    rules: RefCell<Vec<Rule>>,
    history: RefCell<Vec<RecordedCommand>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `pattern` exit 1.
    pub fn fail_when(&self, pattern: impl Into<String>) -> &Self {
        self.rules.borrow_mut().push(Rule::Fail(pattern.into()));
        self
    }

    /// Commands containing `pattern` time out.
    pub fn time_out_when(&self, pattern: impl Into<String>) -> &Self {
        self.rules.borrow_mut().push(Rule::TimeOut(pattern.into()));
        self
    }

    /// Drop every rule.
    pub fn clear_rules(&self) {
        self.rules.borrow_mut().clear();
    }

    /// Every command run so far, in order.
    pub fn history(&self) -> Vec<RecordedCommand> {
        self.history.borrow().clone()
    }

    /// Just the command lines.
    pub fn commands(&self) -> Vec<String> {
        self.history
            .borrow()
            .iter()
            .map(|c| c.command.clone())
            .collect()
    }

    /// Whether any command contained `pattern`.
    pub fn ran(&self, pattern: &str) -> bool {
        self.history
            .borrow()
            .iter()
            .any(|c| c.command.contains(pattern))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        self.history.borrow_mut().push(RecordedCommand {
            command: command.to_string(),
            cwd: options.cwd.clone(),
            run_as: options.run_as.clone(),
            timeout: options.timeout,
        });

        for rule in self.rules.borrow().iter() {
            match rule {
                Rule::Fail(p) if command.contains(p.as_str()) => {
                    return Ok(CommandResult::failure(
                        Some(1),
                        String::new(),
                        format!("mock failure: {}", p),
                        Duration::ZERO,
                    ));
                }
                Rule::TimeOut(p) if command.contains(p.as_str()) => {
                    return Err(OutpostError::CommandTimedOut {
                        command: command.to_string(),
                        seconds: options.timeout.map(|t| t.as_secs()).unwrap_or(0),
                    });
                }
                _ => {}
            }
        }

        Ok(CommandResult::success(
            String::new(),
            String::new(),
            Duration::ZERO,
        ))
    }
}

/// Quote a value for `sh`.
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || "-_.:/%+=,@".contains(ch))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\"'\"'"))
    }
}

/// Fill a command template's `{key}` placeholders with quoted values.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), &shell_quote(value))
    })
}
