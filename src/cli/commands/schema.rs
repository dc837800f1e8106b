//! Schema command implementation.
//!
//! The `outpost schema` command prints the manifest JSON Schema, for
//! editor integration.

use std::io::Write;

use crate::config::manifest_schema;
use crate::error::Result;

use super::dispatcher::{Command, CommandContext, CommandResult};

pub struct SchemaCommand;

impl Command for SchemaCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<CommandResult> {
        let json = serde_json::to_string_pretty(&manifest_schema()).map_err(anyhow::Error::from)?;
        writeln!(std::io::stdout().lock(), "{}", json)?;
        Ok(CommandResult::success())
    }
}
