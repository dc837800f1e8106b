//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Outpost - declarative, idempotent workstation provisioning.
#[derive(Debug, Parser)]
#[command(name = "outpost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Load exactly this manifest file (no layering)
    #[arg(short, long, global = true, env = "OUTPOST_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Directory searched for .outpost/ (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Start from a built-in manifest variant (full, lite)
    #[arg(long, global = true)]
    pub variant: Option<String>,

    /// Account being provisioned (defaults to SUDO_USER, then USER)
    #[arg(short, long, global = true, env = "OUTPOST_USER")]
    pub user: Option<String>,

    /// Home directory of the target account
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provision the workstation (default if no command specified)
    Run(RunArgs),

    /// Show the ordered plan without probing anything
    Plan(PlanArgs),

    /// Probe every step without changing the system
    Check(CheckArgs),

    /// Print the manifest JSON Schema
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Probe every step but apply nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Run only these steps and their prerequisites (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Stop the whole run at the first fatal failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Emit JSON lines on stdout instead of human output
    #[arg(long)]
    pub json: bool,

    /// Append JSON lines for every event to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show only these steps and their prerequisites (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Check only these steps and their prerequisites (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
