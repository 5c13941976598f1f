//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Factory - Validate skill descriptors and generate team artifacts
#[derive(Parser, Debug)]
#[command(name = "factory")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable JSON output for machine consumption.
    /// Kept for older integrations; prefer --output-format=json or -m.
    #[arg(long, global = true, hide = true)]
    pub robot: bool,

    /// Output format (human, json, jsonl, plain)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Force plain output (no colors)
    #[arg(long, global = true)]
    pub plain: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ./factory.toml over ~/.config/factory/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root all configured paths are relative to
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the effective output format.
    ///
    /// Priority order:
    /// 1. `--plain` → Plain format
    /// 2. `--output-format` → Explicit format
    /// 3. `--machine` → JSON format (shorthand)
    /// 4. `--robot` → JSON format
    /// 5. Default → Human format
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.plain {
            return OutputFormat::Plain;
        }
        if let Some(fmt) = self.output_format {
            return fmt;
        }
        if self.machine || self.robot {
            return OutputFormat::Json;
        }
        OutputFormat::Human
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand include directives in one document or the whole source tree
    Expand(commands::expand::ExpandArgs),

    /// Show closure, ancestors and members of a preset group
    Resolve(commands::resolve::ResolveArgs),

    /// Derive the skill matrix, doc types, sections and rosters
    Derive(commands::derive::DeriveArgs),

    /// Run every cross check and report diagnostics
    Validate(commands::validate::ValidateArgs),

    /// List the skills a set of target groups selects
    Select(commands::select::SelectArgs),

    /// Validate, write generated artifacts and expand includes
    Build(commands::build::BuildArgs),
}
