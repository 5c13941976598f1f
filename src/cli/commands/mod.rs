//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use serde::Serialize;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::cli::output::{
    HumanLayout, OutputFormat, emit_diagnostics, emit_human, emit_json, emit_jsonl,
    robot_outcome,
};
use crate::core::diagnostics::{Outcome, RunStatus};
use crate::error::{FactoryError, Result};

pub mod build;
pub mod derive;
pub mod expand;
pub mod resolve;
pub mod select;
pub mod validate;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Expand(args) => expand::run(ctx, args),
        Commands::Resolve(args) => resolve::run(ctx, args),
        Commands::Derive(args) => derive::run(ctx, args),
        Commands::Validate(args) => validate::run(ctx, args),
        Commands::Select(args) => select::run(ctx, args),
        Commands::Build(args) => build::run(ctx, args),
    }
}

/// Emit an entry point's outcome and turn a failing status into an error.
///
/// Machine formats get the data and diagnostics in one document. Human
/// formats print the layout on stdout and the diagnostics on stderr.
pub(crate) fn finish<T: Serialize>(
    ctx: &AppContext,
    what: &str,
    outcome: Outcome<T>,
    strict: bool,
    human: impl FnOnce(&T, &mut HumanLayout),
) -> Result<()> {
    let status = outcome.status(strict);
    let errors = outcome.error_count();
    let warnings = outcome.warning_count();

    match ctx.output_format {
        OutputFormat::Json => emit_json(&robot_outcome(outcome.data, outcome.diagnostics, status))?,
        OutputFormat::Jsonl => {
            emit_jsonl(std::slice::from_ref(&outcome.data))?;
            emit_jsonl(&outcome.diagnostics)?;
        }
        OutputFormat::Human | OutputFormat::Plain => {
            let mut layout = HumanLayout::new(ctx.output_format.use_colors());
            human(&outcome.data, &mut layout);
            if !ctx.quiet {
                emit_human(layout);
            }
            emit_diagnostics(&outcome.diagnostics, ctx.output_format);
        }
    }

    match status {
        RunStatus::Success => Ok(()),
        RunStatus::Failure => Err(FactoryError::ValidationFailed(format!(
            "{what}: {errors} error(s), {warnings} warning(s){}",
            if strict { " (strict)" } else { "" }
        ))),
    }
}

/// Check mark or cross for a human summary line.
pub(crate) fn mark(ok: bool, color: bool) -> String {
    use colored::Colorize;
    match (ok, color) {
        (true, true) => "✓".green().to_string(),
        (false, true) => "✗".red().to_string(),
        (true, false) => "ok".to_string(),
        (false, false) => "FAIL".to_string(),
    }
}
