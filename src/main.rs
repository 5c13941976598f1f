//! factory - skill corpus composition and validation CLI
//!
//! Expands includes, resolves preset groups, derives team artifacts and
//! cross-checks the whole corpus.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use factory::app::AppContext;
use factory::cli::Cli;
use factory::cli::output::{emit_json, robot_error_structured};
use factory::{FactoryError, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);
    if cli.plain {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let robot = cli.output_format().is_machine_readable();
            match &e {
                // The command already reported its diagnostics.
                FactoryError::ValidationFailed(_) if robot => {}
                FactoryError::ValidationFailed(msg) => eprintln!("{}", msg.red()),
                _ if robot => {
                    if emit_json(&robot_error_structured(&e)).is_err() {
                        eprintln!("Error: {e}");
                    }
                }
                _ => {
                    let structured = e.to_structured();
                    eprintln!("{} {e}", "Error:".red().bold());
                    eprintln!("  {}", structured.suggestion.dimmed());
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    factory::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,factory=info",
        1 => "info,factory=debug",
        2 => "debug,factory=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.output_format().is_machine_readable() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_ansi(!cli.plain)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
