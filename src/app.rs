//! Per-invocation context shared by every command.

use std::path::PathBuf;

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Engine;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub output_format: OutputFormat,
    pub robot_mode: bool,
    pub verbosity: u8,
    pub quiet: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref(), &cli.root)?;
        let output_format = cli.output_format();
        debug!(
            root = %cli.root.display(),
            source_dir = %config.paths.source_dir,
            strict = config.validate.strict,
            "configuration loaded"
        );
        Ok(Self {
            root: cli.root.clone(),
            config,
            output_format,
            robot_mode: output_format.is_machine_readable(),
            verbosity: cli.verbose,
            quiet: cli.quiet,
        })
    }

    /// Engine over the configured project.
    #[must_use]
    pub fn engine(&self) -> Engine {
        Engine::new(self.config.clone(), &self.root)
    }

    /// Engine with command-line overrides for the validation switches.
    #[must_use]
    pub fn engine_with(&self, strict: bool, check_generated: bool) -> Engine {
        let mut config = self.config.clone();
        config.validate.strict |= strict;
        config.validate.check_generated |= check_generated;
        Engine::new(config, &self.root)
    }

    #[must_use]
    pub const fn strict(&self) -> bool {
        self.config.validate.strict
    }
}
