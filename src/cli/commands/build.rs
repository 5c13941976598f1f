//! factory build - Validate, write generated artifacts and expand includes
//!
//! Nothing is written when validation fails. With `--target`, only the
//! selected skills' documents are expanded; every other include root is
//! expanded in full.

use clap::Args;
use itertools::Itertools;

use crate::app::AppContext;
use crate::cli::commands::{finish, mark};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Target preset group (repeatable); all skills when omitted
    #[arg(long = "target", short = 't', value_name = "GROUP")]
    pub targets: Vec<String>,

    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,

    /// Also compare generated artifacts on disk before writing
    #[arg(long)]
    pub check_generated: bool,
}

pub fn run(ctx: &AppContext, args: &BuildArgs) -> Result<()> {
    let engine = ctx.engine_with(args.strict, args.check_generated);
    let strict = engine.config().validate.strict;
    let outcome = engine.build(&args.targets)?;
    let color = ctx.output_format.use_colors();

    finish(ctx, "build", outcome, strict, |report, layout| {
        if !report.written {
            layout.title(&format!(
                "{} Build stopped: validation failed, nothing written",
                mark(false, color)
            ));
            layout
                .kv("errors", &report.validation.errors.to_string())
                .kv("warnings", &report.validation.warnings.to_string());
            return;
        }
        layout
            .title(&format!("{} Build complete", mark(true, color)))
            .kv("skills", &report.validation.skills.to_string())
            .kv("artifacts", &report.artifacts.len().to_string())
            .kv("expanded", &report.expanded.files.len().to_string())
            .kv("output", &report.expanded.output_dir);
        if let Some(selection) = &report.selection {
            layout
                .kv("targets", &selection.targets.iter().join(", "))
                .kv("selected", &selection.skills.iter().join(", "));
        }
        if !report.expanded.failed.is_empty() {
            layout.blank().section("Skipped (include cycle)");
            for rel in &report.expanded.failed {
                layout.bullet(rel);
            }
        }
    })
}
