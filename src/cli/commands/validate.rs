//! factory validate - Run every cross check over the source tree

use clap::Args;

use crate::app::AppContext;
use crate::cli::commands::{finish, mark};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,

    /// Also compare generated artifacts on disk with a fresh rendering
    #[arg(long)]
    pub check_generated: bool,
}

pub fn run(ctx: &AppContext, args: &ValidateArgs) -> Result<()> {
    let engine = ctx.engine_with(args.strict, args.check_generated);
    let strict = engine.config().validate.strict;
    let outcome = engine.validate()?;
    let color = ctx.output_format.use_colors();

    finish(ctx, "validation", outcome, strict, |report, layout| {
        let ok = report.errors == 0 && !(strict && report.warnings > 0);
        layout
            .title(&format!("{} Validation", mark(ok, color)))
            .kv("skills", &report.skills.to_string())
            .kv("groups", &report.groups.to_string())
            .kv("doc types", &report.doc_types.to_string())
            .kv("handoffs", &report.handoffs.to_string())
            .kv("errors", &report.errors.to_string())
            .kv("warnings", &report.warnings.to_string());
    })
}
