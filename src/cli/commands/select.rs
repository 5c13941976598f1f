//! factory select - List the skills selected by target groups

use clap::Args;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::commands::finish;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Target preset groups
    #[arg(required = true)]
    pub groups: Vec<String>,
}

pub fn run(ctx: &AppContext, args: &SelectArgs) -> Result<()> {
    let outcome = ctx.engine().filtered_build(&args.groups)?;
    let plain = ctx.output_format == OutputFormat::Plain;

    finish(ctx, "selection", outcome, ctx.strict(), |selection, layout| {
        // Plain output is one name per line for piping.
        if !plain {
            layout.title(&format!(
                "{} skill(s) for {}",
                selection.skills.len(),
                selection.targets.join(" + ")
            ));
        }
        for skill in &selection.skills {
            if plain {
                layout.push_line(skill.clone());
            } else {
                layout.bullet(skill);
            }
        }
    })
}
