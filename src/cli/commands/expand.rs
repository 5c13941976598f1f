//! factory expand - Expand include directives
//!
//! With a path, prints one document's expansion without writing anything.
//! Without one, expands every markdown file under the include roots into
//! the output directory.

use clap::Args;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::commands::{finish, mark};
use crate::core::diagnostics::Outcome;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Document to expand, relative to the source directory
    pub path: Option<String>,

    /// List the include directives met instead of printing the content
    #[arg(long)]
    pub tree: bool,
}

pub fn run(ctx: &AppContext, args: &ExpandArgs) -> Result<()> {
    let engine = ctx.engine();
    let color = ctx.output_format.use_colors();

    let Some(path) = &args.path else {
        let outcome = engine.expand_includes(None)?;
        return finish(ctx, "expand", outcome, ctx.strict(), |report, layout| {
            layout
                .title(&format!(
                    "{} Expanded {} file(s) into {}",
                    mark(report.failed.is_empty(), color),
                    report.files.len(),
                    report.output_dir
                ))
                .kv(
                    "includes",
                    &report.files.iter().map(|f| f.includes).sum::<usize>().to_string(),
                )
                .kv(
                    "missing",
                    &report.files.iter().map(|f| f.missing).sum::<usize>().to_string(),
                );
            if !report.failed.is_empty() {
                layout.blank().section("Skipped (include cycle)");
                for rel in &report.failed {
                    layout.bullet(rel);
                }
            }
        });
    };

    let mut expansion = engine.expand_document(path)?;
    let diagnostics = std::mem::take(&mut expansion.diagnostics);
    let outcome = Outcome::new(expansion, diagnostics);
    let tree = args.tree;
    let raw = matches!(ctx.output_format, OutputFormat::Human | OutputFormat::Plain) && !tree;

    finish(ctx, "expand", outcome, ctx.strict(), |expansion, layout| {
        if raw {
            layout.push_line(expansion.content.trim_end_matches('\n'));
            return;
        }
        layout.title(path);
        for node in &expansion.includes {
            let indent = "  ".repeat(node.depth.saturating_sub(1));
            let state = if node.found { "" } else { " (missing)" };
            layout.push_line(format!("{indent}- {}{state}", node.target));
        }
    })
}
