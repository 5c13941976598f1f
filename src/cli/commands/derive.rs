//! factory derive - Derive aggregate views from the skill descriptors

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::commands::{finish, mark};
use crate::derive::DerivedArtifacts;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Write generated artifacts under the generated directory
    #[arg(long)]
    pub write: bool,

    /// Include the full derived views in machine output
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Serialize)]
struct DeriveSummary {
    skills: usize,
    doc_types: usize,
    handoffs: usize,
    categories: usize,
    groups: Vec<GroupSize>,
    written: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifacts: Option<DerivedArtifacts>,
}

#[derive(Debug, Serialize)]
struct GroupSize {
    group: String,
    skills: usize,
}

pub fn run(ctx: &AppContext, args: &DeriveArgs) -> Result<()> {
    let engine = ctx.engine();
    let outcome = engine.derive()?;

    let written = if args.write {
        let paths = engine.write_artifacts(&outcome.data)?;
        info!(files = paths.len(), "generated artifacts written");
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(&engine.layout().root)
                    .unwrap_or(p)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    } else {
        Vec::new()
    };

    let full = args.full;
    let clean = outcome.error_count() == 0;
    let outcome = outcome.map(|derived| DeriveSummary {
        skills: derived.matrix.skills.len(),
        doc_types: derived.doc_types.len(),
        handoffs: derived.matrix.handoffs.len(),
        categories: derived.sections.categories.len(),
        groups: derived
            .rosters
            .iter()
            .map(|r| GroupSize {
                group: r.group.clone(),
                skills: r.skills.len(),
            })
            .collect(),
        written,
        artifacts: full.then_some(derived),
    });
    let color = ctx.output_format.use_colors();

    finish(ctx, "derive", outcome, ctx.strict(), |summary, layout| {
        layout
            .title(&format!("{} Derived artifacts", mark(clean, color)))
            .kv("skills", &summary.skills.to_string())
            .kv("doc types", &summary.doc_types.to_string())
            .kv("handoffs", &summary.handoffs.to_string())
            .kv("categories", &summary.categories.to_string())
            .blank()
            .section("Rosters");
        for group in &summary.groups {
            layout.kv(&group.group, &group.skills.to_string());
        }
        if !summary.written.is_empty() {
            layout.blank().section("Written");
            for path in &summary.written {
                layout.bullet(path);
            }
        }
    })
}
