//! factory resolve - Show how a preset group resolves

use clap::Args;
use itertools::Itertools;

use crate::app::AppContext;
use crate::cli::commands::finish;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Preset group name
    pub group: String,
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.iter().join(", ")
    }
}

pub fn run(ctx: &AppContext, args: &ResolveArgs) -> Result<()> {
    let outcome = ctx.engine().resolve_membership(&args.group)?;

    finish(ctx, "resolve", outcome, ctx.strict(), |report, layout| {
        layout.title(&report.group);
        if !report.description.is_empty() {
            layout.kv("description", &report.description);
        }
        layout
            .kv("includes all", if report.includes_all { "yes" } else { "no" })
            .kv("closure", &list(&report.closure))
            .kv("ancestors of", &list(&report.ancestors_of))
            .blank()
            .section("Members");
        layout
            .kv("upward", &list(&report.upward_members))
            .kv("team build", &list(&report.team_members))
            .blank()
            .section(&format!("Roster ({})", report.roster.len()));
        for skill in &report.roster {
            layout.bullet(skill);
        }
    })
}
