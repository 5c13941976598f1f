//! Filtered build selection.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::core::descriptor::SkillDescriptor;
use crate::core::diagnostics::{Diagnostic, Outcome};
use crate::core::presets::Membership;
use crate::derive::membership::RosterBuilder;
use crate::error::ErrorCode;

/// Skills selected for a set of target groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Requested groups, deduplicated, in request order
    pub targets: Vec<String>,
    /// Selected skill names, sorted
    pub skills: Vec<String>,
}

impl Selection {
    #[must_use]
    pub fn contains(&self, skill: &str) -> bool {
        self.skills.binary_search_by(|s| s.as_str().cmp(skill)).is_ok()
    }
}

/// Union of the rosters of every requested group.
///
/// A skill qualifies when one of its declared presets lies in a target's
/// closure, or a target lies in the closure of one of its presets. Unknown
/// targets are reported and contribute nothing.
#[must_use]
pub fn select(
    skills: &[SkillDescriptor],
    membership: &Membership,
    targets: &[String],
) -> Outcome<Selection> {
    let builder = RosterBuilder::new(skills, membership);
    let mut requested: Vec<String> = Vec::new();
    let mut selected = BTreeSet::new();
    let mut diagnostics = Vec::new();

    for target in targets {
        if requested.contains(target) {
            continue;
        }
        requested.push(target.clone());
        if !membership.graph().contains(target) {
            diagnostics.push(
                Diagnostic::error(
                    ErrorCode::UnknownPreset,
                    target,
                    format!("unknown target group '{target}'"),
                )
                .with_context(json!({ "target": target })),
            );
            continue;
        }
        selected.extend(builder.roster(target));
    }

    let mut skills: Vec<String> = selected.into_iter().collect();
    skills.sort();
    info!(targets = ?requested, selected = skills.len(), "selected skills for build");
    Outcome::new(
        Selection {
            targets: requested,
            skills,
        },
        diagnostics,
    )
}
