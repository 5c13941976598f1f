//! Cross validation over the fully derived graph.
//!
//! Checks are independent and all of them run, whatever earlier checks
//! found. Their diagnostics are concatenated in a fixed order.

pub mod coverage;
pub mod generated;
pub mod handoffs;
pub mod references;
pub mod roster_sync;
pub mod structure;

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;
use tracing::{debug, info};

use crate::core::descriptor::SkillDescriptor;
use crate::core::diagnostics::Diagnostic;
use crate::core::presets::Membership;
use crate::derive::DerivedArtifacts;
use crate::derive::render::{GeneratedFiles, RosterFile};

pub use structure::StructureInput;

/// Generated files to compare with what is on disk.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedCheck<'a> {
    pub expected: &'a GeneratedFiles,
    pub dir: &'a Path,
    pub display_dir: &'a str,
}

/// Everything the checks look at.
#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    pub skills: &'a [SkillDescriptor],
    pub membership: &'a Membership,
    pub derived: &'a DerivedArtifacts,
    pub structure: StructureInput<'a>,
    pub category_pattern: &'a Regex,
    pub roster_file: Option<&'a RosterFile>,
    pub roster_path: &'a str,
    pub generated: Option<GeneratedCheck<'a>>,
}

/// Run every check.
#[must_use]
pub fn run_all(input: &ValidationInput<'_>) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    let mut run = |name: &str, found: Vec<Diagnostic>| {
        debug!(check = name, findings = found.len(), "validation check finished");
        out.extend(found);
    };

    run("coverage", coverage::check(input.skills, input.membership));
    run(
        "references",
        references::check(input.skills, input.membership, &input.derived.doc_types),
    );
    run("handoffs", handoffs::check(input.skills, input.membership));
    run(
        "roster_sync",
        roster_sync::check(&input.derived.rosters, input.roster_file, input.roster_path),
    );
    run(
        "structure",
        structure::check(
            input.skills,
            &input.derived.doc_types,
            &input.structure,
            input.category_pattern,
        ),
    );
    if let Some(generated) = input.generated {
        run(
            "generated",
            generated::check(generated.expected, generated.dir, generated.display_dir),
        );
    }

    let failing: BTreeSet<&str> = out
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.subject.as_str())
        .collect();
    info!(
        findings = out.len(),
        failing_subjects = failing.len(),
        "validation complete"
    );
    out
}
