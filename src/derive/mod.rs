//! Aggregate views derived from the full descriptor set.
//!
//! Derivation is pure: descriptors and resolved membership in, views out.
//! Nothing here reads or writes files except [`render::GeneratedFiles::write`].

pub mod doc_types;
pub mod matrix;
pub mod membership;
pub mod render;
pub mod sections;
pub mod selection;

use serde::Serialize;
use tracing::info;

use crate::core::descriptor::SkillDescriptor;
use crate::core::presets::Membership;

pub use doc_types::{DocTypeEntry, DocTypeRegistry};
pub use matrix::{HandoffEdge, SkillMatrix, SkillSummary};
pub use membership::{Pipeline, Roster, RosterBuilder};
pub use render::{GeneratedFiles, RosterFile, RosterSkills};
pub use sections::SectionMatrix;
pub use selection::{Selection, select};

/// Everything derived from one run's descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedArtifacts {
    pub matrix: SkillMatrix,
    pub doc_types: DocTypeRegistry,
    pub sections: SectionMatrix,
    pub rosters: Vec<Roster>,
    pub pipelines: Vec<Pipeline>,
}

impl DerivedArtifacts {
    #[must_use]
    pub fn roster(&self, group: &str) -> Option<&Roster> {
        self.rosters.iter().find(|r| r.group == group)
    }
}

/// Derive every view. `skills` must be sorted by name.
#[must_use]
pub fn derive_artifacts(
    skills: &[SkillDescriptor],
    membership: &Membership,
    phase_order: &[String],
) -> DerivedArtifacts {
    let matrix = SkillMatrix::build(skills);
    let doc_types = DocTypeRegistry::build(skills, &matrix);
    let sections = SectionMatrix::build(skills);
    let rosters = RosterBuilder::new(skills, membership).rosters();
    let pipelines = rosters
        .iter()
        .map(|r| Pipeline::build(r, skills, &matrix, phase_order))
        .collect();

    info!(
        skills = skills.len(),
        handoffs = matrix.handoffs.len(),
        doc_types = doc_types.len(),
        groups = rosters.len(),
        "derived artifacts"
    );
    DerivedArtifacts {
        matrix,
        doc_types,
        sections,
        rosters,
        pipelines,
    }
}
