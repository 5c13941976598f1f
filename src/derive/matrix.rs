//! Skill matrix
//!
//! Per-skill summary, skills grouped by phase, and the handoff edges that
//! pair every `delegates_to` target of a skill with every doc type that
//! skill creates.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::descriptor::{RelationKind, SkillDescriptor};

/// Directed relation between two skills.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HandoffEdge {
    pub from: String,
    pub to: String,
    pub kind: RelationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl HandoffEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            doc_type: None,
            path: None,
        }
    }
}

/// Summary row for one skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    pub description: String,
    pub version: String,
    pub phase: String,
    pub category: String,
    pub presets: Vec<String>,
    pub receives_from: Vec<String>,
    pub delegates_to: Vec<String>,
    pub return_paths: Vec<String>,
    pub creates: Vec<String>,
    pub source: String,
}

impl SkillSummary {
    fn from_descriptor(skill: &SkillDescriptor) -> Self {
        let targets = |kind| {
            skill
                .relations(kind)
                .iter()
                .map(|r| r.skill.clone())
                .collect()
        };
        Self {
            description: skill.description.clone(),
            version: skill.version.clone(),
            phase: skill.phase.clone(),
            category: skill.category.clone(),
            presets: skill.presets.clone(),
            receives_from: targets(RelationKind::ReceivesFrom),
            delegates_to: targets(RelationKind::DelegatesTo),
            return_paths: targets(RelationKind::ReturnPath),
            creates: skill
                .created_doc_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
            source: skill.source.clone(),
        }
    }
}

/// Aggregate view over every skill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillMatrix {
    pub skills: BTreeMap<String, SkillSummary>,
    /// Phase name to skill names, both sorted
    pub phases: BTreeMap<String, Vec<String>>,
    pub handoffs: Vec<HandoffEdge>,
}

impl SkillMatrix {
    /// Build the matrix. `skills` must already be sorted by name.
    #[must_use]
    pub fn build(skills: &[SkillDescriptor]) -> Self {
        let mut matrix = Self::default();
        for skill in skills {
            matrix
                .skills
                .insert(skill.name.clone(), SkillSummary::from_descriptor(skill));
            matrix
                .phases
                .entry(skill.phase.clone())
                .or_default()
                .push(skill.name.clone());
            matrix.handoffs.extend(document_handoffs(skill));
        }
        for names in matrix.phases.values_mut() {
            names.sort();
        }
        matrix
    }

    /// Edges leaving `skill`.
    pub fn handoffs_from<'a>(&'a self, skill: &'a str) -> impl Iterator<Item = &'a HandoffEdge> {
        self.handoffs.iter().filter(move |e| e.from == skill)
    }

    /// Edges whose doc type is `id`.
    pub fn handoffs_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a HandoffEdge> {
        self.handoffs
            .iter()
            .filter(move |e| e.doc_type.as_deref() == Some(id))
    }
}

/// Every delegation target crossed with every created doc type.
///
/// The first `creates` entry for a doc type supplies its path.
fn document_handoffs(skill: &SkillDescriptor) -> Vec<HandoffEdge> {
    let mut out = Vec::new();
    for target in &skill.delegates_to {
        for doc_type in skill.created_doc_types() {
            let path = skill
                .creates
                .iter()
                .find(|d| d.doc_type == doc_type)
                .and_then(|d| d.path.clone());
            out.push(HandoffEdge {
                from: skill.name.clone(),
                to: target.skill.clone(),
                kind: RelationKind::DelegatesTo,
                doc_type: Some(doc_type.to_string()),
                path,
            });
        }
    }
    out
}

/// Every declared relationship as an edge, deduplicated on
/// `(from, to, kind)`.
///
/// `receives_from` on skill S naming P is the edge P -> S; the other two
/// kinds point from the declaring skill to the named one.
#[must_use]
pub fn relationship_edges(skills: &[SkillDescriptor]) -> Vec<HandoffEdge> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for skill in skills {
        for kind in RelationKind::ALL {
            for relation in skill.relations(kind) {
                let (from, to) = match kind {
                    RelationKind::ReceivesFrom => (relation.skill.as_str(), skill.name.as_str()),
                    RelationKind::DelegatesTo | RelationKind::ReturnPath => {
                        (skill.name.as_str(), relation.skill.as_str())
                    }
                };
                if seen.insert((from.to_string(), to.to_string(), kind)) {
                    out.push(HandoffEdge::new(from, to, kind));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::{DocRef, Relation};

    fn skill(name: &str, phase: &str) -> SkillDescriptor {
        SkillDescriptor {
            name: name.to_string(),
            phase: phase.to_string(),
            category: "backend".to_string(),
            presets: vec!["core".to_string()],
            source: format!("skills/{name}/SKILL.md"),
            ..SkillDescriptor::default()
        }
    }

    #[test]
    fn handoffs_are_delegates_times_creates() {
        let mut a = skill("a", "design");
        a.delegates_to = vec![Relation::to_skill("b"), Relation::to_skill("c")];
        a.creates = vec![
            DocRef::new("spec").with_path("project/docs/active/specs/"),
            DocRef::new("plan"),
        ];
        let matrix = SkillMatrix::build(&[a, skill("b", "design"), skill("c", "delivery")]);

        let pairs: Vec<(&str, &str)> = matrix
            .handoffs
            .iter()
            .map(|e| (e.to.as_str(), e.doc_type.as_deref().unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![("b", "spec"), ("b", "plan"), ("c", "spec"), ("c", "plan")]
        );
        assert_eq!(
            matrix.handoffs[0].path.as_deref(),
            Some("project/docs/active/specs/")
        );
        assert_eq!(matrix.handoffs_of("plan").count(), 2);
    }

    #[test]
    fn no_creates_means_no_document_handoffs() {
        let mut a = skill("a", "design");
        a.delegates_to = vec![Relation::to_skill("b")];
        let matrix = SkillMatrix::build(&[a]);
        assert!(matrix.handoffs.is_empty());
        assert_eq!(matrix.skills["a"].delegates_to, vec!["b"]);
    }

    #[test]
    fn phases_group_sorted_names() {
        let matrix = SkillMatrix::build(&[
            skill("a", "design"),
            skill("b", "delivery"),
            skill("c", "design"),
        ]);
        assert_eq!(matrix.phases["design"], vec!["a", "c"]);
        assert_eq!(matrix.phases["delivery"], vec!["b"]);
    }

    #[test]
    fn relationship_edges_orient_receives_from() {
        let mut a = skill("a", "design");
        a.receives_from = vec![Relation::to_skill("z")];
        a.delegates_to = vec![Relation::to_skill("b"), Relation::to_skill("b")];
        let edges = relationship_edges(&[a]);
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].from.as_str(), edges[0].to.as_str()), ("z", "a"));
        assert_eq!(edges[1].kind, RelationKind::DelegatesTo);
    }
}
