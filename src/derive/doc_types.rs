//! Document type registry
//!
//! One entry per doc type id that some skill creates. Skills are visited in
//! name order, so the creator of a doc type produced by several skills is
//! the alphabetically first one; the rest are kept as additional creators.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::descriptor::{DEFAULT_CATEGORY, DocRef, Lifecycle, RelationKind, SkillDescriptor};
use crate::derive::matrix::SkillMatrix;

/// Template file id for a doc type.
#[must_use]
pub fn template_id(doc_type: &str) -> String {
    format!("_{doc_type}.md")
}

/// Last non-empty segment of a document path.
#[must_use]
pub fn category_from_path(path: &str) -> Option<String> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocTypeEntry {
    pub id: String,
    pub creator_skill: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_creators: Vec<String>,
    pub consumer_skills: BTreeSet<String>,
    pub lifecycle: Lifecycle,
    pub category: String,
    pub template_id: String,
    /// Phase of the creator skill
    pub phase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocTypeRegistry {
    entries: BTreeMap<String, DocTypeEntry>,
}

impl DocTypeRegistry {
    /// Build the registry. `skills` must be sorted by name.
    #[must_use]
    pub fn build(skills: &[SkillDescriptor], matrix: &SkillMatrix) -> Self {
        let mut producing: BTreeMap<&str, Vec<&DocRef>> = BTreeMap::new();
        let mut entries: BTreeMap<String, DocTypeEntry> = BTreeMap::new();

        for skill in skills {
            for doc in &skill.creates {
                producing.entry(doc.doc_type.as_str()).or_default().push(doc);
            }
            for id in skill.created_doc_types() {
                match entries.get_mut(id) {
                    Some(entry) => entry.additional_creators.push(skill.name.clone()),
                    None => {
                        entries.insert(
                            id.to_string(),
                            DocTypeEntry {
                                id: id.to_string(),
                                creator_skill: skill.name.clone(),
                                additional_creators: Vec::new(),
                                consumer_skills: BTreeSet::new(),
                                lifecycle: Lifecycle::default(),
                                category: DEFAULT_CATEGORY.to_string(),
                                template_id: template_id(id),
                                phase: skill.phase.clone(),
                            },
                        );
                    }
                }
            }
        }

        for (id, entry) in &mut entries {
            let refs = producing.get(id.as_str()).map(Vec::as_slice).unwrap_or_default();
            if let Some(lifecycle) = refs.iter().find_map(|d| d.lifecycle) {
                entry.lifecycle = lifecycle;
            }
            let explicit = refs.iter().find_map(|d| d.doc_category.clone());
            let inferred = || {
                refs.iter()
                    .find_map(|d| d.path.as_deref())
                    .and_then(category_from_path)
            };
            if let Some(category) = explicit.or_else(inferred) {
                entry.category = category;
            }
            entry
                .consumer_skills
                .extend(matrix.handoffs_of(id).map(|e| e.to.clone()));
        }

        for skill in skills {
            for doc in &skill.requires {
                if let Some(entry) = entries.get_mut(&doc.doc_type) {
                    entry.consumer_skills.insert(skill.name.clone());
                }
            }
            for kind in RelationKind::ALL {
                for relation in skill.relations(kind) {
                    let consumer = match kind {
                        RelationKind::ReceivesFrom => &skill.name,
                        RelationKind::DelegatesTo | RelationKind::ReturnPath => &relation.skill,
                    };
                    for id in &relation.docs {
                        if let Some(entry) = entries.get_mut(id) {
                            entry.consumer_skills.insert(consumer.clone());
                        }
                    }
                }
            }
        }

        Self { entries }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DocTypeEntry> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &DocTypeEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Categories named by any entry.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<String> {
        self.entries.values().map(|e| e.category.clone()).collect()
    }
}
