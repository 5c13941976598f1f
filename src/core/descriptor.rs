//! Typed skill descriptors.
//!
//! A [`SkillDescriptor`] is built once per skill document per run by
//! [`crate::core::extract`] and never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category used when nothing more specific can be inferred.
pub const DEFAULT_CATEGORY: &str = "utility";

/// Header keys that must be present in every skill document.
pub const REQUIRED_FIELDS: [&str; 6] = ["name", "description", "version", "phase", "category", "presets"];

/// Document lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifecycle {
    /// One document per feature, archived when the feature ships
    #[default]
    PerFeature,
    /// Long-lived document updated in place
    Living,
}

impl Lifecycle {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "per-feature" => Some(Self::PerFeature),
            "living" => Some(Self::Living),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerFeature => "per-feature",
            Self::Living => "living",
        }
    }
}

/// The three relationship lists a skill can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    ReceivesFrom,
    DelegatesTo,
    ReturnPath,
}

impl RelationKind {
    pub const ALL: [Self; 3] = [Self::ReceivesFrom, Self::DelegatesTo, Self::ReturnPath];

    /// Header key the relationship list is read from.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::ReceivesFrom => "receives_from",
            Self::DelegatesTo => "delegates_to",
            Self::ReturnPath => "return_paths",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReceivesFrom => f.write_str("receives_from"),
            Self::DelegatesTo => f.write_str("delegates_to"),
            Self::ReturnPath => f.write_str("return_path"),
        }
    }
}

/// The four document lists a skill can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocListKind {
    Creates,
    Requires,
    Updates,
    Archives,
}

impl DocListKind {
    pub const ALL: [Self; 4] = [Self::Creates, Self::Requires, Self::Updates, Self::Archives];

    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Creates => "creates",
            Self::Requires => "requires",
            Self::Updates => "updates",
            Self::Archives => "archives",
        }
    }
}

/// One entry of `receives_from`, `delegates_to` or `return_paths`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub skill: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl Relation {
    #[must_use]
    pub fn to_skill(skill: impl Into<String>) -> Self {
        Self {
            skill: skill.into(),
            docs: Vec::new(),
            trigger: None,
        }
    }
}

/// One entry of `creates`, `requires`, `updates` or `archives`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRef {
    pub doc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl DocRef {
    #[must_use]
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            path: None,
            lifecycle: None,
            doc_category: None,
            trigger: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Typed view of one skill document's header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDescriptor {
    pub name: String,
    pub description: String,
    pub version: String,
    pub phase: String,
    pub category: String,
    pub presets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp_servers: Vec<String>,
    #[serde(default)]
    pub receives_from: Vec<Relation>,
    #[serde(default)]
    pub delegates_to: Vec<Relation>,
    #[serde(default)]
    pub return_paths: Vec<Relation>,
    #[serde(default)]
    pub creates: Vec<DocRef>,
    #[serde(default)]
    pub requires: Vec<DocRef>,
    #[serde(default)]
    pub updates: Vec<DocRef>,
    #[serde(default)]
    pub archives: Vec<DocRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_sections: Vec<String>,
    /// Source document, relative to the source directory
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

impl SkillDescriptor {
    #[must_use]
    pub fn relations(&self, kind: RelationKind) -> &[Relation] {
        match kind {
            RelationKind::ReceivesFrom => &self.receives_from,
            RelationKind::DelegatesTo => &self.delegates_to,
            RelationKind::ReturnPath => &self.return_paths,
        }
    }

    #[must_use]
    pub fn documents(&self, kind: DocListKind) -> &[DocRef] {
        match kind {
            DocListKind::Creates => &self.creates,
            DocListKind::Requires => &self.requires,
            DocListKind::Updates => &self.updates,
            DocListKind::Archives => &self.archives,
        }
    }

    /// Every document reference that carries a path, in list order.
    pub fn path_refs(&self) -> impl Iterator<Item = (DocListKind, &DocRef)> {
        DocListKind::ALL.into_iter().flat_map(move |kind| {
            self.documents(kind)
                .iter()
                .filter(|doc| doc.path.is_some())
                .map(move |doc| (kind, doc))
        })
    }

    /// Doc type ids from `creates`, deduplicated in declaration order.
    #[must_use]
    pub fn created_doc_types(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for doc in &self.creates {
            if !out.contains(&doc.doc_type.as_str()) {
                out.push(doc.doc_type.as_str());
            }
        }
        out
    }
}
