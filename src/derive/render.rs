//! Rendering derived views into files.
//!
//! Every artifact is rendered to a string first; writing is a separate
//! step so the same renderings can be compared against what is on disk.
//! Output never embeds timestamps, so identical input renders identical
//! bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, Serializer};
use serde_yaml::Value;
use tracing::{debug, info};

use crate::core::presets::is_valid_group_name;
use crate::derive::DerivedArtifacts;
use crate::derive::membership::{Pipeline, Roster};
use crate::error::{FactoryError, Result};

pub const YAML_BANNER: &str = "# Generated by factory. Do not edit.\n";
pub const MARKDOWN_BANNER: &str = "<!-- Generated by factory. Do not edit. -->\n";

pub const SKILL_MATRIX_FILE: &str = "skill-matrix.yaml";
pub const DOC_TYPES_FILE: &str = "doc-types.yaml";
pub const SECTION_MATRIX_FILE: &str = "section-matrix.yaml";
pub const PRESETS_FILE: &str = "presets.yaml";
pub const TEAMS_DIR: &str = "teams";
pub const PIPELINES_DIR: &str = "pipelines";

/// Wildcard member list of an includes-all group.
pub const ALL_SKILLS: &str = "*";

/// Members as listed in a roster file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSkills")]
pub enum RosterSkills {
    All,
    Listed(BTreeSet<String>),
}

impl Default for RosterSkills {
    fn default() -> Self {
        Self::Listed(BTreeSet::new())
    }
}

impl Serialize for RosterSkills {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str(ALL_SKILLS),
            Self::Listed(skills) => serializer.collect_seq(skills),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSkills {
    Marker(String),
    List(Vec<String>),
}

impl TryFrom<RawSkills> for RosterSkills {
    type Error = String;

    fn try_from(raw: RawSkills) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawSkills::Marker(marker) if marker == ALL_SKILLS => Ok(Self::All),
            RawSkills::Marker(other) => Err(format!(
                "skills must be a list or \"{ALL_SKILLS}\", got \"{other}\""
            )),
            RawSkills::List(list) => Ok(Self::Listed(list.into_iter().collect())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: RosterSkills,
}

/// Group name to member list, as stored in `presets.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RosterFile {
    entries: BTreeMap<String, RosterEntry>,
}

impl RosterFile {
    #[must_use]
    pub fn from_rosters(rosters: &[Roster]) -> Self {
        let entries = rosters
            .iter()
            .map(|r| {
                let skills = if r.includes_all {
                    RosterSkills::All
                } else {
                    RosterSkills::Listed(r.skills.iter().cloned().collect())
                };
                (
                    r.group.clone(),
                    RosterEntry {
                        description: r.description.clone(),
                        skills,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Parse a roster file. Top-level keys starting with `_` are ignored.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let root: BTreeMap<String, Value> = serde_yaml::from_str(raw)?;
        let mut entries = BTreeMap::new();
        for (group, value) in root {
            if group.starts_with('_') {
                continue;
            }
            let entry = if value.is_null() {
                RosterEntry::default()
            } else {
                serde_yaml::from_value(value)?
            };
            entries.insert(group, entry);
        }
        Ok(Self { entries })
    }

    /// Load a roster file; `None` when it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|err| FactoryError::Config(format!("read roster {}: {err}", path.display())))?;
        let file = Self::from_yaml_str(&raw)
            .map_err(|err| FactoryError::Config(format!("parse roster {}: {err}", path.display())))?;
        Ok(Some(file))
    }

    #[must_use]
    pub fn get(&self, group: &str) -> Option<&RosterEntry> {
        self.entries.get(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(format!("{YAML_BANNER}{}", serde_yaml::to_string(self)?))
    }
}

/// Rendered artifacts keyed by path relative to the generated directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GeneratedFiles {
    files: BTreeMap<String, String>,
}

impl GeneratedFiles {
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.files.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `dir`, replacing what was there.
    ///
    /// The per-group `teams/` and `pipelines/` directories are cleared
    /// first so pages of removed groups do not linger.
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        for sub in [TEAMS_DIR, PIPELINES_DIR] {
            let stale = dir.join(sub);
            if stale.is_dir() {
                std::fs::remove_dir_all(&stale)?;
                debug!(dir = %stale.display(), "cleared per-group artifacts");
            }
        }
        let mut written = Vec::with_capacity(self.files.len());
        for (rel, content) in &self.files {
            let path = dir.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)?;
            debug!(path = %path.display(), "wrote artifact");
            written.push(path);
        }
        info!(dir = %dir.display(), files = written.len(), "wrote generated artifacts");
        Ok(written)
    }
}

fn yaml<T: Serialize>(value: &T) -> Result<String> {
    Ok(format!("{YAML_BANNER}{}", serde_yaml::to_string(value)?))
}

fn group_file_name(group: &str) -> Result<&str> {
    if is_valid_group_name(group) {
        Ok(group)
    } else {
        Err(FactoryError::Config(format!(
            "preset name '{group}' cannot be used in an artifact file name"
        )))
    }
}

/// Render every derived artifact.
pub fn render_all(derived: &DerivedArtifacts) -> Result<GeneratedFiles> {
    let mut files = GeneratedFiles::default();
    files.insert(SKILL_MATRIX_FILE, yaml(&derived.matrix)?);
    files.insert(DOC_TYPES_FILE, yaml(&derived.doc_types)?);
    files.insert(SECTION_MATRIX_FILE, yaml(&derived.sections)?);
    files.insert(PRESETS_FILE, RosterFile::from_rosters(&derived.rosters).to_yaml()?);
    for roster in &derived.rosters {
        files.insert(
            format!("{TEAMS_DIR}/TEAM_{}.md", group_file_name(&roster.group)?),
            render_team(roster, derived),
        );
    }
    for pipeline in &derived.pipelines {
        files.insert(
            format!("{PIPELINES_DIR}/PIPELINE_{}.md", group_file_name(&pipeline.group)?),
            render_pipeline(pipeline),
        );
    }
    Ok(files)
}

/// Team page: one table row per member.
#[must_use]
pub fn render_team(roster: &Roster, derived: &DerivedArtifacts) -> String {
    let mut out = String::from(MARKDOWN_BANNER);
    let _ = writeln!(out, "# Team: {}\n", roster.group);
    if !roster.description.is_empty() {
        let _ = writeln!(out, "{}\n", roster.description);
    }
    if roster.includes_all {
        out.push_str("Includes every skill.\n\n");
    }
    if roster.skills.is_empty() {
        out.push_str("_No members._\n");
        return out;
    }
    out.push_str("| Skill | Phase | Category | Description |\n");
    out.push_str("|-------|-------|----------|-------------|\n");
    for name in &roster.skills {
        let Some(summary) = derived.matrix.skills.get(name) else {
            continue;
        };
        let _ = writeln!(
            out,
            "| {name} | {} | {} | {} |",
            summary.phase,
            summary.category,
            summary.description.replace('|', "\\|")
        );
    }
    out
}

#[must_use]
pub fn render_pipeline(pipeline: &Pipeline) -> String {
    let mut out = String::from(MARKDOWN_BANNER);
    let _ = writeln!(out, "# Pipeline: {}\n", pipeline.group);
    if !pipeline.description.is_empty() {
        let _ = writeln!(out, "{}\n", pipeline.description);
    }

    out.push_str("## Phases\n\n");
    if pipeline.phases.is_empty() {
        out.push_str("_No members._\n");
    } else {
        out.push_str("| Phase | Skills |\n|-------|--------|\n");
        for (phase, skills) in &pipeline.phases {
            let _ = writeln!(out, "| {phase} | {} |", skills.join(", "));
        }
    }

    out.push_str("\n## Handoffs\n\n");
    if pipeline.handoffs.is_empty() {
        out.push_str("_None._\n");
    } else {
        out.push_str("| From | To | Document |\n|------|----|----------|\n");
        for edge in &pipeline.handoffs {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                edge.from,
                edge.to,
                edge.doc_type.as_deref().unwrap_or("-")
            );
        }
    }

    out.push_str("\n## Return paths\n\n");
    if pipeline.return_paths.is_empty() {
        out.push_str("_None._\n");
    } else {
        for edge in &pipeline.return_paths {
            let _ = writeln!(out, "- {} -> {}", edge.from, edge.to);
        }
    }
    out
}
