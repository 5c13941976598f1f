//! Collect phase: find skill documents and extract their descriptors.
//!
//! Documents live at `<skills_dir>/<name>/SKILL.md` and
//! `<skills_dir>/<private_dir>/<name>/SKILL.md`. Discovery returns them in
//! path order; extraction runs in parallel but results are re-sorted by
//! skill name before anything downstream sees them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde_json::json;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::descriptor::SkillDescriptor;
use crate::core::diagnostics::{Diagnostic, Outcome};
use crate::core::enums::EnumTable;
use crate::core::extract::extract;
use crate::error::{ErrorCode, FactoryError, Result};

/// File name of a skill document.
pub const SKILL_FILE: &str = "SKILL.md";

/// Raw skill document read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDocument {
    /// Path relative to the source directory, `/`-separated
    pub source: String,
    pub content: String,
}

impl SkillDocument {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// `path` relative to `base`, with `/` separators.
#[must_use]
pub fn relative_string(base: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Every skill document under `skills_root`, sorted by path.
///
/// Public skills sit one level down; private skills sit one level below
/// `private_dir`. Anything deeper (bundled examples, references) is not a
/// skill document.
pub fn discover_skill_documents(skills_root: &Path, private_dir: &str) -> Result<Vec<PathBuf>> {
    if !skills_root.is_dir() {
        return Err(FactoryError::NotFound(format!(
            "skills directory {}",
            skills_root.display()
        )));
    }

    let mut out = Vec::new();
    let walker = WalkDir::new(skills_root)
        .max_depth(3)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|err| FactoryError::Config(format!("walk skill paths: {err}")))?;
        if !entry.file_type().is_file() || entry.file_name() != SKILL_FILE {
            continue;
        }
        let rel = relative_string(skills_root, entry.path());
        let parts: Vec<&str> = rel.split('/').collect();
        let is_skill = match parts.as_slice() {
            [name, _] => *name != private_dir,
            [dir, _, _] => *dir == private_dir,
            _ => false,
        };
        if is_skill {
            out.push(entry.into_path());
        }
    }
    debug!(root = %skills_root.display(), found = out.len(), "discovered skill documents");
    Ok(out)
}

/// Read every discovered document. Unreadable files become diagnostics.
pub fn read_skill_documents(
    source_dir: &Path,
    skills_dir: &str,
    private_dir: &str,
) -> Result<Outcome<Vec<SkillDocument>>> {
    let paths = discover_skill_documents(&source_dir.join(skills_dir), private_dir)?;
    let mut documents = Vec::with_capacity(paths.len());
    let mut diagnostics = Vec::new();
    for path in paths {
        let source = relative_string(source_dir, &path);
        match std::fs::read_to_string(&path) {
            Ok(content) => documents.push(SkillDocument { source, content }),
            Err(err) => diagnostics.push(
                Diagnostic::error(ErrorCode::IoError, &source, format!("read failed: {err}"))
                    .with_path(&source),
            ),
        }
    }
    Ok(Outcome::new(documents, diagnostics))
}

/// Extract descriptors from every document in parallel.
///
/// Documents that fail extraction are dropped and their diagnostics kept.
/// A second document claiming an existing skill name is rejected. The
/// returned descriptors are sorted by name.
#[must_use]
pub fn extract_all(documents: &[SkillDocument], enums: &EnumTable) -> Outcome<Vec<SkillDescriptor>> {
    let mut results: Vec<(&SkillDocument, _)> = documents
        .par_iter()
        .map(|doc| (doc, extract(&doc.source, &doc.content, enums)))
        .collect();
    results.sort_by(|a, b| a.0.source.cmp(&b.0.source));

    let mut by_name: BTreeMap<String, SkillDescriptor> = BTreeMap::new();
    let mut diagnostics = Vec::new();
    for (doc, result) in results {
        match result {
            Ok(extracted) => {
                diagnostics.extend(extracted.warnings);
                let descriptor = extracted.descriptor;
                if let Some(existing) = by_name.get(&descriptor.name) {
                    diagnostics.push(
                        Diagnostic::error(
                            ErrorCode::FieldInvalid,
                            &descriptor.name,
                            format!("duplicate skill name, already defined in {}", existing.source),
                        )
                        .with_path(&doc.source)
                        .with_context(json!({ "field": "name", "first": existing.source })),
                    );
                    continue;
                }
                by_name.insert(descriptor.name.clone(), descriptor);
            }
            Err(errors) => diagnostics.extend(errors),
        }
    }

    let descriptors: Vec<SkillDescriptor> = by_name.into_values().collect();
    info!(
        documents = documents.len(),
        skills = descriptors.len(),
        diagnostics = diagnostics.len(),
        "extracted descriptors"
    );
    Outcome::new(descriptors, diagnostics)
}

/// Subdirectory names of `root`, excluding dot-directories.
///
/// Returns `None` when `root` does not exist.
pub fn list_subdirs(root: &Path) -> Result<Option<BTreeSet<String>>> {
    if !root.is_dir() {
        return Ok(None);
    }
    let mut out = BTreeSet::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            out.insert(name);
        }
    }
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn skill(name: &str) -> String {
        format!(
            "---\nname: {name}\ndescription: A skill used in tests\nversion: 1.0.0\n\
             phase: implementation\ncategory: backend\npresets: [core]\n---\n# {name}\n"
        )
    }

    fn enums() -> EnumTable {
        EnumTable::from_yaml_str("phases: [implementation]\ncategories: [backend]\npresets: [core]\n")
            .unwrap()
    }

    #[test]
    fn discovers_public_and_private_skills_only() {
        let temp = TempDir::new().unwrap();
        let skills = temp.path().join("skills");
        write(&skills, "beta/SKILL.md", "b");
        write(&skills, "alpha/SKILL.md", "a");
        write(&skills, "private/secret/SKILL.md", "s");
        write(&skills, "alpha/examples/SKILL.md", "nested");
        write(&skills, ".hidden/SKILL.md", "h");
        write(&skills, "private/SKILL.md", "not a skill");

        let found: Vec<String> = discover_skill_documents(&skills, "private")
            .unwrap()
            .iter()
            .map(|p| relative_string(&skills, p))
            .collect();
        assert_eq!(
            found,
            vec!["alpha/SKILL.md", "beta/SKILL.md", "private/secret/SKILL.md"]
        );
    }

    #[test]
    fn missing_skills_dir_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = discover_skill_documents(&temp.path().join("skills"), "private").unwrap_err();
        assert!(matches!(err, FactoryError::NotFound(_)));
    }

    #[test]
    fn read_records_relative_sources() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "skills/a/SKILL.md", "x");
        let outcome = read_skill_documents(temp.path(), "skills", "private").unwrap();
        assert_eq!(outcome.data[0].source, "skills/a/SKILL.md");
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn extract_all_sorts_by_name() {
        let docs = vec![
            SkillDocument::new("skills/zeta/SKILL.md", skill("zeta")),
            SkillDocument::new("skills/alpha/SKILL.md", skill("alpha")),
        ];
        let outcome = extract_all(&docs, &enums());
        let names: Vec<&str> = outcome.data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(outcome.error_count(), 0);
    }

    #[test]
    fn duplicate_names_keep_first_by_path() {
        let docs = vec![
            SkillDocument::new("skills/b/SKILL.md", skill("same")),
            SkillDocument::new("skills/a/SKILL.md", skill("same")),
        ];
        let outcome = extract_all(&docs, &enums());
        assert_eq!(outcome.data.len(), 1);
        assert_eq!(outcome.data[0].source, "skills/a/SKILL.md");
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.diagnostics[0].path.as_deref(), Some("skills/b/SKILL.md"));
    }

    #[test]
    fn failed_documents_keep_their_diagnostics() {
        let docs = vec![
            SkillDocument::new("skills/ok/SKILL.md", skill("ok")),
            SkillDocument::new("skills/bad/SKILL.md", "# no header\n"),
        ];
        let outcome = extract_all(&docs, &enums());
        assert_eq!(outcome.data.len(), 1);
        assert_eq!(outcome.diagnostics[0].code, ErrorCode::HeaderMissing);
    }

    #[test]
    fn list_subdirs_skips_files_and_dot_dirs() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("plans")).unwrap();
        std::fs::create_dir_all(temp.path().join(".git")).unwrap();
        std::fs::write(temp.path().join("README.md"), "x").unwrap();
        let dirs = list_subdirs(temp.path()).unwrap().unwrap();
        assert_eq!(dirs, BTreeSet::from(["plans".to_string()]));
        assert!(list_subdirs(&temp.path().join("absent")).unwrap().is_none());
    }
}
