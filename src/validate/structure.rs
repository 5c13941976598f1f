//! Document paths against the canonical category folders.
//!
//! A path names a category when it contains the configured marker
//! (`project/docs/active/` by default); the segment after the marker is the
//! category. Paths without the marker are not checked.

use std::collections::BTreeSet;

use regex::Regex;
use serde_json::json;

use crate::core::descriptor::SkillDescriptor;
use crate::core::diagnostics::Diagnostic;
use crate::derive::doc_types::DocTypeRegistry;
use crate::error::{ErrorCode, FactoryError, Result};

/// Inputs for the structure check.
#[derive(Debug, Clone, Copy)]
pub struct StructureInput<'a> {
    /// Folder names under the active root; `None` when it is missing
    pub canonical: Option<&'a BTreeSet<String>>,
    /// Categories from the document enum file
    pub doc_categories: &'a BTreeSet<String>,
    /// Shown in diagnostics
    pub active_root: &'a str,
}

/// Build the category matcher for `marker`.
pub fn category_pattern(marker: &str) -> Result<Regex> {
    Regex::new(&format!("{}([^/]+)", regex::escape(marker)))
        .map_err(|err| FactoryError::Config(format!("path marker {marker:?}: {err}")))
}

#[must_use]
pub fn check(
    skills: &[SkillDescriptor],
    doc_types: &DocTypeRegistry,
    input: &StructureInput<'_>,
    pattern: &Regex,
) -> Vec<Diagnostic> {
    let Some(canonical) = input.canonical else {
        return vec![
            Diagnostic::warning(
                ErrorCode::ConfigNotFound,
                input.active_root,
                "canonical category folder not found, structure checks skipped",
            )
            .with_path(input.active_root),
        ];
    };

    let listing = || canonical.iter().cloned().collect::<Vec<_>>();
    let mut used: BTreeSet<String> = doc_types.categories();
    let mut out = Vec::new();

    for skill in skills {
        for (kind, doc) in skill.path_refs() {
            let Some(path) = doc.path.as_deref() else {
                continue;
            };
            let Some(caps) = pattern.captures(path) else {
                continue;
            };
            let category = caps[1].to_string();
            if !canonical.contains(&category) {
                out.push(
                    Diagnostic::error(
                        ErrorCode::UnknownCategory,
                        &skill.name,
                        format!(
                            "{} path '{path}' names category '{category}' with no folder",
                            kind.field()
                        ),
                    )
                    .with_path(&skill.source)
                    .with_context(json!({
                        "path": path,
                        "category": category,
                        "known": listing(),
                    })),
                );
            }
            used.insert(category);
        }
    }

    for category in input.doc_categories {
        if !canonical.contains(category) {
            out.push(
                Diagnostic::error(
                    ErrorCode::UnknownCategory,
                    category,
                    format!("document category '{category}' has no folder"),
                )
                .with_context(json!({ "category": category, "known": listing() })),
            );
        }
        used.insert(category.clone());
    }

    for category in canonical {
        if !used.contains(category) {
            out.push(
                Diagnostic::warning(
                    ErrorCode::UnusedCategory,
                    category,
                    format!("category folder '{category}' is not referenced by any skill or doc type"),
                )
                .with_path(format!("{}/{category}", input.active_root)),
            );
        }
    }
    out
}
