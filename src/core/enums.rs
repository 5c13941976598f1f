//! Enum tables consulted during extraction.
//!
//! Tables are read-only input. Each key may hold either a list of values or
//! a mapping whose keys are the values (descriptions live in the mapping
//! values and are ignored here). Several files may be merged.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::core::diagnostics::{Diagnostic, Outcome};
use crate::error::{ErrorCode, FactoryError, Result};

/// Valid values for enum-constrained header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnumTable {
    pub phases: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub presets: BTreeSet<String>,
    pub scopes: BTreeSet<String>,
    pub mcp_servers: BTreeSet<String>,
    pub triggers: BTreeSet<String>,
    pub protocols: BTreeSet<String>,
    pub checks: BTreeSet<String>,
}

impl EnumTable {
    /// Parse one enum file.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(raw)?;
        Ok(Self {
            phases: enum_keys(&root, "phases"),
            categories: enum_keys(&root, "categories"),
            presets: enum_keys(&root, "presets"),
            scopes: enum_keys(&root, "scopes"),
            mcp_servers: enum_keys(&root, "mcp_servers"),
            triggers: enum_keys(&root, "triggers"),
            protocols: enum_keys(&root, "protocols"),
            checks: enum_keys(&root, "checks"),
        })
    }

    /// Load and merge every file that exists. Missing files are skipped;
    /// when none exists at all the run gets a warning, since every phase
    /// and category will then be rejected.
    pub fn load(paths: &[PathBuf]) -> Result<Outcome<Self>> {
        let mut table = Self::default();
        let mut found = 0;
        for path in paths {
            if !path.exists() {
                debug!(path = %path.display(), "enum file not found, skipping");
                continue;
            }
            let raw = read(path)?;
            let parsed = Self::from_yaml_str(&raw).map_err(|err| {
                FactoryError::Config(format!("parse enum file {}: {err}", path.display()))
            })?;
            table.merge(parsed);
            found += 1;
        }

        let mut diagnostics = Vec::new();
        if found == 0 {
            let listed: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            warn!(paths = ?listed, "no enum file found");
            let mut diag = Diagnostic::warning(
                ErrorCode::ConfigNotFound,
                "enums",
                "no enum file found; phase and category values cannot be validated",
            )
            .with_context(json!({ "paths": listed }));
            if let Some(first) = listed.first() {
                diag = diag.with_path(first.clone());
            }
            diagnostics.push(diag);
        }
        Ok(Outcome::new(table, diagnostics))
    }

    pub fn merge(&mut self, other: Self) {
        self.phases.extend(other.phases);
        self.categories.extend(other.categories);
        self.presets.extend(other.presets);
        self.scopes.extend(other.scopes);
        self.mcp_servers.extend(other.mcp_servers);
        self.triggers.extend(other.triggers);
        self.protocols.extend(other.protocols);
        self.checks.extend(other.checks);
    }

    /// Registered preset names are always valid preset values.
    #[must_use]
    pub fn with_presets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.presets.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Read the `categories` key of a document enum file.
pub fn load_doc_categories(path: &Path) -> Result<BTreeSet<String>> {
    if !path.exists() {
        debug!(path = %path.display(), "document enum file not found");
        return Ok(BTreeSet::new());
    }
    let raw = read(path)?;
    let root: Value = serde_yaml::from_str(&raw)
        .map_err(|err| FactoryError::Config(format!("parse enum file {}: {err}", path.display())))?;
    Ok(enum_keys(&root, "categories"))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|err| FactoryError::Config(format!("read enum file {}: {err}", path.display())))
}

fn enum_keys(root: &Value, key: &str) -> BTreeSet<String> {
    match root.get(key) {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar).collect(),
        Some(Value::Mapping(map)) => map.keys().filter_map(scalar).collect(),
        _ => BTreeSet::new(),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn accepts_list_and_mapping_forms() {
        let table = EnumTable::from_yaml_str(
            r"
phases: [discovery, implementation]
categories:
  backend: Server-side work
  utility: Helpers
",
        )
        .unwrap();
        assert!(table.phases.contains("discovery"));
        assert!(table.categories.contains("backend"));
        assert!(table.categories.contains("utility"));
        assert!(table.presets.is_empty());
    }

    #[test]
    fn load_merges_files_and_skips_missing() {
        let temp = TempDir::new().unwrap();
        let factory = temp.path().join("factory.yaml");
        let runtime = temp.path().join("runtime.yaml");
        std::fs::write(&factory, "phases: [design]\npresets: [core]\n").unwrap();
        std::fs::write(&runtime, "triggers: [on-start]\nmcp_servers: {context7: docs}\n").unwrap();

        let loaded = EnumTable::load(&[factory, runtime, temp.path().join("absent.yaml")]).unwrap();
        assert!(loaded.diagnostics.is_empty());
        let table = loaded.data;
        assert!(table.phases.contains("design"));
        assert!(table.presets.contains("core"));
        assert!(table.triggers.contains("on-start"));
        assert!(table.mcp_servers.contains("context7"));
    }

    #[test]
    fn no_enum_file_at_all_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let loaded = EnumTable::load(&[temp.path().join("factory.yaml")]).unwrap();
        assert_eq!(loaded.data, EnumTable::default());
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].code, ErrorCode::ConfigNotFound);
        assert!(!loaded.diagnostics[0].is_error());
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        std::fs::write(&path, "phases: [unterminated").unwrap();
        let err = EnumTable::load(&[path]).unwrap_err();
        assert!(matches!(err, FactoryError::Config(_)));
    }

    #[test]
    fn with_presets_extends_registered_names() {
        let table = EnumTable::default().with_presets(["core", "backend"]);
        assert_eq!(table.presets.len(), 2);
    }

    #[test]
    fn doc_categories_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let cats = load_doc_categories(&temp.path().join("enums.yaml")).unwrap();
        assert!(cats.is_empty());
    }
}
