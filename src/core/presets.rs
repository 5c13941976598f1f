//! Preset graph resolution.
//!
//! Presets form a directed graph through their `inherits` lists. The graph
//! is kept as an arena of [`PresetNode`] values keyed by name, and every
//! traversal carries an explicit path so a cycle is reported with the exact
//! chain that closes it instead of recursing forever.
//!
//! Two membership questions are answered here:
//! - [`PresetGraph::resolve`]: a preset plus everything it inherits from
//! - [`PresetGraph::ancestors_of`]: every preset whose closure contains a
//!   given preset (itself included), found by a full scan

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, trace};

use crate::error::{FactoryError, Result};

static GROUP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("group name pattern is valid")
});

/// Group names end up in generated file names, so they are limited to
/// ASCII letters, digits, `_` and `-`.
#[must_use]
pub fn is_valid_group_name(name: &str) -> bool {
    GROUP_NAME_RE.is_match(name)
}

/// One named group of skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetNode {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Parent presets, in declaration order
    #[serde(default)]
    pub inherits: Vec<String>,
    /// Matches every skill regardless of its declared presets
    #[serde(default)]
    pub includes_all: bool,
}

impl PresetNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            inherits: Vec::new(),
            includes_all: false,
        }
    }

    #[must_use]
    pub fn inheriting<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inherits = parents.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn matching_all(mut self) -> Self {
        self.includes_all = true;
        self
    }
}

/// Arena of presets indexed by name.
#[derive(Debug, Clone, Default)]
pub struct PresetGraph {
    nodes: BTreeMap<String, PresetNode>,
}

impl PresetGraph {
    pub fn new(nodes: impl IntoIterator<Item = PresetNode>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.name.clone(), n)).collect(),
        }
    }

    /// Parse a hierarchy document: a mapping of preset name to
    /// `{description, inherits, includes_all}`. Keys starting with `_` are
    /// metadata and skipped. `inherits` may be a single name or a list.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(raw)?;
        let Value::Mapping(map) = root else {
            if root.is_null() {
                return Ok(Self::default());
            }
            return Err(FactoryError::Config(
                "preset hierarchy must be a mapping of preset names".to_string(),
            ));
        };

        let mut nodes = Vec::with_capacity(map.len());
        for (key, config) in &map {
            let Some(name) = key.as_str() else {
                continue;
            };
            if name.starts_with('_') {
                continue;
            }
            if !is_valid_group_name(name) {
                return Err(FactoryError::Config(format!(
                    "invalid preset name '{name}': use letters, digits, '-' and '_'"
                )));
            }
            let mut node = PresetNode::new(name);
            if let Value::Mapping(config) = config {
                node.description = config
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                node.inherits = match config.get("inherits") {
                    Some(Value::String(parent)) => vec![parent.clone()],
                    Some(Value::Sequence(parents)) => parents
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    _ => Vec::new(),
                };
                node.includes_all = config
                    .get("includes_all")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
            }
            nodes.push(node);
        }
        Ok(Self::new(nodes))
    }

    /// Load the hierarchy file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FactoryError::NotFound(format!(
                "preset hierarchy {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        let graph = Self::from_yaml_str(&raw).map_err(|err| {
            FactoryError::Config(format!("parse preset hierarchy {}: {err}", path.display()))
        })?;
        debug!(presets = graph.len(), path = %path.display(), "loaded preset hierarchy");
        Ok(graph)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PresetNode> {
        self.nodes.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Preset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Nodes in name order.
    pub fn nodes(&self) -> impl Iterator<Item = &PresetNode> {
        self.nodes.values()
    }

    /// `(child, parent)` pairs whose parent is not defined.
    #[must_use]
    pub fn dangling_parents(&self) -> Vec<(String, String)> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.inherits
                    .iter()
                    .filter(move |parent| !self.nodes.contains_key(*parent))
                    .map(move |parent| (node.name.clone(), parent.clone()))
            })
            .collect()
    }

    /// `name` plus every preset it transitively inherits from.
    ///
    /// Undefined names resolve to themselves; dangling parents are reported
    /// by validation, not here.
    ///
    /// # Errors
    ///
    /// [`FactoryError::InheritanceCycle`] when a preset is reached again
    /// while it is still on the traversal path.
    pub fn resolve(&self, name: &str) -> Result<BTreeSet<String>> {
        let mut result = BTreeSet::new();
        let mut path = Vec::new();
        self.visit(name, name, &mut path, &mut result)?;
        trace!(preset = name, closure = ?result, "resolved preset");
        Ok(result)
    }

    fn visit(
        &self,
        root: &str,
        name: &str,
        path: &mut Vec<String>,
        result: &mut BTreeSet<String>,
    ) -> Result<()> {
        if let Some(start) = path.iter().position(|p| p == name) {
            let mut cycle = path[start..].to_vec();
            cycle.push(name.to_string());
            return Err(FactoryError::InheritanceCycle {
                preset: root.to_string(),
                cycle,
            });
        }
        // Off-path and already collected: that subtree was fully walked.
        if !result.insert(name.to_string()) {
            return Ok(());
        }

        path.push(name.to_string());
        if let Some(node) = self.nodes.get(name) {
            for parent in &node.inherits {
                self.visit(root, parent, path, result)?;
            }
        }
        path.pop();
        Ok(())
    }

    /// Every preset whose closure contains `name`, itself included when
    /// defined. One full scan over the graph.
    pub fn ancestors_of(&self, name: &str) -> Result<BTreeSet<String>> {
        let mut out = BTreeSet::new();
        for candidate in self.nodes.keys() {
            if self.resolve(candidate)?.contains(name) {
                out.insert(candidate.clone());
            }
        }
        Ok(out)
    }

    /// Resolve every preset once, in name order. The first cycle found
    /// aborts.
    pub fn resolve_all(&self) -> Result<Membership> {
        let mut closures = BTreeMap::new();
        for name in self.nodes.keys() {
            closures.insert(name.clone(), self.resolve(name)?);
        }
        debug!(presets = closures.len(), "resolved preset closures");
        Ok(Membership {
            graph: self.clone(),
            closures,
        })
    }
}

/// Closures for every preset, computed once per run.
#[derive(Debug, Clone)]
pub struct Membership {
    graph: PresetGraph,
    closures: BTreeMap<String, BTreeSet<String>>,
}

impl Membership {
    #[must_use]
    pub const fn graph(&self) -> &PresetGraph {
        &self.graph
    }

    /// Closure of `name`; undefined names resolve to themselves.
    #[must_use]
    pub fn closure(&self, name: &str) -> BTreeSet<String> {
        self.closures
            .get(name)
            .cloned()
            .unwrap_or_else(|| BTreeSet::from([name.to_string()]))
    }

    /// Union of the closures of every declared preset.
    #[must_use]
    pub fn resolve_declared(&self, presets: &[String]) -> BTreeSet<String> {
        presets.iter().flat_map(|p| self.closure(p)).collect()
    }

    /// Presets whose closure contains `name`.
    #[must_use]
    pub fn ancestors_of(&self, name: &str) -> BTreeSet<String> {
        self.closures
            .iter()
            .filter(|(_, closure)| closure.contains(name))
            .map(|(preset, _)| preset.clone())
            .collect()
    }

    #[must_use]
    pub fn includes_all(&self, name: &str) -> bool {
        self.graph.get(name).is_some_and(|n| n.includes_all)
    }

    /// Whether any of the declared presets is registered (ignoring
    /// includes-all groups, which every skill matches anyway).
    #[must_use]
    pub fn covers(&self, presets: &[String]) -> bool {
        self.resolve_declared(presets)
            .iter()
            .any(|p| self.graph.contains(p))
    }
}
