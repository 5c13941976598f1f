//! Include directive expansion.
//!
//! Two directive syntaxes are recognised:
//! - `{{include: partials/foo.md}}`
//! - `<!-- INCLUDE: _meta/_skills/sections/foo.md -->` (legacy, remapped to
//!   `partials/foo.md` before lookup)
//!
//! Targets are read through an [`IncludeSource`], so expansion itself never
//! touches the filesystem and is a pure function of the source contents.
//! A missing target is replaced by an inline marker and reported as a
//! warning. Revisiting a file that is already on the current include chain
//! is an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::json;
use tracing::{trace, warn};

use crate::core::diagnostics::Diagnostic;
use crate::error::{ErrorCode, FactoryError, Result};

/// Directory fragment identifying a legacy include path.
pub const LEGACY_SECTIONS_DIR: &str = "_meta/_skills/sections/";

/// Directory legacy includes are remapped into.
pub const PARTIALS_DIR: &str = "partials";

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{include:\s*([^}]+)\}\}|<!--\s*INCLUDE:\s*([^>]+?)\s*-->")
        .expect("include directive pattern is valid")
});

/// Read access to include targets, keyed by path relative to the source
/// root.
pub trait IncludeSource: Send + Sync {
    /// Content of `path`, or `None` when it does not exist.
    fn read(&self, path: &str) -> Option<String>;
}

/// Reads include targets from a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl IncludeSource for DirSource {
    fn read(&self, path: &str) -> Option<String> {
        let full = self.root.join(path);
        if !full.is_file() {
            return None;
        }
        std::fs::read_to_string(full).ok()
    }
}

/// In-memory include targets.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl IncludeSource for MemorySource {
    fn read(&self, path: &str) -> Option<String> {
        self.files.get(path).cloned()
    }
}

/// Which directive spelling was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveSyntax {
    Modern,
    Legacy,
}

/// One directive occurrence met during expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeNode {
    /// File containing the directive
    pub origin: String,
    pub syntax: DirectiveSyntax,
    /// Path as written in the directive
    pub written: String,
    /// Path actually looked up
    pub target: String,
    pub found: bool,
    /// Nesting depth, 1 for directives in the root document
    pub depth: usize,
}

/// Flattened content plus what happened along the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Expansion {
    pub content: String,
    pub includes: Vec<IncludeNode>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Rewrite a legacy sections path to its partials location.
///
/// `_meta/_skills/sections/foo.md` -> `partials/foo.md`. Other paths pass
/// through unchanged.
#[must_use]
pub fn remap_legacy_path(path: &str) -> String {
    if !path.contains(LEGACY_SECTIONS_DIR) {
        return path.to_string();
    }
    let filename = path.rsplit('/').next().unwrap_or(path);
    format!("{PARTIALS_DIR}/{filename}")
}

/// Inline marker left where a missing include used to be.
#[must_use]
pub fn missing_marker(path: &str) -> String {
    format!("<!-- ERROR: Include not found: {path} -->")
}

fn normalize(path: &str) -> String {
    path.trim().trim_start_matches("./").to_string()
}

/// Recursive include expander over an [`IncludeSource`].
pub struct Expander<'a, S: IncludeSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: IncludeSource + ?Sized> Expander<'a, S> {
    pub const fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Expand the document at `root_path`.
    ///
    /// # Errors
    ///
    /// [`FactoryError::NotFound`] when the root itself does not exist, and
    /// [`FactoryError::IncludeCycle`] when a directive revisits a file on
    /// the current chain.
    pub fn expand(&self, root_path: &str) -> Result<Expansion> {
        let root = normalize(root_path);
        let content = self
            .source
            .read(&root)
            .ok_or_else(|| FactoryError::NotFound(format!("include root {root}")))?;
        self.expand_str(&root, &content)
    }

    /// Expand `content` as if it were the file at `origin`.
    pub fn expand_str(&self, origin: &str, content: &str) -> Result<Expansion> {
        let mut expansion = Expansion::default();
        let mut chain = vec![normalize(origin)];
        expansion.content = self.expand_inner(
            content,
            &mut chain,
            &mut expansion.includes,
            &mut expansion.diagnostics,
        )?;
        Ok(expansion)
    }

    fn expand_inner(
        &self,
        content: &str,
        chain: &mut Vec<String>,
        nodes: &mut Vec<IncludeNode>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<String> {
        let origin = chain.last().cloned().unwrap_or_default();
        let mut out = String::with_capacity(content.len());
        let mut last = 0;

        for caps in DIRECTIVE_RE.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&content[last..whole.start()]);
            last = whole.end();

            let (syntax, written) = match (caps.get(1), caps.get(2)) {
                (Some(modern), _) => (DirectiveSyntax::Modern, normalize(modern.as_str())),
                (None, Some(legacy)) => (DirectiveSyntax::Legacy, normalize(legacy.as_str())),
                (None, None) => continue,
            };
            let target = match syntax {
                DirectiveSyntax::Modern => written.clone(),
                DirectiveSyntax::Legacy => remap_legacy_path(&written),
            };

            if chain.contains(&target) {
                let mut cycle = chain.clone();
                cycle.push(target);
                return Err(FactoryError::IncludeCycle {
                    root: chain[0].clone(),
                    chain: cycle,
                });
            }

            let depth = chain.len();
            match self.source.read(&target) {
                Some(included) => {
                    trace!(origin = %origin, target = %target, "expanding include");
                    nodes.push(IncludeNode {
                        origin: origin.clone(),
                        syntax,
                        written,
                        target: target.clone(),
                        found: true,
                        depth,
                    });
                    chain.push(target);
                    let expanded = self.expand_inner(&included, chain, nodes, diagnostics)?;
                    chain.pop();
                    out.push_str(&expanded);
                }
                None => {
                    warn!(origin = %origin, target = %target, "include target not found");
                    out.push_str(&missing_marker(&written));
                    diagnostics.push(
                        Diagnostic::warning(
                            ErrorCode::IncludeNotFound,
                            &origin,
                            format!("include not found: {target}"),
                        )
                        .with_path(&origin)
                        .with_context(json!({ "target": target, "written": written })),
                    );
                    nodes.push(IncludeNode {
                        origin: origin.clone(),
                        syntax,
                        written,
                        target,
                        found: false,
                        depth,
                    });
                }
            }
        }

        out.push_str(&content[last..]);
        Ok(out)
    }
}
