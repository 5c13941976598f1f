//! Entry points.
//!
//! A run is strictly sequential: collect documents, extract descriptors,
//! resolve the preset hierarchy, derive views, validate, report. Every entry
//! point reads its inputs once from the configured layout and returns an
//! [`Outcome`]; only an inheritance cycle, an unreadable input file or bad
//! configuration is returned as an `Err`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::core::collect::{extract_all, list_subdirs, read_skill_documents, relative_string};
use crate::core::descriptor::SkillDescriptor;
use crate::core::diagnostics::{Diagnostic, Outcome, RunStatus};
use crate::core::enums::{EnumTable, load_doc_categories};
use crate::core::includes::{DirSource, Expander, Expansion};
use crate::core::presets::{Membership, PresetGraph};
use crate::derive::render::{PRESETS_FILE, RosterFile, render_all};
use crate::derive::{DerivedArtifacts, RosterBuilder, Selection, derive_artifacts, select};
use crate::error::{ErrorCode, FactoryError, Result};
use crate::validate::{self, GeneratedCheck, StructureInput, ValidationInput};

/// Absolute locations resolved from [`Config`] and a project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub skills_dir: PathBuf,
    pub hierarchy_file: PathBuf,
    pub enum_files: Vec<PathBuf>,
    pub doc_enum_file: PathBuf,
    pub roster_file: PathBuf,
    pub active_root: PathBuf,
    pub generated_dir: PathBuf,
    /// `dist_dir/output_dir`
    pub output_dir: PathBuf,
}

impl Layout {
    #[must_use]
    pub fn new(config: &Config, root: &Path) -> Self {
        let paths = &config.paths;
        let source_dir = root.join(&paths.source_dir);
        Self {
            root: root.to_path_buf(),
            skills_dir: source_dir.join(&paths.skills_dir),
            hierarchy_file: source_dir.join(&paths.hierarchy_file),
            enum_files: paths.enum_files.iter().map(|f| source_dir.join(f)).collect(),
            doc_enum_file: source_dir.join(&paths.doc_enum_file),
            roster_file: source_dir.join(&paths.roster_file),
            active_root: source_dir.join(&paths.active_root),
            generated_dir: source_dir.join(&config.pipeline.generated_dir),
            output_dir: root.join(&paths.dist_dir).join(&config.build.output_dir),
            source_dir,
        }
    }
}

/// Descriptors and resolved membership for one run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Sorted by name
    pub skills: Vec<SkillDescriptor>,
    pub membership: Membership,
    /// Collect and extract diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of `resolve-membership` for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipReport {
    pub group: String,
    pub defined: bool,
    pub description: String,
    pub includes_all: bool,
    /// The group plus everything it inherits from
    pub closure: Vec<String>,
    /// Groups whose closure contains this group
    pub ancestors_of: Vec<String>,
    pub upward_members: Vec<String>,
    pub team_members: Vec<String>,
    pub roster: Vec<String>,
}

/// One expanded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedFile {
    pub source: String,
    pub output: String,
    pub includes: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpandReport {
    pub output_dir: String,
    pub files: Vec<ExpandedFile>,
    /// Documents not written because of an include cycle
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub skills: usize,
    pub groups: usize,
    pub doc_types: usize,
    pub handoffs: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub validation: ValidationReport,
    pub selection: Option<Selection>,
    /// Artifact paths written, relative to the project root
    pub artifacts: Vec<String>,
    pub expanded: ExpandReport,
    /// False when validation failed and nothing was written
    pub written: bool,
}

/// Runs entry points against one project.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    layout: Layout,
}

impl Engine {
    #[must_use]
    pub fn new(config: Config, root: &Path) -> Self {
        let layout = Layout::new(&config, root);
        Self { config, layout }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    fn display(&self, path: &Path) -> String {
        relative_string(&self.layout.root, path)
    }

    pub fn load_graph(&self) -> Result<PresetGraph> {
        PresetGraph::load(&self.layout.hierarchy_file)
    }

    pub fn load_enums(&self, graph: &PresetGraph) -> Result<Outcome<EnumTable>> {
        let loaded = EnumTable::load(&self.layout.enum_files)?;
        let diagnostics = loaded
            .diagnostics
            .into_iter()
            .map(|d| {
                let shown = d.path.as_deref().map(|p| self.display(Path::new(p)));
                match shown {
                    Some(shown) => d.with_path(shown),
                    None => d,
                }
            })
            .collect();
        Ok(Outcome::new(loaded.data.with_presets(graph.names()), diagnostics))
    }

    /// Collect, extract and resolve.
    ///
    /// # Errors
    ///
    /// [`FactoryError::InheritanceCycle`] aborts before anything is derived.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let graph = self.load_graph()?;
        let enums = self.load_enums(&graph)?;

        let collected = read_skill_documents(
            &self.layout.source_dir,
            &self.config.paths.skills_dir,
            &self.config.paths.private_dir,
        )?;
        let mut diagnostics = enums.diagnostics;
        diagnostics.extend(collected.diagnostics);
        let enums = enums.data;
        let extracted = extract_all(&collected.data, &enums);
        diagnostics.extend(extracted.diagnostics);

        let membership = graph.resolve_all()?;
        info!(
            skills = extracted.data.len(),
            presets = graph.len(),
            "snapshot ready"
        );
        Ok(Snapshot {
            skills: extracted.data,
            membership,
            diagnostics,
        })
    }

    /// Closure, ancestors and both membership directions for `group`.
    pub fn resolve_membership(&self, group: &str) -> Result<Outcome<MembershipReport>> {
        let snapshot = self.snapshot()?;
        let membership = &snapshot.membership;
        let builder = RosterBuilder::new(&snapshot.skills, membership);
        let node = membership.graph().get(group);

        let mut diagnostics = snapshot.diagnostics.clone();
        if node.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    ErrorCode::UnknownPreset,
                    group,
                    format!("group '{group}' is not registered"),
                )
                .with_path(self.display(&self.layout.hierarchy_file)),
            );
        }

        let report = MembershipReport {
            group: group.to_string(),
            defined: node.is_some(),
            description: node.map(|n| n.description.clone()).unwrap_or_default(),
            includes_all: membership.includes_all(group),
            closure: membership.closure(group).into_iter().collect(),
            ancestors_of: membership.ancestors_of(group).into_iter().collect(),
            upward_members: builder.upward_members(group).into_iter().collect(),
            team_members: builder.team_members(group).into_iter().collect(),
            roster: builder.roster(group).into_iter().collect(),
        };
        Ok(Outcome::new(report, diagnostics))
    }

    /// Derive every view from the current sources.
    pub fn derive(&self) -> Result<Outcome<DerivedArtifacts>> {
        let snapshot = self.snapshot()?;
        let derived = self.derive_from(&snapshot);
        Ok(Outcome::new(derived, snapshot.diagnostics))
    }

    fn derive_from(&self, snapshot: &Snapshot) -> DerivedArtifacts {
        derive_artifacts(
            &snapshot.skills,
            &snapshot.membership,
            &self.config.pipeline.phase_order,
        )
    }

    /// Render and write every generated artifact.
    pub fn write_artifacts(&self, derived: &DerivedArtifacts) -> Result<Vec<PathBuf>> {
        render_all(derived)?.write(&self.layout.generated_dir)
    }

    /// Run every cross check.
    pub fn validate(&self) -> Result<Outcome<ValidationReport>> {
        let snapshot = self.snapshot()?;
        let derived = self.derive_from(&snapshot);
        self.validate_with(&snapshot, &derived)
    }

    fn validate_with(
        &self,
        snapshot: &Snapshot,
        derived: &DerivedArtifacts,
    ) -> Result<Outcome<ValidationReport>> {
        let canonical = list_subdirs(&self.layout.active_root)?;
        if canonical.is_none() {
            warn!(path = %self.layout.active_root.display(), "canonical category folder missing");
        }
        let doc_categories = load_doc_categories(&self.layout.doc_enum_file)?;
        let roster_file = RosterFile::load(&self.layout.roster_file)?;
        let pattern = validate::structure::category_pattern(&self.config.validate.path_marker)?;

        let active_root = self.display(&self.layout.active_root);
        let roster_path = self.display(&self.layout.roster_file);
        let generated_display = self.display(&self.layout.generated_dir);

        let expected = if self.config.validate.check_generated {
            let mut files = render_all(derived)?;
            // The roster is compared structurally by the roster check.
            files.remove(PRESETS_FILE);
            Some(files)
        } else {
            None
        };

        let input = ValidationInput {
            skills: &snapshot.skills,
            membership: &snapshot.membership,
            derived,
            structure: StructureInput {
                canonical: canonical.as_ref(),
                doc_categories: &doc_categories,
                active_root: &active_root,
            },
            category_pattern: &pattern,
            roster_file: roster_file.as_ref(),
            roster_path: &roster_path,
            generated: expected.as_ref().map(|expected| GeneratedCheck {
                expected,
                dir: &self.layout.generated_dir,
                display_dir: &generated_display,
            }),
        };

        let mut diagnostics = snapshot.diagnostics.clone();
        diagnostics.extend(validate::run_all(&input));

        let mut outcome = Outcome::new(ValidationReport::default(), diagnostics);
        outcome.data = ValidationReport {
            skills: snapshot.skills.len(),
            groups: derived.rosters.len(),
            doc_types: derived.doc_types.len(),
            handoffs: derived.matrix.handoffs.len(),
            errors: outcome.error_count(),
            warnings: outcome.warning_count(),
        };
        Ok(outcome)
    }

    /// Stable-sorted selection of skills for `targets`.
    pub fn filtered_build(&self, targets: &[String]) -> Result<Outcome<Selection>> {
        let snapshot = self.snapshot()?;
        let selected = select(&snapshot.skills, &snapshot.membership, targets);
        let mut diagnostics = snapshot.diagnostics;
        diagnostics.extend(selected.diagnostics);
        Ok(Outcome::new(selected.data, diagnostics))
    }

    /// Expand a single document without writing anything.
    ///
    /// `path` is relative to the source directory.
    pub fn expand_document(&self, path: &str) -> Result<Expansion> {
        let source = DirSource::new(&self.layout.source_dir);
        Expander::new(&source).expand(path)
    }

    /// Expand every markdown file under the include roots into the output
    /// directory, replacing its previous contents. With `only`, files under
    /// the skills directory are limited to those directory prefixes.
    pub fn expand_includes(&self, only: Option<&BTreeSet<String>>) -> Result<Outcome<ExpandReport>> {
        let source = DirSource::new(&self.layout.source_dir);
        let expander = Expander::new(&source);
        let skills_prefix = format!("{}/", self.config.paths.skills_dir);

        let mut report = ExpandReport {
            output_dir: self.display(&self.layout.output_dir),
            ..ExpandReport::default()
        };
        let mut diagnostics = Vec::new();

        let files = self.markdown_files()?;
        if self.layout.output_dir.is_dir() {
            std::fs::remove_dir_all(&self.layout.output_dir)?;
            debug!(output = %report.output_dir, "cleared previous output");
        }

        for rel in files {
            if let Some(allowed) = only {
                if rel.starts_with(&skills_prefix)
                    && !allowed.iter().any(|dir| rel.starts_with(&format!("{dir}/")))
                {
                    continue;
                }
            }
            match expander.expand(&rel) {
                Ok(expansion) => {
                    let output = self.layout.output_dir.join(&rel);
                    if let Some(parent) = output.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&output, &expansion.content)?;
                    report.files.push(ExpandedFile {
                        source: rel,
                        output: self.display(&output),
                        includes: expansion.includes.iter().filter(|n| n.found).count(),
                        missing: expansion.includes.iter().filter(|n| !n.found).count(),
                    });
                    diagnostics.extend(expansion.diagnostics);
                }
                Err(FactoryError::IncludeCycle { root, chain }) => {
                    warn!(path = %rel, chain = ?chain, "include cycle, document skipped");
                    diagnostics.push(
                        Diagnostic::error(
                            ErrorCode::IncludeCycle,
                            &rel,
                            format!("include cycle: {}", chain.join(" -> ")),
                        )
                        .with_path(&root)
                        .with_context(json!({ "chain": chain })),
                    );
                    report.failed.push(rel);
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            files = report.files.len(),
            failed = report.failed.len(),
            output = %report.output_dir,
            "expanded includes"
        );
        Ok(Outcome::new(report, diagnostics))
    }

    /// Markdown files under the include roots, relative to the source dir,
    /// sorted and deduplicated.
    fn markdown_files(&self) -> Result<Vec<String>> {
        let skip = &self.config.build.skip_dirs;
        let mut out = Vec::new();
        for root in &self.config.build.include_roots {
            let dir = self.layout.source_dir.join(root);
            if !dir.is_dir() {
                debug!(root = %dir.display(), "include root missing, skipping");
                continue;
            }
            let walker = WalkDir::new(&dir)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    let name = e.file_name().to_string_lossy();
                    e.depth() == 0
                        || !(name.starts_with('.')
                            || (e.file_type().is_dir() && skip.iter().any(|s| *s == name)))
                });
            for entry in walker {
                let entry =
                    entry.map_err(|err| FactoryError::Config(format!("walk include root: {err}")))?;
                if entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "md")
                {
                    out.push(relative_string(&self.layout.source_dir, entry.path()));
                }
            }
        }
        out.sort();
        out.dedup();
        Ok(out)
    }

    /// Validate, then derive and write artifacts and expand the selected
    /// skills. Nothing is written when validation fails.
    pub fn build(&self, targets: &[String]) -> Result<Outcome<BuildReport>> {
        let snapshot = self.snapshot()?;
        let derived = self.derive_from(&snapshot);
        let validation = self.validate_with(&snapshot, &derived)?;
        let strict = self.config.validate.strict;
        let mut diagnostics = validation.diagnostics.clone();

        let mut report = BuildReport {
            validation: validation.data.clone(),
            ..BuildReport::default()
        };
        if validation.status(strict) == RunStatus::Failure {
            warn!(errors = report.validation.errors, "validation failed, nothing written");
            return Ok(Outcome::new(report, diagnostics));
        }

        let only = if targets.is_empty() {
            None
        } else {
            let selected = select(&snapshot.skills, &snapshot.membership, targets);
            diagnostics.extend(selected.diagnostics);
            let dirs: BTreeSet<String> = snapshot
                .skills
                .iter()
                .filter(|s| selected.data.contains(&s.name))
                .filter_map(|s| s.source.rsplit_once('/').map(|(dir, _)| dir.to_string()))
                .collect();
            report.selection = Some(selected.data);
            Some(dirs)
        };

        let written = self.write_artifacts(&derived)?;
        report.artifacts = written.iter().map(|p| self.display(p)).collect();

        let expanded = self.expand_includes(only.as_ref())?;
        diagnostics.extend(expanded.diagnostics);
        report.expanded = expanded.data;
        report.written = true;

        info!(
            artifacts = report.artifacts.len(),
            expanded = report.expanded.files.len(),
            "build complete"
        );
        Ok(Outcome::new(report, diagnostics))
    }
}
