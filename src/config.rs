use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FactoryError, Result};

/// Project configuration file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "factory.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub validate: ValidateConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("FACTORY_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(FactoryError::MissingConfig(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let path = dirs::config_dir()
            .ok_or_else(|| FactoryError::MissingConfig("config directory not found".to_string()))?
            .join("factory/config.toml");
        Self::load_patch(&path)
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join(PROJECT_CONFIG_FILE))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| FactoryError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| FactoryError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.build {
            self.build.merge(patch);
        }
        if let Some(patch) = patch.validate {
            self.validate.merge(patch);
        }
        if let Some(patch) = patch.pipeline {
            self.pipeline.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("FACTORY_SOURCE_DIR") {
            self.paths.source_dir = value;
        }
        if let Some(value) = env_string("FACTORY_SKILLS_DIR") {
            self.paths.skills_dir = value;
        }
        if let Some(value) = env_string("FACTORY_HIERARCHY_FILE") {
            self.paths.hierarchy_file = value;
        }
        if let Some(values) = env_list("FACTORY_ENUM_FILES")? {
            self.paths.enum_files = merge_unique(values, &self.paths.enum_files);
        }
        if let Some(value) = env_string("FACTORY_ROSTER_FILE") {
            self.paths.roster_file = value;
        }
        if let Some(value) = env_string("FACTORY_ACTIVE_ROOT") {
            self.paths.active_root = value;
        }
        if let Some(value) = env_string("FACTORY_DIST_DIR") {
            self.paths.dist_dir = value;
        }

        if let Some(values) = env_list("FACTORY_INCLUDE_ROOTS")? {
            self.build.include_roots = values;
        }
        if let Some(value) = env_string("FACTORY_OUTPUT_DIR") {
            self.build.output_dir = value;
        }
        if let Some(values) = env_list("FACTORY_SKIP_DIRS")? {
            self.build.skip_dirs = merge_unique(values, &self.build.skip_dirs);
        }

        if let Some(value) = env_bool("FACTORY_STRICT") {
            self.validate.strict = value;
        }
        if let Some(value) = env_bool("FACTORY_CHECK_GENERATED") {
            self.validate.check_generated = value;
        }
        if let Some(value) = env_string("FACTORY_PATH_MARKER") {
            self.validate.path_marker = value;
        }

        if let Some(values) = env_list("FACTORY_PHASE_ORDER")? {
            self.pipeline.phase_order = values;
        }
        if let Some(value) = env_string("FACTORY_GENERATED_DIR") {
            self.pipeline.generated_dir = value;
        }

        Ok(())
    }
}

/// Source layout. Everything except `source_dir` and `dist_dir` is relative
/// to `source_dir`; those two are relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub source_dir: String,
    #[serde(default)]
    pub skills_dir: String,
    /// Directory under `skills_dir` holding private skills
    #[serde(default)]
    pub private_dir: String,
    #[serde(default)]
    pub meta_dir: String,
    #[serde(default)]
    pub hierarchy_file: String,
    #[serde(default)]
    pub enum_files: Vec<String>,
    #[serde(default)]
    pub doc_enum_file: String,
    #[serde(default)]
    pub roster_file: String,
    #[serde(default)]
    pub active_root: String,
    #[serde(default)]
    pub dist_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            skills_dir: "skills".to_string(),
            private_dir: "private".to_string(),
            meta_dir: "_meta".to_string(),
            hierarchy_file: "_meta/preset-hierarchy.yaml".to_string(),
            enum_files: vec![
                "_meta/schema/skills/enums/factory.yaml".to_string(),
                "_meta/schema/skills/enums/runtime.yaml".to_string(),
            ],
            doc_enum_file: "_meta/schema/documents/enums/enums.yaml".to_string(),
            roster_file: "_meta/presets.yaml".to_string(),
            active_root: "templates/folder-structure/active".to_string(),
            dist_dir: "dist".to_string(),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.source_dir {
            self.source_dir = value;
        }
        if let Some(value) = patch.skills_dir {
            self.skills_dir = value;
        }
        if let Some(value) = patch.private_dir {
            self.private_dir = value;
        }
        if let Some(value) = patch.meta_dir {
            self.meta_dir = value;
        }
        if let Some(value) = patch.hierarchy_file {
            self.hierarchy_file = value;
        }
        if let Some(values) = patch.enum_files {
            self.enum_files = merge_unique(values, &self.enum_files);
        }
        if let Some(value) = patch.doc_enum_file {
            self.doc_enum_file = value;
        }
        if let Some(value) = patch.roster_file {
            self.roster_file = value;
        }
        if let Some(value) = patch.active_root {
            self.active_root = value;
        }
        if let Some(value) = patch.dist_dir {
            self.dist_dir = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Source subtrees whose markdown files are expanded into dist
    #[serde(default)]
    pub include_roots: Vec<String>,
    /// Output directory under `dist_dir`
    #[serde(default)]
    pub output_dir: String,
    /// Directory names never descended into during expansion
    #[serde(default)]
    pub skip_dirs: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            include_roots: vec![
                "skills".to_string(),
                "rules".to_string(),
                "workflows".to_string(),
                "templates/documents".to_string(),
            ],
            output_dir: ".agent".to_string(),
            skip_dirs: vec!["examples".to_string()],
        }
    }
}

impl BuildConfig {
    fn merge(&mut self, patch: BuildPatch) {
        if let Some(values) = patch.include_roots {
            self.include_roots = values;
        }
        if let Some(value) = patch.output_dir {
            self.output_dir = value;
        }
        if let Some(values) = patch.skip_dirs {
            self.skip_dirs = merge_unique(values, &self.skip_dirs);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateConfig {
    /// Warnings fail the run
    #[serde(default)]
    pub strict: bool,
    /// Compare generated artifacts on disk against a fresh rendering
    #[serde(default)]
    pub check_generated: bool,
    /// Path fragment preceding the category folder in document paths
    #[serde(default)]
    pub path_marker: String,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            strict: false,
            check_generated: false,
            path_marker: "project/docs/active/".to_string(),
        }
    }
}

impl ValidateConfig {
    fn merge(&mut self, patch: ValidatePatch) {
        if let Some(value) = patch.strict {
            self.strict = value;
        }
        if let Some(value) = patch.check_generated {
            self.check_generated = value;
        }
        if let Some(value) = patch.path_marker {
            self.path_marker = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Phase order used in pipeline views
    #[serde(default)]
    pub phase_order: Vec<String>,
    /// Where derived artifacts are written, relative to the source dir
    #[serde(default)]
    pub generated_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            phase_order: [
                "discovery",
                "definition",
                "design",
                "architecture",
                "implementation",
                "delivery",
                "utility",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            generated_dir: "_meta/generated".to_string(),
        }
    }
}

impl PipelineConfig {
    fn merge(&mut self, patch: PipelinePatch) {
        if let Some(values) = patch.phase_order {
            self.phase_order = values;
        }
        if let Some(value) = patch.generated_dir {
            self.generated_dir = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub paths: Option<PathsPatch>,
    pub build: Option<BuildPatch>,
    pub validate: Option<ValidatePatch>,
    pub pipeline: Option<PipelinePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsPatch {
    pub source_dir: Option<String>,
    pub skills_dir: Option<String>,
    pub private_dir: Option<String>,
    pub meta_dir: Option<String>,
    pub hierarchy_file: Option<String>,
    pub enum_files: Option<Vec<String>>,
    pub doc_enum_file: Option<String>,
    pub roster_file: Option<String>,
    pub active_root: Option<String>,
    pub dist_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BuildPatch {
    pub include_roots: Option<Vec<String>>,
    pub output_dir: Option<String>,
    pub skip_dirs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ValidatePatch {
    pub strict: Option<bool>,
    pub check_generated: Option<bool>,
    pub path_marker: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PipelinePatch {
    pub phase_order: Option<Vec<String>>,
    pub generated_dir: Option<String>,
}

fn merge_unique(values: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values.into_iter().chain(existing.iter().cloned()) {
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_list(key: &str) -> Result<Option<Vec<String>>> {
    match std::env::var(key) {
        Ok(value) => {
            let list = value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();
            if list.is_empty() {
                return Err(FactoryError::Config(format!("{key} is set but empty")));
            }
            Ok(Some(list))
        }
        Err(_) => Ok(None),
    }
}
