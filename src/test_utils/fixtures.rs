use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::Config;
use crate::pipeline::Engine;

pub const HIERARCHY: &str = r"_meta:
  version: 1
core:
  description: Shared foundation
backend:
  description: Server-side team
  inherits: [core]
frontend:
  description: Client-side team
  inherits: core
everything:
  description: All skills
  includes_all: true
";

pub const SKILL_ENUMS: &str = r"phases: [discovery, definition, design, architecture, implementation, delivery, utility]
categories:
  backend: Server-side work
  frontend: Client-side work
  utility: Helpers
triggers: [on-start, on-complete]
mcp_servers: [context7]
";

pub const DOC_ENUMS: &str = "categories: [architecture, requirements]\n";

pub const SVC_A: &str = r"---
name: svc-a
description: Backend service implementation skill
version: 1.0.0
phase: implementation
category: backend
presets: [backend]
delegates_to:
  - qa-lead
creates:
  - doc_type: api-contract
    path: project/docs/active/architecture/
    lifecycle: living
required_sections: [Overview, Endpoints]
---
# svc-a

{{include: partials/header.md}}
";

pub const QA_LEAD: &str = r"---
name: qa-lead
description: Reviews delivered work before release
version: 0.3.1
phase: delivery
category: utility
presets: [core]
receives_from:
  - skill: svc-a
    docs: [api-contract]
requires:
  - api-contract
required_sections: [Overview]
---
# qa-lead
";

pub const UI_KIT: &str = r"---
name: ui-kit
description: Component library for client screens
version: 2.0.0
phase: design
category: frontend
presets: [frontend]
---
# ui-kit
";

/// Roster file matching the standard corpus.
pub const ROSTER: &str = r#"backend:
  description: Server-side team
  skills: [qa-lead, svc-a]
core:
  description: Shared foundation
  skills: [qa-lead, svc-a, ui-kit]
everything:
  description: All skills
  skills: "*"
frontend:
  description: Client-side team
  skills: [qa-lead, ui-kit]
"#;

/// A project root in a temp dir with the default layout.
///
/// All `write*` paths are relative to the source directory (`src/`).
pub struct CorpusFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl CorpusFixture {
    /// Empty project root.
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        println!("[FIXTURE] Created project root: {}", root.display());
        Self { temp_dir, root }
    }

    /// Enum tables and canonical folders only; callers add the hierarchy
    /// and skills.
    pub fn with_enums() -> Self {
        let fixture = Self::empty();
        fixture.write("_meta/schema/skills/enums/factory.yaml", SKILL_ENUMS);
        fixture.write("_meta/schema/documents/enums/enums.yaml", DOC_ENUMS);
        fixture.write_active_category("architecture");
        fixture.write_active_category("requirements");
        fixture
    }

    /// Three skills across `core`, `backend` and `frontend`, a consistent
    /// roster file, canonical folders and one shared partial. Validates
    /// clean.
    pub fn standard() -> Self {
        let fixture = Self::with_enums();
        fixture.write_hierarchy(HIERARCHY);
        fixture.write("partials/header.md", "Shared header.\n");
        fixture.write("skills/svc-a/SKILL.md", SVC_A);
        fixture.write("skills/qa-lead/SKILL.md", QA_LEAD);
        fixture.write("skills/ui-kit/SKILL.md", UI_KIT);
        fixture.write("_meta/presets.yaml", ROSTER);
        fixture.write(
            "rules/style.md",
            "# Style\n\n<!-- INCLUDE: _meta/_skills/sections/header.md -->\n",
        );
        fixture
    }

    #[must_use]
    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.root.join("src").join(relative)
    }

    #[must_use]
    pub fn dist_path(&self, relative: &str) -> PathBuf {
        self.root.join("dist").join(relative)
    }

    /// Create a file under the source directory.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let full_path = self.source_path(relative);
        write_file(&full_path, content);
        println!(
            "[FIXTURE] Created file: {} ({} bytes)",
            full_path.display(),
            content.len()
        );
        full_path
    }

    /// Create a file relative to the project root.
    pub fn write_root(&self, relative: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative);
        write_file(&full_path, content);
        full_path
    }

    pub fn remove(&self, relative: &str) {
        let path = self.source_path(relative);
        if path.is_dir() {
            std::fs::remove_dir_all(&path).expect("Failed to remove dir");
        } else {
            std::fs::remove_file(&path).expect("Failed to remove file");
        }
        println!("[FIXTURE] Removed: {}", path.display());
    }

    pub fn write_hierarchy(&self, yaml: &str) -> PathBuf {
        self.write("_meta/preset-hierarchy.yaml", yaml)
    }

    /// Write `skills/<name>/SKILL.md` with a valid identity block, the given
    /// presets and any extra header lines.
    pub fn write_skill(&self, name: &str, presets: &[&str], extra: &str) -> PathBuf {
        self.write(
            &format!("skills/{name}/SKILL.md"),
            &skill_document(name, presets, extra),
        )
    }

    /// Create a canonical category folder under the active root.
    pub fn write_active_category(&self, category: &str) -> PathBuf {
        self.write(
            &format!("templates/folder-structure/active/{category}/.gitkeep"),
            "",
        )
    }

    #[must_use]
    pub fn config(&self) -> Config {
        Config::default()
    }

    #[must_use]
    pub fn engine(&self) -> Engine {
        Engine::new(self.config(), &self.root)
    }

    #[must_use]
    pub fn engine_with(&self, adjust: impl FnOnce(&mut Config)) -> Engine {
        let mut config = self.config();
        adjust(&mut config);
        Engine::new(config, &self.root)
    }

    #[must_use]
    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("Failed to read file")
    }
}

impl Drop for CorpusFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up project root: {}", self.root.display());
    }
}

/// Minimal valid skill document.
#[must_use]
pub fn skill_document(name: &str, presets: &[&str], extra: &str) -> String {
    format!(
        "---\nname: {name}\ndescription: Fixture skill {name} for tests\nversion: 1.0.0\n\
         phase: implementation\ncategory: utility\npresets: [{}]\n{extra}---\n# {name}\n",
        presets.join(", ")
    )
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    std::fs::write(path, content).expect("Failed to write file");
}
