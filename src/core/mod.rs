//! Skill documents, descriptors, preset hierarchy and include expansion

pub mod collect;
pub mod descriptor;
pub mod diagnostics;
pub mod enums;
pub mod extract;
pub mod frontmatter;
pub mod includes;
pub mod presets;

pub use collect::SkillDocument;
pub use descriptor::{DocListKind, DocRef, Lifecycle, Relation, RelationKind, SkillDescriptor};
pub use diagnostics::{Diagnostic, Outcome, RunStatus, Severity};
pub use enums::EnumTable;
pub use includes::{DirSource, Expander, Expansion, IncludeSource, MemorySource};
pub use presets::{Membership, PresetGraph, PresetNode};
