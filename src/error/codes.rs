//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Document errors (header parse, schema)
//! - 2xx: Preset graph errors
//! - 3xx: Config errors
//! - 4xx: Reference errors (includes, unknown skills/groups/doc types/categories)
//! - 5xx: Coverage errors
//! - 6xx: Compatibility errors
//! - 7xx: Sync errors
//! - 8xx: Validation run errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output and diagnostics.
///
/// Each variant maps to a numeric code (e.g., `HeaderMissing` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Document errors (1xx)
    // ========================================
    /// E101: Document has no leading header block
    HeaderMissing,
    /// E102: Header block is not a valid structured document
    HeaderMalformed,
    /// E103: Required identity field is missing
    FieldMissing,
    /// E104: Field value has the wrong shape or fails its pattern
    FieldInvalid,
    /// E105: Field value is not a member of its enum
    EnumViolation,
    /// E106: Optional value is not recognised (warning)
    UnknownValue,

    // ========================================
    // Preset graph errors (2xx)
    // ========================================
    /// E201: The inherits relation contains a cycle
    InheritanceCycle,
    /// E202: A preset inherits from a preset that is not defined
    UnknownParent,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config or input file not found
    ConfigNotFound,
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E303: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Reference errors (4xx)
    // ========================================
    /// E401: Include directive target does not exist
    IncludeNotFound,
    /// E402: Include directive revisits a file on the current chain
    IncludeCycle,
    /// E403: Relationship names a skill that does not exist
    UnknownSkill,
    /// E404: Skill names a preset that is not registered
    UnknownPreset,
    /// E405: Document reference names a doc type nobody creates
    UnknownDocType,
    /// E406: Document path names a category missing from the folder layout
    UnknownCategory,
    /// E407: Canonical category is never referenced (warning)
    UnusedCategory,
    /// E408: Doc type has more than one creator (warning)
    DuplicateCreator,

    // ========================================
    // Coverage errors (5xx)
    // ========================================
    /// E501: Skill is not a member of any registered preset
    PresetCoverage,

    // ========================================
    // Compatibility errors (6xx)
    // ========================================
    /// E601: Handoff endpoints share no resolved preset
    HandoffIncompatible,

    // ========================================
    // Sync errors (7xx)
    // ========================================
    /// E701: Roster artifact disagrees with the computed roster
    RosterMismatch,
    /// E702: Generated artifact on disk differs from a fresh derivation
    StaleArtifact,
    /// E703: Generated artifact is missing (warning)
    MissingArtifact,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: The run finished with error diagnostics
    ValidationFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Unexpected internal error
    InternalError,
    /// E902: IO operation failed
    IoError,
    /// E903: Serialization/deserialization failed
    SerializationError,
    /// E904: Generic not found (catch-all)
    NotFound,
}

/// Diagnostic families, one per error class a run can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorKind {
    ParseError,
    SchemaError,
    GraphError,
    ReferenceError,
    CoverageError,
    CompatibilityError,
    SyncError,
    ConfigError,
    InternalError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ParseError => "ParseError",
            Self::SchemaError => "SchemaError",
            Self::GraphError => "GraphError",
            Self::ReferenceError => "ReferenceError",
            Self::CoverageError => "CoverageError",
            Self::CompatibilityError => "CompatibilityError",
            Self::SyncError => "SyncError",
            Self::ConfigError => "ConfigError",
            Self::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `HeaderMissing` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::HeaderMissing => 101,
            Self::HeaderMalformed => 102,
            Self::FieldMissing => 103,
            Self::FieldInvalid => 104,
            Self::EnumViolation => 105,
            Self::UnknownValue => 106,

            Self::InheritanceCycle => 201,
            Self::UnknownParent => 202,

            Self::ConfigNotFound => 301,
            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 303,

            Self::IncludeNotFound => 401,
            Self::IncludeCycle => 402,
            Self::UnknownSkill => 403,
            Self::UnknownPreset => 404,
            Self::UnknownDocType => 405,
            Self::UnknownCategory => 406,
            Self::UnusedCategory => 407,
            Self::DuplicateCreator => 408,

            Self::PresetCoverage => 501,

            Self::HandoffIncompatible => 601,

            Self::RosterMismatch => 701,
            Self::StaleArtifact => 702,
            Self::MissingArtifact => 703,

            Self::ValidationFailed => 801,

            Self::InternalError => 901,
            Self::IoError => 902,
            Self::SerializationError => 903,
            Self::NotFound => 904,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// The diagnostic family this code reports under.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::HeaderMissing | Self::HeaderMalformed => ErrorKind::ParseError,
            Self::FieldMissing | Self::FieldInvalid | Self::EnumViolation | Self::UnknownValue => {
                ErrorKind::SchemaError
            }
            Self::InheritanceCycle => ErrorKind::GraphError,
            Self::UnknownParent
            | Self::IncludeNotFound
            | Self::IncludeCycle
            | Self::UnknownSkill
            | Self::UnknownPreset
            | Self::UnknownDocType
            | Self::UnknownCategory
            | Self::UnusedCategory
            | Self::DuplicateCreator => ErrorKind::ReferenceError,
            Self::PresetCoverage => ErrorKind::CoverageError,
            Self::HandoffIncompatible => ErrorKind::CompatibilityError,
            Self::RosterMismatch | Self::StaleArtifact | Self::MissingArtifact => {
                ErrorKind::SyncError
            }
            Self::ConfigNotFound | Self::ConfigInvalid | Self::ConfigMissingRequired => {
                ErrorKind::ConfigError
            }
            Self::ValidationFailed
            | Self::InternalError
            | Self::IoError
            | Self::SerializationError
            | Self::NotFound => ErrorKind::InternalError,
        }
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "Start the document with a `---` line, the header keys, and a closing `---` line",
            Self::HeaderMalformed => "Fix the YAML syntax inside the header block",
            Self::FieldMissing => "Add the missing field to the document header",
            Self::FieldInvalid => "Check the field against its expected shape (pattern, length or list type)",
            Self::EnumViolation => "Use one of the values declared in the enum tables, or add the value there",
            Self::UnknownValue => "Declare the value in the runtime enum table or remove it",

            Self::InheritanceCycle => "Remove one `inherits` edge so the preset hierarchy becomes acyclic",
            Self::UnknownParent => "Define the parent preset in the hierarchy file or fix the `inherits` entry",

            Self::ConfigNotFound => "Create the file, or point --config / FACTORY_CONFIG at an existing one",
            Self::ConfigInvalid => "Check TOML syntax in the config file",
            Self::ConfigMissingRequired => "Set the required config value in factory.toml or via FACTORY_* variables",

            Self::IncludeNotFound => "Create the include target or fix the path in the directive",
            Self::IncludeCycle => "Break the include chain so no file includes itself transitively",
            Self::UnknownSkill => "Fix the skill name in the relationship list or add the missing skill",
            Self::UnknownPreset => "Register the preset in the hierarchy file or fix the skill's `presets`",
            Self::UnknownDocType => "Add a `creates` entry for the doc type in some skill, or fix the id",
            Self::UnknownCategory => "Create the category folder under the active documents root or fix the path",
            Self::UnusedCategory => "Reference the category from a skill or remove the folder",
            Self::DuplicateCreator => "Keep a single creator for each doc type",

            Self::PresetCoverage => "Add the skill to at least one registered preset",

            Self::HandoffIncompatible => "Put both skills in a shared preset or one related through `inherits`",

            Self::RosterMismatch => "Regenerate the roster with `factory derive --write`",
            Self::StaleArtifact => "Regenerate artifacts with `factory derive --write`",
            Self::MissingArtifact => "Generate artifacts with `factory derive --write`",

            Self::ValidationFailed => "Review the diagnostics and fix each issue. Run `factory validate` for details",

            Self::InternalError => "An unexpected error occurred. Please report this issue with full error output",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
            Self::NotFound => "The requested resource was not found. Check the path or identifier",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InternalError | Self::SerializationError)
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "document",
            2 => "graph",
            3 => "config",
            4 => "reference",
            5 => "coverage",
            6 => "compatibility",
            7 => "sync",
            8 => "validation",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::HeaderMissing,
            Self::HeaderMalformed,
            Self::FieldMissing,
            Self::FieldInvalid,
            Self::EnumViolation,
            Self::UnknownValue,
            Self::InheritanceCycle,
            Self::UnknownParent,
            Self::ConfigNotFound,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::IncludeNotFound,
            Self::IncludeCycle,
            Self::UnknownSkill,
            Self::UnknownPreset,
            Self::UnknownDocType,
            Self::UnknownCategory,
            Self::UnusedCategory,
            Self::DuplicateCreator,
            Self::PresetCoverage,
            Self::HandoffIncompatible,
            Self::RosterMismatch,
            Self::StaleArtifact,
            Self::MissingArtifact,
            Self::ValidationFailed,
            Self::InternalError,
            Self::IoError,
            Self::SerializationError,
            Self::NotFound,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
