//! Error handling for factory.
//!
//! This module provides:
//! - [`FactoryError`]: The error enum for fatal conditions
//! - [`ErrorCode`]: Standardized error codes shared with diagnostics
//! - [`StructuredError`]: Rich error type with suggestions and context
//! - Suggestion helpers for context-aware recovery hints
//!
//! Per-document and per-check problems are not errors; they travel as
//! [`crate::core::diagnostics::Diagnostic`] records so a run can report
//! everything at once.

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::{ErrorCode, ErrorKind};
pub use suggestions::suggest_for_error;

/// Main error type for factory operations.
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Inheritance cycle detected at preset '{preset}': {}", .cycle.join(" -> "))]
    InheritanceCycle { preset: String, cycle: Vec<String> },

    #[error("Include cycle detected while expanding '{root}': {}", .chain.join(" -> "))]
    IncludeCycle { root: String, chain: Vec<String> },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl FactoryError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::InheritanceCycle { .. } => ErrorCode::InheritanceCycle,
            Self::IncludeCycle { .. } => ErrorCode::IncludeCycle,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::InheritanceCycle { preset, cycle } => {
                Some(serde_json::json!({ "preset": preset, "cycle": cycle }))
            }
            Self::IncludeCycle { root, chain } => {
                Some(serde_json::json!({ "root": root, "chain": chain }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            Self::NotFound(what) => Some(serde_json::json!({ "target": what })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_factory_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Emitted in robot mode so callers can branch on `code` instead of parsing
/// messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "INHERITANCE_CYCLE")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 201)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "graph", "config")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a [`FactoryError`].
    #[must_use]
    pub fn from_factory_error(err: &FactoryError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        // Regenerate suggestion with new context
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }

    /// Set a custom suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<FactoryError> for StructuredError {
    fn from(err: FactoryError) -> Self {
        Self::from_factory_error(&err)
    }
}

impl From<&FactoryError> for StructuredError {
    fn from(err: &FactoryError) -> Self {
        Self::from_factory_error(err)
    }
}

/// Result type alias using FactoryError.
pub type Result<T> = std::result::Result<T, FactoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_error_code_mapping() {
        assert_eq!(
            FactoryError::Config("bad".into()).code(),
            ErrorCode::ConfigInvalid
        );
        assert_eq!(
            FactoryError::InheritanceCycle {
                preset: "a".into(),
                cycle: vec!["a".into(), "b".into(), "a".into()]
            }
            .code(),
            ErrorCode::InheritanceCycle
        );
        assert_eq!(
            FactoryError::IncludeCycle {
                root: "x.md".into(),
                chain: vec!["x.md".into(), "x.md".into()]
            }
            .code()
            .kind(),
            ErrorKind::ReferenceError
        );
    }

    #[test]
    fn test_cycle_message_joins_path() {
        let err = FactoryError::InheritanceCycle {
            preset: "a".into(),
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "Inheritance cycle detected at preset 'a': a -> b -> a"
        );
    }

    #[test]
    fn test_structured_error_from_factory_error() {
        let err = FactoryError::InheritanceCycle {
            preset: "core".into(),
            cycle: vec!["core".into(), "backend".into(), "core".into()],
        };
        let structured = err.to_structured();

        assert_eq!(structured.code, ErrorCode::InheritanceCycle);
        assert_eq!(structured.numeric_code, 201);
        assert_eq!(structured.category, "graph");
        assert!(structured.suggestion.contains("core -> backend -> core"));
        let ctx = structured.context.unwrap();
        assert_eq!(ctx.get("preset").unwrap(), "core");
    }

    #[test]
    fn test_structured_error_serialization() {
        let err = StructuredError::new(ErrorCode::PresetCoverage, "svc-a is orphaned");
        let json = serde_json::to_string(&err).unwrap();

        assert!(json.contains("PRESET_COVERAGE"));
        assert!(json.contains("\"numeric_code\":501"));
        assert!(json.contains("\"recoverable\":true"));
        assert!(json.contains("\"category\":\"coverage\""));
    }

    #[test]
    fn test_structured_error_with_context() {
        let err = StructuredError::new(ErrorCode::FieldMissing, "missing field")
            .with_context(serde_json::json!({ "field": "version" }));
        assert!(err.suggestion.contains("version"));
    }

    #[test]
    fn test_structured_error_display() {
        let err = StructuredError::new(ErrorCode::IncludeNotFound, "partials/x.md");
        assert_eq!(err.to_string(), "[E401] partials/x.md");
    }
}
