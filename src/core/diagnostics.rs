//! Diagnostic records and run outcomes.
//!
//! Every non-fatal problem found during a run becomes a [`Diagnostic`].
//! Diagnostics are appended in processing order, and processing order is
//! always sorted by name, so identical inputs give identical reports.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorCode, ErrorKind, suggest_for_error};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub severity: Severity,
    /// Skill, preset, doc type, category or file the problem is about
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(code: ErrorCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, subject, message)
    }

    #[must_use]
    pub fn warning(code: ErrorCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, subject, message)
    }

    fn new(
        code: ErrorCode,
        severity: Severity,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            kind: code.kind(),
            severity,
            subject: subject.into(),
            message: message.into(),
            path: None,
            context: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Recovery hint for this diagnostic, using its context when present.
    #[must_use]
    pub fn suggestion(&self) -> String {
        suggest_for_error(self.code, self.context.as_ref())
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.code, self.subject, self.message
        )?;
        if let Some(path) = &self.path {
            write!(f, " ({path})")?;
        }
        Ok(())
    }
}

/// Final status of an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failure,
}

/// What every entry point returns: its data plus the diagnostics found on
/// the way.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub data: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Outcome<T> {
    #[must_use]
    pub const fn new(data: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { data, diagnostics }
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    /// Failure when any error was reported, or any warning under `strict`.
    #[must_use]
    pub fn status(&self, strict: bool) -> RunStatus {
        let failed = self.error_count() > 0 || (strict && !self.diagnostics.is_empty());
        if failed {
            RunStatus::Failure
        } else {
            RunStatus::Success
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            data: f(self.data),
            diagnostics: self.diagnostics,
        }
    }
}
