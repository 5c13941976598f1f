use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::core::diagnostics::{Diagnostic, RunStatus, Severity};
use crate::error::{ErrorCode, FactoryError, Result};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable formatted output with colors (default)
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// Newline-delimited JSON (one object per line)
    Jsonl,
    /// Plain text without colors or formatting
    Plain,
}

impl OutputFormat {
    /// Check if this format should use colors
    #[must_use]
    pub const fn use_colors(&self) -> bool {
        matches!(self, OutputFormat::Human)
    }

    /// Check if this format is machine-readable
    #[must_use]
    pub const fn is_machine_readable(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Jsonl)
    }
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    /// Run completed but reported failing diagnostics
    Failure { errors: usize, warnings: usize },
    #[serde(rename = "error")]
    StructuredError {
        /// Error code enum value (e.g., "INHERITANCE_CYCLE")
        code: ErrorCode,
        /// Numeric error code (e.g., 203)
        numeric_code: u16,
        message: String,
        /// Actionable suggestion for recovery
        suggestion: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        recoverable: bool,
        category: String,
    },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        diagnostics: Vec::new(),
    }
}

/// Wrap a run's data and diagnostics, marking failure when `status` says so.
pub fn robot_outcome<T: Serialize>(
    data: T,
    diagnostics: Vec<Diagnostic>,
    status: RunStatus,
) -> RobotResponse<T> {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;
    RobotResponse {
        status: match status {
            RunStatus::Success => RobotStatus::Ok,
            RunStatus::Failure => RobotStatus::Failure { errors, warnings },
        },
        diagnostics,
        ..robot_ok(data)
    }
}

/// Create a robot error response from a [`FactoryError`].
pub fn robot_error_structured(err: &FactoryError) -> RobotResponse<serde_json::Value> {
    let structured = err.to_structured();
    RobotResponse {
        status: RobotStatus::StructuredError {
            code: structured.code,
            numeric_code: structured.numeric_code,
            message: structured.message,
            suggestion: structured.suggestion,
            context: structured.context,
            recoverable: structured.recoverable,
            category: structured.category,
        },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data: serde_json::Value::Null,
        diagnostics: Vec::new(),
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

/// Emit a slice of items in JSONL format (one JSON object per line)
pub fn emit_jsonl<T: Serialize>(items: &[T]) -> Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
    color: bool,
}

impl HumanLayout {
    #[must_use]
    pub const fn new(color: bool) -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
            color,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        let line = if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        };
        self.lines.push(line);
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        let line = if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        };
        self.lines.push(line);
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        let key = if self.color {
            padded.dimmed().to_string()
        } else {
            padded
        };
        self.lines.push(format!("{key} {value}"));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// One line per diagnostic, with the recovery hint underneath.
#[must_use]
pub fn format_diagnostic(diag: &Diagnostic, color: bool) -> String {
    let label = format!("{}[{}]", diag.severity, diag.code.code_string());
    let label = match (color, diag.severity) {
        (false, _) => label,
        (true, Severity::Error) => label.red().bold().to_string(),
        (true, Severity::Warning) => label.yellow().bold().to_string(),
    };
    let mut line = format!("{label} {}: {}", diag.subject, diag.message);
    if let Some(path) = &diag.path {
        line.push_str(&format!("\n    at {path}"));
    }
    let hint = diag.suggestion();
    if !hint.is_empty() {
        let hint = if color {
            hint.dimmed().to_string()
        } else {
            hint
        };
        line.push_str(&format!("\n    hint: {hint}"));
    }
    line
}

/// Print diagnostics to stderr followed by a summary line.
pub fn emit_diagnostics(diagnostics: &[Diagnostic], format: OutputFormat) {
    let color = format.use_colors();
    for diag in diagnostics {
        eprintln!("{}", format_diagnostic(diag, color));
    }
    if diagnostics.is_empty() {
        return;
    }
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let summary = format!(
        "{errors} error(s), {} warning(s)",
        diagnostics.len() - errors
    );
    if color && errors > 0 {
        eprintln!("{}", summary.red());
    } else {
        eprintln!("{summary}");
    }
}
