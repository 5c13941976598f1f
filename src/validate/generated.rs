//! Generated artifacts on disk must match a fresh rendering.

use std::path::Path;

use crate::core::diagnostics::Diagnostic;
use crate::derive::render::GeneratedFiles;
use crate::error::ErrorCode;

#[must_use]
pub fn check(expected: &GeneratedFiles, dir: &Path, display_dir: &str) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for (rel, content) in expected.iter() {
        let shown = format!("{display_dir}/{rel}");
        match std::fs::read_to_string(dir.join(rel)) {
            Ok(actual) if actual == content => {}
            Ok(_) => out.push(
                Diagnostic::error(ErrorCode::StaleArtifact, rel, "generated file is out of date")
                    .with_path(&shown),
            ),
            Err(_) => out.push(
                Diagnostic::warning(ErrorCode::MissingArtifact, rel, "generated file not found")
                    .with_path(&shown),
            ),
        }
    }
    out
}
