//! Metadata extraction.
//!
//! Turns the raw text of one skill document into a [`SkillDescriptor`], or
//! into the complete list of problems that prevented it. Problems are
//! accumulated field by field; a document with three broken fields reports
//! three diagnostics. Extraction is a pure function of the text and the
//! enum table, so it is safe to run on many documents in parallel.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use serde_yaml::{Mapping, Value};

use crate::core::descriptor::{
    DocListKind, DocRef, Lifecycle, REQUIRED_FIELDS, Relation, RelationKind, SkillDescriptor,
};
use crate::core::diagnostics::Diagnostic;
use crate::core::enums::EnumTable;
use crate::core::frontmatter::split_header;
use crate::error::ErrorCode;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("name pattern is valid"));

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("version pattern is valid"));

/// Minimum description length, in characters.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// A successfully extracted descriptor and the warnings found on the way.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub descriptor: SkillDescriptor,
    pub warnings: Vec<Diagnostic>,
}

/// Extract a descriptor from `content`.
///
/// `source` is the document path relative to the source directory; it is
/// recorded on the descriptor and used to name the document when the
/// header has no usable `name`.
///
/// # Errors
///
/// Returns every diagnostic found (errors and warnings) when the header is
/// missing, malformed, or any field fails validation.
pub fn extract(source: &str, content: &str, enums: &EnumTable) -> Result<Extracted, Vec<Diagnostic>> {
    let fallback = fallback_subject(source);

    let Some(split) = split_header(content) else {
        return Err(vec![
            Diagnostic::error(ErrorCode::HeaderMissing, &fallback, "no header").with_path(source),
        ]);
    };

    let header: Value = match serde_yaml::from_str(split.header) {
        Ok(value) => value,
        Err(err) => {
            return Err(vec![
                Diagnostic::error(
                    ErrorCode::HeaderMalformed,
                    &fallback,
                    format!("header is not valid YAML: {err}"),
                )
                .with_path(source),
            ]);
        }
    };

    let map = match header {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => {
            return Err(vec![
                Diagnostic::error(ErrorCode::HeaderMalformed, &fallback, "header is not a mapping")
                    .with_path(source),
            ]);
        }
    };

    let subject = map
        .get("name")
        .and_then(Value::as_str)
        .map_or(fallback, str::to_string);

    let mut reader = HeaderReader {
        map: &map,
        subject,
        source,
        enums,
        diagnostics: Vec::new(),
    };
    let descriptor = reader.read_descriptor();
    let has_errors = reader.diagnostics.iter().any(Diagnostic::is_error);

    match descriptor {
        Some(descriptor) if !has_errors => Ok(Extracted {
            descriptor,
            warnings: reader.diagnostics,
        }),
        _ => Err(reader.diagnostics),
    }
}

/// Name used for diagnostics before the header's own name is known: the
/// document's parent directory (`skills/svc-a/SKILL.md` -> `svc-a`).
fn fallback_subject(source: &str) -> String {
    let path = Path::new(source);
    path.parent()
        .and_then(Path::file_name)
        .or_else(|| path.file_name())
        .map_or_else(|| source.to_string(), |n| n.to_string_lossy().into_owned())
}

struct HeaderReader<'a> {
    map: &'a Mapping,
    subject: String,
    source: &'a str,
    enums: &'a EnumTable,
    diagnostics: Vec<Diagnostic>,
}

impl HeaderReader<'_> {
    fn read_descriptor(&mut self) -> Option<SkillDescriptor> {
        for field in REQUIRED_FIELDS {
            if matches!(self.map.get(field), None | Some(Value::Null)) {
                self.error(ErrorCode::FieldMissing, field, format!("missing required field '{field}'"));
            }
        }

        let name = self.string_field("name");
        let description = self.string_field("description");
        let version = self.string_field("version");
        let phase = self.string_field("phase");
        let category = self.string_field("category");
        let presets = self.presets();

        if let Some(name) = &name {
            if !NAME_RE.is_match(name) {
                self.error(
                    ErrorCode::FieldInvalid,
                    "name",
                    format!("'name' must be lowercase-with-hyphens, got '{name}'"),
                );
            }
        }
        if let Some(version) = &version {
            if !VERSION_RE.is_match(version) {
                self.error(
                    ErrorCode::FieldInvalid,
                    "version",
                    format!("'version' must be MAJOR.MINOR.PATCH, got '{version}'"),
                );
            }
        }
        if let Some(description) = &description {
            if description.chars().count() < MIN_DESCRIPTION_LEN {
                self.error(
                    ErrorCode::FieldInvalid,
                    "description",
                    format!("'description' must be at least {MIN_DESCRIPTION_LEN} characters"),
                );
            }
        }
        if let Some(phase) = &phase {
            if !self.enums.phases.contains(phase) {
                self.error(ErrorCode::EnumViolation, "phase", format!("invalid phase '{phase}'"));
            }
        }
        if let Some(category) = &category {
            if !self.enums.categories.contains(category) {
                self.error(
                    ErrorCode::EnumViolation,
                    "category",
                    format!("invalid category '{category}'"),
                );
            }
        }

        let scope = self.string_field("scope");
        if let Some(scope) = &scope {
            if !self.enums.scopes.is_empty() && !self.enums.scopes.contains(scope) {
                self.error(ErrorCode::EnumViolation, "scope", format!("invalid scope '{scope}'"));
            }
        }

        let tags = self.string_list("tags");
        let mcp_servers = self.string_list("mcp_servers");
        let required_sections = self.string_list("required_sections");
        // shape check only
        self.string_list("quality_gates");
        if !self.enums.mcp_servers.is_empty() {
            for server in &mcp_servers {
                if !self.enums.mcp_servers.contains(server) {
                    self.warning(
                        ErrorCode::UnknownValue,
                        "mcp_servers",
                        format!("unknown mcp_server '{server}'"),
                    );
                }
            }
        }

        self.pre_handoff();

        let receives_from = self.relations(RelationKind::ReceivesFrom);
        let delegates_to = self.relations(RelationKind::DelegatesTo);
        let return_paths = self.relations(RelationKind::ReturnPath);

        let mut creates = self.documents(DocListKind::Creates);
        creates.extend(self.legacy_outputs());
        let requires = self.documents(DocListKind::Requires);
        let updates = self.documents(DocListKind::Updates);
        let archives = self.documents(DocListKind::Archives);

        Some(SkillDescriptor {
            name: name?,
            description: description?,
            version: version?,
            phase: phase?,
            category: category?,
            presets: presets?,
            scope,
            tags,
            mcp_servers,
            receives_from,
            delegates_to,
            return_paths,
            creates,
            requires,
            updates,
            archives,
            required_sections,
            source: self.source.to_string(),
        })
    }

    fn error(&mut self, code: ErrorCode, field: &str, message: String) {
        let diag = Diagnostic::error(code, &self.subject, message)
            .with_path(self.source)
            .with_context(json!({ "field": field }));
        self.diagnostics.push(diag);
    }

    fn warning(&mut self, code: ErrorCode, field: &str, message: String) {
        let diag = Diagnostic::warning(code, &self.subject, message)
            .with_path(self.source)
            .with_context(json!({ "field": field }));
        self.diagnostics.push(diag);
    }

    /// Present, non-null scalar rendered as a string. Absence is not
    /// reported here; required fields were checked up front.
    fn string_field(&mut self, field: &str) -> Option<String> {
        match self.map.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let text = scalar_string(value);
                if text.is_none() {
                    self.error(ErrorCode::FieldInvalid, field, format!("'{field}' must be a string"));
                }
                text
            }
        }
    }

    fn presets(&mut self) -> Option<Vec<String>> {
        let value = self.map.get("presets")?;
        let Value::Sequence(items) = value else {
            if !value.is_null() {
                self.error(ErrorCode::FieldInvalid, "presets", "'presets' must be list".to_string());
            }
            return None;
        };

        let mut presets = Vec::with_capacity(items.len());
        for item in items {
            match scalar_string(item) {
                Some(preset) => {
                    if !self.enums.presets.contains(&preset) {
                        self.error(
                            ErrorCode::EnumViolation,
                            "presets",
                            format!("invalid preset '{preset}'"),
                        );
                    }
                    presets.push(preset);
                }
                None => self.error(
                    ErrorCode::FieldInvalid,
                    "presets",
                    "'presets' entries must be strings".to_string(),
                ),
            }
        }
        Some(presets)
    }

    fn string_list(&mut self, field: &str) -> Vec<String> {
        match self.map.get(field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
            Some(_) => {
                self.error(ErrorCode::FieldInvalid, field, format!("'{field}' must be list"));
                Vec::new()
            }
        }
    }

    fn pre_handoff(&mut self) {
        let map = self.map;
        let Some(value) = map.get("pre_handoff") else {
            return;
        };
        let Value::Mapping(section) = value else {
            if !value.is_null() {
                self.error(
                    ErrorCode::FieldInvalid,
                    "pre_handoff",
                    "'pre_handoff' must be object with protocols/checks".to_string(),
                );
            }
            return;
        };

        let enums = self.enums;
        let checks = [("protocols", &enums.protocols), ("checks", &enums.checks)];
        let mut problems = Vec::new();
        for (key, allowed) in checks {
            let Some(Value::Sequence(items)) = section.get(key) else {
                continue;
            };
            if allowed.is_empty() {
                continue;
            }
            for item in items.iter().filter_map(scalar_string) {
                if !allowed.contains(&item) {
                    let singular = key.trim_end_matches('s');
                    problems.push(format!("invalid {singular} '{item}'"));
                }
            }
        }
        for message in problems {
            self.error(ErrorCode::EnumViolation, "pre_handoff", message);
        }
    }

    fn relations(&mut self, kind: RelationKind) -> Vec<Relation> {
        let field = kind.field();
        let map = self.map;
        let items = match map.get(field) {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Sequence(items)) => items,
            Some(_) => {
                self.error(ErrorCode::FieldInvalid, field, format!("'{field}' must be list"));
                return Vec::new();
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::String(skill) => out.push(Relation::to_skill(skill.clone())),
                Value::Mapping(entry) => {
                    let Some(skill) = entry.get("skill").and_then(scalar_string) else {
                        self.error(
                            ErrorCode::FieldInvalid,
                            field,
                            format!("'{field}[{index}]' missing 'skill'"),
                        );
                        continue;
                    };
                    out.push(Relation {
                        skill,
                        docs: string_or_list(entry.get("docs")),
                        trigger: entry.get("trigger").and_then(scalar_string),
                    });
                }
                _ => self.error(
                    ErrorCode::FieldInvalid,
                    field,
                    format!("'{field}[{index}]' must be a skill name or object"),
                ),
            }
        }
        out
    }

    fn documents(&mut self, kind: DocListKind) -> Vec<DocRef> {
        let field = kind.field();
        let map = self.map;
        let items = match map.get(field) {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Sequence(items)) => items,
            Some(_) => {
                self.error(ErrorCode::FieldInvalid, field, format!("'{field}' must be list"));
                return Vec::new();
            }
        };
        let check_trigger = kind != DocListKind::Requires;
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| self.document(field, index, item, check_trigger))
            .collect()
    }

    /// `outputs` is the older spelling of `creates`.
    fn legacy_outputs(&mut self) -> Vec<DocRef> {
        let map = self.map;
        let Some(Value::Sequence(items)) = map.get("outputs") else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| self.document("outputs", index, item, true))
            .collect()
    }

    fn document(&mut self, field: &str, index: usize, item: &Value, check_trigger: bool) -> Option<DocRef> {
        let entry = match item {
            Value::String(doc_type) => return Some(DocRef::new(strip_extension(doc_type))),
            Value::Mapping(entry) => entry,
            _ => {
                self.error(
                    ErrorCode::FieldInvalid,
                    field,
                    format!("'{field}[{index}]' must be a doc type or object"),
                );
                return None;
            }
        };

        let doc_type = entry
            .get("doc_type")
            .and_then(scalar_string)
            .or_else(|| entry.get("artifact").and_then(scalar_string).map(|a| strip_extension(&a)));
        let Some(doc_type) = doc_type.filter(|d| !d.is_empty()) else {
            self.error(
                ErrorCode::FieldInvalid,
                field,
                format!("'{field}[{index}]' missing 'doc_type'"),
            );
            return None;
        };

        let lifecycle = match entry.get("lifecycle").and_then(scalar_string) {
            None => None,
            Some(raw) => {
                let parsed = Lifecycle::parse(&raw);
                if parsed.is_none() {
                    self.error(
                        ErrorCode::FieldInvalid,
                        field,
                        format!("'{field}[{index}]' lifecycle must be per-feature or living, got '{raw}'"),
                    );
                }
                parsed
            }
        };

        let trigger = entry.get("trigger").and_then(scalar_string);
        if check_trigger {
            if let Some(trigger) = &trigger {
                if !self.enums.triggers.is_empty() && !self.enums.triggers.contains(trigger) {
                    self.warning(
                        ErrorCode::UnknownValue,
                        field,
                        format!("unknown trigger '{trigger}' in {field}"),
                    );
                }
            }
        }

        Some(DocRef {
            doc_type,
            path: entry.get("path").and_then(scalar_string),
            lifecycle,
            doc_category: entry.get("doc_category").and_then(scalar_string),
            trigger,
        })
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_or_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        Some(other) => scalar_string(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// `spec.md` -> `spec`; ids without an extension pass through.
fn strip_extension(raw: &str) -> String {
    match raw.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => raw.to_string(),
    }
}
