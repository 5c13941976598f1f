//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module by reading the
//! JSON context attached to an error or diagnostic.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
///
/// Falls back to the static suggestion when the context carries nothing
/// more specific.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::InheritanceCycle => suggest_inheritance_cycle(context),
        ErrorCode::IncludeCycle => suggest_include_cycle(context),
        ErrorCode::IncludeNotFound => suggest_include_not_found(context),
        ErrorCode::HandoffIncompatible => suggest_handoff_incompatible(context),
        ErrorCode::RosterMismatch => suggest_roster_mismatch(context),
        ErrorCode::FieldMissing => suggest_field_missing(context),
        _ => code.suggestion().to_string(),
    }
}

fn str_list(context: Option<&Value>, key: &str) -> Option<Vec<String>> {
    context
        .and_then(|c| c.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
}

fn suggest_inheritance_cycle(context: Option<&Value>) -> String {
    match str_list(context, "cycle") {
        Some(chain) if !chain.is_empty() => format!(
            "Inheritance cycle: {}\nRemove one of these `inherits` edges",
            chain.join(" -> ")
        ),
        _ => ErrorCode::InheritanceCycle.suggestion().to_string(),
    }
}

fn suggest_include_cycle(context: Option<&Value>) -> String {
    match str_list(context, "chain") {
        Some(chain) if !chain.is_empty() => format!(
            "Include cycle: {}\nRemove the directive that closes the loop",
            chain.join(" -> ")
        ),
        _ => ErrorCode::IncludeCycle.suggestion().to_string(),
    }
}

fn suggest_include_not_found(context: Option<&Value>) -> String {
    let target = context
        .and_then(|c| c.get("target"))
        .and_then(Value::as_str);
    match target {
        Some(target) => format!("Create `{target}` under the source directory or fix the directive"),
        None => ErrorCode::IncludeNotFound.suggestion().to_string(),
    }
}

fn suggest_handoff_incompatible(context: Option<&Value>) -> String {
    let from = context.and_then(|c| c.get("from")).and_then(Value::as_str);
    let to = context.and_then(|c| c.get("to")).and_then(Value::as_str);
    match (from, to) {
        (Some(from), Some(to)) => format!(
            "'{from}' and '{to}' never ship together. Add a shared preset to one of them, or make one preset inherit the other"
        ),
        _ => ErrorCode::HandoffIncompatible.suggestion().to_string(),
    }
}

fn suggest_roster_mismatch(context: Option<&Value>) -> String {
    let missing = str_list(context, "missing_in_roster").unwrap_or_default();
    let extra = str_list(context, "extra_in_roster").unwrap_or_default();
    if missing.is_empty() && extra.is_empty() {
        return ErrorCode::RosterMismatch.suggestion().to_string();
    }
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("add {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        parts.push(format!("remove {}", extra.join(", ")));
    }
    format!(
        "Roster is out of date ({}). Run `factory derive --write`",
        parts.join("; ")
    )
}

fn suggest_field_missing(context: Option<&Value>) -> String {
    let field = context.and_then(|c| c.get("field")).and_then(Value::as_str);
    match field {
        Some(field) => format!("Add `{field}:` to the document header"),
        None => ErrorCode::FieldMissing.suggestion().to_string(),
    }
}
