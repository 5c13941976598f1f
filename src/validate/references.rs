//! Dangling references: unknown skills, presets, parents and doc types.

use std::collections::BTreeSet;

use serde_json::json;

use crate::core::descriptor::{DocListKind, RelationKind, SkillDescriptor};
use crate::core::diagnostics::Diagnostic;
use crate::core::presets::Membership;
use crate::derive::doc_types::DocTypeRegistry;
use crate::error::ErrorCode;

#[must_use]
pub fn check(
    skills: &[SkillDescriptor],
    membership: &Membership,
    doc_types: &DocTypeRegistry,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for (child, parent) in membership.graph().dangling_parents() {
        out.push(
            Diagnostic::error(
                ErrorCode::UnknownParent,
                &child,
                format!("inherits from undefined preset '{parent}'"),
            )
            .with_context(json!({ "parent": parent })),
        );
    }

    let names: BTreeSet<&str> = skills.iter().map(|s| s.name.as_str()).collect();
    for skill in skills {
        for preset in &skill.presets {
            if !membership.graph().contains(preset) {
                out.push(
                    Diagnostic::error(
                        ErrorCode::UnknownPreset,
                        &skill.name,
                        format!("declares unregistered preset '{preset}'"),
                    )
                    .with_path(&skill.source)
                    .with_context(json!({ "field": "presets", "value": preset })),
                );
            }
        }

        for kind in RelationKind::ALL {
            for relation in skill.relations(kind) {
                if !names.contains(relation.skill.as_str()) {
                    out.push(
                        Diagnostic::error(
                            ErrorCode::UnknownSkill,
                            &skill.name,
                            format!("{} names unknown skill '{}'", kind.field(), relation.skill),
                        )
                        .with_path(&skill.source)
                        .with_context(json!({ "field": kind.field(), "value": relation.skill })),
                    );
                }
                for doc in &relation.docs {
                    if !doc_types.contains(doc) {
                        out.push(unknown_doc_type(skill, kind.field(), doc));
                    }
                }
            }
        }

        for kind in [DocListKind::Requires, DocListKind::Updates, DocListKind::Archives] {
            for doc in skill.documents(kind) {
                if !doc_types.contains(&doc.doc_type) {
                    out.push(unknown_doc_type(skill, kind.field(), &doc.doc_type));
                }
            }
        }
    }

    for entry in doc_types.entries() {
        if entry.additional_creators.is_empty() {
            continue;
        }
        out.push(
            Diagnostic::warning(
                ErrorCode::DuplicateCreator,
                &entry.id,
                format!(
                    "created by {} and also by {}",
                    entry.creator_skill,
                    entry.additional_creators.join(", ")
                ),
            )
            .with_context(json!({
                "creator": entry.creator_skill,
                "additional_creators": entry.additional_creators,
            })),
        );
    }
    out
}

fn unknown_doc_type(skill: &SkillDescriptor, field: &str, doc_type: &str) -> Diagnostic {
    Diagnostic::error(
        ErrorCode::UnknownDocType,
        &skill.name,
        format!("{field} names doc type '{doc_type}' that no skill creates"),
    )
    .with_path(&skill.source)
    .with_context(json!({ "field": field, "value": doc_type }))
}
