//! Handoff compatibility: both ends of a relationship must share a group.
//!
//! Compatibility is symmetric, so each unordered pair of skills is checked
//! once, in the direction of the first edge met. Edges to unknown skills
//! are left to the reference check.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;

use crate::core::descriptor::SkillDescriptor;
use crate::core::diagnostics::Diagnostic;
use crate::core::presets::Membership;
use crate::derive::matrix::relationship_edges;
use crate::error::ErrorCode;

/// Whether two resolved sets may hand off to each other.
#[must_use]
pub fn compatible(membership: &Membership, from: &BTreeSet<String>, to: &BTreeSet<String>) -> bool {
    from.iter().chain(to).any(|p| membership.includes_all(p)) || !from.is_disjoint(to)
}

#[must_use]
pub fn check(skills: &[SkillDescriptor], membership: &Membership) -> Vec<Diagnostic> {
    let by_name: BTreeMap<&str, &SkillDescriptor> =
        skills.iter().map(|s| (s.name.as_str(), s)).collect();
    let mut checked = BTreeSet::new();
    let mut out = Vec::new();

    for edge in relationship_edges(skills) {
        if edge.from == edge.to {
            continue;
        }
        let (Some(from), Some(to)) = (by_name.get(edge.from.as_str()), by_name.get(edge.to.as_str()))
        else {
            continue;
        };
        let pair = if edge.from < edge.to {
            (edge.from.clone(), edge.to.clone())
        } else {
            (edge.to.clone(), edge.from.clone())
        };
        if !checked.insert(pair) {
            continue;
        }

        let from_set = membership.resolve_declared(&from.presets);
        let to_set = membership.resolve_declared(&to.presets);
        if compatible(membership, &from_set, &to_set) {
            continue;
        }
        let fmt = |set: &BTreeSet<String>| set.iter().cloned().collect::<Vec<_>>().join(", ");
        out.push(
            Diagnostic::error(
                ErrorCode::HandoffIncompatible,
                &edge.from,
                format!(
                    "{} -> {} ({}) crosses groups: [{}] vs [{}]",
                    edge.from,
                    edge.to,
                    edge.kind,
                    fmt(&from_set),
                    fmt(&to_set)
                ),
            )
            .with_path(&from.source)
            .with_context(json!({
                "from": edge.from,
                "to": edge.to,
                "kind": edge.kind,
                "from_presets": from_set,
                "to_presets": to_set,
            })),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::Relation;
    use crate::core::presets::{PresetGraph, PresetNode};

    fn skill(name: &str, presets: &[&str]) -> SkillDescriptor {
        SkillDescriptor {
            name: name.to_string(),
            presets: presets.iter().map(|p| (*p).to_string()).collect(),
            ..SkillDescriptor::default()
        }
    }

    fn membership() -> Membership {
        PresetGraph::new([
            PresetNode::new("core"),
            PresetNode::new("backend").inheriting(["core"]),
            PresetNode::new("frontend"),
            PresetNode::new("all").matching_all(),
        ])
        .resolve_all()
        .unwrap()
    }

    #[test]
    fn disjoint_groups_report_one_violation() {
        let mut a = skill("svc-a", &["backend"]);
        a.delegates_to = vec![Relation::to_skill("svc-b")];
        let mut b = skill("svc-b", &["frontend"]);
        b.receives_from = vec![Relation::to_skill("svc-a")];
        let diags = check(&[a, b], &membership());

        assert_eq!(diags.len(), 1);
        let diag = &diags[0];
        assert_eq!(diag.code, ErrorCode::HandoffIncompatible);
        assert_eq!(diag.subject, "svc-a");
        let ctx = diag.context.as_ref().unwrap();
        assert_eq!(ctx["to"], "svc-b");
        assert_eq!(ctx["from_presets"], json!(["backend", "core"]));
        assert_eq!(ctx["to_presets"], json!(["frontend"]));
    }

    #[test]
    fn shared_ancestor_is_compatible() {
        let mut a = skill("a", &["backend"]);
        a.delegates_to = vec![Relation::to_skill("b")];
        let diags = check(&[a, skill("b", &["core"])], &membership());
        assert!(diags.is_empty());
    }

    #[test]
    fn includes_all_is_compatible_with_anything() {
        let mut a = skill("a", &["all"]);
        a.return_paths = vec![Relation::to_skill("b")];
        let diags = check(&[a, skill("b", &["frontend"])], &membership());
        assert!(diags.is_empty());
    }

    #[test]
    fn unknown_targets_are_skipped() {
        let mut a = skill("a", &["backend"]);
        a.delegates_to = vec![Relation::to_skill("missing")];
        assert!(check(&[a], &membership()).is_empty());
    }
}
