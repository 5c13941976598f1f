//! Compare the maintained roster file with the computed rosters.

use std::collections::BTreeSet;

use serde_json::json;

use crate::core::diagnostics::Diagnostic;
use crate::derive::membership::Roster;
use crate::derive::render::{ALL_SKILLS, RosterFile, RosterSkills};
use crate::error::ErrorCode;

/// Check every computed roster against `file`.
///
/// `file_path` is used only for diagnostics. A missing file is a single
/// warning; everything else is an error.
#[must_use]
pub fn check(rosters: &[Roster], file: Option<&RosterFile>, file_path: &str) -> Vec<Diagnostic> {
    let Some(file) = file else {
        return vec![
            Diagnostic::warning(
                ErrorCode::MissingArtifact,
                file_path,
                "roster file not found, run `factory derive --write` and copy presets.yaml",
            )
            .with_path(file_path),
        ];
    };

    let mut out = Vec::new();
    for roster in rosters {
        let Some(entry) = file.get(&roster.group) else {
            out.push(mismatch(
                roster,
                file_path,
                "group is missing from the roster file".to_string(),
                roster.skills.iter().cloned().collect(),
                BTreeSet::new(),
            ));
            continue;
        };

        match (&entry.skills, roster.includes_all) {
            (RosterSkills::All, true) => {}
            (RosterSkills::All, false) => out.push(mismatch(
                roster,
                file_path,
                format!("listed as \"{ALL_SKILLS}\" but the group does not include every skill"),
                BTreeSet::new(),
                BTreeSet::new(),
            )),
            (RosterSkills::Listed(_), true) => out.push(mismatch(
                roster,
                file_path,
                format!("group includes every skill and should be listed as \"{ALL_SKILLS}\""),
                BTreeSet::new(),
                BTreeSet::new(),
            )),
            (RosterSkills::Listed(listed), false) => {
                let computed: BTreeSet<String> = roster.skills.iter().cloned().collect();
                let missing: BTreeSet<String> = computed.difference(listed).cloned().collect();
                let extra: BTreeSet<String> = listed.difference(&computed).cloned().collect();
                if !missing.is_empty() || !extra.is_empty() {
                    out.push(mismatch(
                        roster,
                        file_path,
                        format!(
                            "roster out of date: {} missing, {} extra",
                            missing.len(),
                            extra.len()
                        ),
                        missing,
                        extra,
                    ));
                }
            }
        }
    }

    let known: BTreeSet<&str> = rosters.iter().map(|r| r.group.as_str()).collect();
    for group in file.groups() {
        if !known.contains(group) {
            out.push(
                Diagnostic::error(
                    ErrorCode::RosterMismatch,
                    group,
                    "roster file lists a group that is not registered",
                )
                .with_path(file_path),
            );
        }
    }
    out
}

fn mismatch(
    roster: &Roster,
    file_path: &str,
    message: String,
    missing: BTreeSet<String>,
    extra: BTreeSet<String>,
) -> Diagnostic {
    Diagnostic::error(ErrorCode::RosterMismatch, &roster.group, message)
        .with_path(file_path)
        .with_context(json!({
            "missing_in_roster": missing,
            "extra_in_roster": extra,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(group: &str, skills: &[&str]) -> Roster {
        Roster {
            group: group.to_string(),
            description: String::new(),
            includes_all: false,
            skills: skills.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn matching_file_is_clean() {
        let rosters = vec![roster("core", &["a", "b"])];
        let file = RosterFile::from_rosters(&rosters);
        assert!(check(&rosters, Some(&file), "presets.yaml").is_empty());
    }

    #[test]
    fn reports_disjoint_missing_and_extra_sets() {
        let rosters = vec![roster("core", &["a", "b"])];
        let file = RosterFile::from_yaml_str("core:\n  skills: [b, c]\n").unwrap();
        let diags = check(&rosters, Some(&file), "presets.yaml");
        assert_eq!(diags.len(), 1);
        let ctx = diags[0].context.as_ref().unwrap();
        assert_eq!(ctx["missing_in_roster"], json!(["a"]));
        assert_eq!(ctx["extra_in_roster"], json!(["c"]));
    }

    #[test]
    fn missing_and_unknown_groups() {
        let rosters = vec![roster("core", &["a"])];
        let file = RosterFile::from_yaml_str("stale:\n  skills: []\n").unwrap();
        let diags = check(&rosters, Some(&file), "presets.yaml");
        let subjects: Vec<&str> = diags.iter().map(|d| d.subject.as_str()).collect();
        assert_eq!(subjects, vec!["core", "stale"]);
        assert!(diags.iter().all(|d| d.code == ErrorCode::RosterMismatch));
    }

    #[test]
    fn star_must_match_includes_all() {
        let mut all = roster("all", &["a"]);
        all.includes_all = true;
        let file = RosterFile::from_yaml_str("all:\n  skills: [a]\n").unwrap();
        assert_eq!(check(&[all], Some(&file), "presets.yaml").len(), 1);
    }

    #[test]
    fn absent_file_is_a_warning() {
        let diags = check(&[roster("core", &[])], None, "_meta/presets.yaml");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, ErrorCode::MissingArtifact);
        assert!(!diags[0].is_error());
    }
}
