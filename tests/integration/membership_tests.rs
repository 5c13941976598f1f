//! Preset resolution, rosters and selection.

use factory::FactoryError;
use factory::error::ErrorCode;
use factory::test_utils::CorpusFixture;

const CORE_BACKEND: &str = r"core:
  description: Shared foundation
backend:
  description: Server-side team
  inherits: [core]
frontend:
  description: Client-side team
";

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// =============================================================================
// Resolve
// =============================================================================

#[test]
fn backend_skill_is_in_backend_and_core_rosters() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(CORE_BACKEND);
    fixture.write_skill("svc-a", &["backend"], "");

    let engine = fixture.engine();
    let backend = engine.resolve_membership("backend").unwrap();
    assert!(backend.diagnostics.is_empty());
    assert_eq!(backend.data.closure, names(&["backend", "core"]));
    assert!(backend.data.roster.contains(&"svc-a".to_string()));

    let core = engine.resolve_membership("core").unwrap();
    assert_eq!(core.data.closure, names(&["core"]));
    assert_eq!(core.data.ancestors_of, names(&["backend", "core"]));
    assert_eq!(core.data.upward_members, names(&["svc-a"]));
    assert!(core.data.team_members.is_empty());
    assert_eq!(core.data.roster, names(&["svc-a"]));
}

#[test]
fn team_build_pulls_in_more_general_skills() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(CORE_BACKEND);
    fixture.write_skill("svc-a", &["backend"], "");
    fixture.write_skill("lib-c", &["core"], "");

    let report = fixture.engine().resolve_membership("backend").unwrap().data;
    assert_eq!(report.upward_members, names(&["svc-a"]));
    assert_eq!(report.team_members, names(&["lib-c", "svc-a"]));
    assert_eq!(report.roster, names(&["lib-c", "svc-a"]));
}

#[test]
fn unknown_group_is_reported_not_fatal() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(CORE_BACKEND);
    fixture.write_skill("svc-a", &["backend"], "");

    let outcome = fixture.engine().resolve_membership("mobile").unwrap();
    assert!(!outcome.data.defined);
    assert_eq!(outcome.data.closure, names(&["mobile"]));
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].code, ErrorCode::UnknownPreset);
}

#[test]
fn includes_all_group_lists_every_skill() {
    let fixture = CorpusFixture::standard();
    let report = fixture.engine().resolve_membership("everything").unwrap().data;
    assert!(report.includes_all);
    assert_eq!(report.roster, names(&["qa-lead", "svc-a", "ui-kit"]));
}

#[test]
fn inheritance_cycle_aborts_resolution() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy("a:\n  inherits: [b]\nb:\n  inherits: [a]\n");
    fixture.write_skill("svc-a", &["a"], "");

    match fixture.engine().resolve_membership("a") {
        Err(FactoryError::InheritanceCycle { preset, cycle }) => {
            assert_eq!(preset, "a");
            assert_eq!(cycle, names(&["a", "b", "a"]));
        }
        other => panic!("expected inheritance cycle, got {other:?}"),
    }
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn selection_is_sorted_and_follows_both_directions() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(CORE_BACKEND);
    fixture.write_skill("zeta", &["backend"], "");
    fixture.write_skill("alpha", &["core"], "");
    fixture.write_skill("ui", &["frontend"], "");

    let engine = fixture.engine();
    let backend = engine.filtered_build(&names(&["backend"])).unwrap();
    assert!(backend.diagnostics.is_empty());
    assert_eq!(backend.data.skills, names(&["alpha", "zeta"]));

    let core = engine.filtered_build(&names(&["core"])).unwrap();
    assert_eq!(core.data.skills, names(&["alpha", "zeta"]));

    let both = engine.filtered_build(&names(&["frontend", "backend", "frontend"])).unwrap();
    assert_eq!(both.data.targets, names(&["frontend", "backend"]));
    assert_eq!(both.data.skills, names(&["alpha", "ui", "zeta"]));
}

#[test]
fn unknown_target_contributes_nothing() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(CORE_BACKEND);
    fixture.write_skill("svc-a", &["backend"], "");

    let outcome = fixture.engine().filtered_build(&names(&["ghost"])).unwrap();
    assert!(outcome.data.skills.is_empty());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].code, ErrorCode::UnknownPreset);
}
