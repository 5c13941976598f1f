//! Cross validation over whole corpora.

use factory::FactoryError;
use factory::core::{Diagnostic, RunStatus};
use factory::error::ErrorCode;
use factory::test_utils::CorpusFixture;

const SPLIT_TEAMS: &str = r"core:
  description: Shared foundation
backend:
  description: Server-side team
  inherits: [core]
frontend:
  description: Client-side team
";

fn with_code(diagnostics: &[Diagnostic], code: ErrorCode) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.code == code).collect()
}

#[test]
fn standard_corpus_validates_clean() {
    let fixture = CorpusFixture::standard();
    let outcome = fixture.engine().validate().unwrap();

    for diag in &outcome.diagnostics {
        println!("[TEST] unexpected: {diag}");
    }
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.status(true), RunStatus::Success);
    assert_eq!(outcome.data.skills, 3);
    assert_eq!(outcome.data.groups, 4);
    assert_eq!(outcome.data.doc_types, 1);
    assert_eq!(outcome.data.handoffs, 1);
}

#[test]
fn handoff_across_unrelated_groups_is_one_violation() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(SPLIT_TEAMS);
    fixture.write_skill("svc-a", &["backend"], "delegates_to:\n  - svc-b\n");
    fixture.write_skill("svc-b", &["frontend"], "receives_from:\n  - svc-a\n");

    let outcome = fixture.engine().validate().unwrap();
    let violations = with_code(&outcome.diagnostics, ErrorCode::HandoffIncompatible);
    assert_eq!(violations.len(), 1);

    let context = violations[0].context.as_ref().unwrap();
    assert_eq!(context["from"], "svc-a");
    assert_eq!(context["to"], "svc-b");
    assert_eq!(context["from_presets"], serde_json::json!(["backend", "core"]));
    assert_eq!(context["to_presets"], serde_json::json!(["frontend"]));
    assert_eq!(outcome.status(false), RunStatus::Failure);
}

#[test]
fn handoff_through_shared_ancestor_is_compatible() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(
        "core: {}\nbackend:\n  inherits: [core]\nfrontend:\n  inherits: [core]\n",
    );
    fixture.write_skill("svc-a", &["backend"], "delegates_to:\n  - svc-b\n");
    fixture.write_skill("svc-b", &["frontend"], "");

    let outcome = fixture.engine().validate().unwrap();
    assert!(with_code(&outcome.diagnostics, ErrorCode::HandoffIncompatible).is_empty());
}

#[test]
fn skill_without_presets_is_reported_once() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(SPLIT_TEAMS);
    fixture.write_skill("lonely", &[], "");
    fixture.write_skill("svc-a", &["backend"], "");

    let outcome = fixture.engine().validate().unwrap();
    let coverage = with_code(&outcome.diagnostics, ErrorCode::PresetCoverage);
    assert_eq!(coverage.len(), 1);
    assert_eq!(coverage[0].subject, "lonely");
}

#[test]
fn inheritance_cycle_is_fatal() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy("a:\n  inherits: b\nb:\n  inherits: c\nc:\n  inherits: a\n");
    fixture.write_skill("svc-a", &["a"], "");

    let err = fixture.engine().validate().unwrap_err();
    assert!(matches!(err, FactoryError::InheritanceCycle { .. }));
    assert_eq!(err.code(), ErrorCode::InheritanceCycle);
}

#[test]
fn broken_document_does_not_stop_the_run() {
    let fixture = CorpusFixture::standard();
    fixture.write("skills/broken/SKILL.md", "# no header here\n");
    fixture.write(
        "skills/half/SKILL.md",
        "---\nname: half\nversion: one\n---\n",
    );

    let outcome = fixture.engine().validate().unwrap();
    assert_eq!(outcome.data.skills, 3);
    assert_eq!(with_code(&outcome.diagnostics, ErrorCode::HeaderMissing).len(), 1);
    let half: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.subject == "half")
        .collect();
    // description, phase, category and presets missing; version malformed
    assert_eq!(half.len(), 5);
}

#[test]
fn roster_drift_reports_both_sides() {
    let fixture = CorpusFixture::standard();
    let roster = factory::test_utils::fixtures::ROSTER
        .replace("skills: [qa-lead, svc-a]\n", "skills: [svc-a, ghost]\n");
    fixture.write("_meta/presets.yaml", &roster);

    let outcome = fixture.engine().validate().unwrap();
    let drift = with_code(&outcome.diagnostics, ErrorCode::RosterMismatch);
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].subject, "backend");
    let context = drift[0].context.as_ref().unwrap();
    assert_eq!(context["missing_in_roster"], serde_json::json!(["qa-lead"]));
    assert_eq!(context["extra_in_roster"], serde_json::json!(["ghost"]));
}

#[test]
fn missing_roster_file_is_a_warning() {
    let fixture = CorpusFixture::standard();
    fixture.remove("_meta/presets.yaml");

    let outcome = fixture.engine().validate().unwrap();
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].code, ErrorCode::MissingArtifact);
    assert_eq!(outcome.status(false), RunStatus::Success);
    assert_eq!(outcome.status(true), RunStatus::Failure);
}

#[test]
fn unknown_references_are_errors() {
    let fixture = CorpusFixture::standard();
    fixture.write_skill(
        "lost",
        &["core"],
        "delegates_to:\n  - nobody\nrequires:\n  - blueprint\n",
    );
    let roster = factory::test_utils::fixtures::ROSTER.replace(
        "skills: [qa-lead, svc-a, ui-kit]",
        "skills: [lost, qa-lead, svc-a, ui-kit]",
    );
    fixture.write("_meta/presets.yaml", &roster);

    let outcome = fixture.engine().validate().unwrap();
    let codes: Vec<ErrorCode> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.subject == "lost")
        .map(|d| d.code)
        .collect();
    assert_eq!(codes, vec![ErrorCode::UnknownSkill, ErrorCode::UnknownDocType]);
}

#[test]
fn category_folders_are_checked_both_ways() {
    let fixture = CorpusFixture::standard();
    fixture.write_active_category("research");
    fixture.write_skill(
        "writer",
        &["core"],
        "creates:\n  - doc_type: memo\n    path: project/docs/active/memos/\n",
    );

    let outcome = fixture.engine().validate().unwrap();
    let unknown = with_code(&outcome.diagnostics, ErrorCode::UnknownCategory);
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].subject, "writer");
    let unused = with_code(&outcome.diagnostics, ErrorCode::UnusedCategory);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].subject, "research");
    assert!(!unused[0].is_error());
}

#[test]
fn strict_config_fails_on_warnings() {
    let fixture = CorpusFixture::standard();
    fixture.write_active_category("research");

    let outcome = fixture
        .engine_with(|config| config.validate.strict = true)
        .validate()
        .unwrap();
    assert_eq!(outcome.data.errors, 0);
    assert_eq!(outcome.data.warnings, 1);
    assert_eq!(outcome.status(false), RunStatus::Success);
    assert_eq!(outcome.status(true), RunStatus::Failure);
}

#[test]
fn identical_input_gives_identical_diagnostics() {
    let fixture = CorpusFixture::with_enums();
    fixture.write_hierarchy(SPLIT_TEAMS);
    for name in ["d", "b", "a", "c"] {
        fixture.write_skill(name, &["frontend"], "delegates_to:\n  - svc-x\n");
    }
    fixture.write_skill("svc-x", &["backend"], "");

    let first = fixture.engine().validate().unwrap();
    let second = fixture.engine().validate().unwrap();
    assert_eq!(first.diagnostics, second.diagnostics);

    let subjects: Vec<&str> = with_code(&first.diagnostics, ErrorCode::HandoffIncompatible)
        .iter()
        .map(|d| d.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["a", "b", "c", "d"]);
}

#[test]
fn missing_enum_files_are_explained() {
    let fixture = CorpusFixture::standard();
    fixture.remove("_meta/schema/skills/enums/factory.yaml");

    let outcome = fixture.engine().validate().unwrap();
    let missing = with_code(&outcome.diagnostics, ErrorCode::ConfigNotFound);
    assert_eq!(missing.len(), 1);
    assert!(!missing[0].is_error());
    assert_eq!(
        missing[0].path.as_deref(),
        Some("src/_meta/schema/skills/enums/factory.yaml")
    );
}
