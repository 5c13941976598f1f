//! Full builds: generated artifacts, expansion output and the failure gate.

use factory::core::RunStatus;
use factory::error::ErrorCode;
use factory::test_utils::CorpusFixture;

#[test]
fn build_writes_artifacts_and_expanded_tree() {
    let fixture = CorpusFixture::standard();
    let outcome = fixture.engine().build(&[]).unwrap();
    let report = &outcome.data;

    assert!(outcome.diagnostics.is_empty());
    assert!(report.written);
    assert!(report.selection.is_none());
    assert!(report.artifacts.contains(&"src/_meta/generated/skill-matrix.yaml".to_string()));
    assert!(report.artifacts.contains(&"src/_meta/generated/teams/TEAM_backend.md".to_string()));
    assert!(
        report
            .artifacts
            .contains(&"src/_meta/generated/pipelines/PIPELINE_core.md".to_string())
    );

    let doc_types = fixture.read(&fixture.source_path("_meta/generated/doc-types.yaml"));
    assert!(doc_types.starts_with("# Generated by factory. Do not edit."));
    assert!(doc_types.contains("api-contract"));
    assert!(doc_types.contains("qa-lead"));

    let skill = fixture.read(&fixture.dist_path(".agent/skills/svc-a/SKILL.md"));
    assert!(skill.contains("Shared header."));
    assert!(!skill.contains("{{include"));

    let rules = fixture.read(&fixture.dist_path(".agent/rules/style.md"));
    assert_eq!(rules, "# Style\n\nShared header.\n\n");

    let sources: Vec<&str> = report.expanded.files.iter().map(|f| f.source.as_str()).collect();
    assert_eq!(
        sources,
        vec![
            "rules/style.md",
            "skills/qa-lead/SKILL.md",
            "skills/svc-a/SKILL.md",
            "skills/ui-kit/SKILL.md",
        ]
    );
}

#[test]
fn failing_validation_writes_nothing() {
    let fixture = CorpusFixture::standard();
    fixture.write_skill("lost", &["core"], "delegates_to:\n  - nobody\n");

    let outcome = fixture.engine().build(&[]).unwrap();
    assert!(!outcome.data.written);
    assert!(outcome.data.artifacts.is_empty());
    assert!(outcome.data.validation.errors > 0);
    assert_eq!(outcome.status(false), RunStatus::Failure);
    assert!(!fixture.source_path("_meta/generated").exists());
    assert!(!fixture.dist_path(".agent").exists());
}

#[test]
fn targeted_build_expands_only_selected_skills() {
    let fixture = CorpusFixture::standard();
    let outcome = fixture.engine().build(&["frontend".to_string()]).unwrap();
    let report = &outcome.data;

    let selection = report.selection.as_ref().unwrap();
    assert_eq!(selection.skills, vec!["qa-lead".to_string(), "ui-kit".to_string()]);
    assert!(fixture.dist_path(".agent/skills/ui-kit/SKILL.md").exists());
    assert!(fixture.dist_path(".agent/skills/qa-lead/SKILL.md").exists());
    assert!(!fixture.dist_path(".agent/skills/svc-a/SKILL.md").exists());
    // Shared roots are not filtered.
    assert!(fixture.dist_path(".agent/rules/style.md").exists());
}

#[test]
fn generated_artifacts_are_checked_when_enabled() {
    let fixture = CorpusFixture::standard();
    let engine = fixture.engine_with(|config| config.validate.check_generated = true);

    let before = engine.validate().unwrap();
    let missing: Vec<_> = before
        .diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::MissingArtifact)
        .collect();
    assert!(!missing.is_empty());
    assert!(missing.iter().all(|d| !d.is_error()));

    fixture.engine().build(&[]).unwrap();
    let fresh = engine.validate().unwrap();
    assert!(fresh.diagnostics.is_empty());

    fixture.write("_meta/generated/doc-types.yaml", "# hand edited\n");
    let stale = engine.validate().unwrap();
    assert_eq!(stale.diagnostics.len(), 1);
    assert_eq!(stale.diagnostics[0].code, ErrorCode::StaleArtifact);
    assert_eq!(stale.diagnostics[0].subject, "doc-types.yaml");
    assert!(stale.diagnostics[0].is_error());
}

#[test]
fn rebuild_is_byte_identical() {
    let fixture = CorpusFixture::standard();
    fixture.engine().build(&[]).unwrap();
    let matrix = fixture.read(&fixture.source_path("_meta/generated/skill-matrix.yaml"));
    let pipeline = fixture.read(&fixture.source_path("_meta/generated/pipelines/PIPELINE_backend.md"));

    fixture.engine().build(&[]).unwrap();
    assert_eq!(
        matrix,
        fixture.read(&fixture.source_path("_meta/generated/skill-matrix.yaml"))
    );
    assert_eq!(
        pipeline,
        fixture.read(&fixture.source_path("_meta/generated/pipelines/PIPELINE_backend.md"))
    );
}

#[test]
fn include_cycle_skips_only_affected_documents() {
    let fixture = CorpusFixture::standard();
    fixture.write("rules/a.md", "A {{include: rules/b.md}}");
    fixture.write("rules/b.md", "B {{include: rules/a.md}}");

    let outcome = fixture.engine().build(&[]).unwrap();
    let report = &outcome.data;
    assert!(report.written);
    assert_eq!(
        report.expanded.failed,
        vec!["rules/a.md".to_string(), "rules/b.md".to_string()]
    );
    let cycles = outcome
        .diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::IncludeCycle)
        .count();
    assert_eq!(cycles, 2);
    assert!(fixture.dist_path(".agent/rules/style.md").exists());
    assert!(!fixture.dist_path(".agent/rules/a.md").exists());
}

#[test]
fn targeted_build_after_full_build_drops_unselected_output() {
    let fixture = CorpusFixture::standard();
    fixture.engine().build(&[]).unwrap();
    assert!(fixture.dist_path(".agent/skills/ui-kit/SKILL.md").exists());

    let outcome = fixture.engine().build(&["backend".to_string()]).unwrap();
    let selection = outcome.data.selection.as_ref().unwrap();
    assert_eq!(selection.skills, vec!["qa-lead".to_string(), "svc-a".to_string()]);
    assert!(fixture.dist_path(".agent/skills/svc-a/SKILL.md").exists());
    assert!(fixture.dist_path(".agent/skills/qa-lead/SKILL.md").exists());
    assert!(!fixture.dist_path(".agent/skills/ui-kit/SKILL.md").exists());
}

#[test]
fn pages_of_removed_groups_are_pruned() {
    let fixture = CorpusFixture::standard();
    // Without a roster file drift is only a warning.
    fixture.remove("_meta/presets.yaml");
    fixture.write_hierarchy(&format!(
        "{}legacy:\n  description: Retired team\n",
        factory::test_utils::fixtures::HIERARCHY
    ));
    fixture.engine().build(&[]).unwrap();
    assert!(fixture.source_path("_meta/generated/teams/TEAM_legacy.md").exists());

    fixture.write_hierarchy(factory::test_utils::fixtures::HIERARCHY);
    fixture.engine().build(&[]).unwrap();
    assert!(!fixture.source_path("_meta/generated/teams/TEAM_legacy.md").exists());
    assert!(!fixture.source_path("_meta/generated/pipelines/PIPELINE_legacy.md").exists());
    assert!(fixture.source_path("_meta/generated/teams/TEAM_core.md").exists());
}
