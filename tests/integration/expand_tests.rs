//! Include expansion against a real source tree.

use factory::FactoryError;
use factory::core::includes::missing_marker;
use factory::error::ErrorCode;
use factory::test_utils::CorpusFixture;

#[test]
fn missing_include_degrades_to_marker() {
    let fixture = CorpusFixture::standard();
    fixture.write(
        "workflows/release.md",
        "Steps:\n{{include: partials/gone.md}}\n{{include: partials/header.md}}",
    );

    let expansion = fixture.engine().expand_document("workflows/release.md").unwrap();
    assert_eq!(
        expansion.content,
        format!("Steps:\n{}\nShared header.\n", missing_marker("partials/gone.md"))
    );
    assert_eq!(expansion.diagnostics.len(), 1);
    assert_eq!(expansion.diagnostics[0].code, ErrorCode::IncludeNotFound);
    assert!(!expansion.diagnostics[0].is_error());
    assert_eq!(expansion.includes.iter().filter(|n| n.found).count(), 1);
}

#[test]
fn tree_expansion_continues_past_missing_targets() {
    let fixture = CorpusFixture::standard();
    fixture.write("workflows/broken.md", "{{include: partials/gone.md}}");

    let outcome = fixture.engine().expand_includes(None).unwrap();
    assert!(outcome.data.failed.is_empty());
    assert_eq!(outcome.data.files.len(), 5);
    let broken = outcome
        .data
        .files
        .iter()
        .find(|f| f.source == "workflows/broken.md")
        .unwrap();
    assert_eq!(broken.missing, 1);
    assert_eq!(outcome.error_count(), 0);
    assert_eq!(outcome.warning_count(), 1);
    assert_eq!(
        fixture.read(&fixture.dist_path(".agent/workflows/broken.md")),
        missing_marker("partials/gone.md")
    );
}

#[test]
fn expansion_is_idempotent_on_disk() {
    let fixture = CorpusFixture::standard();
    let engine = fixture.engine();
    let output = fixture.dist_path(".agent/skills/svc-a/SKILL.md");

    engine.expand_includes(None).unwrap();
    let first = fixture.read(&output);
    engine.expand_includes(None).unwrap();
    assert_eq!(first, fixture.read(&output));
}

#[test]
fn skip_dirs_and_hidden_entries_are_ignored() {
    let fixture = CorpusFixture::standard();
    fixture.write("skills/svc-a/examples/sample.md", "{{include: partials/gone.md}}");
    fixture.write("rules/.drafts/wip.md", "draft");

    let outcome = fixture.engine().expand_includes(None).unwrap();
    assert!(outcome.diagnostics.is_empty());
    assert!(outcome.data.files.iter().all(|f| !f.source.contains("examples")));
    assert!(outcome.data.files.iter().all(|f| !f.source.contains(".drafts")));
}

#[test]
fn missing_document_is_not_found() {
    let fixture = CorpusFixture::standard();
    let err = fixture.engine().expand_document("rules/absent.md").unwrap_err();
    assert!(matches!(err, FactoryError::NotFound(_)));
}
