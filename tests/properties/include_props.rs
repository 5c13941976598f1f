use proptest::prelude::*;

use factory::core::includes::missing_marker;
use factory::core::{Expander, MemorySource};

fn file(i: usize) -> String {
    format!("partials/f{i}.md")
}

/// Text without directive syntax in it.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,\n#-]{0,40}"
}

/// Files `f0..fn` where `fi` may only include `fj` with `j > i`, plus the
/// occasional missing target.
fn arb_tree() -> impl Strategy<Value = Vec<(String, Vec<Option<usize>>)>> {
    (1usize..6).prop_flat_map(|n| {
        (0..n)
            .map(move |i| {
                let target = if i + 1 < n {
                    prop_oneof![
                        4 => ((i + 1)..n).prop_map(Some),
                        1 => Just(None),
                    ]
                    .boxed()
                } else {
                    Just(None).boxed()
                };
                (arb_text(), prop::collection::vec(target, 0..3))
            })
            .collect::<Vec<_>>()
    })
}

fn source_from(tree: &[(String, Vec<Option<usize>>)]) -> MemorySource {
    let mut source = MemorySource::new();
    for (i, (text, targets)) in tree.iter().enumerate() {
        let mut content = text.clone();
        for target in targets {
            let path = target.map_or_else(|| "partials/missing.md".to_string(), file);
            content.push_str(&format!("\n{{{{include: {path}}}}}\n"));
        }
        source.insert(file(i), content);
    }
    source
}

proptest! {
    #[test]
    fn expansion_is_deterministic(tree in arb_tree()) {
        let source = source_from(&tree);
        let expander = Expander::new(&source);
        let first = expander.expand(&file(0)).unwrap();
        let second = expander.expand(&file(0)).unwrap();
        prop_assert_eq!(&first.content, &second.content);
        prop_assert_eq!(first.includes, second.includes);
    }

    #[test]
    fn expanded_output_has_no_directives_left(tree in arb_tree()) {
        let source = source_from(&tree);
        let expansion = Expander::new(&source).expand(&file(0)).unwrap();
        prop_assert!(!expansion.content.contains("{{include:"));

        let missing = expansion.includes.iter().filter(|n| !n.found).count();
        prop_assert_eq!(expansion.diagnostics.len(), missing);
        prop_assert_eq!(
            expansion.content.matches(&missing_marker("partials/missing.md")).count(),
            missing
        );
    }

    #[test]
    fn plain_text_expands_to_itself(text in arb_text()) {
        let source = MemorySource::new().with("doc.md", text.clone());
        let expansion = Expander::new(&source).expand("doc.md").unwrap();
        prop_assert_eq!(expansion.content, text);
        prop_assert!(expansion.includes.is_empty());
    }
}
