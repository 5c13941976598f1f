use std::collections::BTreeSet;

use proptest::prelude::*;

use factory::core::SkillDescriptor;
use factory::derive::selection::select;

use crate::graph_props::{arb_dag, graph_from};

/// A preset DAG plus skills each declaring a few of its presets.
fn arb_corpus() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<Vec<usize>>)> {
    arb_dag().prop_flat_map(|parents| {
        let n = parents.len();
        let skills = prop::collection::vec(prop::collection::vec(0..n, 0..3), 0..8);
        (Just(parents), skills)
    })
}

fn skills_from(declared: &[Vec<usize>]) -> Vec<SkillDescriptor> {
    declared
        .iter()
        .enumerate()
        .map(|(i, presets)| SkillDescriptor {
            name: format!("skill-{i:02}"),
            presets: presets.iter().map(|p| format!("p{p}")).collect(),
            ..Default::default()
        })
        .collect()
}

fn targets(n: usize, picks: &[usize]) -> Vec<String> {
    picks.iter().map(|p| format!("p{}", p % n)).collect()
}

proptest! {
    #[test]
    fn selection_is_sorted_unique_subset(
        (parents, declared) in arb_corpus(),
        picks in prop::collection::vec(0usize..16, 1..4),
    ) {
        let membership = graph_from(&parents).resolve_all().unwrap();
        let skills = skills_from(&declared);
        let outcome = select(&skills, &membership, &targets(parents.len(), &picks));

        prop_assert!(outcome.diagnostics.is_empty());
        let selected = &outcome.data.skills;
        prop_assert!(selected.windows(2).all(|w| w[0] < w[1]));
        let known: BTreeSet<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        prop_assert!(selected.iter().all(|s| known.contains(s.as_str())));
        // Skills without presets never qualify.
        for skill in skills.iter().filter(|s| s.presets.is_empty()) {
            prop_assert!(!outcome.data.contains(&skill.name));
        }
    }

    #[test]
    fn selection_distributes_over_target_union(
        (parents, declared) in arb_corpus(),
        left in prop::collection::vec(0usize..16, 1..3),
        right in prop::collection::vec(0usize..16, 1..3),
    ) {
        let n = parents.len();
        let membership = graph_from(&parents).resolve_all().unwrap();
        let skills = skills_from(&declared);

        let a = select(&skills, &membership, &targets(n, &left)).data.skills;
        let b = select(&skills, &membership, &targets(n, &right)).data.skills;
        let mut both_targets = targets(n, &left);
        both_targets.extend(targets(n, &right));
        let both = select(&skills, &membership, &both_targets).data.skills;

        let union: BTreeSet<String> = a.into_iter().chain(b).collect();
        prop_assert_eq!(both, union.into_iter().collect::<Vec<_>>());
    }
}
