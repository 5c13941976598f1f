use std::collections::{BTreeSet, VecDeque};

use proptest::prelude::*;

use factory::FactoryError;
use factory::core::{PresetGraph, PresetNode};

fn preset(i: usize) -> String {
    format!("p{i}")
}

/// Parent lists where node `i` only inherits from nodes `j > i`.
pub fn arb_dag() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..10).prop_flat_map(|n| {
        (0..n)
            .map(move |i| {
                let later: Vec<usize> = ((i + 1)..n).collect();
                proptest::sample::subsequence(later.clone(), 0..=later.len())
            })
            .collect::<Vec<_>>()
    })
}

pub fn graph_from(parents: &[Vec<usize>]) -> PresetGraph {
    PresetGraph::new(
        parents
            .iter()
            .enumerate()
            .map(|(i, ps)| PresetNode::new(preset(i)).inheriting(ps.iter().map(|&p| preset(p)))),
    )
}

fn reachable(parents: &[Vec<usize>], start: usize) -> BTreeSet<String> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for &parent in &parents[node] {
            if seen.insert(parent) {
                queue.push_back(parent);
            }
        }
    }
    seen.into_iter().map(preset).collect()
}

proptest! {
    #[test]
    fn closure_matches_reachability(parents in arb_dag()) {
        let graph = graph_from(&parents);
        for i in 0..parents.len() {
            prop_assert_eq!(graph.resolve(&preset(i)).unwrap(), reachable(&parents, i));
        }
    }

    #[test]
    fn ancestors_of_inverts_closure(parents in arb_dag()) {
        let membership = graph_from(&parents).resolve_all().unwrap();
        for i in 0..parents.len() {
            let name = preset(i);
            for holder in membership.ancestors_of(&name) {
                prop_assert!(membership.closure(&holder).contains(&name));
            }
            prop_assert!(membership.ancestors_of(&name).contains(&name));
        }
    }

    #[test]
    fn any_ring_is_detected(ring in 1usize..6, tail in 0usize..4) {
        // p0 -> p1 -> ... -> p{ring-1} -> p0, plus tail nodes pointing into the ring
        let mut parents: Vec<Vec<usize>> = (0..ring).map(|i| vec![(i + 1) % ring]).collect();
        for _ in 0..tail {
            parents.push(vec![0]);
        }
        let graph = graph_from(&parents);

        for i in 0..parents.len() {
            match graph.resolve(&preset(i)) {
                Err(FactoryError::InheritanceCycle { cycle, .. }) => {
                    prop_assert!(cycle.len() >= 2);
                    prop_assert_eq!(cycle.first(), cycle.last());
                }
                other => prop_assert!(false, "expected cycle, got {:?}", other),
            }
        }
        prop_assert!(graph.resolve_all().is_err());
    }
}
