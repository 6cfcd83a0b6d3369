use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Tarjan's algorithm over an adjacency list.
///
/// Components are returned sinks first (reverse topological order of the
/// condensation), each with its members sorted ascending.
#[must_use]
pub fn strongly_connected_components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let edges = adjacency.iter().enumerate().flat_map(|(from, targets)| {
        targets
            .iter()
            .map(move |&to| (NodeIndex::new(from), NodeIndex::new(to)))
    });

    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(adjacency.len(), 0);
    for _ in adjacency {
        graph.add_node(());
    }
    graph.extend_with_edges(edges);

    tarjan_scc(&graph)
        .into_iter()
        .map(|component| {
            let mut members: Vec<usize> = component.into_iter().map(NodeIndex::index).collect();
            members.sort_unstable();
            members
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut components: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        components.sort();
        components
    }

    #[test]
    fn acyclic_graph_has_singleton_components() {
        let adjacency = vec![vec![1], vec![2], vec![]];
        let components = strongly_connected_components(&adjacency);

        assert_eq!(components, vec![vec![2], vec![1], vec![0]]);
    }

    #[test]
    fn finds_cycle_and_tail() {
        // 0 -> 1 -> 2 -> 0, 2 -> 3
        let adjacency = vec![vec![1], vec![2], vec![0, 3], vec![]];
        let components = strongly_connected_components(&adjacency);

        assert_eq!(sorted(components.clone()), vec![vec![0, 1, 2], vec![3]]);
        assert_eq!(components[0], vec![3]);
    }

    #[test]
    fn two_separate_cycles() {
        let adjacency = vec![vec![1], vec![0], vec![3], vec![2, 0]];
        let components = strongly_connected_components(&adjacency);

        assert_eq!(sorted(components), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let n = 100_000;
        let adjacency: Vec<Vec<usize>> = (0..n)
            .map(|i| if i + 1 < n { vec![i + 1] } else { vec![] })
            .collect();

        assert_eq!(strongly_connected_components(&adjacency).len(), n);
    }
}
