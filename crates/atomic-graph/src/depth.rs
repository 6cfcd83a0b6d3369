use std::collections::VecDeque;

/// Longest-path depth of every node, measured over the condensation so all
/// members of one component share a depth. Components with no incoming
/// edges sit at depth 0.
pub(crate) fn condensation_depths(adjacency: &[Vec<usize>], components: &[Vec<usize>]) -> Vec<usize> {
    let mut component_of = vec![0; adjacency.len()];
    for (c, members) in components.iter().enumerate() {
        for &m in members {
            component_of[m] = c;
        }
    }

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); components.len()];
    let mut in_degree = vec![0usize; components.len()];
    for (from, targets) in adjacency.iter().enumerate() {
        let cf = component_of[from];
        for &to in targets {
            let ct = component_of[to];
            if cf != ct && !successors[cf].contains(&ct) {
                successors[cf].push(ct);
                in_degree[ct] += 1;
            }
        }
    }

    let mut component_depth = vec![0usize; components.len()];
    let mut queue: VecDeque<usize> = (0..components.len()).filter(|&c| in_degree[c] == 0).collect();

    while let Some(c) = queue.pop_front() {
        for &next in &successors[c] {
            component_depth[next] = component_depth[next].max(component_depth[c] + 1);
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    component_of.iter().map(|&c| component_depth[c]).collect()
}
