//! Strongly connected component analysis of the call graph.
//!
//! Components are found with Kosaraju's algorithm using explicit stacks, so
//! call chains tens of thousands of functions deep cannot overflow the
//! thread stack. A component is cyclic when it has two or more members, or
//! when its single member calls itself.

use super::CallGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SccResult {
    /// Every component, members sorted by id
    pub components: Vec<Vec<String>>,
    /// Function id to index into `components`
    pub component_of: HashMap<String, usize>,
    pub largest_component_size: usize,
    pub total_components: usize,
    /// Members of cyclic components, in component order
    pub cyclic_function_ids: Vec<String>,
    /// Indices of components that form cycles
    pub cyclic_components: BTreeSet<usize>,
}

impl SccResult {
    pub fn is_cyclic(&self, function_id: &str) -> bool {
        self.component_of
            .get(function_id)
            .map(|&idx| self.cyclic_components.contains(&idx))
            .unwrap_or(false)
    }

    /// Components that form cycles, largest first
    pub fn cycles(&self) -> Vec<&Vec<String>> {
        let mut cycles: Vec<_> = self
            .cyclic_components
            .iter()
            .map(|&idx| &self.components[idx])
            .collect();
        cycles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        cycles
    }

    pub fn cyclic_function_set(&self) -> HashSet<String> {
        self.cyclic_function_ids.iter().cloned().collect()
    }
}

/// Partitions a [`CallGraph`] into strongly connected components.
#[derive(Debug, Default, Clone, Copy)]
pub struct SccAnalyzer;

impl SccAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, graph: &CallGraph) -> SccResult {
        let raw = find_components(graph.adjacency());

        let mut components = Vec::with_capacity(raw.len());
        let mut component_of = HashMap::with_capacity(graph.node_count());
        let mut cyclic_components = BTreeSet::new();
        let mut cyclic_function_ids = Vec::new();
        let mut largest_component_size = 0;

        for (idx, members) in raw.into_iter().enumerate() {
            let is_cyclic = members.len() > 1 || graph.has_self_loop(members[0]);
            let mut ids: Vec<String> = members.iter().map(|&n| graph.id(n).to_string()).collect();
            ids.sort();

            for id in &ids {
                component_of.insert(id.clone(), idx);
            }
            if is_cyclic {
                cyclic_components.insert(idx);
                cyclic_function_ids.extend(ids.iter().cloned());
            }
            largest_component_size = largest_component_size.max(ids.len());
            components.push(ids);
        }

        SccResult {
            total_components: components.len(),
            components,
            component_of,
            largest_component_size,
            cyclic_function_ids,
            cyclic_components,
        }
    }
}

/// Find strongly connected components of a dense adjacency list.
///
/// Every node appears in exactly one returned component.
pub fn find_components(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = adj.len();
    let mut visited = vec![false; n];
    let mut finish_order = Vec::with_capacity(n);

    for start in 0..n {
        if !visited[start] {
            dfs_finish(start, adj, &mut visited, &mut finish_order);
        }
    }

    let mut reverse_adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (from, neighbors) in adj.iter().enumerate() {
        for &to in neighbors {
            reverse_adj[to].push(from);
        }
    }

    visited.fill(false);
    let mut components = Vec::new();
    for &node in finish_order.iter().rev() {
        if !visited[node] {
            let mut component = Vec::new();
            dfs_collect(node, &reverse_adj, &mut visited, &mut component);
            components.push(component);
        }
    }

    components
}

/// Iterative DFS recording nodes in post-order
fn dfs_finish(start: usize, adj: &[Vec<usize>], visited: &mut [bool], finish_order: &mut Vec<usize>) {
    // (node, next neighbor index to inspect)
    let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
    visited[start] = true;

    while let Some(frame) = stack.last_mut() {
        let (node, next) = *frame;
        match adj[node][next..].iter().position(|&m| !visited[m]) {
            Some(offset) => {
                let neighbor = adj[node][next + offset];
                frame.1 = next + offset + 1;
                visited[neighbor] = true;
                stack.push((neighbor, 0));
            }
            None => {
                stack.pop();
                finish_order.push(node);
            }
        }
    }
}

/// Iterative DFS over the reversed graph collecting one component
fn dfs_collect(start: usize, adj: &[Vec<usize>], visited: &mut [bool], component: &mut Vec<usize>) {
    let mut stack = vec![start];
    visited[start] = true;

    while let Some(node) = stack.pop() {
        component.push(node);
        for &neighbor in &adj[node] {
            if !visited[neighbor] {
                visited[neighbor] = true;
                stack.push(neighbor);
            }
        }
    }
}
