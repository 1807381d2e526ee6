//! Call graph index over a snapshot's functions and call edges.
//!
//! Function ids are interned to dense indices so the SCC, dependency and
//! PageRank passes can work on plain adjacency vectors. Two views of every
//! function's calls are kept:
//!
//! - a deduplicated adjacency (one entry per distinct caller/callee pair),
//!   used for fan-in/fan-out and graph traversal
//! - raw call-site multiplicities, kept for reporting
//!
//! External calls (no callee) and calls to ids outside the function set are
//! terminal: they are counted per caller but never traversed.

pub mod dependency;
pub mod scc;

use crate::core::{CallEdge, FunctionRecord};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub use dependency::{DependencyCalculator, DependencyMetric, DependencyMetrics};
pub use scc::{SccAnalyzer, SccResult};

/// Options controlling which edges participate in the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphBuildOptions {
    /// Drop calls whose caller and callee live in the same file
    pub exclude_intra_file_calls: bool,
}

/// Edge bookkeeping collected while building the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphBuildStats {
    /// Every edge offered to the builder
    pub total_edges: usize,
    /// Call sites between two known functions that were kept
    pub resolved_call_sites: usize,
    /// Distinct (caller, callee) pairs that were kept
    pub distinct_edges: usize,
    /// Edges with no callee
    pub external_edges: usize,
    /// Edges whose callee id is not part of the function set
    pub unresolved_edges: usize,
    /// Edges dropped by the intra-file exclusion toggle
    pub excluded_intra_file_edges: usize,
}

#[derive(Debug, Clone)]
pub struct CallGraph {
    ids: Vec<String>,
    names: Vec<String>,
    files: Vec<String>,
    index: HashMap<String, usize>,
    callee_index: Vec<Vec<usize>>,
    caller_index: Vec<Vec<usize>>,
    call_sites_out: Vec<usize>,
    call_sites_in: Vec<usize>,
    external_calls: Vec<usize>,
    self_loops: Vec<bool>,
    stats: GraphBuildStats,
}

impl CallGraph {
    /// Build the graph from raw snapshot records.
    ///
    /// Fails only when an edge's caller is not a known function, which means
    /// the edge set and function set belong to different snapshots.
    pub fn build(
        functions: &[FunctionRecord],
        edges: &[CallEdge],
        options: GraphBuildOptions,
    ) -> Result<Self> {
        let mut graph = Self::with_functions(functions);
        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(edges.len());
        graph.stats.total_edges = edges.len();

        for edge in edges {
            let caller = graph
                .index
                .get(edge.caller_id.as_str())
                .copied()
                .ok_or_else(|| Error::unknown_function(edge.caller_id.clone()))?;

            let Some(callee_id) = edge.callee_id.as_deref() else {
                graph.stats.external_edges += 1;
                graph.external_calls[caller] += 1;
                continue;
            };

            let Some(&callee) = graph.index.get(callee_id) else {
                graph.stats.unresolved_edges += 1;
                graph.external_calls[caller] += 1;
                continue;
            };

            if options.exclude_intra_file_calls
                && caller != callee
                && graph.files[caller] == graph.files[callee]
            {
                graph.stats.excluded_intra_file_edges += 1;
                continue;
            }

            graph.add_call(caller, callee, &mut seen);
        }

        graph.stats.distinct_edges = seen.len();
        Ok(graph)
    }

    fn with_functions(functions: &[FunctionRecord]) -> Self {
        let mut graph = Self {
            ids: Vec::with_capacity(functions.len()),
            names: Vec::with_capacity(functions.len()),
            files: Vec::with_capacity(functions.len()),
            index: HashMap::with_capacity(functions.len()),
            callee_index: Vec::new(),
            caller_index: Vec::new(),
            call_sites_out: Vec::new(),
            call_sites_in: Vec::new(),
            external_calls: Vec::new(),
            self_loops: Vec::new(),
            stats: GraphBuildStats::default(),
        };

        for function in functions {
            if graph.index.contains_key(&function.id) {
                log::warn!("Duplicate function id '{}' ignored", function.id);
                continue;
            }
            graph.index.insert(function.id.clone(), graph.ids.len());
            graph.ids.push(function.id.clone());
            graph.names.push(function.name.clone());
            graph.files.push(function.normalized_path());
        }

        let n = graph.ids.len();
        graph.callee_index = vec![Vec::new(); n];
        graph.caller_index = vec![Vec::new(); n];
        graph.call_sites_out = vec![0; n];
        graph.call_sites_in = vec![0; n];
        graph.external_calls = vec![0; n];
        graph.self_loops = vec![false; n];
        graph
    }

    fn add_call(&mut self, caller: usize, callee: usize, seen: &mut HashSet<(usize, usize)>) {
        self.stats.resolved_call_sites += 1;
        self.call_sites_out[caller] += 1;
        self.call_sites_in[callee] += 1;

        if seen.insert((caller, callee)) {
            self.callee_index[caller].push(callee);
            self.caller_index[callee].push(caller);
            if caller == callee {
                self.self_loops[caller] = true;
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn distinct_edge_count(&self) -> usize {
        self.stats.distinct_edges
    }

    pub fn stats(&self) -> &GraphBuildStats {
        &self.stats
    }

    pub fn id(&self, node: usize) -> &str {
        &self.ids[node]
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    /// Normalized file path of a node
    pub fn file(&self, node: usize) -> &str {
        &self.files[node]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Distinct callees of a node, in first-seen edge order
    pub fn callees(&self, node: usize) -> &[usize] {
        &self.callee_index[node]
    }

    /// Distinct callers of a node, in first-seen edge order
    pub fn callers(&self, node: usize) -> &[usize] {
        &self.caller_index[node]
    }

    /// Deduplicated out-adjacency for every node
    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.callee_index
    }

    pub fn call_sites_out(&self, node: usize) -> usize {
        self.call_sites_out[node]
    }

    pub fn call_sites_in(&self, node: usize) -> usize {
        self.call_sites_in[node]
    }

    /// External and unresolved calls made by a node
    pub fn external_calls(&self, node: usize) -> usize {
        self.external_calls[node]
    }

    pub fn has_self_loop(&self, node: usize) -> bool {
        self.self_loops[node]
    }

    /// Iterate over distinct edges as `(caller, callee)` index pairs
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.callee_index
            .iter()
            .enumerate()
            .flat_map(|(caller, callees)| callees.iter().map(move |&callee| (caller, callee)))
    }
}
