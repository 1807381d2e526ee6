//! Centrality analysis over the call graph.
//!
//! The flat engine ranks the whole graph in one power-iteration run. The
//! layered engine in [`layered`] ranks each architectural layer on its own.

pub mod layered;
pub mod layers;
pub mod monte_carlo;
pub mod pagerank;
pub mod stats;

use serde::{Deserialize, Serialize};

use crate::analysis::thresholds::CentralityThresholds;
use crate::config::PageRankConfig;
use crate::graph::CallGraph;

pub use layered::{
    layer_iteration_budget, LayerInsight, LayerPageRankResult, LayerPartition, LayeredPageRank,
    LayeredPageRankResult, ScoringMethod,
};
pub use layers::LayerMatcher;
pub use monte_carlo::MonteCarloEstimator;
pub use pagerank::{
    power_iteration, rank_scores, CentralityMetrics, Importance, PageRankScore, PowerIterationRun,
};

/// Whole-graph PageRank result with centrality post-processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRankSummary {
    /// Every function, best first
    pub scores: Vec<PageRankScore>,
    pub iterations: usize,
    pub converged: bool,
    pub final_delta: f64,
    pub centrality: CentralityMetrics,
    pub thresholds: CentralityThresholds,
    /// Normalized score at or above `thresholds.high`, below critical
    pub high_centrality_functions: Vec<String>,
    /// Normalized score at or above `thresholds.critical`
    pub critical_centrality_functions: Vec<String>,
}

impl PageRankSummary {
    pub fn score_of(&self, function_id: &str) -> Option<&PageRankScore> {
        self.scores.iter().find(|s| s.function_id == function_id)
    }
}

#[derive(Debug, Clone)]
pub struct PageRankEngine {
    config: PageRankConfig,
}

impl PageRankEngine {
    pub fn new(config: PageRankConfig) -> Self {
        Self { config }
    }

    pub fn compute(&self, graph: &CallGraph) -> PageRankSummary {
        let run = power_iteration(
            graph.adjacency(),
            self.config.damping,
            self.config.max_iterations,
            self.config.tolerance,
        );
        if !run.converged && !graph.is_empty() {
            log::debug!(
                "PageRank stopped after {} iterations without converging (delta {:.2e})",
                run.iterations,
                run.final_delta
            );
        }

        let scores = rank_scores(|node| graph.id(node), &run.scores);
        let centrality = CentralityMetrics::from_ranked(&scores, self.config.top_n);
        let thresholds = CentralityThresholds::adaptive(centrality.gini, graph.node_count());

        let mut high = Vec::new();
        let mut critical = Vec::new();
        for score in &scores {
            if score.normalized_score >= thresholds.critical {
                critical.push(score.function_id.clone());
            } else if score.normalized_score >= thresholds.high {
                high.push(score.function_id.clone());
            }
        }

        PageRankSummary {
            scores,
            iterations: run.iterations,
            converged: run.converged,
            final_delta: run.final_delta,
            centrality,
            thresholds,
            high_centrality_functions: high,
            critical_centrality_functions: critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallEdge, FunctionRecord};
    use crate::graph::GraphBuildOptions;

    fn star(leaves: usize) -> CallGraph {
        let mut functions = vec![FunctionRecord::new("hub", "hub", "src/hub.rs", 1, 20)];
        let mut edges = Vec::new();
        for i in 0..leaves {
            let id = format!("leaf{i}");
            functions.push(FunctionRecord::new(&id, &id, "src/leaves.rs", i + 1, i + 2));
            edges.push(CallEdge::new(id.as_str(), "hub"));
        }
        CallGraph::build(&functions, &edges, GraphBuildOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_graph_summary() {
        let graph = CallGraph::build(&[], &[], GraphBuildOptions::default()).unwrap();
        let summary = PageRankEngine::new(PageRankConfig::default()).compute(&graph);

        assert!(summary.scores.is_empty());
        assert!(summary.converged);
        assert_eq!(summary.centrality.gini, 0.0);
        assert!(summary.critical_centrality_functions.is_empty());
    }

    #[test]
    fn test_star_hub_is_critical() {
        let summary = PageRankEngine::new(PageRankConfig::default()).compute(&star(30));

        assert_eq!(summary.scores[0].function_id, "hub");
        assert_eq!(summary.scores[0].importance, Importance::Critical);
        assert_eq!(summary.critical_centrality_functions, vec!["hub".to_string()]);
        assert!(summary.high_centrality_functions.is_empty());
        assert!(summary.centrality.gini > 0.4);
        assert_eq!(summary.centrality.top_functions.len(), 10);

        let total: f64 = summary.scores.iter().map(|s| s.score).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_lookup() {
        let summary = PageRankEngine::new(PageRankConfig::default()).compute(&star(3));
        assert!(summary.score_of("leaf0").is_some());
        assert!(summary.score_of("missing").is_none());
    }
}
