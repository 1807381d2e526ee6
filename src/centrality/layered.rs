//! Layer-partitioned PageRank.
//!
//! Functions are assigned to architectural layers by file path. A single pass
//! over the graph's edges sorts every edge into intra-layer, cross-layer or
//! unassigned traffic and builds one local adjacency per layer. Each layer is
//! then ranked on its own: exact power iteration under an allocated iteration
//! budget, or random-walk estimation once the layer grows too large.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::layers::LayerMatcher;
use super::monte_carlo::MonteCarloEstimator;
use super::pagerank::{power_iteration, rank_scores, CentralityMetrics, PageRankScore};
use crate::config::{MonteCarloConfig, PageRankConfig};
use crate::graph::CallGraph;

const MIN_LAYER_ITERATIONS: usize = 8;
const MAX_LAYER_ITERATIONS: usize = 40;
const LAYER_TOP_N: usize = 5;

const HIGHLY_UNEQUAL_GINI: f64 = 0.7;
const WELL_DISTRIBUTED_GINI: f64 = 0.4;
const BOTTLENECK_SHARE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    PowerIteration,
    MonteCarlo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPageRankResult {
    pub layer: String,
    pub function_count: usize,
    pub intra_edges: usize,
    pub method: ScoringMethod,
    /// Power iterations performed; 0 for random-walk estimates
    pub iterations: usize,
    pub converged: bool,
    pub scores: Vec<PageRankScore>,
    pub top_functions: Vec<PageRankScore>,
    pub average_score: f64,
    pub max_score: f64,
    pub gini: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerInsight {
    HighlyUnequal { layer: String, gini: f64 },
    WellDistributed { layer: String, gini: f64 },
    PotentialBottleneck {
        layer: String,
        function_id: String,
        share: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayeredPageRankResult {
    pub layers: Vec<LayerPageRankResult>,
    pub intra_layer_edges: usize,
    pub cross_layer_edges: usize,
    /// Edges with at least one endpoint outside every layer
    pub unassigned_edges: usize,
    pub unassigned_functions: usize,
    /// `cross / (intra + cross)`, in [0, 1]
    pub cross_layer_ratio: f64,
    pub average_gini: f64,
    pub total_iterations: usize,
    pub iteration_budget: Option<usize>,
    /// Seed used for random-walk layers, if any layer needed one
    pub monte_carlo_seed: Option<u64>,
    pub insights: Vec<LayerInsight>,
}

/// Functions and intra-layer adjacency of one layer, in local indices
#[derive(Debug, Clone, Default)]
struct LayerSlice {
    members: Vec<usize>,
    adjacency: Vec<Vec<usize>>,
    edge_count: usize,
}

/// Result of classifying every node and edge of a graph by layer
#[derive(Debug, Clone, Default)]
pub struct LayerPartition {
    slices: Vec<LayerSlice>,
    pub intra_edges: usize,
    pub cross_edges: usize,
    pub unassigned_edges: usize,
    pub unassigned_functions: usize,
}

impl LayerPartition {
    pub fn classify(graph: &CallGraph, matcher: &LayerMatcher) -> Self {
        let mut partition = Self {
            slices: vec![LayerSlice::default(); matcher.len()],
            ..Self::default()
        };

        let mut local = vec![0usize; graph.node_count()];
        let assignment: Vec<Option<usize>> = (0..graph.node_count())
            .map(|node| matcher.layer_of(graph.file(node)))
            .collect();

        for (node, layer) in assignment.iter().enumerate() {
            match layer {
                Some(layer) => {
                    let slice = &mut partition.slices[*layer];
                    local[node] = slice.members.len();
                    slice.members.push(node);
                    slice.adjacency.push(Vec::new());
                }
                None => partition.unassigned_functions += 1,
            }
        }

        for (caller, callee) in graph.edges() {
            match (assignment[caller], assignment[callee]) {
                (Some(a), Some(b)) if a == b => {
                    let slice = &mut partition.slices[a];
                    slice.adjacency[local[caller]].push(local[callee]);
                    slice.edge_count += 1;
                    partition.intra_edges += 1;
                }
                (Some(_), Some(_)) => partition.cross_edges += 1,
                _ => partition.unassigned_edges += 1,
            }
        }

        partition
    }

    pub fn layer_size(&self, layer: usize) -> usize {
        self.slices[layer].members.len()
    }

    pub fn layer_edges(&self, layer: usize) -> usize {
        self.slices[layer].edge_count
    }

    pub fn cross_layer_ratio(&self) -> f64 {
        let total = self.intra_edges + self.cross_edges;
        if total == 0 {
            0.0
        } else {
            self.cross_edges as f64 / total as f64
        }
    }
}

/// Iterations allowed for one layer.
///
/// Without a global budget this is `max(8, min(40, 10 + ceil(log2(n))))`.
/// With one, the layer gets its share of the budget proportional to its
/// intra-layer edges, never more than the base and never fewer than 8.
pub fn layer_iteration_budget(
    layer_size: usize,
    layer_edges: usize,
    total_intra_edges: usize,
    global_budget: Option<usize>,
) -> usize {
    let log = if layer_size > 1 {
        (layer_size as f64).log2().ceil() as usize
    } else {
        0
    };
    let base = (10 + log).clamp(MIN_LAYER_ITERATIONS, MAX_LAYER_ITERATIONS);

    match global_budget {
        Some(budget) if total_intra_edges > 0 => {
            let share = (budget as f64 * layer_edges as f64 / total_intra_edges as f64).floor();
            (share as usize).min(base).max(MIN_LAYER_ITERATIONS)
        }
        _ => base,
    }
}

/// Runs PageRank independently for every configured layer
pub struct LayeredPageRank<'a> {
    matcher: &'a LayerMatcher,
    pagerank: &'a PageRankConfig,
    monte_carlo: &'a MonteCarloConfig,
    iteration_budget: Option<usize>,
}

impl<'a> LayeredPageRank<'a> {
    pub fn new(
        matcher: &'a LayerMatcher,
        pagerank: &'a PageRankConfig,
        monte_carlo: &'a MonteCarloConfig,
    ) -> Self {
        Self {
            matcher,
            pagerank,
            monte_carlo,
            iteration_budget: None,
        }
    }

    pub fn with_iteration_budget(mut self, budget: Option<usize>) -> Self {
        self.iteration_budget = budget;
        self
    }

    fn needs_estimation(&self, partition: &LayerPartition, layer: usize) -> bool {
        partition.layer_size(layer) > self.monte_carlo.max_layer_functions
            || partition.layer_edges(layer) > self.monte_carlo.max_layer_edges
    }

    pub fn run(&self, graph: &CallGraph) -> LayeredPageRankResult {
        let partition = LayerPartition::classify(graph, self.matcher);

        let any_estimated =
            (0..self.matcher.len()).any(|layer| self.needs_estimation(&partition, layer));
        let seed = any_estimated.then(|| self.monte_carlo.seed.unwrap_or_else(rand::random));
        if any_estimated && self.monte_carlo.seed.is_none() {
            log::debug!("No Monte-Carlo seed configured; layer estimates are not reproducible");
        }

        let layers: Vec<LayerPageRankResult> = (0..self.matcher.len())
            .into_par_iter()
            .filter(|&layer| partition.layer_size(layer) > 0)
            .map(|layer| self.rank_layer(graph, &partition, layer, seed))
            .collect();

        let average_gini = if layers.is_empty() {
            0.0
        } else {
            layers.iter().map(|l| l.gini).sum::<f64>() / layers.len() as f64
        };

        LayeredPageRankResult {
            intra_layer_edges: partition.intra_edges,
            cross_layer_edges: partition.cross_edges,
            unassigned_edges: partition.unassigned_edges,
            unassigned_functions: partition.unassigned_functions,
            cross_layer_ratio: partition.cross_layer_ratio(),
            average_gini,
            total_iterations: layers.iter().map(|l| l.iterations).sum(),
            iteration_budget: self.iteration_budget,
            monte_carlo_seed: seed,
            insights: layer_insights(&layers),
            layers,
        }
    }

    fn rank_layer(
        &self,
        graph: &CallGraph,
        partition: &LayerPartition,
        layer: usize,
        seed: Option<u64>,
    ) -> LayerPageRankResult {
        let slice = &partition.slices[layer];
        let name = self.matcher.name(layer);
        let _span =
            tracing::debug_span!("layer_pagerank", layer = name, functions = slice.members.len())
                .entered();

        let (scores, method, iterations, converged) = match seed {
            Some(seed) if self.needs_estimation(partition, layer) => {
                let estimator = MonteCarloEstimator::new(
                    self.monte_carlo.walks_per_node,
                    self.monte_carlo.max_walk_length,
                    self.pagerank.damping,
                );
                log::debug!(
                    "Estimating layer '{}' by random walks ({} steps)",
                    name,
                    estimator.step_budget(slice.members.len())
                );
                let mut rng = ChaCha8Rng::seed_from_u64(seed ^ layer as u64);
                let scores = estimator.estimate(&slice.adjacency, &mut rng);
                (scores, ScoringMethod::MonteCarlo, 0, true)
            }
            _ => {
                let budget = layer_iteration_budget(
                    slice.members.len(),
                    slice.edge_count,
                    partition.intra_edges,
                    self.iteration_budget,
                );
                let run = power_iteration(
                    &slice.adjacency,
                    self.pagerank.damping,
                    budget,
                    self.pagerank.tolerance,
                );
                (run.scores, ScoringMethod::PowerIteration, run.iterations, run.converged)
            }
        };

        let ranked = rank_scores(|local| graph.id(slice.members[local]), &scores);
        let centrality = CentralityMetrics::from_ranked(&ranked, LAYER_TOP_N);
        let max_score = ranked.first().map(|s| s.score).unwrap_or(0.0);
        let average_score = scores.iter().sum::<f64>() / scores.len().max(1) as f64;

        LayerPageRankResult {
            layer: name.to_string(),
            function_count: slice.members.len(),
            intra_edges: slice.edge_count,
            method,
            iterations,
            converged,
            top_functions: centrality.top_functions,
            average_score,
            max_score,
            gini: centrality.gini,
            scores: ranked,
        }
    }
}

fn layer_insights(layers: &[LayerPageRankResult]) -> Vec<LayerInsight> {
    let mut insights = Vec::new();

    for layer in layers {
        if layer.gini > HIGHLY_UNEQUAL_GINI {
            insights.push(LayerInsight::HighlyUnequal {
                layer: layer.layer.clone(),
                gini: layer.gini,
            });
        } else if layer.gini < WELL_DISTRIBUTED_GINI {
            insights.push(LayerInsight::WellDistributed {
                layer: layer.layer.clone(),
                gini: layer.gini,
            });
        }

        if layer.function_count < 2 {
            continue;
        }
        let total: f64 = layer.scores.iter().map(|s| s.score).sum();
        if let Some(top) = layer.scores.first().filter(|_| total > 0.0) {
            let share = top.score / total;
            if share > BOTTLENECK_SHARE {
                insights.push(LayerInsight::PotentialBottleneck {
                    layer: layer.layer.clone(),
                    function_id: top.function_id.clone(),
                    share,
                });
            }
        }
    }

    insights
}
