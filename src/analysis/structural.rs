//! Structural analysis pipeline for one snapshot.
//!
//! Loads functions and edges, consults the cache by snapshot id and edge-set
//! hash, and on a miss runs call graph construction, SCC detection,
//! dependency metrics, centrality and scoring. Graphs above the simplified
//! edge threshold skip centrality entirely.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use super::thresholds::hub_threshold;
use crate::cache::{
    config_fingerprint, edge_set_hash, entry_point_fingerprint, CacheOutcome, StructuralCache,
};
use crate::centrality::{LayerMatcher, LayeredPageRank, PageRankEngine};
use crate::config::StructuralConfig;
use crate::core::{
    AnalysisMode, CallEdge, DependencySummary, FunctionRecord, SccSummary, StructuralMetrics,
};
use crate::errors::{Result, ResultExt};
use crate::graph::{CallGraph, DependencyCalculator, GraphBuildOptions, SccAnalyzer};
use crate::io::SnapshotStore;
use crate::risk::{assess, StructuralSignals};

/// How centrality is computed for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralityStrategy {
    /// One PageRank over the whole graph
    Flat,
    /// Whole-graph PageRank plus an independent run per layer
    Layered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalyzerStats {
    pub full_runs: u64,
    pub simplified_runs: u64,
    pub cache_hits: u64,
    pub failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    full_runs: AtomicU64,
    simplified_runs: AtomicU64,
    cache_hits: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug)]
pub struct StructuralAnalyzer {
    config: StructuralConfig,
    config_hash: u64,
    layers: LayerMatcher,
    entry_points: HashSet<String>,
    cache: Arc<StructuralCache>,
    counters: Counters,
}

impl StructuralAnalyzer {
    /// Analyzer with its own cache, using the configured TTL
    pub fn new(config: StructuralConfig) -> Result<Self> {
        let ttl = Duration::from_secs(config.cache.ttl_seconds);
        Self::with_cache(config, Arc::new(StructuralCache::new(ttl)))
    }

    /// Analyzer sharing an existing cache handle
    pub fn with_cache(config: StructuralConfig, cache: Arc<StructuralCache>) -> Result<Self> {
        config.validate()?;
        let layers = LayerMatcher::compile(&config.layers.definitions)
            .context("Failed to compile layer patterns")?;
        Ok(Self {
            config_hash: config_fingerprint(&config),
            config,
            layers,
            entry_points: HashSet::new(),
            cache,
            counters: Counters::default(),
        })
    }

    /// Known entry points; when empty they are inferred from the graph
    pub fn with_entry_points(mut self, entry_points: HashSet<String>) -> Self {
        self.config_hash =
            config_fingerprint(&self.config) ^ entry_point_fingerprint(&entry_points);
        self.entry_points = entry_points;
        self
    }

    pub fn config(&self) -> &StructuralConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<StructuralCache> {
        &self.cache
    }

    pub fn stats(&self) -> AnalyzerStats {
        AnalyzerStats {
            full_runs: self.counters.full_runs.load(Ordering::Relaxed),
            simplified_runs: self.counters.simplified_runs.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    pub fn strategy_for(&self, edge_count: usize) -> CentralityStrategy {
        if self.config.layers.applies_to(edge_count) {
            CentralityStrategy::Layered
        } else {
            CentralityStrategy::Flat
        }
    }

    /// Analyze a stored snapshot. Failures come back as failed metrics.
    pub fn analyze<S>(&self, store: &S, snapshot_id: &str) -> StructuralMetrics
    where
        S: SnapshotStore + ?Sized,
    {
        let start = Instant::now();
        self.try_analyze(store, snapshot_id)
            .unwrap_or_else(|e| self.failed(snapshot_id, &e.to_string(), start))
    }

    pub fn try_analyze<S>(&self, store: &S, snapshot_id: &str) -> Result<StructuralMetrics>
    where
        S: SnapshotStore + ?Sized,
    {
        let functions = store.functions(snapshot_id)?;
        let edges = store.call_edges(snapshot_id)?;
        self.try_analyze_graph(snapshot_id, &functions, &edges)
    }

    /// Analyze records the caller already holds. Failures come back as
    /// failed metrics.
    pub fn analyze_graph(
        &self,
        snapshot_id: &str,
        functions: &[FunctionRecord],
        edges: &[CallEdge],
    ) -> StructuralMetrics {
        let start = Instant::now();
        self.try_analyze_graph(snapshot_id, functions, edges)
            .unwrap_or_else(|e| self.failed(snapshot_id, &e.to_string(), start))
    }

    pub fn try_analyze_graph(
        &self,
        snapshot_id: &str,
        functions: &[FunctionRecord],
        edges: &[CallEdge],
    ) -> Result<StructuralMetrics> {
        let edge_hash = edge_set_hash(edges);
        let (metrics, outcome) =
            self.cache
                .get_or_compute(snapshot_id, edge_hash, self.config_hash, || {
                    self.compute(snapshot_id, functions, edges)
                })?;

        if outcome == CacheOutcome::Hit {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(metrics)
    }

    fn failed(&self, snapshot_id: &str, error: &str, start: Instant) -> StructuralMetrics {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        self.counters.failures.fetch_add(1, Ordering::Relaxed);
        warn!(
            snapshot = snapshot_id,
            elapsed_ms, "Structural analysis failed after {}ms: {}", elapsed_ms, error
        );
        StructuralMetrics::failed(snapshot_id, error, elapsed_ms)
    }

    /// Run the full pipeline without consulting the cache
    pub fn compute(
        &self,
        snapshot_id: &str,
        functions: &[FunctionRecord],
        edges: &[CallEdge],
    ) -> Result<StructuralMetrics> {
        let start = Instant::now();
        let span = info_span!(
            "structural_analysis",
            snapshot = snapshot_id,
            functions = functions.len(),
            edges = edges.len(),
        );
        let _guard = span.enter();

        let graph = {
            let _span = info_span!("call_graph_building").entered();
            let options = GraphBuildOptions {
                exclude_intra_file_calls: self.config.analysis.exclude_intra_file_calls,
            };
            CallGraph::build(functions, edges, options)
                .context(format!("Failed to build call graph for snapshot {}", snapshot_id))?
        };
        let stats = graph.stats().clone();
        let internal_edges = stats.total_edges - stats.external_edges;
        let simplified = internal_edges > self.config.analysis.simplified_edge_threshold;

        let scc = {
            let _span = info_span!("scc_analysis").entered();
            let scc = SccAnalyzer::new().analyze(&graph);
            debug!(
                components = scc.total_components,
                largest = scc.largest_component_size,
                "SCC analysis complete"
            );
            scc
        };

        let dependencies = {
            let _span = info_span!("dependency_metrics").entered();
            let cyclic = scc.cyclic_function_set();
            DependencyCalculator::new()
                .with_entry_points(&self.entry_points)
                .with_cyclic_functions(&cyclic)
                .calculate(&graph)
        };
        let threshold = hub_threshold(&dependencies.fan_in_values());
        let dependency_summary =
            DependencySummary::from_metrics(&dependencies, threshold, self.config.analysis.top_n);

        let (pagerank, layered) = if simplified {
            info!(
                edges = internal_edges,
                threshold = self.config.analysis.simplified_edge_threshold,
                "Large call graph, skipping centrality analysis"
            );
            (None, None)
        } else {
            let _span = info_span!("centrality").entered();
            let flat = PageRankEngine::new(self.config.pagerank.clone()).compute(&graph);
            let layered = match self.strategy_for(internal_edges) {
                CentralityStrategy::Layered => Some(
                    LayeredPageRank::new(&self.layers, &self.config.pagerank, &self.config.monte_carlo)
                        .with_iteration_budget(self.config.layers.global_iteration_budget)
                        .run(&graph),
                ),
                CentralityStrategy::Flat => None,
            };
            (Some(flat), layered)
        };

        let assessment = {
            let _span = info_span!("structural_scoring").entered();
            let hub_cyclic_overlap = dependencies
                .hubs(threshold)
                .iter()
                .filter(|m| m.is_cyclic)
                .count();
            assess(&StructuralSignals {
                largest_component_size: scc.largest_component_size,
                cyclic_function_count: scc.cyclic_function_ids.len(),
                hub_count: dependency_summary.hub_function_ids.len(),
                hub_threshold: threshold,
                hub_cyclic_overlap,
                max_fan_in: dependency_summary.max_fan_in,
                max_fan_out: dependency_summary.max_fan_out,
                cross_layer_ratio: layered.as_ref().map(|l| l.cross_layer_ratio),
            })
        };

        let mode = if simplified {
            self.counters.simplified_runs.fetch_add(1, Ordering::Relaxed);
            AnalysisMode::Simplified
        } else {
            self.counters.full_runs.fetch_add(1, Ordering::Relaxed);
            AnalysisMode::Full
        };

        let computed_in_ms = start.elapsed().as_millis() as u64;
        info!(
            snapshot = snapshot_id,
            risk = %assessment.level,
            penalty = assessment.penalty.total,
            computed_in_ms,
            "Structural analysis complete"
        );

        Ok(StructuralMetrics {
            snapshot_id: snapshot_id.to_string(),
            mode,
            function_count: graph.node_count(),
            edge_count: graph.distinct_edge_count(),
            graph: stats,
            scc: SccSummary::from_result(&scc),
            dependencies: dependency_summary,
            pagerank,
            layered,
            penalty: assessment.penalty,
            structural_risk: assessment.level,
            risk_points: assessment.risk_points,
            analysis_error: None,
            failed_after_ms: None,
            computed_in_ms,
        })
    }
}
