use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Root configuration structure for structmap
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StructuralConfig {
    #[serde(default)]
    pub pagerank: PageRankConfig,

    #[serde(default)]
    pub layers: LayersConfig,

    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,

    #[serde(default)]
    pub analysis: AnalysisSettings,

    #[serde(default)]
    pub cache: CacheSettings,
}

/// Damped power-iteration settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageRankConfig {
    #[serde(default = "default_damping")]
    pub damping: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence threshold on the L1 delta between iterations
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Number of functions reported in centrality top lists
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            top_n: default_top_n(),
        }
    }
}

/// A named architectural layer and the path globs that select its files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerDefinition {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl LayerDefinition {
    pub fn new(name: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            name: name.into(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Layer-partitioned PageRank settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayersConfig {
    #[serde(default = "default_layers_enabled")]
    pub enabled: bool,

    /// Layered analysis is skipped for graphs with more edges than this
    #[serde(default = "default_layer_max_edges")]
    pub max_edges: usize,

    /// Cap on matrix-vector multiplications shared by all layers
    #[serde(default)]
    pub global_iteration_budget: Option<usize>,

    #[serde(default)]
    pub definitions: Vec<LayerDefinition>,
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            enabled: default_layers_enabled(),
            max_edges: default_layer_max_edges(),
            global_iteration_budget: None,
            definitions: Vec::new(),
        }
    }
}

impl LayersConfig {
    /// Whether layered analysis should run for a graph with `edge_count` edges
    pub fn applies_to(&self, edge_count: usize) -> bool {
        self.enabled && !self.definitions.is_empty() && edge_count <= self.max_edges
    }
}

/// Random-walk estimator settings for oversized layers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonteCarloConfig {
    #[serde(default = "default_walks_per_node")]
    pub walks_per_node: usize,

    #[serde(default = "default_max_walk_length")]
    pub max_walk_length: usize,

    /// Layers with more functions than this use random walks
    #[serde(default = "default_max_layer_functions")]
    pub max_layer_functions: usize,

    /// Layers with more intra-layer edges than this use random walks
    #[serde(default = "default_max_layer_edges")]
    pub max_layer_edges: usize,

    /// Fixed seed; without one, estimates differ between runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            walks_per_node: default_walks_per_node(),
            max_walk_length: default_max_walk_length(),
            max_layer_functions: default_max_layer_functions(),
            max_layer_edges: default_max_layer_edges(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSettings {
    /// Graphs with more non-external edges skip PageRank entirely
    #[serde(default = "default_simplified_edge_threshold")]
    pub simplified_edge_threshold: usize,

    #[serde(default)]
    pub exclude_intra_file_calls: bool,

    /// Length of the fan-in / fan-out rankings in the summary
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            simplified_edge_threshold: default_simplified_edge_threshold(),
            exclude_intra_file_calls: false,
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSettings {
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

impl StructuralConfig {
    /// Check value ranges and that every layer pattern compiles
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.pagerank.damping) {
            return Err(Error::Configuration(format!(
                "pagerank.damping must be in [0, 1], got {}",
                self.pagerank.damping
            )));
        }
        if self.pagerank.tolerance <= 0.0 || !self.pagerank.tolerance.is_finite() {
            return Err(Error::Configuration(format!(
                "pagerank.tolerance must be positive, got {}",
                self.pagerank.tolerance
            )));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(Error::Configuration(
                "cache.ttl_seconds must be greater than zero".to_string(),
            ));
        }
        if self.monte_carlo.walks_per_node == 0 || self.monte_carlo.max_walk_length == 0 {
            return Err(Error::Configuration(
                "monte_carlo walks_per_node and max_walk_length must be greater than zero"
                    .to_string(),
            ));
        }
        for layer in &self.layers.definitions {
            if layer.name.trim().is_empty() {
                return Err(Error::Configuration("layer name must not be empty".to_string()));
            }
            for pattern in &layer.patterns {
                glob::Pattern::new(pattern)?;
            }
        }
        Ok(())
    }
}

fn default_damping() -> f64 {
    0.85
}
fn default_max_iterations() -> usize {
    100
}
fn default_tolerance() -> f64 {
    1e-6
}
fn default_top_n() -> usize {
    10
}
fn default_layers_enabled() -> bool {
    true
}
fn default_layer_max_edges() -> usize {
    3000
}
fn default_walks_per_node() -> usize {
    10
}
fn default_max_walk_length() -> usize {
    50
}
fn default_max_layer_functions() -> usize {
    1200
}
fn default_max_layer_edges() -> usize {
    3000
}
fn default_simplified_edge_threshold() -> usize {
    3500
}
fn default_ttl_seconds() -> u64 {
    300
}
