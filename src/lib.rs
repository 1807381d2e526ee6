// Export modules for library usage
pub mod analysis;
pub mod cache;
pub mod centrality;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod graph;
pub mod io;
pub mod risk;

// Re-export commonly used types
pub use crate::core::{
    AnalysisMode, CallEdge, DependencySummary, FanRanking, FunctionMetricsBlock, FunctionRecord,
    SccSummary, StructuralMetrics,
};

pub use crate::analysis::{
    hub_threshold, AnalyzerStats, CentralityStrategy, CentralityThresholds, StructuralAnalyzer,
};

pub use crate::cache::{
    CacheEntryInfo, CacheStats, Clock, ManualClock, StructuralCache, SystemClock,
};

pub use crate::centrality::{
    CentralityMetrics, Importance, LayerInsight, LayerPageRankResult, LayeredPageRankResult,
    PageRankEngine, PageRankScore, PageRankSummary,
};

pub use crate::config::{load_config, StructuralConfig};

pub use crate::errors::{Error, Result};

pub use crate::graph::{
    CallGraph, DependencyCalculator, DependencyMetric, DependencyMetrics, GraphBuildOptions,
    SccAnalyzer, SccResult,
};

pub use crate::io::{InMemorySnapshotStore, JsonSnapshotFile, SnapshotStore};

pub use crate::risk::{RiskLevel, StructuralPenaltyBreakdown};
