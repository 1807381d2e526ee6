//! Structural analysis orchestration and data-dependent thresholds.

pub mod structural;
pub mod thresholds;

pub use structural::{AnalyzerStats, CentralityStrategy, StructuralAnalyzer};
pub use thresholds::{hub_threshold, percentile, project_size_floor, CentralityThresholds};
