//! The aggregate result of one structural analysis.

use serde::{Deserialize, Serialize};

use crate::centrality::{LayeredPageRankResult, PageRankSummary};
use crate::graph::{DependencyMetric, DependencyMetrics, GraphBuildStats, SccResult};
use crate::risk::{RiskLevel, StructuralPenaltyBreakdown, StructuralRiskAssessment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Dependency metrics, SCC, PageRank and scoring
    Full,
    /// PageRank and layered analysis skipped for an oversized graph
    Simplified,
    /// The analysis raised an error; counts are zeroed
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SccSummary {
    pub total_components: usize,
    pub largest_component_size: usize,
    pub cyclic_function_count: usize,
    pub cyclic_function_ids: Vec<String>,
    /// Cyclic components, largest first
    pub cycles: Vec<Vec<String>>,
}

impl SccSummary {
    pub fn from_result(scc: &SccResult) -> Self {
        Self {
            total_components: scc.total_components,
            largest_component_size: scc.largest_component_size,
            cyclic_function_count: scc.cyclic_function_ids.len(),
            cyclic_function_ids: scc.cyclic_function_ids.clone(),
            cycles: scc.cycles().into_iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanRanking {
    pub function_id: String,
    pub count: usize,
}

impl FanRanking {
    fn fan_in(metric: &DependencyMetric) -> Self {
        Self {
            function_id: metric.function_id.clone(),
            count: metric.fan_in,
        }
    }

    fn fan_out(metric: &DependencyMetric) -> Self {
        Self {
            function_id: metric.function_id.clone(),
            count: metric.fan_out,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencySummary {
    pub average_fan_in: f64,
    pub average_fan_out: f64,
    pub max_fan_in: usize,
    pub max_fan_out: usize,
    pub total_fan_in: usize,
    pub total_fan_out: usize,
    pub entry_point_count: usize,
    pub hub_threshold: usize,
    /// Fan-in strictly above `hub_threshold`, highest first
    pub hub_function_ids: Vec<String>,
    pub top_fan_in: Vec<FanRanking>,
    pub top_fan_out: Vec<FanRanking>,
}

impl DependencySummary {
    pub fn from_metrics(metrics: &DependencyMetrics, hub_threshold: usize, top_n: usize) -> Self {
        Self {
            average_fan_in: metrics.average_fan_in(),
            average_fan_out: metrics.average_fan_out(),
            max_fan_in: metrics.max_fan_in(),
            max_fan_out: metrics.max_fan_out(),
            total_fan_in: metrics.total_fan_in(),
            total_fan_out: metrics.total_fan_out(),
            entry_point_count: metrics.entry_point_count(),
            hub_threshold,
            hub_function_ids: metrics
                .hubs(hub_threshold)
                .into_iter()
                .map(|m| m.function_id.clone())
                .collect(),
            top_fan_in: metrics
                .top_by_fan_in(top_n)
                .into_iter()
                .map(FanRanking::fan_in)
                .collect(),
            top_fan_out: metrics
                .top_by_fan_out(top_n)
                .into_iter()
                .map(FanRanking::fan_out)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralMetrics {
    pub snapshot_id: String,
    pub mode: AnalysisMode,
    pub function_count: usize,
    /// Distinct (caller, callee) pairs between known functions
    pub edge_count: usize,
    pub graph: GraphBuildStats,
    pub scc: SccSummary,
    pub dependencies: DependencySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagerank: Option<PageRankSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layered: Option<LayeredPageRankResult>,
    pub penalty: StructuralPenaltyBreakdown,
    pub structural_risk: RiskLevel,
    pub risk_points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_after_ms: Option<u64>,
    pub computed_in_ms: u64,
}

impl StructuralMetrics {
    /// Zeroed metrics with a low risk tier
    pub fn empty(snapshot_id: impl Into<String>) -> Self {
        let assessment = StructuralRiskAssessment::default();
        Self {
            snapshot_id: snapshot_id.into(),
            mode: AnalysisMode::Full,
            function_count: 0,
            edge_count: 0,
            graph: GraphBuildStats::default(),
            scc: SccSummary::default(),
            dependencies: DependencySummary::default(),
            pagerank: None,
            layered: None,
            penalty: assessment.penalty,
            structural_risk: assessment.level,
            risk_points: assessment.risk_points,
            analysis_error: None,
            failed_after_ms: None,
            computed_in_ms: 0,
        }
    }

    /// Stand-in returned when the analysis raised an error
    pub fn failed(snapshot_id: impl Into<String>, error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            mode: AnalysisMode::Failed,
            analysis_error: Some(error.into()),
            failed_after_ms: Some(elapsed_ms),
            computed_in_ms: elapsed_ms,
            ..Self::empty(snapshot_id)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.mode == AnalysisMode::Failed
    }

    pub fn hub_function_ids(&self) -> &[String] {
        &self.dependencies.hub_function_ids
    }

    pub fn cyclic_function_ids(&self) -> &[String] {
        &self.scc.cyclic_function_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics_are_low_risk() {
        let metrics = StructuralMetrics::empty("snap");
        assert_eq!(metrics.structural_risk, RiskLevel::Low);
        assert_eq!(metrics.penalty.total, 0.0);
        assert_eq!(metrics.scc.total_components, 0);
        assert!(!metrics.is_failed());
    }

    #[test]
    fn test_failed_metrics_carry_error() {
        let metrics = StructuralMetrics::failed("snap", "boom", 12);
        assert!(metrics.is_failed());
        assert_eq!(metrics.analysis_error.as_deref(), Some("boom"));
        assert_eq!(metrics.failed_after_ms, Some(12));
        assert_eq!(metrics.structural_risk, RiskLevel::Low);
    }

    #[test]
    fn test_failed_metrics_serialize_error_fields() {
        let json = serde_json::to_value(StructuralMetrics::failed("snap", "boom", 3)).unwrap();
        assert_eq!(json["mode"], "failed");
        assert_eq!(json["structural_risk"], "low");
        assert_eq!(json["analysis_error"], "boom");
        assert!(json.get("pagerank").is_none());
    }
}
