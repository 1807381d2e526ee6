pub mod metrics;

use serde::{Deserialize, Serialize};

pub use metrics::{
    AnalysisMode, DependencySummary, FanRanking, SccSummary, StructuralMetrics,
};

/// Optional per-function metrics produced by the extraction collaborator.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FunctionMetricsBlock {
    #[serde(default)]
    pub cyclomatic_complexity: u32,
    #[serde(default)]
    pub cognitive_complexity: u32,
    #[serde(default)]
    pub lines_of_code: u32,
    #[serde(default)]
    pub max_nesting: u32,
    #[serde(default)]
    pub parameter_count: u32,
    #[serde(default)]
    pub comment_ratio: f64,
}

/// Identity and location of a single function in a snapshot.
///
/// Records are created by the extraction collaborator and are read-only to
/// the structural engine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionRecord {
    pub id: String,
    pub name: String,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<FunctionMetricsBlock>,
}

impl FunctionRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        file_path: impl Into<String>,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file_path: file_path.into(),
            start_line,
            end_line,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: FunctionMetricsBlock) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// File path with `/` separators, as matched by layer patterns.
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.file_path)
    }
}

/// Convert Windows separators to `/` and drop a leading `./`.
pub fn normalize_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    match replaced.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => replaced,
    }
}

/// A directed call from `caller_id` to `callee_id`.
///
/// A missing callee denotes an external or unresolved call target. Edges may
/// repeat when a caller invokes the same callee from several call sites.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CallEdge {
    pub caller_id: String,
    #[serde(default)]
    pub callee_id: Option<String>,
}

/// Placeholder used for external callees in normalized edge keys.
pub const EXTERNAL_CALLEE: &str = "<external>";

impl CallEdge {
    pub fn new(caller_id: impl Into<String>, callee_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            callee_id: Some(callee_id.into()),
        }
    }

    pub fn external(caller_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            callee_id: None,
        }
    }

    pub fn is_external(&self) -> bool {
        self.callee_id.is_none()
    }

    /// `"caller->callee"`, with external callees rendered as `<external>`.
    pub fn normalized_key(&self) -> String {
        format!(
            "{}->{}",
            self.caller_id,
            self.callee_id.as_deref().unwrap_or(EXTERNAL_CALLEE)
        )
    }
}
