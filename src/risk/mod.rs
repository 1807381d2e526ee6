pub mod structural;

pub use structural::{
    assess, cross_layer_penalty, fan_in_penalty, penalty_breakdown, risk_points, RiskLevel,
    StructuralPenaltyBreakdown, StructuralRiskAssessment, StructuralSignals, MAX_PENALTY,
};
