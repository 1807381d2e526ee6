//! Structural penalty and risk tier.
//!
//! Independent signals (cycle size, cyclic functions, hubs, fan-in and
//! cross-layer traffic) each contribute a penalty. Functions that are both
//! hubs and cyclic would otherwise be charged twice, so part of the smaller
//! of the two penalties is given back before clamping the total to 50.
//!
//! The risk tier comes from a separate point table and does not depend on
//! the numeric penalty.

use serde::{Deserialize, Serialize};

pub const MAX_PENALTY: f64 = 50.0;

const COMPONENT_SIZE_ALLOWANCE: usize = 10;
const COMPONENT_WEIGHT: f64 = 2.0;
const CYCLIC_ALLOWANCE: usize = 5;
const CYCLIC_WEIGHT: f64 = 3.0;
const HUB_ALLOWANCE: usize = 20;
const HUB_WEIGHT: f64 = 1.0;
const FAN_IN_LINEAR_START: f64 = 10.0;
const FAN_IN_LINEAR_WEIGHT: f64 = 0.5;
const FAN_IN_MIN_BASELINE: usize = 15;
const FAN_IN_DEFAULT_HUB_THRESHOLD: usize = 10;
const FAN_IN_LOG_WEIGHT: f64 = 25.0;
const CROSS_LAYER_ALLOWANCE_PCT: f64 = 50.0;
const CROSS_LAYER_WEIGHT: f64 = 0.3;
const OVERLAP_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_points(points: u32) -> Self {
        match points {
            p if p >= 7 => RiskLevel::Critical,
            p if p >= 5 => RiskLevel::High,
            p if p >= 3 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Factor for downstream composite scores; not applied to the penalty
    pub fn multiplier(self) -> f64 {
        match self {
            RiskLevel::Low => 1.0,
            RiskLevel::Medium => 0.95,
            RiskLevel::High => 0.85,
            RiskLevel::Critical => 0.7,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Graph-level signals the scorer works from
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralSignals {
    pub largest_component_size: usize,
    pub cyclic_function_count: usize,
    pub hub_count: usize,
    pub hub_threshold: usize,
    /// Functions that are both hubs and cyclic
    pub hub_cyclic_overlap: usize,
    pub max_fan_in: usize,
    pub max_fan_out: usize,
    /// Share of layered edges that cross layers, when layers were analyzed
    pub cross_layer_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralPenaltyBreakdown {
    pub component_penalty: f64,
    pub cyclic_penalty: f64,
    pub hub_penalty: f64,
    pub fan_in_penalty: f64,
    pub cross_layer_penalty: f64,
    pub overlap_ratio: f64,
    pub overlap_adjustment: f64,
    /// Sum of the penalties minus the overlap adjustment, before clamping
    pub raw_total: f64,
    /// `raw_total` clamped to `[0, 50]`
    pub total: f64,
    pub risk_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructuralRiskAssessment {
    pub level: RiskLevel,
    pub risk_points: u32,
    pub penalty: StructuralPenaltyBreakdown,
}

impl Default for StructuralRiskAssessment {
    fn default() -> Self {
        assess(&StructuralSignals::default())
    }
}

pub fn assess(signals: &StructuralSignals) -> StructuralRiskAssessment {
    let risk_points = risk_points(signals);
    let level = RiskLevel::from_points(risk_points);
    let mut penalty = penalty_breakdown(signals);
    penalty.risk_multiplier = level.multiplier();
    StructuralRiskAssessment {
        level,
        risk_points,
        penalty,
    }
}

pub fn penalty_breakdown(signals: &StructuralSignals) -> StructuralPenaltyBreakdown {
    let component_penalty = excess(signals.largest_component_size, COMPONENT_SIZE_ALLOWANCE)
        * COMPONENT_WEIGHT;
    let cyclic_penalty = excess(signals.cyclic_function_count, CYCLIC_ALLOWANCE) * CYCLIC_WEIGHT;
    let hub_penalty = excess(signals.hub_count, HUB_ALLOWANCE) * HUB_WEIGHT;
    let fan_in_penalty = fan_in_penalty(signals.max_fan_in, signals.hub_threshold);
    let cross_layer_penalty = signals.cross_layer_ratio.map_or(0.0, cross_layer_penalty);

    let overlap = signals
        .hub_cyclic_overlap
        .min(signals.hub_count)
        .min(signals.cyclic_function_count);
    let overlap_ratio = overlap as f64
        / signals
            .hub_count
            .max(signals.cyclic_function_count)
            .max(1) as f64;
    let overlap_adjustment = hub_penalty.min(cyclic_penalty) * overlap_ratio * OVERLAP_WEIGHT;

    let raw_total = component_penalty
        + cyclic_penalty
        + hub_penalty
        + fan_in_penalty
        + cross_layer_penalty
        - overlap_adjustment;

    StructuralPenaltyBreakdown {
        component_penalty,
        cyclic_penalty,
        hub_penalty,
        fan_in_penalty,
        cross_layer_penalty,
        overlap_ratio,
        overlap_adjustment,
        raw_total,
        total: raw_total.clamp(0.0, MAX_PENALTY),
        risk_multiplier: 1.0,
    }
}

fn excess(value: usize, allowance: usize) -> f64 {
    value.saturating_sub(allowance) as f64
}

/// Linear up to the baseline, logarithmic beyond it.
///
/// The baseline is `max(15, hub_threshold)`, with a zero threshold read as
/// 10. The log branch starts from the linear value at the baseline so the
/// curve never steps down.
pub fn fan_in_penalty(max_fan_in: usize, hub_threshold: usize) -> f64 {
    let threshold = if hub_threshold == 0 {
        FAN_IN_DEFAULT_HUB_THRESHOLD
    } else {
        hub_threshold
    };
    let baseline = threshold.max(FAN_IN_MIN_BASELINE) as f64;
    let linear = |x: f64| ((x - FAN_IN_LINEAR_START) * FAN_IN_LINEAR_WEIGHT).max(0.0);

    let fan_in = max_fan_in as f64;
    let penalty = if fan_in <= baseline {
        linear(fan_in)
    } else {
        linear(baseline) + FAN_IN_LOG_WEIGHT * (fan_in / baseline).ln()
    };
    round_one_decimal(penalty)
}

pub fn cross_layer_penalty(ratio: f64) -> f64 {
    let pct = ratio * 100.0;
    if pct > CROSS_LAYER_ALLOWANCE_PCT {
        (pct - CROSS_LAYER_ALLOWANCE_PCT) * CROSS_LAYER_WEIGHT
    } else {
        0.0
    }
}

pub fn risk_points(signals: &StructuralSignals) -> u32 {
    let component = match signals.largest_component_size {
        s if s >= 20 => 3,
        s if s >= 10 => 2,
        s if s >= 5 => 1,
        _ => 0,
    };
    let cyclic = match signals.cyclic_function_count {
        c if c >= 30 => 3,
        c if c >= 15 => 2,
        c if c >= 5 => 1,
        _ => 0,
    };
    let hubs = match signals.hub_count {
        h if h >= 30 => 2,
        h if h >= 10 => 1,
        _ => 0,
    };
    let fan_in = match signals.max_fan_in {
        f if f >= 50 => 2,
        f if f >= 25 => 1,
        _ => 0,
    };
    let fan_out = u32::from(signals.max_fan_out >= 40);

    component + cyclic + hubs + fan_in + fan_out
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
