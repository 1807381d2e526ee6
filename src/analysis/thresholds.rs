//! Data-dependent thresholds.
//!
//! Fixed cut-offs misfire on both tiny and very large projects, so the hub
//! threshold and the centrality thresholds are derived from the snapshot
//! being analyzed.

use serde::{Deserialize, Serialize};

const HUB_AVERAGE_MULTIPLIER: f64 = 2.5;
const HUB_MIN_THRESHOLD: usize = 5;
const HUB_MAX_THRESHOLD: usize = 50;

/// Fan-in above which a function counts as a hub.
///
/// The largest of: 2.5× the average fan-in (at least 5), the 90th
/// percentile fan-in, and a floor based on project size. Capped at 50.
pub fn hub_threshold(fan_ins: &[usize]) -> usize {
    let average = if fan_ins.is_empty() {
        0.0
    } else {
        fan_ins.iter().sum::<usize>() as f64 / fan_ins.len() as f64
    };
    let from_average = ((HUB_AVERAGE_MULTIPLIER * average).ceil() as usize).max(HUB_MIN_THRESHOLD);

    let mut sorted = fan_ins.to_vec();
    sorted.sort_unstable();
    let p90 = percentile(&sorted, 0.9);

    from_average
        .max(p90)
        .max(project_size_floor(fan_ins.len()))
        .min(HUB_MAX_THRESHOLD)
}

/// Value at `floor(p × (n − 1))` of an ascending slice; 0 when empty
pub fn percentile(sorted: &[usize], p: f64) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx]
}

pub fn project_size_floor(function_count: usize) -> usize {
    match function_count {
        n if n > 1000 => 10,
        n if n > 500 => 8,
        n if n > 100 => 6,
        _ => 5,
    }
}

/// Normalized-score bars for "high" and "critical" centrality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralityThresholds {
    pub high: f64,
    pub critical: f64,
}

impl Default for CentralityThresholds {
    fn default() -> Self {
        Self {
            high: 0.90,
            critical: 0.95,
        }
    }
}

impl CentralityThresholds {
    /// Shift the base bars by score inequality and project size.
    ///
    /// Highly unequal distributions (Gini > 0.8) lower the bar, flat ones
    /// (Gini < 0.6) raise it. Small projects (< 100 functions) lower it again
    /// and large ones (> 1000) raise it.
    pub fn adaptive(gini: f64, function_count: usize) -> Self {
        let base = Self::default();

        let inequality_shift = if gini > 0.8 {
            -0.05
        } else if gini < 0.6 {
            0.03
        } else {
            0.0
        };
        let size_shift = if function_count < 100 {
            -0.05
        } else if function_count > 1000 {
            0.02
        } else {
            0.0
        };

        let shift = inequality_shift + size_shift;
        let high = (base.high + shift).clamp(0.5, 0.98);
        let critical = (base.critical + shift).clamp(high + 0.01, 0.99);
        Self { high, critical }
    }
}
