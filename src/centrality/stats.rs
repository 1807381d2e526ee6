//! Distribution statistics for centrality scores.

/// Population variance of `values`; 0 for an empty slice.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Gini coefficient of a non-negative distribution.
///
/// Uses `G = Σ (2i − n − 1)·x_(i) / (n · mean · (n − 1))` over values sorted
/// ascending with 1-based `i`, so a single non-zero value yields exactly 1.
/// Defined as 0 when `n ≤ 1` or the mean is 0.
pub fn gini_coefficient(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    // equal values: skip the weighted sum, which may not cancel exactly
    if sorted[0] == sorted[n - 1] {
        return 0.0;
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    if mean <= 0.0 {
        return 0.0;
    }

    let n_f = n as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (2.0 * (i as f64 + 1.0) - n_f - 1.0) * x)
        .sum();

    (weighted / (n_f * mean * (n_f - 1.0))).clamp(0.0, 1.0)
}
