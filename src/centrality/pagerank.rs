//! Damped power-iteration PageRank.
//!
//! `score_i(t+1) = (1 − d)/N + d · (Σ_{j→i} score_j(t)/out(j) + dangling(t)/N)`
//!
//! Dangling nodes spread their mass uniformly, so the scores sum to 1 after
//! every iteration. Running out of iterations is not an error: the best
//! available scores are returned with `converged = false`.

use serde::{Deserialize, Serialize};

use super::stats::{gini_coefficient, population_variance};

/// Outcome of one power-iteration run over a dense adjacency list
#[derive(Debug, Clone, PartialEq)]
pub struct PowerIterationRun {
    pub scores: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// L1 distance between the last two iterates
    pub final_delta: f64,
}

/// Run damped power iteration over `adj` (node → distinct successors).
pub fn power_iteration(
    adj: &[Vec<usize>],
    damping: f64,
    max_iterations: usize,
    tolerance: f64,
) -> PowerIterationRun {
    let n = adj.len();
    if n == 0 {
        return PowerIterationRun {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
            final_delta: 0.0,
        };
    }

    let n_f = n as f64;
    let teleport = (1.0 - damping) / n_f;
    let mut scores = vec![1.0 / n_f; n];
    let mut next = vec![0.0; n];
    let mut iterations = 0;
    let mut final_delta = f64::INFINITY;
    let mut converged = false;

    while iterations < max_iterations {
        let dangling: f64 = adj
            .iter()
            .zip(&scores)
            .filter(|(out, _)| out.is_empty())
            .map(|(_, score)| score)
            .sum();
        let base = teleport + damping * dangling / n_f;
        next.fill(base);

        for (node, out) in adj.iter().enumerate() {
            if out.is_empty() {
                continue;
            }
            let share = damping * scores[node] / out.len() as f64;
            for &target in out {
                next[target] += share;
            }
        }

        final_delta = scores.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut scores, &mut next);
        iterations += 1;

        if final_delta < tolerance {
            converged = true;
            break;
        }
    }

    if iterations == 0 {
        final_delta = 0.0;
    }

    PowerIterationRun {
        scores,
        iterations,
        converged,
        final_delta,
    }
}

/// Discrete importance tier derived from the raw PageRank score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Critical,
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn from_raw_score(score: f64) -> Self {
        if score > 0.1 {
            Importance::Critical
        } else if score > 0.05 {
            Importance::High
        } else if score > 0.02 {
            Importance::Medium
        } else {
            Importance::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRankScore {
    pub function_id: String,
    pub score: f64,
    /// 1-based, descending by score; ties broken by function id
    pub rank: usize,
    /// `score / max score`, in [0, 1]
    pub normalized_score: f64,
    pub importance: Importance,
}

/// Turn raw scores into ranked [`PageRankScore`]s, best first.
pub fn rank_scores<'a>(ids: impl Fn(usize) -> &'a str, scores: &[f64]) -> Vec<PageRankScore> {
    let max = scores.iter().copied().fold(0.0_f64, f64::max);

    let mut ranked: Vec<PageRankScore> = scores
        .iter()
        .enumerate()
        .map(|(node, &score)| PageRankScore {
            function_id: ids(node).to_string(),
            score,
            rank: 0,
            normalized_score: if max > 0.0 { (score / max).clamp(0.0, 1.0) } else { 0.0 },
            importance: Importance::from_raw_score(score),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.function_id.cmp(&b.function_id))
    });
    for (i, score) in ranked.iter_mut().enumerate() {
        score.rank = i + 1;
    }
    ranked
}

/// Inequality statistics over a ranked score list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralityMetrics {
    /// Population variance of the normalized scores
    pub variance: f64,
    /// Gini coefficient of the normalized scores
    pub gini: f64,
    pub top_functions: Vec<PageRankScore>,
}

impl CentralityMetrics {
    pub fn from_ranked(ranked: &[PageRankScore], top_n: usize) -> Self {
        let normalized: Vec<f64> = ranked.iter().map(|s| s.normalized_score).collect();
        Self {
            variance: population_variance(&normalized),
            gini: gini_coefficient(&normalized),
            top_functions: ranked.iter().take(top_n).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(scores: &[f64]) -> f64 {
        scores.iter().sum()
    }

    #[test]
    fn test_empty_graph() {
        let run = power_iteration(&[], 0.85, 100, 1e-6);
        assert!(run.scores.is_empty());
        assert!(run.converged);
        assert_eq!(run.iterations, 0);
    }

    #[test]
    fn test_single_node_scores_one() {
        let run = power_iteration(&[vec![]], 0.85, 100, 1e-6);
        assert!((run.scores[0] - 1.0).abs() < 1e-12);
        assert!(run.converged);
    }

    #[test]
    fn test_cycle_is_uniform() {
        let adj = vec![vec![1], vec![2], vec![0]];
        let run = power_iteration(&adj, 0.85, 100, 1e-9);
        for score in &run.scores {
            assert!((score - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_star_inward_center_dominates() {
        // leaves 1..=5 call node 0, which calls nothing
        let mut adj = vec![vec![]; 6];
        for leaf in 1..6 {
            adj[leaf].push(0);
        }
        let run = power_iteration(&adj, 0.85, 100, 1e-9);

        assert!(run.converged);
        for leaf in 1..6 {
            assert!(run.scores[0] > run.scores[leaf]);
        }
        assert!((sum(&run.scores) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mass_conserved_when_not_converged() {
        let adj = vec![vec![1, 2], vec![2], vec![], vec![0, 3]];
        let run = power_iteration(&adj, 0.85, 2, 1e-15);

        assert!(!run.converged);
        assert_eq!(run.iterations, 2);
        assert!((sum(&run.scores) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_iterations_returns_uniform() {
        let run = power_iteration(&[vec![1], vec![]], 0.85, 0, 1e-6);
        assert!(!run.converged);
        assert_eq!(run.scores, vec![0.5, 0.5]);
    }

    #[test]
    fn test_importance_breakpoints() {
        assert_eq!(Importance::from_raw_score(0.2), Importance::Critical);
        assert_eq!(Importance::from_raw_score(0.1), Importance::High);
        assert_eq!(Importance::from_raw_score(0.06), Importance::High);
        assert_eq!(Importance::from_raw_score(0.03), Importance::Medium);
        assert_eq!(Importance::from_raw_score(0.02), Importance::Low);
    }

    #[test]
    fn test_rank_scores_orders_and_normalizes() {
        let ids = ["a", "b", "c"];
        let ranked = rank_scores(|i| ids[i], &[0.2, 0.5, 0.2]);

        assert_eq!(ranked[0].function_id, "b");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].normalized_score, 1.0);
        // tie between a and c resolved by id
        assert_eq!(ranked[1].function_id, "a");
        assert_eq!(ranked[2].function_id, "c");
        assert!((ranked[2].normalized_score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_centrality_metrics_uniform() {
        let ids = ["a", "b"];
        let ranked = rank_scores(|i| ids[i], &[0.5, 0.5]);
        let metrics = CentralityMetrics::from_ranked(&ranked, 1);

        assert_eq!(metrics.gini, 0.0);
        assert_eq!(metrics.variance, 0.0);
        assert_eq!(metrics.top_functions.len(), 1);
    }
}
