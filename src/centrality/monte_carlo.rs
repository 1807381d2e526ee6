//! Monte-Carlo PageRank estimation by random walks.
//!
//! Every node launches a fixed number of walks of bounded length. At each
//! step the walker teleports to a uniformly random node with probability
//! `1 − damping`, or when it sits on a node without successors; otherwise it
//! follows a random outgoing edge. Visit counts normalized by the total
//! number of visits approximate the PageRank vector.
//!
//! Estimates are only reproducible when the random source is seeded with a
//! fixed value.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloEstimator {
    pub walks_per_node: usize,
    pub max_walk_length: usize,
    pub damping: f64,
}

impl MonteCarloEstimator {
    pub fn new(walks_per_node: usize, max_walk_length: usize, damping: f64) -> Self {
        Self {
            walks_per_node,
            max_walk_length,
            damping,
        }
    }

    /// Estimate scores for `adj`; the result sums to 1 for non-empty graphs.
    pub fn estimate<R: Rng + ?Sized>(&self, adj: &[Vec<usize>], rng: &mut R) -> Vec<f64> {
        let n = adj.len();
        if n == 0 {
            return Vec::new();
        }

        let mut visits = vec![0u64; n];
        for start in 0..n {
            for _ in 0..self.walks_per_node {
                self.walk(adj, start, rng, &mut visits);
            }
        }

        let total: u64 = visits.iter().sum();
        if total == 0 {
            return vec![1.0 / n as f64; n];
        }
        visits.iter().map(|&v| v as f64 / total as f64).collect()
    }

    /// Number of walk steps a full estimate performs
    pub fn step_budget(&self, node_count: usize) -> usize {
        node_count * self.walks_per_node * self.max_walk_length
    }

    fn walk<R: Rng + ?Sized>(&self, adj: &[Vec<usize>], start: usize, rng: &mut R, visits: &mut [u64]) {
        let n = adj.len();
        let mut current = start;

        for _ in 0..self.max_walk_length {
            visits[current] += 1;
            let successors = &adj[current];
            let teleport = successors.is_empty() || rng.random::<f64>() >= self.damping;
            current = if teleport {
                rng.random_range(0..n)
            } else {
                successors[rng.random_range(0..successors.len())]
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::pagerank::power_iteration;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn star_inward(leaves: usize) -> Vec<Vec<usize>> {
        let mut adj = vec![vec![]; leaves + 1];
        for leaf in adj.iter_mut().skip(1) {
            leaf.push(0);
        }
        adj
    }

    #[test]
    fn test_empty_graph() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let estimator = MonteCarloEstimator::new(4, 10, 0.85);
        assert!(estimator.estimate(&[], &mut rng).is_empty());
    }

    #[test]
    fn test_scores_sum_to_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let estimator = MonteCarloEstimator::new(5, 20, 0.85);
        let scores = estimator.estimate(&star_inward(20), &mut rng);

        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let adj = star_inward(15);
        let estimator = MonteCarloEstimator::new(8, 30, 0.85);

        let a = estimator.estimate(&adj, &mut ChaCha8Rng::seed_from_u64(99));
        let b = estimator.estimate(&adj, &mut ChaCha8Rng::seed_from_u64(99));

        assert_eq!(a, b);
    }

    #[test]
    fn test_approximates_power_iteration() {
        let adj = star_inward(30);
        let exact = power_iteration(&adj, 0.85, 200, 1e-12).scores;
        let estimator = MonteCarloEstimator::new(200, 50, 0.85);
        let approx = estimator.estimate(&adj, &mut ChaCha8Rng::seed_from_u64(2024));

        // hub keeps the top spot and lands near its exact share
        let hub = approx[0];
        assert!(approx.iter().skip(1).all(|&leaf| leaf < hub));
        assert!((hub - exact[0]).abs() < 0.05, "hub {hub} vs exact {}", exact[0]);
    }
}
