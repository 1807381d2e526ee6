//! Environment-style tunables.
//!
//! Variables are captured once into an [`EnvironmentSnapshot`] so the
//! override logic stays a pure function that tests can drive directly.

use std::collections::HashMap;

use super::core::StructuralConfig;

pub const ENV_PREFIX: &str = "STRUCTMAP_";
pub const ITERATION_BUDGET: &str = "STRUCTMAP_ITERATION_BUDGET";
pub const EXCLUDE_INTRA_FILE_CALLS: &str = "STRUCTMAP_EXCLUDE_INTRA_FILE_CALLS";
pub const LAYER_ANALYSIS: &str = "STRUCTMAP_LAYER_ANALYSIS";
pub const LAYER_MAX_EDGES: &str = "STRUCTMAP_LAYER_MAX_EDGES";
pub const MONTE_CARLO_SEED: &str = "STRUCTMAP_MONTE_CARLO_SEED";

/// Environment variable snapshot for configuration resolution
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSnapshot {
    /// Map of environment variable names to values
    pub vars: HashMap<String, String>,
}

impl EnvironmentSnapshot {
    /// Create snapshot of current environment
    pub fn from_current_env() -> Self {
        let vars = std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Get environment variable value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// Parse `true`/`false` (also `1`/`0`, `yes`/`no`); anything else is ignored
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            other => {
                log::warn!("Ignoring {}={}: expected true or false", key, other);
                None
            }
        }
    }

    /// Parse environment variable as type T
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        let parsed = raw.trim().parse().ok();
        if parsed.is_none() {
            log::warn!("Ignoring {}={}: not a valid value", key, raw);
        }
        parsed
    }
}

/// Apply environment overrides on top of a file-based configuration
pub fn apply_env_overrides(mut config: StructuralConfig, env: &EnvironmentSnapshot) -> StructuralConfig {
    if let Some(budget) = env.parse::<usize>(ITERATION_BUDGET) {
        config.layers.global_iteration_budget = (budget > 0).then_some(budget);
    }
    if let Some(exclude) = env.flag(EXCLUDE_INTRA_FILE_CALLS) {
        config.analysis.exclude_intra_file_calls = exclude;
    }
    if let Some(enabled) = env.flag(LAYER_ANALYSIS) {
        config.layers.enabled = enabled;
    }
    if let Some(max_edges) = env.parse::<usize>(LAYER_MAX_EDGES) {
        config.layers.max_edges = max_edges;
    }
    if let Some(seed) = env.parse::<u64>(MONTE_CARLO_SEED) {
        config.monte_carlo.seed = Some(seed);
    }
    config
}
