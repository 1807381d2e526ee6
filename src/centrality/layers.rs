//! Architectural layer assignment by file path globs.
//!
//! Patterns are matched case-insensitively against `/`-separated paths.
//! `*` stays within one path segment and `**` spans any number of segments.
//! A path belongs to the first layer, in declaration order, with a matching
//! pattern.

use glob::{MatchOptions, Pattern};

use crate::config::LayerDefinition;
use crate::core::normalize_path;
use crate::errors::Result;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct CompiledLayer {
    name: String,
    patterns: Vec<Pattern>,
}

/// Layer definitions with their patterns compiled once
#[derive(Debug, Clone, Default)]
pub struct LayerMatcher {
    layers: Vec<CompiledLayer>,
}

impl LayerMatcher {
    pub fn compile(definitions: &[LayerDefinition]) -> Result<Self> {
        let layers = definitions
            .iter()
            .map(|def| -> Result<CompiledLayer> {
                let patterns = def
                    .patterns
                    .iter()
                    .map(|p| Pattern::new(&normalize_path(p)))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(CompiledLayer {
                    name: def.name.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { layers })
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn name(&self, layer: usize) -> &str {
        &self.layers[layer].name
    }

    /// Index of the first layer matching `path`, if any
    pub fn layer_of(&self, path: &str) -> Option<usize> {
        let path = normalize_path(path);
        self.layers.iter().position(|layer| {
            layer
                .patterns
                .iter()
                .any(|pattern| pattern.matches_with(&path, MATCH_OPTIONS))
        })
    }
}
