//! Content hashes that decide whether a cached result is still valid.

use std::collections::HashSet;
use xxhash_rust::xxh64::Xxh64;

use crate::config::StructuralConfig;
use crate::core::CallEdge;

const EDGE_HASH_SEED: u64 = 0;

/// Order-independent hash of an edge set.
///
/// Each edge is rendered as `"caller->callee"` (external callees as
/// `<external>`); the strings are sorted and streamed into xxh64 with a
/// newline after each one. Repeated edges count every time they occur.
pub fn edge_set_hash(edges: &[CallEdge]) -> u64 {
    let mut keys: Vec<String> = edges.iter().map(CallEdge::normalized_key).collect();
    keys.sort_unstable();

    let mut hasher = Xxh64::new(EDGE_HASH_SEED);
    for key in &keys {
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
    }
    hasher.digest()
}

/// Fingerprint of every setting that influences a structural result
pub fn config_fingerprint(config: &StructuralConfig) -> u64 {
    match serde_json::to_vec(config) {
        Ok(bytes) => xxhash_rust::xxh64::xxh64(&bytes, EDGE_HASH_SEED),
        Err(e) => {
            log::warn!("Failed to fingerprint configuration: {}", e);
            0
        }
    }
}

/// Order-independent hash of a caller-supplied entry point set; 0 when empty
pub fn entry_point_fingerprint(entry_points: &HashSet<String>) -> u64 {
    if entry_points.is_empty() {
        return 0;
    }
    let mut ids: Vec<&String> = entry_points.iter().collect();
    ids.sort_unstable();

    let mut hasher = Xxh64::new(EDGE_HASH_SEED);
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\n");
    }
    hasher.digest()
}
