//! Time-bounded, in-process cache of structural results.

pub mod clock;
pub mod keys;
pub mod structural_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::{config_fingerprint, edge_set_hash, entry_point_fingerprint};
pub use structural_cache::{
    CacheEntry, CacheEntryInfo, CacheOutcome, CacheStats, StructuralCache, DEFAULT_TTL,
};
