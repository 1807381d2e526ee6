use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use crate::core::StructuralMetrics;
use crate::errors::Result;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cached result for one snapshot
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub metrics: StructuralMetrics,
    pub created_at: Instant,
    pub edge_hash: u64,
    pub config_hash: u64,
}

/// Entry age for operational display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntryInfo {
    pub snapshot_id: String,
    pub age: Duration,
    pub edge_hash: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// In-memory structural results keyed by snapshot id.
///
/// An entry is served only while it is younger than the TTL and both the
/// edge-set hash and the config fingerprint still match. Computation for a
/// given snapshot id is serialized through a per-key lock, so two callers
/// asking for the same snapshot never compute it twice.
#[derive(Debug)]
pub struct StructuralCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    key_locks: DashMap<String, Arc<Mutex<()>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for StructuralCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl StructuralCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            key_locks: DashMap::new(),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) >= self.ttl
    }

    /// Cached metrics for `snapshot_id`, if still valid
    pub fn get(&self, snapshot_id: &str, edge_hash: u64, config_hash: u64) -> Option<StructuralMetrics> {
        let now = self.clock.now();
        let entries = self.entries.read();

        let reason = match entries.get(snapshot_id) {
            None => "not cached",
            Some(entry) if self.is_expired(entry, now) => "expired",
            Some(entry) if entry.edge_hash != edge_hash => "edge set changed",
            Some(entry) if entry.config_hash != config_hash => "configuration changed",
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                log::debug!("Structural cache hit for snapshot {}", snapshot_id);
                return Some(entry.metrics.clone());
            }
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("Structural cache miss for snapshot {} ({})", snapshot_id, reason);
        None
    }

    /// Store metrics, replacing any previous entry for the snapshot.
    ///
    /// Expired entries are swept first.
    pub fn insert(&self, snapshot_id: &str, metrics: StructuralMetrics, edge_hash: u64, config_hash: u64) {
        self.sweep_expired();
        let entry = CacheEntry {
            metrics,
            created_at: self.clock.now(),
            edge_hash,
            config_hash,
        };
        self.entries.write().insert(snapshot_id.to_string(), entry);
    }

    /// Return the cached result or compute and store a new one.
    ///
    /// The per-key lock is held across the check, the computation and the
    /// insert. Errors from `compute` are returned and nothing is cached.
    pub fn get_or_compute<F>(
        &self,
        snapshot_id: &str,
        edge_hash: u64,
        config_hash: u64,
        compute: F,
    ) -> Result<(StructuralMetrics, CacheOutcome)>
    where
        F: FnOnce() -> Result<StructuralMetrics>,
    {
        let key_lock = self.key_lock(snapshot_id);
        let _guard = key_lock.lock();

        if let Some(metrics) = self.get(snapshot_id, edge_hash, config_hash) {
            return Ok((metrics, CacheOutcome::Hit));
        }

        let metrics = compute()?;
        self.insert(snapshot_id, metrics.clone(), edge_hash, config_hash);
        Ok((metrics, CacheOutcome::Miss))
    }

    fn key_lock(&self, snapshot_id: &str) -> Arc<Mutex<()>> {
        self.key_locks
            .entry(snapshot_id.to_string())
            .or_default()
            .clone()
    }

    /// Drop every expired entry and release idle key locks, returning how
    /// many entries were removed
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        let removed = before - entries.len();

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
            log::debug!("Swept {} expired structural cache entries", removed);
        }

        // a lock still referenced elsewhere is guarding a computation in flight
        self.key_locks.retain(|snapshot_id, lock| {
            entries.contains_key(snapshot_id) || Arc::strong_count(lock) > 1
        });
        removed
    }

    pub fn invalidate(&self, snapshot_id: &str) -> bool {
        self.key_locks
            .remove_if(snapshot_id, |_, lock| Arc::strong_count(lock) == 1);
        self.entries.write().remove(snapshot_id).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        self.key_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Age of every entry, oldest first
    pub fn entry_ages(&self) -> Vec<CacheEntryInfo> {
        let now = self.clock.now();
        let mut ages: Vec<CacheEntryInfo> = self
            .entries
            .read()
            .iter()
            .map(|(snapshot_id, entry)| CacheEntryInfo {
                snapshot_id: snapshot_id.clone(),
                age: now.saturating_duration_since(entry.created_at),
                edge_hash: entry.edge_hash,
            })
            .collect();
        ages.sort_by(|a, b| b.age.cmp(&a.age).then_with(|| a.snapshot_id.cmp(&b.snapshot_id)));
        ages
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            entries: self.len(),
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::errors::Error;

    fn cache_with_clock() -> (StructuralCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = StructuralCache::with_clock(DEFAULT_TTL, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_get_miss_on_empty_cache() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get("snap", 1, 1).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_put_and_get() {
        let (cache, _) = cache_with_clock();
        cache.insert("snap", StructuralMetrics::empty("snap"), 7, 9);

        assert_eq!(cache.get("snap", 7, 9), Some(StructuralMetrics::empty("snap")));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_hash_mismatch_is_a_miss() {
        let (cache, _) = cache_with_clock();
        cache.insert("snap", StructuralMetrics::empty("snap"), 7, 9);

        assert!(cache.get("snap", 8, 9).is_none());
        assert!(cache.get("snap", 7, 10).is_none());
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.insert("snap", StructuralMetrics::empty("snap"), 1, 1);

        clock.advance(Duration::from_secs(299));
        assert!(cache.get("snap", 1, 1).is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("snap", 1, 1).is_none());
    }

    #[test]
    fn test_insert_sweeps_expired_entries() {
        let (cache, clock) = cache_with_clock();
        cache.insert("old", StructuralMetrics::empty("old"), 1, 1);
        clock.advance(Duration::from_secs(400));

        cache.insert("new", StructuralMetrics::empty("new"), 2, 1);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.entry_ages()[0].snapshot_id, "new");
    }

    #[test]
    fn test_entry_ages_oldest_first() {
        let (cache, clock) = cache_with_clock();
        cache.insert("a", StructuralMetrics::empty("a"), 1, 1);
        clock.advance(Duration::from_secs(30));
        cache.insert("b", StructuralMetrics::empty("b"), 2, 1);
        clock.advance(Duration::from_secs(10));

        let ages = cache.entry_ages();
        assert_eq!(ages[0].snapshot_id, "a");
        assert_eq!(ages[0].age, Duration::from_secs(40));
        assert_eq!(ages[1].age, Duration::from_secs(10));
    }

    #[test]
    fn test_get_or_compute_runs_once() {
        let (cache, _) = cache_with_clock();
        let mut runs = 0;

        let (_, first) = cache
            .get_or_compute("snap", 1, 1, || {
                runs += 1;
                Ok(StructuralMetrics::empty("snap"))
            })
            .unwrap();
        let (_, second) = cache
            .get_or_compute("snap", 1, 1, || {
                runs += 1;
                Ok(StructuralMetrics::empty("snap"))
            })
            .unwrap();

        assert_eq!(first, CacheOutcome::Miss);
        assert_eq!(second, CacheOutcome::Hit);
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_get_or_compute_does_not_cache_errors() {
        let (cache, _) = cache_with_clock();
        let result = cache.get_or_compute("snap", 1, 1, || Err(Error::unknown_function("ghost")));

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (cache, _) = cache_with_clock();
        cache.insert("a", StructuralMetrics::empty("a"), 1, 1);
        cache.insert("b", StructuralMetrics::empty("b"), 1, 1);

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_releases_idle_key_locks() {
        let (cache, clock) = cache_with_clock();
        for i in 0..1000 {
            let id = format!("snap-{}", i);
            cache
                .get_or_compute(&id, 1, 1, || Ok(StructuralMetrics::empty(id.as_str())))
                .unwrap();
        }
        assert_eq!(cache.key_locks.len(), 1000);

        clock.advance(Duration::from_secs(600));

        assert_eq!(cache.sweep_expired(), 1000);
        assert!(cache.is_empty());
        assert_eq!(cache.key_locks.len(), 0);
    }

    #[test]
    fn test_failed_computations_do_not_leave_key_locks() {
        let (cache, _) = cache_with_clock();
        for i in 0..10 {
            let id = format!("broken-{}", i);
            let _ = cache.get_or_compute(&id, 1, 1, || Err(Error::unknown_function("ghost")));
        }

        cache.sweep_expired();

        assert_eq!(cache.key_locks.len(), 0);
    }

    #[test]
    fn test_invalidate_keeps_a_held_key_lock() {
        let (cache, _) = cache_with_clock();
        cache.insert("snap", StructuralMetrics::empty("snap"), 1, 1);

        let held = cache.key_lock("snap");
        let _guard = held.lock();
        assert!(cache.invalidate("snap"));
        cache.clear();

        assert!(Arc::ptr_eq(&held, &cache.key_lock("snap")));
    }

    #[test]
    fn test_invalidate_drops_an_idle_key_lock() {
        let (cache, _) = cache_with_clock();
        cache
            .get_or_compute("snap", 1, 1, || Ok(StructuralMetrics::empty("snap")))
            .unwrap();
        assert_eq!(cache.key_locks.len(), 1);

        assert!(cache.invalidate("snap"));

        assert_eq!(cache.key_locks.len(), 0);
    }

    #[test]
    fn test_hit_rate() {
        let (cache, _) = cache_with_clock();
        cache.insert("snap", StructuralMetrics::empty("snap"), 1, 1);
        cache.get("snap", 1, 1);
        cache.get("other", 1, 1);

        let stats = cache.stats();
        assert_eq!(stats.hit_rate, 0.5);
        assert_eq!(stats.entries, 1);
    }
}
