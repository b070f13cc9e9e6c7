//! Resolution Cache
//!
//! Bounded TTL cache for hostname resolution outcomes.

use crate::domain::entities::ResolveOutcome;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before LRU eviction kicks in
    pub capacity: usize,
    /// Maximum age of an entry before it is treated as absent
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// A cached resolution outcome with its insertion time.
struct CacheEntry {
    outcome: ResolveOutcome,
    inserted_at: Instant,
}

/// Snapshot of cache counters for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
    pub len: usize,
}

/// Bounded, TTL-based cache of resolution outcomes per address.
///
/// Expiry is lazy: an entry older than the TTL is treated as absent and
/// evicted on the read that discovers it; there is no background sweep.
/// Recency is updated on both `get` hits and `put`, so the entry evicted
/// at capacity is the least-recently-accessed one. Both successful and
/// failed outcomes are cached with the same TTL.
///
/// The lock is held only for the duration of a single operation, never
/// across an await point. Interleaving protection for read-then-write
/// sequences on one key is the gate's coalescing, not this lock.
pub struct ResolutionCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
}

impl ResolutionCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Look up the cached outcome for an address.
    ///
    /// Returns `None` when no entry exists or the stored entry has
    /// outlived the TTL; an expired entry is evicted by this read.
    pub fn get(&self, address: &str) -> Option<ResolveOutcome> {
        let mut entries = self.entries.lock();

        let expired = match entries.get(address) {
            Some(entry) if entry.inserted_at.elapsed() > self.ttl => true,
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.outcome.clone());
            }
            None => false,
        };

        if expired {
            entries.pop(address);
            self.expirations.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or overwrite the outcome for an address, stamped now.
    ///
    /// Inserting a new key at capacity evicts the least-recently-accessed
    /// entry first.
    pub fn put(&self, address: &str, outcome: ResolveOutcome) {
        let mut entries = self.entries.lock();

        if entries.len() == usize::from(entries.cap()) && !entries.contains(address) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        entries.put(
            address.to_string(),
            CacheEntry {
                outcome,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Current number of entries (including not-yet-expired stale ones).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the diagnostic counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
        }
    }
}
