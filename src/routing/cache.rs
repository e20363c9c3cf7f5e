//! Read-through match cache.
//!
//! # Responsibilities
//! - Memoize resolved matches per (method, domain, path)
//! - Bound memory with least-recently-used eviction
//! - Drop everything on any route-table mutation
//!
//! # Design Decisions
//! - Invalidation is all-or-nothing; route mutation is rare next to lookup
//! - Only successful matches are stored
//! - Interior mutex so lookups take `&self`; the critical section is a
//!   single LRU operation

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use serde::Serialize;

use crate::routing::matcher::RouteMatch;
use crate::routing::method::HttpMethod;

/// Identity of one lookup. Fields are kept apart so no (domain, path)
/// pair can alias another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: HttpMethod,
    domain: Option<String>,
    path: String,
}

/// Build the cache key for a lookup.
pub fn cache_key(method: HttpMethod, path: &str, domain: Option<&str>) -> CacheKey {
    CacheKey {
        method,
        domain: domain.map(str::to_string),
        path: path.to_string(),
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CacheStats {
    pub enabled: bool,
    pub capacity: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub invalidations: u64,
    pub hit_ratio: f64,
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.insertions,
            &self.evictions,
            &self.invalidations,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Bounded LRU of resolved matches.
#[derive(Debug)]
pub struct MatchCache {
    enabled: bool,
    entries: Mutex<LruCache<CacheKey, RouteMatch>>,
    counters: CacheCounters,
}

impl MatchCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            enabled: true,
            entries: Mutex::new(LruCache::new(capacity)),
            counters: CacheCounters::default(),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(1)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, RouteMatch>> {
        // No entry is ever left half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<RouteMatch> {
        if !self.enabled {
            return None;
        }
        let hit = self.lock().get(key).cloned();
        match hit {
            Some(_) => CacheCounters::bump(&self.counters.hits),
            None => CacheCounters::bump(&self.counters.misses),
        }
        hit
    }

    pub fn set(&self, key: CacheKey, value: RouteMatch) {
        if !self.enabled {
            return;
        }
        let displaced = self.lock().push(key.clone(), value);
        CacheCounters::bump(&self.counters.insertions);
        if let Some((old_key, _)) = displaced {
            if old_key != key {
                CacheCounters::bump(&self.counters.evictions);
            }
        }
    }

    /// Drop every entry; counters are kept.
    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        if !entries.is_empty() {
            tracing::debug!(entries = entries.len(), "Match cache invalidated");
        }
        entries.clear();
        CacheCounters::bump(&self.counters.invalidations);
    }

    /// Drop every entry and reset counters.
    pub fn clear(&self) {
        self.lock().clear();
        self.counters.reset();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let (entries, capacity) = {
            let guard = self.lock();
            (guard.len(), guard.cap().get())
        };
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            enabled: self.enabled,
            capacity,
            entries,
            hits,
            misses,
            insertions: self.counters.insertions.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
            hit_ratio: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }
}
