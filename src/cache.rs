//! Result cache keyed by normalized URL.
//!
//! Reads load an `ArcSwap` snapshot without locking. Writes clone the map and
//! swap it in (`rcu`), so concurrent writers for the same key resolve
//! last-writer-wins. An expired entry is evicted when it is read, and every
//! write prunes all expired entries so the map only holds live URLs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use tracing::debug;

use crate::result::PipelineResult;
use crate::url_utils::normalize_url;

/// Monotonic time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock advanced by hand, for TTL tests.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset_ms: AtomicU64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// A cached result with its storage time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: PipelineResult,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    /// Whether the entry is still readable at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// TTL cache of pipeline results.
pub struct ResultCache {
    entries: ArcSwap<HashMap<String, Arc<CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ResultCache {
    /// Cache using the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: ArcSwap::from_pointee(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Cache key for `url`.
    #[must_use]
    pub fn key(url: &str) -> String {
        normalize_url(url)
    }

    /// Fresh result for `url`, evicting it if expired.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<PipelineResult> {
        let key = Self::key(url);
        let entry = self.entries.load().get(&key).cloned()?;

        if entry.is_fresh(self.clock.now()) {
            debug!(%key, "Cache hit");
            return Some(entry.result.clone());
        }

        debug!(%key, "Cache entry expired");
        self.entries.rcu(|current| {
            let mut next = HashMap::clone(current);
            // Only drop the entry we saw expire, not a fresher replacement.
            if next.get(&key).is_some_and(|e| Arc::ptr_eq(e, &entry)) {
                next.remove(&key);
            }
            next
        });
        None
    }

    /// Store `result` for `url`, replacing any previous entry and dropping
    /// every entry that has expired.
    pub fn insert(&self, url: &str, result: PipelineResult) {
        let key = Self::key(url);
        let now = self.clock.now();
        let entry = Arc::new(CacheEntry {
            result,
            stored_at: now,
            ttl: self.ttl,
        });
        self.entries.rcu(|current| {
            let mut next: HashMap<_, _> = current
                .iter()
                .filter(|(_, cached)| cached.is_fresh(now))
                .map(|(k, cached)| (k.clone(), Arc::clone(cached)))
                .collect();
            next.insert(key.clone(), Arc::clone(&entry));
            next
        });
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.store(Arc::new(HashMap::new()));
    }
}
