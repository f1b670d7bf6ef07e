use core::borrow::Borrow;
use core::hash::Hash;
use core::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

/// A value plus the instant it was written, used for TTL checks.
struct Slot<V> {
    value: V,
    stored_at: Instant,
}

/// Hit/miss/eviction counters of one store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl StoreStats {
    /// Hit rate as a fraction [0.0, 1.0]. Returns 0.0 if no lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Insertions between two automatic sweeps of expired entries.
const SWEEP_EVERY: u64 = 1024;

struct Inner<K, V> {
    entries: LruCache<K, Slot<V>>,
    stats: StoreStats,
}

/// A bounded, optionally time-limited key/value store safe for concurrent use.
///
/// ## Eviction
/// Capacity pressure evicts the least recently used entry. With a TTL, an
/// entry older than the TTL is treated as absent and dropped on the next
/// touch. Neither case is ever reported to the caller as an error.
///
/// ## Locking
/// A single `parking_lot::Mutex` guards the recency list. Critical sections
/// are O(1) and never call back into user code, so a `put` can only delay a
/// concurrent `get` by one list update.
pub struct ExpiringStore<K, V> {
    name: &'static str,
    ttl: Option<Duration>,
    inner: Mutex<Inner<K, V>>,
}

impl<K: Hash + Eq, V: Clone> ExpiringStore<K, V> {
    /// Creates a store holding at most `capacity` entries (minimum 1).
    /// `ttl = None` disables time-based expiry.
    pub fn new(name: &'static str, capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            ttl,
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: StoreStats::default(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().entries.cap().get()
    }

    #[inline]
    fn is_live(&self, slot: &Slot<V>) -> bool {
        match self.ttl {
            Some(ttl) => slot.stored_at.elapsed() < ttl,
            None => true,
        }
    }

    /// Returns a clone of the value for `key` and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock();
        match inner.entries.get(key) {
            Some(slot) if self.is_live(slot) => {
                let value = slot.value.clone();
                inner.stats.hits += 1;
                return Some(value);
            }
            Some(_) => {}
            None => {
                inner.stats.misses += 1;
                return None;
            }
        }

        inner.entries.pop(key);
        inner.stats.expirations += 1;
        inner.stats.misses += 1;
        tracing::trace!("{}: dropped expired entry on read", self.name);
        None
    }

    /// Checks for a live entry without touching its recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let inner = self.inner.lock();
        inner.entries.peek(key).is_some_and(|slot| self.is_live(slot))
    }

    /// Inserts or replaces `key`. Returns the replaced value, if any.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut inner = self.inner.lock();
        let replacing = inner.entries.contains(&key);
        let slot = Slot {
            value,
            stored_at: Instant::now(),
        };
        let displaced = inner.entries.push(key, slot);
        inner.stats.insertions += 1;

        let replaced = match displaced {
            Some((_, old)) if replacing => Some(old.value),
            Some(_) => {
                inner.stats.evictions += 1;
                tracing::trace!("{}: capacity reached, evicted LRU entry", self.name);
                None
            }
            None => None,
        };
        if inner.stats.insertions % SWEEP_EVERY == 0 {
            let purged = self.sweep(&mut inner);
            if purged > 0 {
                tracing::trace!("{}: swept {} expired entries", self.name, purged);
            }
        }
        replaced
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().entries.pop(key).map(|slot| slot.value)
    }

    /// Drops every expired entry. Returns how many were dropped.
    ///
    /// Also runs on its own every `SWEEP_EVERY` insertions.
    pub fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock();
        self.sweep(&mut inner)
    }

    /// Full pass in recency order. Reads refresh recency but not
    /// `stored_at`, so expired entries can sit anywhere in the list.
    fn sweep(&self, inner: &mut Inner<K, V>) -> usize {
        let Some(ttl) = self.ttl else { return 0 };
        let before = inner.entries.len();
        // Popping from the LRU end and pushing live entries back to the MRU
        // end keeps their relative order; the cache never overflows here.
        for _ in 0..before {
            let Some((key, slot)) = inner.entries.pop_lru() else {
                break;
            };
            if slot.stored_at.elapsed() < ttl {
                inner.entries.push(key, slot);
            }
        }
        let purged = before - inner.entries.len();
        inner.stats.expirations += purged as u64;
        purged
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats
    }
}

static_assertions::assert_impl_all!(ExpiringStore<String, Vec<u8>>: Send, Sync);
