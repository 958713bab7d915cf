//! Two-tier, promotion-gated eviction cache.
//!
//! `TieredCache` defends its protected tier against pollution from one-off
//! keys: a key must be observed `K` times before it may occupy a protected
//! slot. This is what keeps a sequential scan of cold keys from flushing the
//! working set.
//!
//! # Tier architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         TieredCache                              │
//! │                                                                  │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                  PROTECTED TIER (LRU, cap C)               │  │
//! │  │   LRU ◀──▶ [evict+notify] ◀──▶ ... ◀──▶ [newest] MRU       │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │                              ▲ promote at K sightings            │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                 PROBATION TIER (FIFO, cap P)               │  │
//! │  │   oldest ◀── [evict silently] ... [newest] ◀── insert      │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Entry lifecycle
//!
//! 1. **First sighting**: the key enters probation with a visit count of 1.
//!    If probation is at capacity `P`, its oldest (first-inserted) entry is
//!    evicted silently — cold keys get no notification.
//! 2. **Each further sighting** (`add` or `get`): the visit count increments.
//! 3. **Promotion**: at `K` sightings the key leaves probation and enters the
//!    protected tier at the MRU end, exactly once.
//! 4. **Protected life**: every access moves the entry to the MRU end.
//!    When the tier exceeds `C`, the LRU entry is evicted and the eviction
//!    hook fires with the evicted key/value pair.
//!
//! # Ordering contract
//!
//! Within the protected tier the list tail is MRU and the head is LRU;
//! eviction removes from the head strictly when the tier size exceeds `C`.
//! The probation tier is FIFO by insertion order — visits do not reorder it.
//!
//! # Eviction hook
//!
//! The hook runs synchronously on the thread that triggered the eviction.
//! It must not call back into the same cache instance (the lock a caller is
//! expected to wrap this cache in is not reentrant) and should not block.
//!
//! # Thread safety
//!
//! `TieredCache` is not internally synchronized; wrap it in a `Mutex` as
//! [`Group`](crate::Group) does. Every operation is O(1), so the critical
//! section stays short.
//!
//! # Examples
//!
//! ```
//! use groupcache_rs::{TieredCache, TieredCacheConfig};
//! use std::num::NonZeroUsize;
//!
//! // Protected capacity 2, promotion after 2 sightings.
//! let config = TieredCacheConfig::new(2, NonZeroUsize::new(2).unwrap());
//! let mut cache = TieredCache::new(config);
//!
//! cache.add("a", 1);              // probation, 1 sighting
//! assert_eq!(cache.get(&"a"), Some(&1)); // 2nd sighting: promoted
//! assert_eq!(cache.len(), 1);     // protected tier size
//! ```

use crate::config::TieredCacheConfig;
use crate::list::List;
use crate::metrics::TieredCacheMetrics;
use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Eviction notification hook, invoked with the evicted key/value pair on
/// protected-tier capacity evictions only.
pub type EvictionHook<K, V> = Box<dyn FnMut(K, V) + Send>;

/// Which tier currently holds a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    /// Staging tier for keys with fewer than `K` sightings.
    Probation,
    /// Admitted, capacity-bounded tier for promoted keys.
    Protected,
}

/// A promoted entry in the protected tier.
struct Entry<K, V> {
    key: K,
    value: V,
}

/// A candidate entry in the probation tier, tracking its sightings.
struct Candidate<K, V> {
    key: K,
    value: V,
    visits: usize,
}

/// A two-tier eviction cache with promotion-based admission control.
///
/// See the [module documentation](self) for the tier semantics. [`len`]
/// reports the protected tier only — that is the cache's externally visible
/// size; probation is staging.
///
/// [`len`]: TieredCache::len
pub struct TieredCache<K, V> {
    config: TieredCacheConfig,

    /// Protected tier: tail = MRU, head = LRU.
    protected: List<Entry<K, V>>,

    /// Probation tier: FIFO, head = oldest inserted.
    probation: List<Candidate<K, V>>,

    /// Key → (slot index, tier). The index points into the list named by the
    /// tier; the two key spaces are disjoint by construction.
    map: HashMap<K, (usize, Tier)>,

    /// Invoked on protected-tier capacity eviction, never on probation
    /// eviction or explicit removal.
    on_evict: Option<EvictionHook<K, V>>,

    metrics: TieredCacheMetrics,
}

impl<K: Hash + Eq + Clone, V> TieredCache<K, V> {
    /// Creates a cache without an eviction hook.
    pub fn new(config: TieredCacheConfig) -> Self {
        Self::init(config, None)
    }

    /// Creates a cache, optionally with an eviction hook.
    ///
    /// The hook fires synchronously on protected-tier capacity evictions
    /// with the exact evicted key/value pair. It must not re-enter this
    /// cache instance.
    pub fn init(config: TieredCacheConfig, on_evict: Option<EvictionHook<K, V>>) -> Self {
        TieredCache {
            config,
            protected: List::new(),
            probation: List::new(),
            map: HashMap::new(),
            on_evict,
            metrics: TieredCacheMetrics::new(),
        }
    }

    /// Returns the number of entries in the protected tier — the cache's
    /// externally visible size.
    #[inline]
    pub fn len(&self) -> usize {
        self.protected.len()
    }

    /// Returns `true` if the protected tier is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.protected.is_empty()
    }

    /// Returns the number of candidates currently in the probation tier.
    #[inline]
    pub fn probation_len(&self) -> usize {
        self.probation.len()
    }

    /// Returns the configuration this cache was built with.
    #[inline]
    pub fn config(&self) -> &TieredCacheConfig {
        &self.config
    }

    /// Returns the counters collected so far.
    #[inline]
    pub fn metrics(&self) -> &TieredCacheMetrics {
        &self.metrics
    }

    /// Inserts or refreshes a key.
    ///
    /// A key already in the protected tier is overwritten and moved to the
    /// MRU end. A key in probation is overwritten and gains a sighting,
    /// promoting at `K`. An unseen key enters probation with one sighting,
    /// silently evicting the oldest candidate if probation is at capacity.
    pub fn add(&mut self, key: K, value: V) {
        self.metrics.record_insertion();

        match self.map.get(&key).copied() {
            Some((idx, Tier::Protected)) => {
                self.protected.get_mut(idx).value = value;
                self.protected.move_to_back(idx);
            }
            Some((idx, Tier::Probation)) => {
                let candidate = self.probation.get_mut(idx);
                candidate.value = value;
                candidate.visits += 1;
                if candidate.visits >= self.config.promotion_threshold().get() {
                    self.promote(idx);
                }
            }
            None => {
                let probation_cap = self.config.probation_capacity();
                if probation_cap > 0 && self.probation.len() >= probation_cap {
                    // Cold, never-promoted key: no notification.
                    if let Some(oldest) = self.probation.pop_front() {
                        self.map.remove(&oldest.key);
                        self.metrics.record_probation_eviction();
                    }
                }
                let idx = self.probation.push_back(Candidate {
                    key: key.clone(),
                    value,
                    visits: 1,
                });
                self.map.insert(key, (idx, Tier::Probation));
            }
        }
    }

    /// Returns a reference to the value for `key`, if cached in either tier.
    ///
    /// A protected hit moves the entry to the MRU end. A probation hit
    /// gains a sighting and promotes the key once the count reaches `K`;
    /// the stored value is returned either way.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (idx, tier) = match self.map.get(key).copied() {
            Some(found) => found,
            None => {
                self.metrics.record_miss();
                return None;
            }
        };

        match tier {
            Tier::Protected => {
                self.metrics.record_protected_hit();
                self.protected.move_to_back(idx);
                // move_to_back relinks in place; idx still names this entry.
                Some(&self.protected.get(idx).value)
            }
            Tier::Probation => {
                self.metrics.record_probation_hit();
                let candidate = self.probation.get_mut(idx);
                candidate.visits += 1;
                if candidate.visits >= self.config.promotion_threshold().get() {
                    let new_idx = self.promote(idx);
                    Some(&self.protected.get(new_idx).value)
                } else {
                    Some(&self.probation.get(idx).value)
                }
            }
        }
    }

    /// Removes `key` from whichever tier holds it, returning its value.
    ///
    /// Explicit removal is a caller decision, not a policy eviction: the
    /// eviction hook is not invoked.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (idx, tier) = self.map.remove(key)?;
        match tier {
            Tier::Protected => Some(self.protected.remove(idx).value),
            Tier::Probation => Some(self.probation.remove(idx).value),
        }
    }

    /// Removes all entries from both tiers. The eviction hook is not
    /// invoked; counters are retained.
    pub fn clear(&mut self) {
        self.map.clear();
        self.protected.clear();
        self.probation.clear();
    }

    /// Moves the candidate at `idx` from probation into the protected tier
    /// at the MRU end, evicting the protected LRU entry (with notification)
    /// if the tier now exceeds capacity. Returns the entry's new index.
    fn promote(&mut self, idx: usize) -> usize {
        let candidate = self.probation.remove(idx);
        let new_idx = self.protected.push_back(Entry {
            key: candidate.key.clone(),
            value: candidate.value,
        });
        self.map.insert(candidate.key, (new_idx, Tier::Protected));
        self.metrics.record_promotion();

        let capacity = self.config.capacity();
        if capacity > 0 && self.protected.len() > capacity {
            if let Some(lru) = self.protected.pop_front() {
                self.map.remove(&lru.key);
                self.metrics.record_protected_eviction();
                if let Some(hook) = self.on_evict.as_mut() {
                    hook(lru.key, lru.value);
                }
            }
        }

        new_idx
    }
}

impl<K, V> fmt::Debug for TieredCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredCache")
            .field("config", &self.config)
            .field("protected_len", &self.protected.len())
            .field("probation_len", &self.probation.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn make_cache<K: Hash + Eq + Clone, V>(cap: usize, k: usize) -> TieredCache<K, V> {
        TieredCache::new(TieredCacheConfig::new(cap, NonZeroUsize::new(k).unwrap()))
    }

    #[test]
    fn test_first_sighting_stays_in_probation() {
        let mut cache = make_cache(4, 2);
        cache.add("a", 1);

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.probation_len(), 1);
    }

    #[test]
    fn test_get_returns_probation_value_before_promotion() {
        let mut cache = make_cache(4, 3);
        cache.add("a", 1);

        // Second sighting: still below K=3, value returned from probation.
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.len(), 0);

        // Third sighting promotes.
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.probation_len(), 0);
    }

    #[test]
    fn test_add_promotes_at_threshold() {
        let mut cache = make_cache(4, 2);
        cache.add("a", 1);
        cache.add("a", 2); // second sighting, promoted with the fresh value

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.probation_len(), 0);
        assert_eq!(cache.get(&"a"), Some(&2));
    }

    #[test]
    fn test_promotion_happens_exactly_once() {
        let mut cache = make_cache(4, 2);
        cache.add("a", 1);
        cache.get(&"a"); // promote
        cache.get(&"a");
        cache.get(&"a");

        assert_eq!(cache.metrics().promotions, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_protected_overwrite_moves_to_mru() {
        let mut cache = make_cache(2, 2);
        for key in ["a", "b"] {
            cache.add(key, 0);
            cache.add(key, 1); // promote
        }
        // Protected order (LRU → MRU): a, b. Refresh "a" to make "b" the LRU.
        cache.add("a", 9);

        cache.add("c", 0);
        cache.add("c", 1); // promote "c", evicting the LRU

        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(&9));
        assert_eq!(cache.get(&"c"), Some(&1));
    }

    #[test]
    fn test_probation_fifo_eviction_is_silent() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let config = TieredCacheConfig::new(2, NonZeroUsize::new(2).unwrap());
        let mut cache: TieredCache<&str, i32> = TieredCache::init(
            config,
            Some(Box::new(move |_k, _v| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        cache.add("a", 1);
        cache.add("b", 2);
        cache.get(&"a"); // second sighting of "a": promoted out of probation
        assert_eq!(cache.probation_len(), 1); // only "b" remains

        cache.add("c", 3);
        cache.add("d", 4); // probation at capacity: "b" evicted silently

        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.metrics().probation_evictions, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_probation_fifo_not_lru() {
        // K=3 so repeated sightings do not promote out of probation here.
        let mut cache = make_cache(2, 3);
        cache.add("a", 1);
        cache.add("b", 2);
        cache.get(&"a"); // 2 sightings, still probation, still oldest inserted

        cache.add("c", 3); // capacity 2: evicts "a" (first inserted), not "b"

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
    }

    #[test]
    fn test_eviction_hook_receives_exact_pair() {
        let evicted: Arc<parking_lot::Mutex<Vec<(String, i32)>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let config = TieredCacheConfig::new(1, NonZeroUsize::new(2).unwrap());
        let mut cache: TieredCache<String, i32> = TieredCache::init(
            config,
            Some(Box::new(move |k, v| sink.lock().push((k, v)))),
        );

        cache.add("a".to_owned(), 1);
        cache.add("a".to_owned(), 1); // promote
        cache.add("b".to_owned(), 2);
        cache.add("b".to_owned(), 2); // promote; protected over capacity, evicts "a"

        let log = evicted.lock();
        assert_eq!(log.as_slice(), &[("a".to_owned(), 1)]);
    }

    #[test]
    fn test_protected_capacity_never_exceeded() {
        let mut cache = make_cache(10, 2);
        for i in 0..100 {
            cache.add(i, i);
            cache.add(i, i);
            assert!(cache.len() <= 10);
        }
        assert_eq!(cache.len(), 10);
    }

    #[test]
    fn test_scenario_twenty_keys_ten_slots() {
        // Protected capacity 10, K=2; 20 distinct keys inserted twice each:
        // 10 resident at the end, 10 notifications in promotion order.
        let evicted: Arc<parking_lot::Mutex<Vec<u32>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let config = TieredCacheConfig::new(10, NonZeroUsize::new(2).unwrap());
        let mut cache: TieredCache<u32, u32> =
            TieredCache::init(config, Some(Box::new(move |k, _v| sink.lock().push(k))));

        for i in 0..20u32 {
            cache.add(i, i * 100);
            cache.add(i, i * 100);
        }

        assert_eq!(cache.len(), 10);
        assert_eq!(cache.metrics().promotions, 20);
        assert_eq!(cache.metrics().protected_evictions, 10);
        let log = evicted.lock();
        assert_eq!(log.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_remove_skips_hook() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let config = TieredCacheConfig::new(4, NonZeroUsize::new(2).unwrap());
        let mut cache: TieredCache<&str, i32> = TieredCache::init(
            config,
            Some(Box::new(move |_k, _v| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        cache.add("a", 1);
        cache.add("a", 1); // promoted
        cache.add("b", 2); // probation

        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.remove(&"b"), Some(2));
        assert_eq!(cache.remove(&"missing"), None);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.probation_len(), 0);
    }

    #[test]
    fn test_unbounded_protected_tier() {
        let config = TieredCacheConfig::new(0, NonZeroUsize::new(1).unwrap());
        let mut cache: TieredCache<u32, u32> = TieredCache::new(config);

        // K=1: every add promotes immediately; capacity 0 never evicts.
        for i in 0..1000 {
            cache.add(i, i);
        }
        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.metrics().protected_evictions, 0);
    }

    #[test]
    fn test_clear() {
        let mut cache = make_cache(4, 2);
        cache.add("a", 1);
        cache.add("a", 1);
        cache.add("b", 2);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.probation_len(), 0);
        assert_eq!(cache.get(&"a"), None);

        // The cache remains usable after clear.
        cache.add("c", 3);
        cache.add("c", 3);
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn test_metrics_counters() {
        let mut cache = make_cache(4, 2);
        cache.add("a", 1); // insertion
        cache.get(&"a"); // probation hit, promotes
        cache.get(&"a"); // protected hit
        cache.get(&"missing"); // miss

        let m = cache.metrics();
        assert_eq!(m.insertions, 1);
        assert_eq!(m.probation_hits, 1);
        assert_eq!(m.protected_hits, 1);
        assert_eq!(m.misses, 1);
        assert_eq!(m.requests, 3);
    }
}
