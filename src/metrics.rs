//! Cache metrics reporting.
//!
//! Counters are reported through a `BTreeMap` rather than a `HashMap` so the
//! output order is deterministic — logs, test assertions, and exports see the
//! same key order every run. With this few keys the O(log n) lookups are
//! irrelevant.

use core::fmt;
use std::collections::BTreeMap;

/// Common interface for reporting cache counters.
pub trait CacheMetrics {
    /// Returns all counters as a name → value map with deterministic ordering.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Returns the name of the eviction algorithm being measured.
    fn algorithm_name(&self) -> &'static str;
}

/// Counters tracked by a [`TieredCache`](crate::TieredCache).
///
/// A "request" is any `get`; `add` contributes to `insertions`. Promotions,
/// evictions, and per-tier hits expose the admission-control behaviour that a
/// plain hit rate would hide: a workload with many probation evictions and few
/// promotions is being successfully defended against scan pollution.
#[derive(Debug, Default, Clone)]
pub struct TieredCacheMetrics {
    /// Total `get` requests.
    pub requests: u64,

    /// Hits served from the protected tier.
    pub protected_hits: u64,

    /// Hits served from the probation tier.
    pub probation_hits: u64,

    /// `get` requests that found neither tier.
    pub misses: u64,

    /// Total `add` calls (including in-place overwrites).
    pub insertions: u64,

    /// Promotions from probation into the protected tier.
    pub promotions: u64,

    /// Capacity evictions from the protected tier (the ones that fire the
    /// eviction hook).
    pub protected_evictions: u64,

    /// Silent FIFO evictions from the probation tier.
    pub probation_evictions: u64,
}

impl TieredCacheMetrics {
    /// Creates a zeroed metrics record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit in the protected tier.
    #[inline]
    pub(crate) fn record_protected_hit(&mut self) {
        self.requests += 1;
        self.protected_hits += 1;
    }

    /// Records a hit in the probation tier.
    #[inline]
    pub(crate) fn record_probation_hit(&mut self) {
        self.requests += 1;
        self.probation_hits += 1;
    }

    /// Records a miss.
    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.requests += 1;
        self.misses += 1;
    }

    /// Records an insertion.
    #[inline]
    pub(crate) fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records a promotion from probation to protected.
    #[inline]
    pub(crate) fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    /// Records a capacity eviction from the protected tier.
    #[inline]
    pub(crate) fn record_protected_eviction(&mut self) {
        self.protected_evictions += 1;
    }

    /// Records a silent FIFO eviction from the probation tier.
    #[inline]
    pub(crate) fn record_probation_eviction(&mut self) {
        self.probation_evictions += 1;
    }

    /// Fraction of requests served from either tier, in `[0, 1]`.
    pub fn hit_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        (self.protected_hits + self.probation_hits) as f64 / self.requests as f64
    }
}

impl CacheMetrics for TieredCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        m.insert("requests".to_owned(), self.requests as f64);
        m.insert("protected_hits".to_owned(), self.protected_hits as f64);
        m.insert("probation_hits".to_owned(), self.probation_hits as f64);
        m.insert("misses".to_owned(), self.misses as f64);
        m.insert("insertions".to_owned(), self.insertions as f64);
        m.insert("promotions".to_owned(), self.promotions as f64);
        m.insert(
            "protected_evictions".to_owned(),
            self.protected_evictions as f64,
        );
        m.insert(
            "probation_evictions".to_owned(),
            self.probation_evictions as f64,
        );
        m.insert("hit_rate".to_owned(), self.hit_rate());
        m
    }

    fn algorithm_name(&self) -> &'static str {
        "TieredLRU"
    }
}

impl fmt::Display for TieredCacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests={} hits={}/{} misses={} promotions={} evictions={}/{}",
            self.requests,
            self.protected_hits,
            self.probation_hits,
            self.misses,
            self.promotions,
            self.protected_evictions,
            self.probation_evictions,
        )
    }
}
