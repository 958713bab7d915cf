//! Configuration for the tiered eviction cache.
//!
//! Invalid configurations are rejected at construction time; the cache
//! operations themselves never fail. The promotion threshold uses
//! [`NonZeroUsize`] so a zero threshold is unrepresentable.

use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a [`TieredCache`](crate::TieredCache).
///
/// # Fields
///
/// - **protected capacity** `C`: maximum entries in the protected tier.
///   `0` means unbounded.
/// - **probation capacity** `P`: maximum entries in the probation tier.
///   Defaults to `C` when not set explicitly.
/// - **promotion threshold** `K`: number of sightings before a key may enter
///   the protected tier. Always at least 1.
///
/// # Examples
///
/// ```
/// use groupcache_rs::TieredCacheConfig;
/// use std::num::NonZeroUsize;
///
/// let config = TieredCacheConfig::new(100, NonZeroUsize::new(2).unwrap())
///     .with_probation_capacity(500);
///
/// assert_eq!(config.capacity(), 100);
/// assert_eq!(config.probation_capacity(), 500);
/// assert_eq!(config.promotion_threshold().get(), 2);
/// ```
#[derive(Clone, Copy)]
pub struct TieredCacheConfig {
    /// Protected-tier capacity; 0 = unbounded.
    capacity: usize,

    /// Probation-tier capacity; `None` defaults to `capacity`.
    probation_capacity: Option<usize>,

    /// Sightings required before promotion into the protected tier.
    promotion_threshold: NonZeroUsize,
}

impl TieredCacheConfig {
    /// Creates a configuration with protected capacity `capacity` and
    /// promotion threshold `promotion_threshold`. The probation tier
    /// defaults to the same capacity as the protected tier.
    pub fn new(capacity: usize, promotion_threshold: NonZeroUsize) -> Self {
        Self {
            capacity,
            probation_capacity: None,
            promotion_threshold,
        }
    }

    /// Overrides the probation-tier capacity. `0` means unbounded.
    pub fn with_probation_capacity(mut self, probation_capacity: usize) -> Self {
        self.probation_capacity = Some(probation_capacity);
        self
    }

    /// Returns the protected-tier capacity. `0` means unbounded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the probation-tier capacity, defaulting to the protected
    /// capacity when not overridden. `0` means unbounded.
    pub fn probation_capacity(&self) -> usize {
        self.probation_capacity.unwrap_or(self.capacity)
    }

    /// Returns the promotion threshold `K`.
    pub fn promotion_threshold(&self) -> NonZeroUsize {
        self.promotion_threshold
    }
}

impl fmt::Debug for TieredCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TieredCacheConfig")
            .field("capacity", &self.capacity)
            .field("probation_capacity", &self.probation_capacity())
            .field("promotion_threshold", &self.promotion_threshold)
            .finish()
    }
}
