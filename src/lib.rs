#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Which layer am I looking for?
//!
//! | Type | Layer | Use it when |
//! |------|-------|-------------|
//! | [`Group`] | orchestrator | you want the whole read path: cache → peers → loader |
//! | [`GroupRegistry`] | composition root | you need to resolve groups by name |
//! | [`TieredCache`] | eviction cache | you want the scan-resistant cache on its own |
//! | [`HashRing`] | peer ownership | you are implementing a [`PeerPicker`] |
//! | [`SingleFlight`] | deduplication | you want herd collapse for your own operations |
//! | [`ByteView`] | value type | always — it is what `get` returns |
//!
//! ## The read path at a glance
//!
//! ```
//! use groupcache_rs::{Error, GroupRegistry, TieredCacheConfig};
//! use std::num::NonZeroUsize;
//!
//! let registry = GroupRegistry::new();
//! let group = registry.new_group(
//!     "scores",
//!     TieredCacheConfig::new(1024, NonZeroUsize::new(2).unwrap()),
//!     |key: &str| match key {
//!         "Zhangsan" => Ok(b"1-1".to_vec()),
//!         missing => Err(Error::load(missing, "not in the slow db")),
//!     },
//! );
//!
//! // Miss: the loader runs, the value is cached locally.
//! assert_eq!(group.get("Zhangsan").unwrap().to_string(), "1-1");
//! // Loader failures propagate; nothing is cached for the key.
//! assert!(group.get("Lisi").is_err());
//! ```
//!
//! ## Wiring up peers
//!
//! A [`PeerPicker`] typically wraps a [`HashRing`] plus one [`PeerFetcher`]
//! per remote node, returning `None` for keys the local process owns:
//!
//! ```
//! use groupcache_rs::{HashRing, PeerFetcher, PeerPicker};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! struct RingPicker {
//!     me: String,
//!     ring: HashRing,
//!     fetchers: HashMap<String, Arc<dyn PeerFetcher>>,
//! }
//!
//! impl PeerPicker for RingPicker {
//!     fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
//!         let owner = self.ring.lookup(key)?;
//!         if owner == self.me {
//!             return None; // this process owns the key; load locally
//!         }
//!         self.fetchers.get(owner).cloned()
//!     }
//! }
//! ```

/// Arena-backed doubly linked list used by the tiered cache.
///
/// Internal infrastructure: index handles into a `Vec` arena instead of
/// per-node allocations, so recency updates never touch the allocator.
pub(crate) mod list;

/// Configuration for the tiered eviction cache.
pub mod config;

/// Two-tier, promotion-gated eviction cache.
///
/// Keys must be seen `K` times in the probation tier before they may occupy
/// a protected slot; one-off keys age out of probation silently.
pub mod tiered;

/// Cache metrics reporting.
pub mod metrics;

/// Consistent-hash ring with virtual replicas.
pub mod ring;

/// In-flight call deduplication (singleflight).
pub mod singleflight;

/// Immutable byte-buffer view returned by cache lookups.
pub mod byteview;

/// Cache groups, loaders, peer capabilities, and the group registry.
pub mod group;

/// Error taxonomy.
pub mod error;

pub use byteview::ByteView;
pub use config::TieredCacheConfig;
pub use error::Error;
pub use group::{Group, GroupRegistry, Loader, PeerFetcher, PeerPicker};
pub use metrics::{CacheMetrics, TieredCacheMetrics};
pub use ring::HashRing;
pub use singleflight::SingleFlight;
pub use tiered::{EvictionHook, TieredCache};
