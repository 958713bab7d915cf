//! Cache groups: the read-path orchestrator.
//!
//! A [`Group`] is a named cache namespace with a single entry point,
//! [`Group::get`], composing four layers:
//!
//! 1. **Local cache** — a [`TieredCache`] consulted first; hits return
//!    immediately.
//! 2. **Deduplication** — misses go through [`SingleFlight`], so concurrent
//!    misses for one key collapse into a single load.
//! 3. **Peer routing** — if a [`PeerPicker`] is registered and names a peer
//!    for the key, the value is fetched remotely. Peer-fetched data is
//!    returned *without* populating the local cache: a key is cached only at
//!    its owning peer, which keeps hot keys from being replicated onto every
//!    node that reads them.
//! 4. **Fallback loading** — when no peer applies or the remote fetch fails,
//!    the system-of-record [`Loader`] runs and its result populates the
//!    local cache.
//!
//! Groups live in a [`GroupRegistry`] owned by the application's composition
//! root; there is no process-global registry.
//!
//! # Failure semantics
//!
//! A failed load caches nothing, so the next `get` for that key starts a
//! genuinely fresh attempt. Peer-fetch failures are absorbed (logged at warn
//! level) and fall through to the loader; the caller only sees an error when
//! the loader itself fails.
//!
//! # Cancellation
//!
//! Loaders and peer fetchers may block on I/O; they run outside every lock
//! held by this crate. Timeouts and cancellation belong inside those
//! injected capabilities — a caller giving up does not abort a load that
//! other deduplicated waiters are still sharing.

use crate::byteview::ByteView;
use crate::config::TieredCacheConfig;
use crate::error::Error;
use crate::singleflight::SingleFlight;
use crate::tiered::TieredCache;
use core::fmt;
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, OnceLock};

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// The system-of-record fetch, invoked on a confirmed miss.
///
/// Implemented automatically by any
/// `Fn(&str) -> Result<Vec<u8>, Error> + Send + Sync` closure.
pub trait Loader: Send + Sync {
    /// Loads the bytes for `key` from the system of record.
    fn load(&self, key: &str) -> Result<Vec<u8>, Error>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> Result<Vec<u8>, Error> + Send + Sync,
{
    fn load(&self, key: &str) -> Result<Vec<u8>, Error> {
        self(key)
    }
}

/// A remote peer that can serve a group's keys.
///
/// The wire transport is out of scope for this crate. One valid binding is
/// an HTTP GET to `<base>/<group>/<key>` returning an octet-stream body on
/// success and a non-2xx status with a plain-text error body on failure.
pub trait PeerFetcher: Send + Sync {
    /// Fetches the bytes for `key` in `group` from this peer.
    fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>, Error>;
}

/// Locates the peer that owns a specific key, typically backed by a
/// [`HashRing`](crate::HashRing) over the cluster membership.
///
/// Returning `None` means no peer applies — either the ring is empty or
/// this process owns the key itself — and the group loads locally.
pub trait PeerPicker: Send + Sync {
    /// Picks the owning peer for `key`, or `None` to load locally.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}

/// A named cache namespace composing local cache, peer routing,
/// deduplication, and fallback loading.
///
/// Construct groups through [`GroupRegistry::new_group`]. A group lives for
/// the process lifetime and is shared behind an `Arc`.
pub struct Group {
    name: String,

    loader: Box<dyn Loader>,

    /// Local cache; the lock is held only for the O(1) tier mutation,
    /// never across a load.
    cache: Mutex<TieredCache<String, ByteView>>,

    /// Set at most once by [`Group::register_peers`].
    peers: OnceLock<Arc<dyn PeerPicker>>,

    flight: SingleFlight<ByteView>,
}

impl Group {
    /// Creates a standalone group. Prefer [`GroupRegistry::new_group`],
    /// which also makes the group discoverable by name.
    pub fn new(
        name: impl Into<String>,
        config: TieredCacheConfig,
        loader: impl Loader + 'static,
    ) -> Self {
        Group {
            name: name.into(),
            loader: Box::new(loader),
            cache: Mutex::new(TieredCache::new(config)),
            peers: OnceLock::new(),
            flight: SingleFlight::new(),
        }
    }

    /// Returns the group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers the peer-selection capability.
    ///
    /// May be called at most once per group; a second call is a
    /// configuration error. Without registration the group behaves as a
    /// purely local read-through cache.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> Result<(), Error> {
        self.peers.set(picker).map_err(|_| {
            Error::Configuration(format!(
                "register_peers called more than once on group {}",
                self.name
            ))
        })
    }

    /// Looks up `key`, loading it on a miss.
    ///
    /// An empty key fails with [`Error::EmptyKey`] before any load. A local
    /// cache hit returns immediately. On a miss, concurrent callers for the
    /// same key share a single deduplicated load — peer fetch if a peer owns
    /// the key, the local [`Loader`] otherwise — and all receive the
    /// identical outcome.
    pub fn get(&self, key: &str) -> Result<ByteView, Error> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }

        if let Some(view) = self.cache.lock().get(key) {
            debug!("[{}] cache hit for {key}", self.name);
            return Ok(view.clone());
        }

        self.load(key)
    }

    /// Removes `key` from the local cache. The next `get` reloads it.
    pub fn invalidate(&self, key: &str) -> bool {
        self.cache.lock().remove(key).is_some()
    }

    /// Returns a snapshot of the local cache's counters.
    pub fn cache_metrics(&self) -> crate::TieredCacheMetrics {
        self.cache.lock().metrics().clone()
    }

    /// The deduplicated miss path: peer fetch with local-loader fallback.
    fn load(&self, key: &str) -> Result<ByteView, Error> {
        self.flight.run(key, || {
            if let Some(picker) = self.peers.get() {
                if let Some(peer) = picker.pick_peer(key) {
                    match self.fetch_from_peer(peer.as_ref(), key) {
                        Ok(view) => return Ok(view),
                        Err(err) => {
                            warn!("[{}] peer fetch failed, falling back: {err}", self.name);
                        }
                    }
                }
            }

            self.load_locally(key)
        })
    }

    /// Loads from the system of record and populates the local cache.
    fn load_locally(&self, key: &str) -> Result<ByteView, Error> {
        let bytes = self.loader.load(key)?;
        let view = ByteView::from(bytes);
        self.cache.lock().add(key.to_owned(), view.clone());
        Ok(view)
    }

    /// Fetches from the owning peer. Deliberately does not populate the
    /// local cache: peer-owned data is cached only at its owner.
    fn fetch_from_peer(&self, peer: &dyn PeerFetcher, key: &str) -> Result<ByteView, Error> {
        let bytes = peer.fetch(&self.name, key)?;
        Ok(ByteView::from(bytes))
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

/// Name → group registry, owned by the application's composition root.
///
/// Reads (`get`) take a shared lock and do not block each other; writes
/// (`new_group`) are exclusive. Registering a name twice overwrites the
/// prior entry — last writer wins, by design.
///
/// # Examples
///
/// ```
/// use groupcache_rs::{GroupRegistry, TieredCacheConfig};
/// use std::num::NonZeroUsize;
///
/// let registry = GroupRegistry::new();
/// let config = TieredCacheConfig::new(64, NonZeroUsize::new(2).unwrap());
/// registry.new_group("users", config, |key: &str| Ok(key.as_bytes().to_vec()));
///
/// assert!(registry.get("users").is_some());
/// assert!(registry.get("absent").is_none());
/// ```
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        GroupRegistry {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Constructs a group and registers it under `name`, overwriting any
    /// prior group of that name.
    pub fn new_group(
        &self,
        name: &str,
        config: TieredCacheConfig,
        loader: impl Loader + 'static,
    ) -> Arc<Group> {
        let group = Arc::new(Group::new(name, config, loader));
        self.groups
            .write()
            .insert(name.to_owned(), Arc::clone(&group));
        group
    }

    /// Returns the group registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Returns the number of registered groups.
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Returns `true` if no groups are registered.
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("groups", &self.groups.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::num::NonZeroUsize;

    fn small_config() -> TieredCacheConfig {
        TieredCacheConfig::new(16, NonZeroUsize::new(2).unwrap())
    }

    #[test]
    fn test_loader_closure_adapter() {
        let loader = |key: &str| Ok(key.as_bytes().to_vec());
        assert_eq!(loader.load("k").unwrap(), b"k".to_vec());
    }

    #[test]
    fn test_empty_key_rejected_without_load() {
        let group = Group::new("t", small_config(), |_key: &str| {
            panic!("loader must not run for an empty key")
        });
        assert_eq!(group.get("").unwrap_err(), Error::EmptyKey);
    }

    #[test]
    fn test_registry_last_writer_wins() {
        let registry = GroupRegistry::new();
        let first = registry.new_group("g", small_config(), |_: &str| Ok(vec![1]));
        let second = registry.new_group("g", small_config(), |_: &str| Ok(vec![2]));

        assert_eq!(registry.len(), 1);
        let resolved = registry.get("g").unwrap();
        assert!(Arc::ptr_eq(&resolved, &second));
        assert!(!Arc::ptr_eq(&resolved, &first));
    }

    #[test]
    fn test_register_peers_twice_is_configuration_error() {
        struct NoPeers;
        impl PeerPicker for NoPeers {
            fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerFetcher>> {
                None
            }
        }

        let group = Group::new("t", small_config(), |_: &str| Ok(Vec::new()));
        assert!(group.register_peers(Arc::new(NoPeers)).is_ok());
        let err = group.register_peers(Arc::new(NoPeers)).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_invalidate_forces_reload() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let group = Group::new("t", small_config(), move |key: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(key.as_bytes().to_vec())
        });

        group.get("k").unwrap();
        group.get("k").unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        assert!(group.invalidate("k"));
        group.get("k").unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(!group.invalidate("absent"));
    }
}
