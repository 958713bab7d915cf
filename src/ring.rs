//! Consistent-hash ring with virtual replicas.
//!
//! Maps keys to owning nodes such that adding or removing a node remaps only
//! the keys falling in that node's arcs of the ring — roughly `1/n` of the
//! key space — instead of rehashing everything.
//!
//! ```text
//!            0/2^32
//!              │
//!      ┌──── [n2#0] ◀─ keys hashing past the largest
//!      │       │        position wrap around here
//!   [n1#1]     │
//!      │    [n1#0]     Each node owns `replicas` virtual
//!      │       │       positions; a key belongs to the first
//!      └─── [n2#1]     position at or after its own hash.
//! ```
//!
//! Every virtual position is derived deterministically from
//! `(replica_index, node_id)`, so two processes that add the same node set in
//! any order build identical rings without coordination — each node in a
//! cluster can answer "who owns this key?" locally and agree with its peers.
//!
//! The hash function is pluggable; CRC32 is the default. Determinism and a
//! reasonably uniform distribution are the only required properties. Hash
//! collisions between virtual positions are possible and tolerated: the
//! colliding positions resolve to whichever node was recorded last.

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

use core::fmt;

/// Hash function used to place virtual nodes and keys on the ring.
///
/// Must be deterministic across processes; `DefaultHashBuilder`-style
/// per-process random seeds would break ring agreement between peers.
pub type RingHashFn = fn(&[u8]) -> u32;

/// A consistent-hash ring mapping keys to node identifiers.
///
/// # Examples
///
/// ```
/// use groupcache_rs::HashRing;
///
/// let mut ring = HashRing::new(50);
/// ring.add_nodes(["cache-a:8001", "cache-b:8002", "cache-c:8003"]);
///
/// let owner = ring.lookup("user:42").unwrap();
/// // The same ring built elsewhere agrees on the owner.
/// let mut other = HashRing::new(50);
/// other.add_nodes(["cache-a:8001", "cache-b:8002", "cache-c:8003"]);
/// assert_eq!(other.lookup("user:42"), Some(owner));
/// ```
pub struct HashRing {
    hash: RingHashFn,

    /// Virtual positions per real node.
    replicas: usize,

    /// All virtual positions, sorted ascending.
    positions: Vec<u32>,

    /// Virtual position → owning node id.
    owners: HashMap<u32, String>,
}

impl HashRing {
    /// Creates an empty ring with `replicas` virtual nodes per real node,
    /// using CRC32 as the hash function.
    ///
    /// # Panics
    ///
    /// Panics if `replicas` is zero.
    pub fn new(replicas: usize) -> Self {
        Self::with_hash(replicas, crc32fast::hash)
    }

    /// Creates an empty ring with a caller-supplied hash function.
    ///
    /// # Panics
    ///
    /// Panics if `replicas` is zero.
    pub fn with_hash(replicas: usize, hash: RingHashFn) -> Self {
        assert!(replicas > 0, "hash ring requires at least one replica per node");
        HashRing {
            hash,
            replicas,
            positions: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Returns the number of virtual positions currently on the ring.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no nodes have been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Adds real nodes to the ring, placing `replicas` virtual positions for
    /// each at `hash("{replica_index}{node}")`.
    ///
    /// Re-adding the same node set — e.g. after a restart — reproduces an
    /// identical ring.
    pub fn add_nodes<I>(&mut self, nodes: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for node in nodes {
            let node = node.into();
            for replica in 0..self.replicas {
                let position = (self.hash)(format!("{replica}{node}").as_bytes());
                self.positions.push(position);
                self.owners.insert(position, node.clone());
            }
        }
        self.positions.sort_unstable();
    }

    /// Returns the node owning `key`, or `None` on an empty ring.
    ///
    /// The key belongs to the first virtual position at or after its hash;
    /// a hash past the largest position wraps around to the smallest (the
    /// ring is circular).
    pub fn lookup(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.positions.partition_point(|&p| p < hash);
        let position = self.positions[idx % self.positions.len()];
        self.owners.get(&position).map(String::as_str)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("positions", &self.positions.len())
            .finish()
    }
}
