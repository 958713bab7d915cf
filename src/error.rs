//! Error taxonomy for the read path.
//!
//! Every fallible operation in this crate reports one of the variants below.
//! The type is `Clone` because a deduplicated load fans its outcome out to
//! every caller that joined it — each waiter receives its own copy of the
//! identical error.

use thiserror::Error;

/// Errors produced by groups, loaders, and peer fetches.
///
/// # Variants and recovery
///
/// | Variant | Meaning | Recovery |
/// |---------|---------|----------|
/// | [`Error::EmptyKey`] | `get` called with an empty key | fix the caller; no load was attempted |
/// | [`Error::Configuration`] | invalid setup, e.g. registering peers twice | fix at composition time; non-recoverable at runtime |
/// | [`Error::Load`] | the system-of-record loader failed | retry `get`; nothing was cached |
/// | [`Error::PeerFetch`] | a remote peer fetch failed | absorbed internally as a fallback signal; only surfaced by peer transports themselves |
///
/// A failed load never leaves a partially populated cache entry, so a later
/// `get` for the same key starts a genuinely fresh attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller passed an empty key. No load is attempted.
    #[error("key is required")]
    EmptyKey,

    /// The group was configured incorrectly, e.g. `register_peers` was
    /// called more than once.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The system-of-record loader failed for a key.
    #[error("load failed for {key}: {reason}")]
    Load {
        /// The key that was being loaded.
        key: String,
        /// Loader-supplied failure description.
        reason: String,
    },

    /// A remote peer fetch failed. Inside [`Group::get`](crate::Group::get)
    /// this is absorbed and the group falls back to the local loader; it is
    /// only observable when invoking a [`PeerFetcher`](crate::PeerFetcher)
    /// directly.
    #[error("peer fetch failed for {key}: {reason}")]
    PeerFetch {
        /// The key that was being fetched.
        key: String,
        /// Transport-supplied failure description.
        reason: String,
    },
}

impl Error {
    /// Convenience constructor for loader failures.
    pub fn load(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Load {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for peer-fetch failures.
    pub fn peer_fetch(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::PeerFetch {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
