//! In-flight call deduplication.
//!
//! `SingleFlight` guarantees at most one physical execution of an expensive,
//! keyed operation at a time: while a call for a key is in flight, further
//! callers for the same key suspend and share its single outcome instead of
//! executing again. This is what turns a thundering herd of cache misses for
//! one hot key into exactly one loader invocation.
//!
//! ```text
//! thread 1: run("k", op) ──▶ registers call, executes op ─▶ result ─┬─▶ returns
//! thread 2: run("k", _)  ──▶ joins, blocks ────────────────────────┤
//! thread 3: run("k", _)  ──▶ joins, blocks ────────────────────────┘
//!                            (op executed once; all three see the
//!                             identical value or identical error)
//! ```
//!
//! The registry lock is held only while inserting or removing the call
//! marker, never while the operation runs, so calls for unrelated keys never
//! serialize against each other.
//!
//! No result caching happens here: once a call completes and deregisters,
//! the next `run` for that key executes afresh. Durable storage of results
//! is [`TieredCache`](crate::TieredCache)'s job.

use crate::error::Error;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// An in-flight or completed call. Waiters block on `done` until `result`
/// is filled in.
struct Call<T> {
    result: Mutex<Option<Result<T, Error>>>,
    done: Condvar,
}

impl<T: Clone> Call<T> {
    fn new() -> Self {
        Call {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    /// Blocks until the executing caller records a result, then returns a
    /// copy of it.
    fn wait(&self) -> Result<T, Error> {
        let mut slot = self.result.lock();
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            self.done.wait(&mut slot);
        }
    }

    /// Records the result and wakes all joined waiters.
    fn complete(&self, result: Result<T, Error>) {
        let mut slot = self.result.lock();
        *slot = Some(result);
        self.done.notify_all();
    }
}

/// Collapses concurrent identical in-flight operations into one execution.
///
/// # Examples
///
/// ```
/// use groupcache_rs::SingleFlight;
///
/// let flight: SingleFlight<u32> = SingleFlight::new();
/// let value = flight.run("answer", || Ok(42)).unwrap();
/// assert_eq!(value, 42);
/// ```
pub struct SingleFlight<T> {
    calls: Mutex<HashMap<String, Arc<Call<T>>>>,
}

impl<T: Clone> SingleFlight<T> {
    /// Creates a deduplicator with no calls in flight.
    pub fn new() -> Self {
        SingleFlight {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Executes `op` for `key`, unless a call for `key` is already in
    /// flight — in that case the caller blocks until that call completes
    /// and returns its recorded outcome verbatim, without invoking `op`.
    ///
    /// The executing caller runs `op` outside the registry lock; only
    /// same-key callers queue. If `op` fails, every joined caller receives
    /// the identical error. No retry happens at this layer.
    pub fn run<F>(&self, key: &str, op: F) -> Result<T, Error>
    where
        F: FnOnce() -> Result<T, Error>,
    {
        let call = {
            let mut calls = self.calls.lock();
            if let Some(existing) = calls.get(key) {
                let existing = Arc::clone(existing);
                drop(calls);
                return existing.wait();
            }
            let call = Arc::new(Call::new());
            calls.insert(key.to_owned(), Arc::clone(&call));
            call
        };

        let result = op();
        call.complete(result.clone());
        self.calls.lock().remove(key);

        result
    }

    /// Returns the number of calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}
