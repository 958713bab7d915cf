//! Arena-backed doubly linked list with in-place reordering.
//!
//! This module provides the ordering structure underneath
//! [`TieredCache`](crate::TieredCache). Nodes live in a single `Vec` arena and
//! link to each other through slot indices, so reordering an entry on every
//! access never touches the allocator: a `move_to_back` is three index swaps.
//! Freed slots are recycled through a free list.
//!
//! The list has two designated ends:
//!
//! - **back** — where [`List::push_back`] inserts and [`List::move_to_back`]
//!   moves to. The cache treats this as the most-recently-used end.
//! - **front** — where [`List::pop_front`] removes from. The cache treats
//!   this as the least-recently-used (or oldest-inserted) end.
//!
//! **Note**: This module is internal infrastructure. Slot indices returned by
//! [`List::push_back`] are only meaningful while the node is still linked;
//! callers must not use an index after removing the node it refers to.

use core::fmt;

/// Sentinel index meaning "no node".
const NIL: usize = usize::MAX;

/// A node in the arena. `val` is `None` only while the slot sits on the
/// free list.
struct Node<T> {
    val: Option<T>,
    prev: usize,
    next: usize,
}

/// A doubly linked list whose nodes live in a growable arena.
///
/// All operations are O(1). The list itself is unbounded; capacity policy
/// belongs to the caller.
pub(crate) struct List<T> {
    slots: Vec<Node<T>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> List<T> {
    /// Creates an empty list.
    pub(crate) fn new() -> List<T> {
        List {
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// Returns the current number of linked nodes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no nodes are linked.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Takes a slot for `val`, recycling a freed one when available.
    fn alloc(&mut self, val: T) -> usize {
        match self.free.pop() {
            Some(idx) => {
                let node = &mut self.slots[idx];
                node.val = Some(val);
                node.prev = NIL;
                node.next = NIL;
                idx
            }
            None => {
                self.slots.push(Node {
                    val: Some(val),
                    prev: NIL,
                    next: NIL,
                });
                self.slots.len() - 1
            }
        }
    }

    /// Detaches `idx` from its neighbours without freeing the slot.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = &self.slots[idx];
            (node.prev, node.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }

        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
        self.len -= 1;
    }

    /// Links an already allocated slot at the back end.
    fn attach_back(&mut self, idx: usize) {
        self.slots[idx].prev = self.tail;
        self.slots[idx].next = NIL;

        if self.tail == NIL {
            self.head = idx;
        } else {
            self.slots[self.tail].next = idx;
        }

        self.tail = idx;
        self.len += 1;
    }

    /// Inserts `val` at the back end and returns its slot index.
    ///
    /// The returned index stays valid until the node is removed.
    pub(crate) fn push_back(&mut self, val: T) -> usize {
        let idx = self.alloc(val);
        self.attach_back(idx);
        idx
    }

    /// Removes and returns the value at the front end, if any.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        if self.head == NIL {
            return None;
        }
        let idx = self.head;
        self.unlink(idx);
        self.free.push(idx);
        self.slots[idx].val.take()
    }

    /// Removes the node at `idx` and returns its value.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not refer to a currently linked node.
    pub(crate) fn remove(&mut self, idx: usize) -> T {
        assert!(
            idx < self.slots.len() && self.slots[idx].val.is_some(),
            "List::remove on unlinked slot"
        );
        self.unlink(idx);
        self.free.push(idx);
        self.slots[idx].val.take().expect("slot checked above")
    }

    /// Moves the node at `idx` to the back end.
    pub(crate) fn move_to_back(&mut self, idx: usize) {
        if self.tail == idx {
            return;
        }
        self.unlink(idx);
        self.attach_back(idx);
    }

    /// Returns a reference to the value at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not refer to a currently linked node.
    pub(crate) fn get(&self, idx: usize) -> &T {
        self.slots[idx].val.as_ref().expect("List::get on unlinked slot")
    }

    /// Returns a mutable reference to the value at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not refer to a currently linked node.
    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut T {
        self.slots[idx]
            .val
            .as_mut()
            .expect("List::get_mut on unlinked slot")
    }

    /// Returns a reference to the value at the front end, if any.
    pub(crate) fn front(&self) -> Option<&T> {
        if self.head == NIL {
            None
        } else {
            self.slots[self.head].val.as_ref()
        }
    }

    /// Removes all nodes. Slot storage is retained for reuse.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    /// Iterates values from front (oldest) to back (newest).
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }
}

/// Front-to-back iterator over a [`List`].
pub(crate) struct Iter<'a, T> {
    list: &'a List<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.list.slots[self.cursor];
        self.cursor = node.next;
        node.val.as_ref()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
