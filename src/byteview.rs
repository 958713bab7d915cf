//! Immutable byte-buffer view returned by cache lookups.

use core::fmt;
use std::sync::Arc;

/// An immutable view over cached bytes.
///
/// Cloning is cheap (a reference-count bump); the backing buffer is shared
/// between the cache and every caller holding a view, and is never exposed
/// mutably. Use [`ByteView::to_vec`] when an owned, detached copy is needed.
///
/// # Examples
///
/// ```
/// use groupcache_rs::ByteView;
///
/// let view = ByteView::from("hello");
/// assert_eq!(view.len(), 5);
/// assert_eq!(view.as_bytes(), b"hello");
/// assert_eq!(view.to_string(), "hello");
///
/// let copy = view.to_vec();
/// assert_eq!(copy, b"hello".to_vec());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ByteView {
    data: Arc<[u8]>,
}

impl ByteView {
    /// Returns the length of the viewed data in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the view is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrows the viewed bytes. The underlying buffer is immutable and
    /// shared; callers cannot modify the cached data through this slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns a defensive copy of the viewed bytes, detached from the
    /// cache's storage.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        ByteView { data: data.into() }
    }
}

impl From<&[u8]> for ByteView {
    fn from(data: &[u8]) -> Self {
        ByteView { data: data.into() }
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        ByteView {
            data: data.as_bytes().into(),
        }
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.data))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byteview_basics() {
        let view = ByteView::from(vec![1u8, 2, 3]);
        assert_eq!(view.len(), 3);
        assert!(!view.is_empty());
        assert_eq!(view.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_to_vec_is_detached() {
        let view = ByteView::from("abc");
        let mut copy = view.to_vec();
        copy[0] = b'z';
        assert_eq!(view.as_bytes(), b"abc");
    }

    #[test]
    fn test_clone_shares_storage() {
        let view = ByteView::from("shared");
        let clone = view.clone();
        assert_eq!(view, clone);
        assert!(std::ptr::eq(view.as_bytes(), clone.as_bytes()));
    }

    #[test]
    fn test_display_lossy_utf8() {
        assert_eq!(ByteView::from("héllo").to_string(), "héllo");
        assert_eq!(ByteView::from(vec![0xff, 0xfe]).to_string(), "\u{fffd}\u{fffd}");
    }
}
