//! Immutable view over a cached value.

use std::fmt;

use bytes::Bytes;

/// An immutable snapshot of a cached value.
///
/// Cloning is cheap (reference-counted); the backing storage is never handed
/// out by reference, so a caller cannot mutate what the cache holds. Callers
/// that need the raw bytes take a defensive copy via [`ByteView::to_vec`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Creates a view that owns a copy of `data`.
    #[must_use]
    pub fn copy_from(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Number of bytes in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the view holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a defensive copy of the underlying bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
        }
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data.as_bytes()),
        }
    }
}

/// Lossy UTF-8 rendering of the value.
impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}
