//! Fixed-capacity byte container used as a transfer target
//!
//! Capacity is set at construction and never reallocated; the descriptor
//! core only ever fills or drains the region, it does not resize it.

/// Fixed-capacity byte buffer with a filled-length watermark.
///
/// A read transfer fills bytes from the front and records how many are
/// valid; a write transfer drains from the front. `capacity()` is the fixed
/// region size, `filled()` how much of it currently holds data.
#[derive(Debug, Clone)]
pub struct FixedBuffer {
    data: Box<[u8]>,
    filled: usize,
}

impl FixedBuffer {
    /// Create a zeroed buffer of the given fixed capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            filled: 0,
        }
    }

    /// Fixed capacity of the underlying region
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes currently holding valid data
    #[must_use]
    pub const fn filled(&self) -> usize {
        self.filled
    }

    /// True if no bytes are filled
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// The filled prefix of the region
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// The whole fixed region, regardless of fill level
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the whole fixed region
    pub fn space_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reset the filled watermark without touching the bytes
    pub fn clear(&mut self) {
        self.filled = 0;
    }

    /// Record how many bytes of the region hold valid data.
    ///
    /// Capped at capacity; transfers never report more than they were given
    /// room for.
    pub(crate) fn set_filled(&mut self, filled: usize) {
        self.filled = filled.min(self.data.len());
    }
}

impl From<Vec<u8>> for FixedBuffer {
    /// Buffer whose capacity and filled length are the vector's length.
    ///
    /// The usual way to stage an outgoing payload for a write transfer.
    fn from(data: Vec<u8>) -> Self {
        let filled = data.len();
        Self {
            data: data.into_boxed_slice(),
            filled,
        }
    }
}

impl From<&[u8]> for FixedBuffer {
    fn from(data: &[u8]) -> Self {
        Self::from(data.to_vec())
    }
}
