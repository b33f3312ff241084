//! The output buffer, which doubles as the back-reference dictionary.

use crate::error::{DecompressError, Result};

/// Growable output; every byte written so far can be copied again.
#[derive(Debug, Default, Clone)]
pub struct Window {
    buf: Vec<u8>,
    max_offset: usize,
    max_match_length: usize,
}

impl Window {
    /// empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Appends `length` bytes copied from `offset` bytes before the end.
    ///
    /// `length` may exceed `offset`: the copy runs left to right, so bytes
    /// written by this copy are sources for its later bytes (run-length style).
    /// Room for the copy is reserved up front; if that fails the window is left
    /// unchanged and [`DecompressError::OutputTooLarge`] is returned.
    pub fn back_copy(&mut self, offset: usize, length: usize) -> Result<()> {
        let pos = self.buf.len();
        if offset == 0 || offset > pos {
            return Err(DecompressError::InvalidBackReference {
                offset,
                available: pos,
            });
        }

        self.buf
            .try_reserve(length)
            .map_err(|_| DecompressError::OutputTooLarge { length })?;

        let start = pos - offset;
        if offset >= length {
            self.buf.extend_from_within(start..start + length);
        } else {
            for i in 0..length {
                let b = self.buf[start + i];
                self.buf.push(b);
            }
        }

        self.max_offset = self.max_offset.max(offset);
        self.max_match_length = self.max_match_length.max(length);
        Ok(())
    }

    /// The last `n` bytes written (all of them if there are fewer).
    pub fn tail(&self, n: usize) -> &[u8] {
        &self.buf[self.buf.len().saturating_sub(n)..]
    }

    /// Number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// All bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Largest distance used by a back-reference so far.
    pub fn max_offset(&self) -> usize {
        self.max_offset
    }

    /// Longest back-reference so far.
    pub fn max_match_length(&self) -> usize {
        self.max_match_length
    }

    /// Hands out the decompressed bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn window_with(bytes: &[u8]) -> Window {
        let mut w = Window::new();
        for &b in bytes {
            w.push(b);
        }
        w
    }

    #[test]
    fn test_run_length_copy() {
        let mut w = window_with(&[0x41]);
        w.back_copy(1, 5).unwrap();
        assert_eq!(w.as_slice(), &[0x41; 6]);
    }

    #[test]
    fn test_overlapping_pattern() {
        let mut w = window_with(&[1, 2, 3]);
        w.back_copy(2, 6).unwrap();
        assert_eq!(w.as_slice(), &[1, 2, 3, 2, 3, 2, 3, 2, 3]);
    }

    #[test]
    fn test_non_overlapping_copy() {
        let mut w = window_with(&[1, 2, 3, 4]);
        w.back_copy(4, 2).unwrap();
        assert_eq!(w.as_slice(), &[1, 2, 3, 4, 1, 2]);
        assert_eq!(w.tail(3), &[4, 1, 2]);
    }

    #[test]
    fn test_invalid_offsets() {
        let mut w = window_with(&[1, 2, 3]);
        assert!(matches!(
            w.back_copy(4, 1),
            Err(DecompressError::InvalidBackReference {
                offset: 4,
                available: 3
            })
        ));
        assert!(matches!(
            w.back_copy(0, 2),
            Err(DecompressError::InvalidBackReference { offset: 0, .. })
        ));
        // nothing written on failure
        assert_eq!(w.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_unallocatable_copy() {
        let mut w = window_with(&[0x41]);
        assert!(matches!(
            w.back_copy(1, 1 << 60),
            Err(DecompressError::OutputTooLarge { length }) if length == 1 << 60
        ));
        assert_eq!(w.as_slice(), &[0x41]);
        assert_eq!(w.max_match_length(), 0);
    }

    #[test]
    fn test_copy_stats() {
        let mut w = window_with(&[9, 8, 7]);
        w.back_copy(3, 2).unwrap();
        w.back_copy(1, 7).unwrap();
        assert_eq!(w.max_offset(), 3);
        assert_eq!(w.max_match_length(), 7);
        assert_eq!(w.tail(100).len(), 12);
    }
}
