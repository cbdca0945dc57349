//! Bounded accumulator for unconsumed serial input.
//!
//! Behaves as a sliding window over the most recent `N` bytes: when an
//! append would overflow, the oldest bytes are discarded first. Nothing
//! here can fail, only truncate history.

/// Rolling buffer of inbound bytes with a drop-oldest overflow policy.
pub struct RxAccumulator<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> RxAccumulator<N> {
    pub const fn new() -> Self {
        Self { buf: [0; N], len: 0 }
    }

    /// Appends newly received bytes, dropping from the front if needed.
    ///
    /// A chunk longer than the capacity replaces the entire content with
    /// the last `N` bytes of the chunk.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.len() >= N {
            self.buf.copy_from_slice(&bytes[bytes.len() - N..]);
            self.len = N;
            return;
        }
        let overflow = (self.len + bytes.len()).saturating_sub(N);
        if overflow > 0 {
            self.consume(overflow);
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }

    /// Removes `n` bytes from the front, shifting the remainder down.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for RxAccumulator<N> {
    fn default() -> Self {
        Self::new()
    }
}
