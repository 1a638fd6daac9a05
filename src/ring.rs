//! Fixed-capacity byte ring for received data.

/// A circular byte queue with `N` slots.
///
/// `head` is the next slot to write and `tail` the next slot to read; the ring is empty when they
/// are equal. One slot is always left free so that a full ring can be told apart from an empty
/// one, which makes the usable capacity `N - 1` bytes.
///
/// A push onto a full ring is refused and counted as an overrun, so bytes already queued are
/// never overwritten and only the consumer ever moves `tail`.
#[derive(Clone, Debug)]
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    head: usize,
    tail: usize,
    overruns: u64,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    /// Creates an empty ring.
    pub const fn new() -> Self {
        assert!(N > 1, "a ring needs at least two slots");
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
            overruns: 0,
        }
    }

    /// The number of bytes the ring can hold at once.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Returns whether no bytes are queued.
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Returns whether another push would be refused.
    pub fn is_full(&self) -> bool {
        (self.head + 1) % N == self.tail
    }

    /// The number of bytes queued.
    pub fn len(&self) -> usize {
        (self.head + N - self.tail) % N
    }

    /// The index of the next slot to write.
    pub fn head(&self) -> usize {
        self.head
    }

    /// The index of the next slot to read.
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// The number of bytes refused because the ring was full.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Queues a byte, returning false if the ring was full and the byte was dropped.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            self.overruns += 1;
            return false;
        }
        self.buf[self.head] = byte;
        self.head = (self.head + 1) % N;
        true
    }

    /// Copies up to `out.len()` of the oldest bytes into `out` without removing them, returning
    /// how many were copied.
    pub fn peek(&self, out: &mut [u8]) -> usize {
        let len = out.len().min(self.len());
        let first = len.min(N - self.tail);
        out[..first].copy_from_slice(&self.buf[self.tail..self.tail + first]);
        out[first..len].copy_from_slice(&self.buf[..len - first]);
        len
    }

    /// Removes `len` bytes from the front of the ring.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `len` bytes are queued.
    pub fn consume(&mut self, len: usize) {
        assert!(len <= self.len(), "consumed {len} of {} queued bytes", self.len());
        self.tail = (self.tail + len) % N;
    }

    /// Moves up to `out.len()` of the oldest bytes into `out`, returning how many were moved.
    pub fn pop_range(&mut self, out: &mut [u8]) -> usize {
        let len = self.peek(out);
        self.consume(len);
        len
    }
}
