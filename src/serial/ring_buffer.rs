//! Fixed-capacity byte ring.
//!
//! One slot of the backing store is sacrificed to tell a full ring from an
//! empty one, so a `RingBuffer<SIZE>` holds at most `SIZE - 1` bytes.
//! Not synchronized: owners wrap it in a critical-section mutex.

/// Byte FIFO over a `[u8; SIZE]` backing store
#[derive(Debug, Clone)]
pub struct RingBuffer<const SIZE: usize> {
    buf: [u8; SIZE],
    read: usize,
    write: usize,
}

impl<const SIZE: usize> RingBuffer<SIZE> {
    pub const fn new() -> Self {
        Self {
            buf: [0; SIZE],
            read: 0,
            write: 0,
        }
    }

    /// Most bytes the ring can ever hold.
    pub const fn capacity(&self) -> usize {
        SIZE.saturating_sub(1)
    }

    pub const fn used(&self) -> usize {
        if self.write >= self.read {
            self.write - self.read
        } else {
            SIZE - self.read + self.write
        }
    }

    pub const fn free(&self) -> usize {
        self.capacity() - self.used()
    }

    pub const fn is_empty(&self) -> bool {
        self.read == self.write
    }

    /// Append all of `data`, or nothing.
    ///
    /// Returns the number of bytes written: `data.len()` on success, 0 if
    /// `data` is empty, larger than [`capacity`](Self::capacity), or larger
    /// than the current free space.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let len = data.len();
        if len == 0 || len > self.capacity() || len > self.free() {
            return 0;
        }

        let first = len.min(SIZE - self.write);
        let (head, tail) = data.split_at(first);
        self.buf[self.write..self.write + first].copy_from_slice(head);
        self.buf[..tail.len()].copy_from_slice(tail);
        self.write = (self.write + len) % SIZE;
        len
    }

    /// Move up to `out.len()` bytes out of the ring.
    ///
    /// Returns the number of bytes read; 0 if the ring is empty.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let count = self.peek(out);
        self.skip(count)
    }

    /// Copy up to `out.len()` bytes without consuming them.
    pub fn peek(&self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.used());
        if count == 0 {
            return 0;
        }

        let first = count.min(SIZE - self.read);
        out[..first].copy_from_slice(&self.buf[self.read..self.read + first]);
        out[first..count].copy_from_slice(&self.buf[..count - first]);
        count
    }

    /// Drop up to `count` bytes from the front. Returns how many were dropped.
    pub fn skip(&mut self, count: usize) -> usize {
        let count = count.min(self.used());
        if count > 0 {
            self.read = (self.read + count) % SIZE;
        }
        count
    }

    /// Drop every buffered byte.
    pub fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
    }
}

impl<const SIZE: usize> Default for RingBuffer<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
