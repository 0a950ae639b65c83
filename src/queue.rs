//! Bounded multi-producer queue for `no_std` environments.
//!
//! Built on `critical-section` and `heapless::Deque`, so producers may run in
//! any thread or interrupt context. Nothing here ever blocks: a full queue
//! hands the value back to the caller.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

/// Error returned when trying to push into a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull<T>(pub T);

/// A bounded, interrupt-safe FIFO.
pub struct Queue<T, const SIZE: usize> {
    inner: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> Queue<T, SIZE> {
    /// Create a new empty queue.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Push a value to the back of the queue.
    ///
    /// Returns `Err(QueueFull(value))` if the queue is full.
    pub fn try_send(&self, value: T) -> Result<(), QueueFull<T>> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(value).map_err(QueueFull)
        })
    }

    /// Pop the oldest value, if any.
    pub fn try_receive(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of queued values.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every queued value.
    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().clear());
    }

    pub const fn capacity(&self) -> usize {
        SIZE
    }
}

impl<T, const SIZE: usize> Default for Queue<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
