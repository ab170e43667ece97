//! Bounded blocking queue
//!
//! Fixed-capacity circular buffer with blocking push/pop.
//!
//! ## Layout
//! ```text
//! capacity = 7, slots = 8 (one sacrificial slot)
//!
//! queue: [ 1 2 3 4 5 6 7 ]
//! slots: [ 6 7 _ 1 2 3 4 5 ]
//!              ^ ^
//!           tail head
//! ```
//! - `head` is the next slot to pop and holds a live item unless empty
//! - `tail` is the next slot to push and never holds a live item
//! - empty: `head == tail`
//! - full:  `(tail + 1) % slots == head`

use parking_lot::{Condvar, Mutex};

/// Ring state guarded by the queue mutex
struct Ring<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    closed: bool,
}

impl<T> Ring<T> {
    fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    fn is_full(&self) -> bool {
        (self.tail + 1) % self.slots.len() == self.head
    }

    fn len(&self) -> usize {
        (self.tail + self.slots.len() - self.head) % self.slots.len()
    }
}

/// Multi-producer, multi-consumer blocking FIFO with a fixed capacity
///
/// ## Concurrency:
/// - All state lives behind one mutex
/// - `push` waits on `allow_push` while full, `pop` waits on `allow_pop`
///   while empty; each side signals the other after a successful operation
/// - Waiter ordering is whatever `parking_lot::Condvar` provides
pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    allow_push: Condvar,
    allow_pop: Condvar,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");

        let mut slots = Vec::with_capacity(capacity + 1);
        slots.resize_with(capacity + 1, || None);

        Self {
            ring: Mutex::new(Ring {
                slots,
                head: 0,
                tail: 0,
                closed: false,
            }),
            allow_push: Condvar::new(),
            allow_pop: Condvar::new(),
            capacity,
        }
    }

    /// Append an item, blocking while the queue is full
    ///
    /// Returns `false` (dropping the item) only if the queue has been closed.
    pub fn push(&self, item: T) -> bool {
        let mut ring = self.ring.lock();
        while ring.is_full() && !ring.closed {
            self.allow_push.wait(&mut ring);
        }
        if ring.closed {
            return false;
        }

        let tail = ring.tail;
        ring.slots[tail] = Some(item);
        ring.tail = (tail + 1) % ring.slots.len();

        // Queue is now non-empty
        self.allow_pop.notify_one();
        true
    }

    /// Remove the oldest item, blocking while the queue is empty
    ///
    /// Returns `None` only once the queue is closed and fully drained.
    pub fn pop(&self) -> Option<T> {
        let mut ring = self.ring.lock();
        while ring.is_empty() && !ring.closed {
            self.allow_pop.wait(&mut ring);
        }
        if ring.is_empty() {
            return None;
        }

        let head = ring.head;
        let item = ring.slots[head].take();
        ring.head = (head + 1) % ring.slots.len();

        // Queue is now not full
        self.allow_push.notify_one();
        item
    }

    /// Close the queue and wake every blocked producer and consumer
    ///
    /// Items already queued can still be popped.
    pub fn close(&self) {
        let mut ring = self.ring.lock();
        ring.closed = true;
        drop(ring);

        self.allow_push.notify_all();
        self.allow_pop.notify_all();
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.ring.lock().closed
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    /// Whether the queue holds no items
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    /// Maximum number of items the queue holds at once
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
