//! Fair reader-writer lock
//!
//! Reader-writer mutual exclusion with a selectable fairness policy.
//!
//! ## Policies
//! - `Readers`: writers wait while any reader is active or waiting
//! - `Writers`: readers wait while any writer is active or waiting
//! - `NWay`: every writer admission resets `countdown = max_wait`. While the
//!   countdown is positive, waiting readers go ahead of waiting writers and
//!   each reader admitted with a writer waiting spends one tick. At zero,
//!   waiting writers go first. A waiting writer therefore sits through at
//!   most `max_wait` reader admissions after the previous writer.
//!
//! ## Invariants
//! - `active_writers` is 0 or 1
//! - `active_writers > 0` implies `active_readers == 0`
//!
//! The lock protects no data of its own; it orders access to something
//! external (a file on disk), so guards carry no payload.

use parking_lot::{Condvar, Mutex};

/// Fairness policy applied when readers and writers compete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Readers always go ahead of waiting writers
    Readers,

    /// Writers always go ahead of waiting readers
    Writers,

    /// Bounded rotation between readers and writers (see module docs)
    NWay,
}

/// Counter snapshot, for tests and debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockStats {
    pub waiting_readers: u32,
    pub active_readers: u32,
    pub waiting_writers: u32,
    pub active_writers: u32,
    pub countdown: u32,
}

/// Counters guarded by the internal mutex
#[derive(Default)]
struct State {
    waiting_readers: u32,
    active_readers: u32,
    waiting_writers: u32,
    active_writers: u32,
    countdown: u32,
}

/// Reader-writer lock with configurable fairness
///
/// ## Concurrency:
/// - Counters are mutated only under `state`
/// - Readers park on `read_go`, writers on `write_go`; each re-checks its
///   admission predicate after every wakeup
pub struct FairRwLock {
    priority: Priority,
    max_wait: u32,
    state: Mutex<State>,
    read_go: Condvar,
    write_go: Condvar,
}

impl FairRwLock {
    /// Create a lock with the given policy
    ///
    /// `max_wait` only matters for `Priority::NWay`.
    pub fn new(priority: Priority, max_wait: u32) -> Self {
        Self {
            priority,
            max_wait,
            state: Mutex::new(State::default()),
            read_go: Condvar::new(),
            write_go: Condvar::new(),
        }
    }

    /// The configured fairness policy
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// The configured N-way countdown reset value
    pub fn max_wait(&self) -> u32 {
        self.max_wait
    }

    /// Acquire shared access, blocking while the policy denies readers
    pub fn reader_lock(&self) -> ReadGuard<'_> {
        let mut state = self.state.lock();

        state.waiting_readers += 1;
        while self.reader_blocked(&state) {
            self.read_go.wait(&mut state);
        }

        // Only admissions that jump a waiting writer spend the countdown
        if state.waiting_writers > 0 {
            state.countdown = state.countdown.saturating_sub(1);
        }
        state.waiting_readers -= 1;
        state.active_readers += 1;

        ReadGuard { lock: self }
    }

    /// Acquire exclusive access, blocking while the policy denies writers
    pub fn writer_lock(&self) -> WriteGuard<'_> {
        let mut state = self.state.lock();

        state.waiting_writers += 1;
        while self.writer_blocked(&state) {
            self.write_go.wait(&mut state);
        }

        state.countdown = self.max_wait;
        state.waiting_writers -= 1;
        state.active_writers += 1;

        WriteGuard { lock: self }
    }

    /// Snapshot the counters
    pub fn stats(&self) -> LockStats {
        let state = self.state.lock();
        LockStats {
            waiting_readers: state.waiting_readers,
            active_readers: state.active_readers,
            waiting_writers: state.waiting_writers,
            active_writers: state.active_writers,
            countdown: state.countdown,
        }
    }

    fn reader_unlock(&self) {
        let mut state = self.state.lock();
        state.active_readers -= 1;
        drop(state);

        self.write_go.notify_one();
    }

    fn writer_unlock(&self) {
        let mut state = self.state.lock();
        state.active_writers -= 1;
        drop(state);

        // Several readers may be admissible at once
        self.write_go.notify_one();
        self.read_go.notify_all();
    }

    fn reader_blocked(&self, state: &State) -> bool {
        if state.active_writers > 0 {
            return true;
        }
        if state.waiting_writers == 0 {
            return false;
        }
        match self.priority {
            Priority::Readers => false,
            Priority::Writers => true,
            Priority::NWay => state.countdown == 0,
        }
    }

    fn writer_blocked(&self, state: &State) -> bool {
        if state.active_readers > 0 || state.active_writers > 0 {
            return true;
        }
        if state.waiting_readers == 0 {
            return false;
        }
        match self.priority {
            Priority::Readers => true,
            Priority::Writers => false,
            Priority::NWay => state.countdown > 0,
        }
    }
}

impl std::fmt::Debug for FairRwLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FairRwLock")
            .field("priority", &self.priority)
            .field("max_wait", &self.max_wait)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Shared access to a [`FairRwLock`]; released on drop
#[must_use = "the read lock is released as soon as the guard is dropped"]
pub struct ReadGuard<'a> {
    lock: &'a FairRwLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.reader_unlock();
    }
}

/// Exclusive access to a [`FairRwLock`]; released on drop
#[must_use = "the write lock is released as soon as the guard is dropped"]
pub struct WriteGuard<'a> {
    lock: &'a FairRwLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.writer_unlock();
    }
}
