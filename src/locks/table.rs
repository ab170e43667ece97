//! Resource lock table
//!
//! Fixed pool of (resource name, lock, in-use count) slots.

use parking_lot::{Condvar, Mutex};

use crate::sync::{FairRwLock, Priority};

/// Name and reference count of one slot, guarded by the table mutex
struct SlotState {
    name: String,
    in_use: usize,
}

/// Routes resource names to a bounded set of reusable locks
///
/// ## Concurrency:
/// - `slots` (names and counts) is protected by one table-wide mutex, held
///   only for the linear scan and the count update, never across I/O
/// - `locks` is immutable after construction; slot `i` always owns
///   `locks[i]`, so a renamed slot reuses the same lock object
/// - All methods use `&self`
pub struct ResourceLockTable {
    slots: Mutex<Vec<SlotState>>,
    locks: Box<[FairRwLock]>,
    slot_freed: Condvar,
}

impl ResourceLockTable {
    /// Create a table with `size` slots, each with its own lock
    ///
    /// `size` should equal the worker count: a worker holds at most one
    /// slot, so at most `size` resources are ever in flight.
    pub fn new(size: usize, priority: Priority, max_wait: u32) -> Self {
        let slots = (0..size)
            .map(|_| SlotState {
                name: String::new(),
                in_use: 0,
            })
            .collect();
        let locks = (0..size)
            .map(|_| FairRwLock::new(priority, max_wait))
            .collect();

        Self {
            slots: Mutex::new(slots),
            locks,
            slot_freed: Condvar::new(),
        }
    }

    /// Number of slots
    pub fn size(&self) -> usize {
        self.locks.len()
    }

    /// Route `name` to a slot and take a reference on it
    ///
    /// A slot already carrying `name` always wins, so concurrent requests
    /// for the same resource meet on the same lock. Otherwise the first idle
    /// slot is renamed to `name`. If every slot is busy with another name
    /// the caller waits until one is released.
    pub fn acquire(&self, name: &str) -> SlotHandle<'_> {
        let mut slots = self.slots.lock();

        let index = loop {
            let mut idle = None;
            let mut matched = None;
            for (i, slot) in slots.iter().enumerate() {
                if slot.name == name {
                    matched = Some(i);
                    break;
                }
                if idle.is_none() && slot.in_use == 0 {
                    idle = Some(i);
                }
            }

            if let Some(i) = matched {
                break i;
            }
            if let Some(i) = idle {
                let slot = &mut slots[i];
                slot.name.clear();
                slot.name.push_str(name);
                break i;
            }

            tracing::debug!(resource = name, "all lock slots busy, waiting");
            self.slot_freed.wait(&mut slots);
        };

        slots[index].in_use += 1;
        SlotHandle { table: self, index }
    }

    /// Number of references currently held on the slot carrying `name`
    pub fn in_use(&self, name: &str) -> usize {
        self.slots
            .lock()
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.in_use)
            .unwrap_or(0)
    }

    /// Number of slots with at least one reference
    pub fn in_flight(&self) -> usize {
        self.slots.lock().iter().filter(|slot| slot.in_use > 0).count()
    }

    fn release(&self, index: usize) {
        let mut slots = self.slots.lock();
        let slot = &mut slots[index];
        slot.in_use -= 1;
        let idle = slot.in_use == 0;
        drop(slots);

        if idle {
            self.slot_freed.notify_all();
        }
    }
}

/// A reference on one table slot; released on drop
#[must_use = "the slot is released as soon as the handle is dropped"]
pub struct SlotHandle<'a> {
    table: &'a ResourceLockTable,
    index: usize,
}

impl<'a> SlotHandle<'a> {
    /// Position of the slot in the table
    pub fn index(&self) -> usize {
        self.index
    }

    /// The lock shared by every request routed to this slot
    pub fn lock(&self) -> &'a FairRwLock {
        &self.table.locks[self.index]
    }
}

impl Drop for SlotHandle<'_> {
    fn drop(&mut self) {
        self.table.release(self.index);
    }
}
