//! ResourceLockTable Tests
//!
//! Tests verify:
//! - Same name always routes to the same slot
//! - Idle slots are recycled for new names
//! - In-use counting and release on drop
//! - At most `size` distinct names are in flight at once

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use fileserv::locks::ResourceLockTable;
use fileserv::sync::Priority;

fn table(size: usize) -> ResourceLockTable {
    ResourceLockTable::new(size, Priority::Writers, 0)
}

// =============================================================================
// Routing Tests
// =============================================================================

#[test]
fn test_same_name_same_slot() {
    let table = table(4);

    let a = table.acquire("a.txt");
    let b = table.acquire("a.txt");

    assert_eq!(a.index(), b.index());
    assert!(std::ptr::eq(a.lock(), b.lock()));
    assert_eq!(table.in_use("a.txt"), 2);
    assert_eq!(table.in_flight(), 1);
}

#[test]
fn test_distinct_names_distinct_slots() {
    let table = table(3);

    let a = table.acquire("a");
    let b = table.acquire("b");
    let c = table.acquire("c");

    assert_ne!(a.index(), b.index());
    assert_ne!(b.index(), c.index());
    assert_ne!(a.index(), c.index());
    assert_eq!(table.in_flight(), 3);
}

#[test]
fn test_release_on_drop() {
    let table = table(2);

    {
        let _a = table.acquire("a");
        assert_eq!(table.in_use("a"), 1);
    }
    assert_eq!(table.in_use("a"), 0);
    assert_eq!(table.in_flight(), 0);
}

#[test]
fn test_idle_name_is_still_matched() {
    let table = table(2);

    let first = table.acquire("a").index();
    let again = table.acquire("a").index();

    assert_eq!(first, again);
}

#[test]
fn test_idle_slot_is_recycled() {
    let table = table(1);

    let a_index = table.acquire("a").index();
    let b = table.acquire("b");

    // One slot only: "b" must have taken over the slot "a" left idle
    assert_eq!(b.index(), a_index);
    assert_eq!(table.in_use("b"), 1);
    assert_eq!(table.in_use("a"), 0);
}

#[test]
fn test_busy_slot_is_not_renamed() {
    let table = table(2);

    let a = table.acquire("a");
    let b = table.acquire("b");
    assert_ne!(a.index(), b.index());
    drop(b);

    // "c" must take the idle slot, never the one "a" is holding
    let c = table.acquire("c");
    assert_ne!(c.index(), a.index());
    assert_eq!(table.in_use("a"), 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_same_name_rendezvous() {
    const THREADS: usize = 8;

    let table = table(THREADS);
    let barrier = Barrier::new(THREADS);

    let indexes: Vec<usize> = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (table, barrier) = (&table, &barrier);
                s.spawn(move |_| {
                    barrier.wait();
                    let slot = table.acquire("shared");
                    let index = slot.index();
                    // Hold until everyone has routed
                    barrier.wait();
                    index
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert!(indexes.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(table.in_flight(), 0);
}

#[test]
fn test_write_locks_serialize_same_name() {
    let table = table(4);
    let inside = AtomicBool::new(false);

    crossbeam::scope(|s| {
        for _ in 0..4 {
            let (table, inside) = (&table, &inside);
            s.spawn(move |_| {
                for _ in 0..50 {
                    let slot = table.acquire("same");
                    let _write = slot.lock().writer_lock();
                    assert!(!inside.swap(true, Ordering::SeqCst), "two writers on one name");
                    thread::yield_now();
                    inside.store(false, Ordering::SeqCst);
                }
            });
        }
    })
    .unwrap();
}

#[test]
fn test_extra_name_waits_for_free_slot() {
    let table = Arc::new(table(2));

    let a = table.acquire("a");
    let b = table.acquire("b");

    let routed = Arc::new(AtomicBool::new(false));
    let handle = {
        let table = Arc::clone(&table);
        let routed = Arc::clone(&routed);
        thread::spawn(move || {
            let c = table.acquire("c");
            routed.store(true, Ordering::SeqCst);
            c.index()
        })
    };

    thread::sleep(Duration::from_millis(100));
    assert!(!routed.load(Ordering::SeqCst), "a third name cannot be in flight");
    assert_eq!(table.in_flight(), 2);

    let freed = b.index();
    drop(b);

    assert_eq!(handle.join().unwrap(), freed);
    assert_eq!(table.in_use("a"), 1);
    drop(a);
}
