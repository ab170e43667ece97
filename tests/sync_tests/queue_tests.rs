//! BoundedQueue Tests
//!
//! Tests verify:
//! - FIFO ordering within capacity
//! - Wrap-around of the ring indices
//! - Blocking push when full and blocking pop when empty
//! - No loss or duplication under concurrent producers/consumers
//! - Close semantics

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use fileserv::sync::BoundedQueue;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_queue_is_empty() {
    let queue: BoundedQueue<u32> = BoundedQueue::new(4);
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
    assert_eq!(queue.capacity(), 4);
    assert!(!queue.is_closed());
}

#[test]
fn test_fifo_order() {
    let queue = BoundedQueue::new(8);

    for i in 0..8 {
        assert!(queue.push(i));
    }
    assert_eq!(queue.len(), 8);

    for i in 0..8 {
        assert_eq!(queue.pop(), Some(i));
    }
    assert!(queue.is_empty());
}

#[test]
fn test_wraps_around_ring() {
    let queue = BoundedQueue::new(3);

    // Cycle many more items than slots through the ring
    for round in 0..10 {
        assert!(queue.push(round * 2));
        assert!(queue.push(round * 2 + 1));
        assert_eq!(queue.pop(), Some(round * 2));
        assert_eq!(queue.pop(), Some(round * 2 + 1));
    }
    assert!(queue.is_empty());
}

#[test]
fn test_fills_to_capacity() {
    let queue = BoundedQueue::new(63);

    for i in 0..63 {
        assert!(queue.push(i));
    }
    assert_eq!(queue.len(), 63);
    assert_eq!(queue.pop(), Some(0));
    assert_eq!(queue.len(), 62);
}

#[test]
#[should_panic]
fn test_zero_capacity_panics() {
    let _queue: BoundedQueue<u8> = BoundedQueue::new(0);
}

// =============================================================================
// Blocking Tests
// =============================================================================

#[test]
fn test_push_blocks_when_full() {
    let queue = Arc::new(BoundedQueue::new(2));
    queue.push(1);
    queue.push(2);

    let pushed = Arc::new(AtomicBool::new(false));
    let handle = {
        let queue = Arc::clone(&queue);
        let pushed = Arc::clone(&pushed);
        thread::spawn(move || {
            assert!(queue.push(3));
            pushed.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(100));
    assert!(!pushed.load(Ordering::SeqCst), "push into a full queue must block");

    assert_eq!(queue.pop(), Some(1));
    handle.join().unwrap();
    assert!(pushed.load(Ordering::SeqCst));

    assert_eq!(queue.pop(), Some(2));
    assert_eq!(queue.pop(), Some(3));
}

#[test]
fn test_pop_blocks_when_empty() {
    let queue: Arc<BoundedQueue<&str>> = Arc::new(BoundedQueue::new(2));

    let popped = Arc::new(AtomicBool::new(false));
    let handle = {
        let queue = Arc::clone(&queue);
        let popped = Arc::clone(&popped);
        thread::spawn(move || {
            let item = queue.pop();
            popped.store(true, Ordering::SeqCst);
            item
        })
    };

    thread::sleep(Duration::from_millis(100));
    assert!(!popped.load(Ordering::SeqCst), "pop from an empty queue must block");

    queue.push("hello");
    assert_eq!(handle.join().unwrap(), Some("hello"));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_producers_and_consumers() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: usize = 500;

    let queue = BoundedQueue::new(5);

    let received: Vec<Vec<usize>> = crossbeam::scope(|s| {
        for p in 0..PRODUCERS {
            let queue = &queue;
            s.spawn(move |_| {
                for i in 0..PER_PRODUCER {
                    assert!(queue.push(p * PER_PRODUCER + i));
                }
            });
        }

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let queue = &queue;
                s.spawn(move |_| {
                    let mut items = Vec::new();
                    for _ in 0..(PRODUCERS * PER_PRODUCER / CONSUMERS) {
                        items.push(queue.pop().unwrap());
                    }
                    items
                })
            })
            .collect();

        consumers.into_iter().map(|c| c.join().unwrap()).collect()
    })
    .unwrap();

    let all: Vec<usize> = received.iter().flatten().copied().collect();
    let unique: HashSet<usize> = all.iter().copied().collect();

    assert_eq!(all.len(), PRODUCERS * PER_PRODUCER, "no item lost");
    assert_eq!(unique.len(), all.len(), "no item duplicated");
    assert!(queue.is_empty());
}

#[test]
fn test_single_producer_order_preserved_across_consumer() {
    let queue = BoundedQueue::new(3);

    crossbeam::scope(|s| {
        s.spawn(|_| {
            for i in 0..1000u32 {
                queue.push(i);
            }
        });

        let mut expected = 0u32;
        while expected < 1000 {
            assert_eq!(queue.pop(), Some(expected));
            expected += 1;
        }
    })
    .unwrap();
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_drains_then_returns_none() {
    let queue = BoundedQueue::new(4);
    queue.push(1);
    queue.push(2);
    queue.close();

    assert!(queue.is_closed());
    assert!(!queue.push(3), "push after close is refused");
    assert_eq!(queue.pop(), Some(1));
    assert_eq!(queue.pop(), Some(2));
    assert_eq!(queue.pop(), None);
}

#[test]
fn test_close_wakes_blocked_consumers() {
    let queue: Arc<BoundedQueue<u8>> = Arc::new(BoundedQueue::new(1));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    queue.close();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), None);
    }
}

#[test]
fn test_close_wakes_blocked_producer() {
    let queue = Arc::new(BoundedQueue::new(1));
    queue.push(0u8);

    let handle = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.push(1))
    };

    thread::sleep(Duration::from_millis(50));
    queue.close();

    assert!(!handle.join().unwrap());
    assert_eq!(queue.pop(), Some(0));
    assert_eq!(queue.pop(), None);
}
