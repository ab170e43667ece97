//! Sync Module
//!
//! Blocking synchronization primitives shared by the acceptor and workers.
//!
//! ## Responsibilities
//! - Hand accepted connections from the acceptor to workers (`BoundedQueue`)
//! - Serialize access to a single resource with a selectable fairness policy
//!   (`FairRwLock`)
//!
//! Neither type touches the network, so both can be exercised directly
//! from plain threads.

mod queue;
mod rwlock;

pub use queue::BoundedQueue;
pub use rwlock::{FairRwLock, LockStats, Priority, ReadGuard, WriteGuard};
