//! Locks Module
//!
//! Per-resource locking for the request handlers.
//!
//! ## Responsibilities
//! - Map a request target to a `FairRwLock`
//! - Recycle idle slots for new resource names
//! - Keep a busy slot's name pinned so same-name requests share its lock
//!
//! ## Sizing
//! The table has exactly one slot per worker. Each worker holds at most one
//! slot at a time, so an idle or matching slot normally exists; `acquire`
//! waits for a release in the case where neither does.

mod table;

pub use table::{ResourceLockTable, SlotHandle};
