//! # fileserv
//!
//! A concurrent file-serving daemon with:
//! - GET/PUT over a minimal text request/response protocol
//! - A bounded accept queue feeding a fixed worker pool
//! - Per-resource reader-writer locks with selectable fairness
//! - Atomic publish of uploads (temp file + rename)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Acceptor (Server::run)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ push (blocks when full)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 BoundedQueue<TcpStream>                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ pop (blocks when empty)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              WorkerPool (N threads, Connection)              │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐               ┌──────────────────┐
//!   │ RequestParser   │               │ ResourceLockTable│
//!   │ (head grammar)  │               │ (N FairRwLocks)  │
//!   └─────────────────┘               └────────┬─────────┘
//!                                              │
//!                                              ▼
//!                                     ┌──────────────────┐
//!                                     │     Handler      │
//!                                     │ (fetch / store)  │
//!                                     └──────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod sync;
pub mod locks;
pub mod protocol;
pub mod handler;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ServerError, Result};
pub use config::Config;
pub use handler::Handler;
pub use network::{Server, ShutdownHandle};
pub use sync::{BoundedQueue, FairRwLock, Priority};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fileserv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
