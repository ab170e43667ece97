//! Error types for fileserv
//!
//! Provides a unified error type for all operations.
//!
//! Client mistakes (bad request line, missing file, unsupported method) are
//! not errors at this level: they become a [`Status`](crate::protocol::Status)
//! written back to the client. `ServerError` covers connection-level I/O
//! failures and fatal startup problems.

use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias using ServerError
pub type Result<T> = std::result::Result<T, ServerError>;

/// Unified error type for fileserv operations
#[derive(Debug, Error)]
pub enum ServerError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Client closed connection after {received} of {expected} body bytes")]
    IncompleteBody { expected: u64, received: u64 },

    // -------------------------------------------------------------------------
    // Startup Errors
    // -------------------------------------------------------------------------
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn worker thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("Request grammar failed to compile: {0}")]
    Pattern(#[from] regex::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
