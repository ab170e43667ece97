//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread pushing accepted streams into a `BoundedQueue`
//! - Fixed worker pool popping streams, one request per connection
//! - Requests routed through the `ResourceLockTable` to the `Handler`

pub mod io;

mod client;
mod connection;
mod server;
mod worker;

pub use client::{parse_response, Client, ClientResponse};
pub use connection::Connection;
pub use server::{Server, ServerContext, ShutdownHandle};
pub use worker::WorkerPool;

/// `tracing` target of the one-line-per-request access log
///
/// Each event's message is `METHOD,/target,STATUS,REQUEST_ID`.
pub const ACCESS_LOG_TARGET: &str = "fileserv::access";
