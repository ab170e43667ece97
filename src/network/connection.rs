//! Connection Handler
//!
//! Handles one accepted client connection: read the head, route, respond.

use std::net::TcpStream;
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{write_status, Method, Status, HEAD_TERMINATOR};

use super::io::read_until;
use super::server::ServerContext;
use super::ACCESS_LOG_TARGET;

/// A single client connection, closed when dropped
pub struct Connection<'a> {
    /// TCP stream (read and written through `&TcpStream`)
    stream: TcpStream,

    /// Shared server state
    context: &'a ServerContext,

    /// Peer address for logging
    peer_addr: String,
}

impl<'a> Connection<'a> {
    /// Wrap an accepted stream, applying the configured timeouts
    pub fn new(stream: TcpStream, context: &'a ServerContext) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let mut connection = Self {
            stream,
            context,
            peer_addr,
        };
        connection.set_timeouts(
            context.config.read_timeout_ms,
            context.config.write_timeout_ms,
        )?;

        Ok(connection)
    }

    /// Configure connection timeouts (0 leaves the stream fully blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Serve the one request carried by this connection
    ///
    /// `scratch` is the worker's buffer: the head is read into it and it is
    /// reused for body copies. Returns the response status, or `None` if the
    /// peer closed without sending anything.
    pub fn handle(&mut self, scratch: &mut [u8]) -> Result<Option<Status>> {
        let len = read_until(&mut self.stream, scratch, HEAD_TERMINATOR)?;
        if len == 0 {
            tracing::debug!("Client {} closed without a request", self.peer_addr);
            return Ok(None);
        }

        let request = match self.context.parser.parse(&scratch[..len]) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("Rejected request from {}: {}", self.peer_addr, e);
                let status = e.status();
                write_status(&mut self.stream, status)?;
                return Ok(Some(status));
            }
        };

        tracing::trace!(
            "Request from {}: {} {} ({} headers)",
            self.peer_addr,
            request.method,
            request.uri(),
            request.headers.len()
        );

        let context = self.context;
        let status = match request.method {
            Method::Get => {
                let slot = context.locks.acquire(&request.target);
                let _read = slot.lock().reader_lock();
                context
                    .handler
                    .fetch(&request.target, &mut &self.stream, scratch)?
            }
            Method::Put => {
                // The slot stays held until the publish is done, so the
                // lock cannot be handed to another name in between
                let slot = context.locks.acquire(&request.target);
                let mut input = &self.stream;
                let mut output = &self.stream;
                context
                    .handler
                    .store(&request, scratch, &mut input, &mut output, slot.lock())?
            }
            Method::Other(ref token) => {
                tracing::debug!("Unsupported method {} from {}", token, self.peer_addr);
                write_status(&mut self.stream, Status::NotImplemented)?;
                return Ok(Some(Status::NotImplemented));
            }
        };

        tracing::info!(
            target: ACCESS_LOG_TARGET,
            "{},{},{},{}",
            request.method,
            request.uri(),
            status.code(),
            request.request_id
        );

        Ok(Some(status))
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
