//! Worker Pool
//!
//! Fixed set of threads popping accepted connections off the queue.

use std::net::TcpStream;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bytes::BytesMut;

use crate::error::{Result, ServerError};
use crate::protocol::MAX_HEADER_LEN;
use crate::sync::BoundedQueue;

use super::connection::Connection;
use super::server::ServerContext;

/// Running worker threads
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `context.config.threads` workers draining `queue`
    ///
    /// Workers exit once the queue is closed and empty. If a thread cannot
    /// be spawned, the queue is closed, the workers already started are
    /// joined, and the error is returned.
    pub fn spawn(queue: Arc<BoundedQueue<TcpStream>>, context: Arc<ServerContext>) -> Result<Self> {
        let threads = context.config.threads;
        let mut handles = Vec::with_capacity(threads);

        for id in 0..threads {
            let queue_clone = Arc::clone(&queue);
            let context_clone = Arc::clone(&context);
            let spawned = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || run_worker(id, &queue_clone, &context_clone));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    queue.close();
                    Self { handles }.join();
                    return Err(ServerError::ThreadSpawn(e));
                }
            }
        }

        Ok(Self { handles })
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to exit
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
    }
}

/// Worker loop: pop, serve, close, repeat
///
/// No span is entered here: the access log layer prints bare messages and
/// the thread name already identifies the worker.
fn run_worker(id: usize, queue: &BoundedQueue<TcpStream>, context: &ServerContext) {
    let mut scratch = BytesMut::zeroed(MAX_HEADER_LEN);

    tracing::debug!("Worker {} started", id);
    while let Some(stream) = queue.pop() {
        serve(stream, context, &mut scratch);
    }
    tracing::debug!("Worker {} stopped", id);
}

/// Serve one connection; the stream is closed when this returns
fn serve(stream: TcpStream, context: &ServerContext, scratch: &mut [u8]) {
    let mut connection = match Connection::new(stream, context) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.handle(scratch) {
        // A client that goes away mid-request is routine
        if let ServerError::Io(ref io_err) = e {
            match io_err.kind() {
                std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("Client {} disconnected: {}", connection.peer_addr(), e);
                    return;
                }
                _ => {}
            }
        }
        tracing::warn!("Error serving {}: {}", connection.peer_addr(), e);
    }
}
