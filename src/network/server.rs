//! TCP Server
//!
//! Accepts connections and dispatches them to the worker pool.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::handler::Handler;
use crate::locks::ResourceLockTable;
use crate::protocol::RequestParser;
use crate::sync::BoundedQueue;

use super::worker::WorkerPool;

/// State shared by the acceptor and every worker
///
/// Built once before any thread starts; read-only afterwards apart from
/// the lock table's internal synchronization.
pub struct ServerContext {
    /// Server configuration
    pub config: Config,

    /// Compiled request grammar
    pub parser: RequestParser,

    /// Per-resource locks, one slot per worker
    pub locks: ResourceLockTable,

    /// File operations under `config.root_dir`
    pub handler: Handler,
}

impl ServerContext {
    /// Build the shared state for `config`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let parser = RequestParser::new()?;
        let locks = ResourceLockTable::new(config.threads, config.priority, config.max_wait);
        let handler = Handler::new(config.root_dir.clone());

        Ok(Self {
            config,
            parser,
            locks,
            handler,
        })
    }
}

/// TCP server for fileserv
pub struct Server {
    context: Arc<ServerContext>,
    listener: TcpListener,
    queue: Arc<BoundedQueue<TcpStream>>,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Validate `config`, build the shared state, and bind the listener
    pub fn bind(config: Config) -> Result<Self> {
        let context = ServerContext::new(config)?;

        let addr = context.config.listen_addr;
        let listener =
            TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let queue = BoundedQueue::new(context.config.queue_capacity);

        Ok(Self {
            context: Arc::new(context),
            listener,
            queue: Arc::new(queue),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared server state
    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    /// A handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.local_addr()?,
        })
    }

    /// Start the workers and accept connections until shut down (blocking)
    ///
    /// On shutdown the queue is closed, connections already queued are
    /// still served, and the workers are joined before returning.
    pub fn run(self) -> Result<()> {
        let workers = WorkerPool::spawn(Arc::clone(&self.queue), Arc::clone(&self.context))?;

        tracing::info!(
            "Listening on {} with {} workers (queue capacity {}, {:?} priority)",
            self.local_addr()?,
            workers.size(),
            self.queue.capacity(),
            self.context.config.priority
        );

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match stream {
                Ok(stream) => {
                    // Blocks while every queue slot is taken
                    if !self.queue.push(stream) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                }
            }
        }

        tracing::info!("Shutting down, draining {} queued connections", self.queue.len());
        self.queue.close();
        workers.join();

        Ok(())
    }
}

/// Stops a running [`Server`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting and wind down
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::AcqRel) {
            return;
        }

        // Unblock the acceptor with a throwaway connection
        let mut wake = self.addr;
        if wake.ip().is_unspecified() {
            wake.set_ip(match wake.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            });
        }
        if let Err(e) = TcpStream::connect(wake) {
            tracing::warn!("Failed to wake acceptor at {}: {}", wake, e);
        }
    }
}
