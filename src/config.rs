//! Configuration for fileserv
//!
//! Centralized configuration with sensible defaults.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::{Result, ServerError};
use crate::sync::Priority;

/// Default worker pool size when `-t` is omitted
pub const DEFAULT_THREADS: usize = 4;

/// Default number of usable connection queue slots
pub const DEFAULT_QUEUE_CAPACITY: usize = 63;

/// Main configuration for a fileserv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: SocketAddr,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Worker Configuration
    // -------------------------------------------------------------------------
    /// Number of worker threads. Also the size of the resource lock table:
    /// each worker holds at most one slot, so at most `threads` resources
    /// are ever in flight.
    pub threads: usize,

    /// Usable slots in the accept queue before the acceptor blocks
    pub queue_capacity: usize,

    // -------------------------------------------------------------------------
    // Resource Configuration
    // -------------------------------------------------------------------------
    /// Directory that request targets are resolved against
    pub root_dir: PathBuf,

    /// Fairness policy for every per-resource lock
    pub priority: Priority,

    /// Countdown reset value for `Priority::NWay`
    pub max_wait: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            threads: DEFAULT_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            root_dir: PathBuf::from("."),
            priority: Priority::Writers,
            max_wait: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(ServerError::Config(
                "worker thread count must be at least 1".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ServerError::Config(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.config.listen_addr = addr;
        self
    }

    /// Listen on all interfaces at the given port
    pub fn port(mut self, port: u16) -> Self {
        self.config.listen_addr.set_port(port);
        self
    }

    /// Set the number of worker threads
    pub fn threads(mut self, count: usize) -> Self {
        self.config.threads = count;
        self
    }

    /// Set the accept queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the directory resources are served from
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the per-resource lock fairness policy
    pub fn priority(mut self, priority: Priority) -> Self {
        self.config.priority = priority;
        self
    }

    /// Set the N-way countdown reset value
    pub fn max_wait(mut self, max_wait: u32) -> Self {
        self.config.max_wait = max_wait;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
