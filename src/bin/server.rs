//! fileserv Server Binary
//!
//! Serves files from a directory over GET/PUT.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use fileserv::network::ACCESS_LOG_TARGET;
use fileserv::{Config, Priority, Server};
use tracing::Level;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// fileserv Server
#[derive(Parser, Debug)]
#[command(name = "fileserv-server")]
#[command(about = "Concurrent file server with per-resource fair locking")]
#[command(version)]
struct Args {
    /// Number of worker threads
    #[arg(short = 't', long, default_value = "4")]
    threads: NonZeroUsize,

    /// Port to listen on
    port: u16,

    /// Directory to serve (defaults to the working directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Connections that may wait for a worker before accept blocks
    #[arg(short, long, default_value = "63")]
    queue_capacity: NonZeroUsize,

    /// Fairness policy for concurrent access to one file
    #[arg(short, long, value_enum, default_value_t = PolicyArg::Writers)]
    policy: PolicyArg,

    /// Reader admissions allowed ahead of a waiting writer (n-way only)
    #[arg(short, long, default_value = "0")]
    max_wait: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Readers,
    Writers,
    NWay,
}

impl From<PolicyArg> for Priority {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Readers => Priority::Readers,
            PolicyArg::Writers => Priority::Writers,
            PolicyArg::NWay => Priority::NWay,
        }
    }
}

fn main() {
    init_logging();

    let args = Args::parse();

    tracing::info!("fileserv Server v{}", fileserv::VERSION);
    tracing::info!("Root directory: {}", args.root.display());

    // Build config from args
    let config = Config::builder()
        .port(args.port)
        .threads(args.threads.get())
        .queue_capacity(args.queue_capacity.get())
        .root_dir(&args.root)
        .priority(args.policy.into())
        .max_wait(args.max_wait)
        .build();

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Operational logs follow `RUST_LOG`: warnings and errors go to stderr, the
/// rest to stdout. The access log goes to stderr as bare
/// `METHOD,/target,STATUS,ID` lines.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fileserv=info"));

    let operational = fmt::layer()
        .with_writer(std::io::stderr.with_max_level(Level::WARN).or_else(std::io::stdout))
        .with_target(true)
        .with_thread_names(true)
        .with_filter(filter)
        .with_filter(filter_fn(|meta| meta.target() != ACCESS_LOG_TARGET));

    let access = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_LOG_TARGET));

    tracing_subscriber::registry()
        .with(operational)
        .with(access)
        .init();
}
