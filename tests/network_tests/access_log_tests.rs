//! Access Log Tests
//!
//! Tests verify:
//! - One `METHOD,/target,STATUS,REQUEST_ID` line per served GET/PUT
//! - A missing Request-Id is logged as 0
//! - Requests rejected before routing (400, 501, 505) leave no line

use std::io::{self, Write};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use fileserv::network::{Client, ACCESS_LOG_TARGET};
use fileserv::{Config, Server, ShutdownHandle};
use parking_lot::Mutex;
use tempfile::TempDir;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

// =============================================================================
// Log Capture
// =============================================================================

/// Shared sink every test in this binary logs into
#[derive(Clone)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Install the access log subscriber once and return its sink
fn capture() -> &'static Capture {
    static CAPTURE: OnceLock<Capture> = OnceLock::new();

    CAPTURE.get_or_init(|| {
        let capture = Capture(Arc::new(Mutex::new(Vec::new())));
        let writer = capture.clone();

        let access = fmt::layer()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_filter(filter_fn(|meta| meta.target() == ACCESS_LOG_TARGET));
        tracing_subscriber::registry().with(access).init();

        capture
    })
}

fn access_lines() -> Vec<String> {
    let bytes = capture().0.lock().clone();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Test Harness
// =============================================================================

struct TestServer {
    _dir: TempDir,
    client: Client,
    shutdown: ShutdownHandle,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        capture();

        let dir = TempDir::new().unwrap();
        let config = Config::builder()
            .listen_addr("127.0.0.1:0".parse().unwrap())
            .root_dir(dir.path())
            .threads(2)
            .build();

        let server = Server::bind(config).unwrap();
        let client = Client::new(server.local_addr().unwrap().to_string());
        let shutdown = server.shutdown_handle().unwrap();
        let handle = thread::spawn(move || server.run().unwrap());

        Self {
            _dir: dir,
            client,
            shutdown,
            handle: Some(handle),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
    }
}

// =============================================================================
// Access Line Tests
// =============================================================================

// The line is logged before the worker closes the connection, and the
// client reads to EOF, so it is in the sink once a request returns.

#[test]
fn test_put_and_get_are_logged() {
    let server = TestServer::start();

    assert_eq!(server.client.put_with_id("logged", b"hi", Some(7)).unwrap().status, 201);
    assert_eq!(server.client.get("logged").unwrap().status, 200);

    let lines = access_lines();
    let put = lines.iter().position(|l| l == "PUT,/logged,201,7");
    let get = lines.iter().position(|l| l == "GET,/logged,200,0");
    assert!(put.is_some(), "missing PUT line in {:?}", lines);
    assert!(get.is_some(), "missing GET line in {:?}", lines);
    assert!(put < get);
}

#[test]
fn test_error_statuses_from_handler_are_logged() {
    let server = TestServer::start();

    assert_eq!(server.client.get_with_id("absent", Some(42)).unwrap().status, 404);
    assert_eq!(
        server
            .client
            .send_raw(b"PUT /nolength HTTP/1.1\r\nRequest-Id: 5\r\n\r\n")
            .unwrap()
            .status,
        400
    );

    let lines = access_lines();
    assert!(lines.iter().any(|l| l == "GET,/absent,404,42"), "{:?}", lines);
    assert!(lines.iter().any(|l| l == "PUT,/nolength,400,5"), "{:?}", lines);
}

#[test]
fn test_rejected_requests_are_not_logged() {
    let server = TestServer::start();

    let rejected: [&[u8]; 3] = [
        b"DELETE /unlogged-delete HTTP/1.1\r\n\r\n",
        b"GET /unlogged-version HTTP/1.0\r\n\r\n",
        b"GET /unlogged/nested HTTP/1.1\r\n\r\n",
    ];
    let expected = [501, 505, 400];
    for (raw, status) in rejected.iter().zip(expected) {
        assert_eq!(server.client.send_raw(raw).unwrap().status, status);
    }

    let lines = access_lines();
    assert!(!lines.iter().any(|l| l.contains("unlogged")), "{:?}", lines);
}
