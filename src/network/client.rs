//! Blocking client
//!
//! Issues one request per connection and reads the whole response.
//! Used by the CLI binary and the end-to-end tests.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};

use crate::error::{Result, ServerError};
use crate::protocol::{CONTENT_LENGTH, HEAD_TERMINATOR, HTTP_VERSION, REQUEST_ID};

/// A response as received by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientResponse {
    /// Numeric status code
    pub status: u16,

    /// Reason phrase from the status line
    pub reason: String,

    /// Body bytes (exactly `Content-Length` of them)
    pub body: Vec<u8>,
}

/// Client for a fileserv server
#[derive(Debug, Clone)]
pub struct Client {
    /// Server address (host:port)
    addr: String,
}

impl Client {
    /// Create a client for the server at `addr`
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Fetch `target`
    pub fn get(&self, target: &str) -> Result<ClientResponse> {
        self.get_with_id(target, None)
    }

    /// Fetch `target`, tagging the request with a correlation id
    pub fn get_with_id(&self, target: &str, request_id: Option<u64>) -> Result<ClientResponse> {
        let mut request = format!("GET /{} {HTTP_VERSION}\r\n", target.trim_start_matches('/'));
        if let Some(id) = request_id {
            request.push_str(&format!("{REQUEST_ID}: {id}\r\n"));
        }
        request.push_str("\r\n");

        self.send_raw(request.as_bytes())
    }

    /// Store `body` as `target`
    pub fn put(&self, target: &str, body: &[u8]) -> Result<ClientResponse> {
        self.put_with_id(target, body, None)
    }

    /// Store `body` as `target`, tagging the request with a correlation id
    pub fn put_with_id(
        &self,
        target: &str,
        body: &[u8],
        request_id: Option<u64>,
    ) -> Result<ClientResponse> {
        let mut request = format!(
            "PUT /{} {HTTP_VERSION}\r\n{CONTENT_LENGTH}: {}\r\n",
            target.trim_start_matches('/'),
            body.len()
        )
        .into_bytes();
        if let Some(id) = request_id {
            request.extend_from_slice(format!("{REQUEST_ID}: {id}\r\n").as_bytes());
        }
        request.extend_from_slice(b"\r\n");
        request.extend_from_slice(body);

        self.send_raw(&request)
    }

    /// Send pre-encoded request bytes and read the response
    pub fn send_raw(&self, request: &[u8]) -> Result<ClientResponse> {
        let mut stream = TcpStream::connect(&self.addr)
            .map_err(|e| ServerError::Protocol(format!("cannot connect to {}: {}", self.addr, e)))?;

        stream.write_all(request)?;
        stream.flush()?;
        stream.shutdown(Shutdown::Write)?;

        let mut response = Vec::new();
        stream.read_to_end(&mut response)?;

        parse_response(&response)
    }
}

/// Parse a complete response (head and body)
pub fn parse_response(bytes: &[u8]) -> Result<ClientResponse> {
    let head_end = bytes
        .windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
        .ok_or_else(|| ServerError::Protocol("response head is incomplete".to_string()))?;

    let head = std::str::from_utf8(&bytes[..head_end])
        .map_err(|_| ServerError::Protocol("response head is not UTF-8".to_string()))?;
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap_or_default();
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if version != HTTP_VERSION {
        return Err(ServerError::Protocol(format!(
            "unexpected response version: {:?}",
            version
        )));
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| ServerError::Protocol(format!("bad status line: {:?}", status_line)))?;
    let reason = parts.next().unwrap_or_default().to_string();

    let mut content_length = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(": ") {
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                content_length = value.trim().parse::<usize>().ok();
            }
        }
    }
    let content_length = content_length
        .ok_or_else(|| ServerError::Protocol("response has no Content-Length".to_string()))?;

    let body = &bytes[head_end + HEAD_TERMINATOR.len()..];
    if body.len() < content_length {
        return Err(ServerError::Protocol(format!(
            "response body truncated: expected {} bytes, got {}",
            content_length,
            body.len()
        )));
    }

    Ok(ClientResponse {
        status,
        reason,
        body: body[..content_length].to_vec(),
    })
}
