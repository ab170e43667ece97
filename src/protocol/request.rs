//! Request definitions
//!
//! Represents a parsed request head.

use std::ops::Range;

/// Request method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// Fetch a resource (read lock)
    Get,

    /// Store a resource (write lock)
    Put,

    /// Any other well-formed method token; answered with 501
    Other(String),
}

impl Method {
    /// Classify a method token (case-sensitive)
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "PUT" => Method::Put,
            other => Method::Other(other.to_string()),
        }
    }

    /// The method token as sent on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Other(token) => token,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `Name: value` header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// A parsed request head
///
/// Offsets refer to the buffer the request was parsed from.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// Request method
    pub method: Method,

    /// Resource name: the request target with its leading `/` stripped
    pub target: String,

    /// Version token from the request line
    pub version: String,

    /// Header lines in the order received
    pub headers: Vec<Header>,

    /// Span of the raw header block (without the terminating empty line)
    pub header_span: Range<usize>,

    /// Declared body length; `None` if absent or not a number
    pub content_length: Option<u64>,

    /// Client-supplied correlation id; 0 if absent
    pub request_id: u64,

    /// Span of body bytes that arrived with the head
    pub body: Range<usize>,
}

impl ParsedRequest {
    /// The request target as sent, with its leading `/`
    pub fn uri(&self) -> String {
        format!("/{}", self.target)
    }

    /// Value of the last header named `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }
}
