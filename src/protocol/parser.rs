//! Request parser
//!
//! Extracts a [`ParsedRequest`] from the bytes read up to and including the
//! empty line that ends the head.
//!
//! ## Grammar
//! ```text
//! request  = method SP target SP version CRLF *( header CRLF ) CRLF [ body ]
//! method   = 1*8 ALPHA
//! target   = "/" 1*63 ( ALPHA / DIGIT / "." / "-" )
//! version  = "HTTP/" DIGIT "." DIGIT
//! header   = 1*128 ( ALPHA / DIGIT / "." / "-" ) ": " 1*128 VCHAR-or-SP
//! ```

use regex::bytes::{Match, Regex};
use thiserror::Error;

use crate::error::Result;

use super::{Header, Method, ParsedRequest, Status};

/// The only protocol version served
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Upper bound on the head (request line + headers + empty line)
pub const MAX_HEADER_LEN: usize = 2048;

/// Marks the end of the head
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Header carrying the body length
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Header carrying the client correlation id
pub const REQUEST_ID: &str = "Request-Id";

const METHOD_PATTERN: &str = r"[a-zA-Z]{1,8}";
const TARGET_PATTERN: &str = r"/[a-zA-Z0-9.-]{1,63}";
const VERSION_PATTERN: &str = r"HTTP/[0-9]\.[0-9]";
const HEADER_NAME_PATTERN: &str = r"[a-zA-Z0-9.-]{1,128}";
const HEADER_VALUE_PATTERN: &str = r"[\x20-\x7e]{1,128}";

/// Why a head could not be turned into a routable request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request line or header block does not match the grammar
    #[error("malformed request head")]
    Malformed,

    /// Well-formed, but not the version this server speaks
    #[error("unsupported version {0}")]
    UnsupportedVersion(String),
}

impl ParseError {
    /// Response status for this error
    pub fn status(&self) -> Status {
        match self {
            ParseError::Malformed => Status::BadRequest,
            ParseError::UnsupportedVersion(_) => Status::VersionNotSupported,
        }
    }
}

/// Compiled request grammar
///
/// Built once at startup and shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct RequestParser {
    /// Whole head: request line captures plus the header block as one span
    head: Regex,

    /// One header line within the header block
    header_line: Regex,
}

impl RequestParser {
    /// Compile the request grammar
    pub fn new() -> Result<Self> {
        let head = Regex::new(&format!(
            r"(?-u)\A({METHOD_PATTERN}) ({TARGET_PATTERN}) ({VERSION_PATTERN})\r\n((?:{HEADER_NAME_PATTERN}: {HEADER_VALUE_PATTERN}\r\n)*)\r\n"
        ))?;
        let header_line = Regex::new(&format!(
            r"(?-u)({HEADER_NAME_PATTERN}): ({HEADER_VALUE_PATTERN})\r\n"
        ))?;

        Ok(Self { head, header_line })
    }

    /// Parse a request head from `buf`
    ///
    /// `buf` holds the head and whatever body bytes arrived with it.
    pub fn parse(&self, buf: &[u8]) -> std::result::Result<ParsedRequest, ParseError> {
        let caps = self.head.captures(buf).ok_or(ParseError::Malformed)?;

        // Groups 1..=4 are not optional, so they are present on any match
        let (Some(whole), Some(method), Some(target), Some(version), Some(block)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3), caps.get(4))
        else {
            return Err(ParseError::Malformed);
        };

        let version = text(version);
        if version != HTTP_VERSION {
            return Err(ParseError::UnsupportedVersion(version));
        }

        let headers: Vec<Header> = self
            .header_line
            .captures_iter(block.as_bytes())
            .filter_map(|line| {
                Some(Header {
                    name: text(line.get(1)?),
                    value: text(line.get(2)?),
                })
            })
            .collect();

        let content_length = last_numeric(&headers, CONTENT_LENGTH);
        let request_id = last_numeric(&headers, REQUEST_ID).unwrap_or(0);

        let target = text(target);
        Ok(ParsedRequest {
            method: Method::from_token(&text(method)),
            target: target.trim_start_matches('/').to_string(),
            version,
            headers,
            header_span: block.range(),
            content_length,
            request_id,
            body: whole.end()..buf.len(),
        })
    }
}

/// Value of the last `name` header whose value is a plain decimal number
///
/// Repeated headers are resolved last-wins; entries that are not numbers
/// are skipped rather than clearing an earlier valid one.
fn last_numeric(headers: &[Header], name: &str) -> Option<u64> {
    headers
        .iter()
        .filter(|header| header.name.eq_ignore_ascii_case(name))
        .filter_map(|header| parse_decimal(&header.value))
        .last()
}

fn parse_decimal(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn text(m: Match<'_>) -> String {
    String::from_utf8_lossy(m.as_bytes()).into_owned()
}
