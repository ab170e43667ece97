//! Protocol Module
//!
//! The request/response subset spoken by the server.
//!
//! ## Request Format
//! ```text
//! PUT /name HTTP/1.1\r\n
//! Content-Length: 2\r\n
//! Request-Id: 7\r\n
//! \r\n
//! hi
//! ```
//!
//! ## Response Format
//! ```text
//! HTTP/1.1 201 Created\r\n
//! Content-Length: 8\r\n
//! \r\n
//! Created\n
//! ```
//!
//! ### Methods
//! - GET: fetch a file
//! - PUT: store a file (requires `Content-Length`)
//! - anything else: 501
//!
//! One request per connection; the server closes the connection after
//! responding.

mod parser;
mod request;
mod response;

pub use parser::{
    ParseError, RequestParser, CONTENT_LENGTH, HEAD_TERMINATOR, HTTP_VERSION, MAX_HEADER_LEN,
    REQUEST_ID,
};
pub use request::{Header, Method, ParsedRequest};
pub use response::{write_head, write_status, Status};
