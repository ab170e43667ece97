//! Response definitions
//!
//! Status codes and the writers that put a response head on the wire.

use std::io::Write;

use super::parser::HTTP_VERSION;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Status {
    Ok = 200,
    Created = 201,
    BadRequest = 400,
    Forbidden = 403,
    NotFound = 404,
    InternalServerError = 500,
    NotImplemented = 501,
    VersionNotSupported = 505,
}

impl Status {
    /// Numeric status code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Reason phrase for the status line
    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::BadRequest => "Bad Request",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
            Status::VersionNotSupported => "Version Not Supported",
        }
    }

    /// Whether this is a 2xx status
    pub fn is_success(self) -> bool {
        matches!(self, Status::Ok | Status::Created)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// Write a status line and `Content-Length` header for a body of `len` bytes
///
/// The caller writes exactly `len` body bytes afterwards.
pub fn write_head<W: Write>(writer: &mut W, status: Status, len: u64) -> std::io::Result<()> {
    write!(writer, "{HTTP_VERSION} {status}\r\nContent-Length: {len}\r\n\r\n")
}

/// Write a complete response whose body is the reason phrase and a newline
pub fn write_status<W: Write>(writer: &mut W, status: Status) -> std::io::Result<()> {
    let body = format!("{}\n", status.reason());
    write_head(writer, status, body.len() as u64)?;
    writer.write_all(body.as_bytes())?;
    writer.flush()
}
