//! Request Handler
//!
//! Fetch (GET) and store (PUT) against files under the root directory.
//!
//! ## Responsibilities
//! - Map a resource name to a path under the root directory
//! - Stream an existing file to the client
//! - Stage an uploaded body in a temp file and publish it with a rename
//! - Pick 200 vs 201 for a store atomically with the publish
//!
//! ## Locking
//! `fetch` expects the caller to hold the resource's read lock. `store`
//! takes the write lock itself, and only around the existence check and
//! the rename; the upload is staged without holding it.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, ServerError};
use crate::network::io::copy_n;
use crate::protocol::{write_head, write_status, ParsedRequest, Status};
use crate::sync::FairRwLock;

/// Prefix of staged uploads in the root directory
pub const STAGING_PREFIX: &str = ".fileserv-upload-";

/// Serves files from one directory
#[derive(Debug, Clone)]
pub struct Handler {
    root: PathBuf,
}

impl Handler {
    /// Create a handler serving `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory resources are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `target`
    pub fn resolve(&self, target: &str) -> PathBuf {
        self.root.join(target)
    }

    /// Send the file backing `target` to `out`
    ///
    /// `scratch` is reused as the copy buffer. The caller holds the
    /// resource's read lock.
    pub fn fetch<W: Write>(&self, target: &str, out: &mut W, scratch: &mut [u8]) -> Result<Status> {
        let path = self.resolve(target);

        // Missing and unreadable parent look the same from here
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(_) => return respond(out, Status::NotFound),
        };
        if metadata.is_dir() {
            return respond(out, Status::Forbidden);
        }

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "open for read failed");
                return respond(out, Status::Forbidden);
            }
        };

        let len = file.metadata()?.len();
        write_head(out, Status::Ok, len)?;
        let sent = copy_n(&mut file, out, len, scratch)?;
        out.flush()?;

        if sent < len {
            tracing::warn!(
                path = %path.display(),
                sent,
                expected = len,
                "file shrank while being sent"
            );
        }

        Ok(Status::Ok)
    }

    /// Store the request body as the file backing `request.target`
    ///
    /// `scratch` holds the bytes the head was parsed from; the body bytes
    /// that arrived with the head sit at `request.body`. The rest of the
    /// body is read from `input`. `lock` is the resource's lock, taken in
    /// write mode for the publish step.
    pub fn store<R: Read, W: Write>(
        &self,
        request: &ParsedRequest,
        scratch: &mut [u8],
        input: &mut R,
        out: &mut W,
        lock: &FairRwLock,
    ) -> Result<Status> {
        let Some(content_length) = request.content_length else {
            return respond(out, Status::BadRequest);
        };

        let path = self.resolve(&request.target);
        if fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false) {
            return respond(out, Status::Forbidden);
        }

        let mut staged = match tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&self.root)
        {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(root = %self.root.display(), error = %e, "cannot create staging file");
                return respond(out, Status::InternalServerError);
            }
        };

        let received = match stage_body(&mut staged, request, content_length, scratch, input) {
            Ok(received) => received,
            Err(e) => {
                tracing::warn!(resource = %request.target, error = %e, "staging upload failed");
                return respond(out, Status::InternalServerError);
            }
        };
        if received < content_length {
            // Dropping `staged` removes the partial upload
            return Err(ServerError::IncompleteBody {
                expected: content_length,
                received,
            });
        }

        let status = {
            let _write = lock.writer_lock();

            // Decided under the write lock so two racing stores of a new
            // resource cannot both see it missing
            let status = if fs::metadata(&path).is_ok() {
                Status::Ok
            } else {
                Status::Created
            };

            match staged.persist(&path) {
                Ok(_) => status,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e.error, "publish failed");
                    Status::InternalServerError
                }
            }
        };

        respond(out, status)
    }
}

/// Write the body into `staged` and flush it to disk
///
/// Returns the number of body bytes written, which is short of
/// `content_length` only if the client closed early.
fn stage_body<R: Read>(
    staged: &mut NamedTempFile,
    request: &ParsedRequest,
    content_length: u64,
    scratch: &mut [u8],
    input: &mut R,
) -> std::io::Result<u64> {
    let buffered = content_length.min(request.body.len() as u64);
    let start = request.body.start;
    // `buffered` fits in usize: it is bounded by the range length
    staged.write_all(&scratch[start..start + buffered as usize])?;

    let streamed = copy_n(input, staged, content_length - buffered, scratch)?;
    staged.as_file().sync_all()?;

    Ok(buffered + streamed)
}

fn respond<W: Write>(out: &mut W, status: Status) -> Result<Status> {
    write_status(out, status)?;
    Ok(status)
}
