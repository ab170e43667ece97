//! Stream helpers
//!
//! Blocking read/copy loops over `Read`/`Write` that never stop at a short
//! read: they keep going until the requested amount, the delimiter, EOF, or
//! an error.

use std::io::{self, ErrorKind, Read, Write};

/// Read into `buf` until `delimiter` has been seen, `buf` is full, or EOF
///
/// Returns the number of bytes read. Bytes after the delimiter that arrived
/// in the same read stay in `buf` past the delimiter.
pub fn read_until<R: Read>(reader: &mut R, buf: &mut [u8], delimiter: &[u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        let len = match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(len) => len,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        // A delimiter may straddle the previous read
        let search_from = filled.saturating_sub(delimiter.len().saturating_sub(1));
        filled += len;

        if contains(&buf[search_from..filled], delimiter) {
            break;
        }
    }

    Ok(filled)
}

/// Copy exactly `n` bytes from `src` to `dst` through `buf`, or fewer on EOF
///
/// Returns the number of bytes copied.
pub fn copy_n<R: Read, W: Write>(src: &mut R, dst: &mut W, n: u64, buf: &mut [u8]) -> io::Result<u64> {
    let mut copied = 0u64;

    while copied < n {
        let want = buf.len().min(usize::try_from(n - copied).unwrap_or(usize::MAX));
        let len = match src.read(&mut buf[..want]) {
            Ok(0) => break,
            Ok(len) => len,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        dst.write_all(&buf[..len])?;
        copied += len as u64;
    }

    Ok(copied)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
