// src/io/bulk.rs

//! Read-to-end and write-all over a descriptor.
//!
//! Both loops absorb `EINTR` and poll an optional [`CancelToken`] before
//! every syscall. They block the calling thread, so async callers run them
//! under `tokio::task::spawn_blocking`.

use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::errors::{Result, ShellExecError};
use crate::exec::cancel::CancelToken;

/// Chunk size used for bulk reads unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Read from `reader` until a zero-length read and return everything.
///
/// Works the same for pipes, regular files and sockets.
pub fn read_all_bytes<R: Read>(
    reader: &mut R,
    chunk_size: usize,
    cancel: Option<&CancelToken>,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut out = Vec::new();

    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ShellExecError::Cancelled);
        }

        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ShellExecError::Io(e)),
        }
    }

    trace!(bytes = out.len(), "read to end of stream");
    Ok(out)
}

/// Write every byte of `bytes` to `writer`.
///
/// A write that accepts zero bytes, or fails with `EPIPE`, while data is
/// still outstanding is reported as [`ShellExecError::BrokenPipe`].
pub fn write_all_bytes<W: Write>(
    writer: &mut W,
    bytes: &[u8],
    cancel: Option<&CancelToken>,
) -> Result<()> {
    let mut remaining = bytes;

    while !remaining.is_empty() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ShellExecError::Cancelled);
        }

        match writer.write(remaining) {
            Ok(0) => {
                return Err(ShellExecError::BrokenPipe {
                    remaining: remaining.len(),
                });
            }
            Ok(n) => remaining = &remaining[n..],
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                return Err(ShellExecError::BrokenPipe {
                    remaining: remaining.len(),
                });
            }
            Err(e) => return Err(ShellExecError::Io(e)),
        }
    }

    trace!(bytes = bytes.len(), "wrote full payload");
    Ok(())
}
