// src/io/file_reader.rs

//! Whole-file reads with a memory-mapped fast path.
//!
//! Regular files are mapped read-only, copied out and unmapped. Anything
//! else (FIFOs, sockets, character devices) or any failure on the fast path
//! goes through [`read_all_bytes`] instead.

use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::path::Path;
use std::ptr;

use tracing::debug;

use crate::errors::Result;
use crate::io::bulk::{read_all_bytes, DEFAULT_CHUNK_SIZE};

/// Read the full contents of the file at `path`.
pub fn read_file_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    debug!(path = %path.display(), "reading file");
    read_fd_bytes(file)
}

/// Read the full contents of an already-open file.
pub fn read_fd_bytes(mut file: File) -> Result<Vec<u8>> {
    match map_regular_file(&file) {
        Ok(FastPath::Mapped(bytes)) => return Ok(bytes),
        Ok(FastPath::NotRegular) => {
            debug!(fd = file.as_raw_fd(), "not a regular file; streaming");
        }
        Ok(FastPath::Empty) => {
            // Zero-length regular files are never mapped. Pseudo-files (procfs,
            // sysfs) report size 0 but still have content, so stream instead.
            debug!(fd = file.as_raw_fd(), "zero-length regular file; streaming");
        }
        Err(e) => {
            debug!(fd = file.as_raw_fd(), error = %e, "mmap fast path failed; streaming");
        }
    }

    read_all_bytes(&mut file, DEFAULT_CHUNK_SIZE, None)
}

enum FastPath {
    Mapped(Vec<u8>),
    NotRegular,
    Empty,
}

fn map_regular_file(file: &File) -> io::Result<FastPath> {
    // `metadata` on an open `File` is an `fstat`.
    let meta = file.metadata()?;
    if !meta.file_type().is_file() {
        return Ok(FastPath::NotRegular);
    }
    if meta.len() == 0 {
        return Ok(FastPath::Empty);
    }

    let len = usize::try_from(meta.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "file too large to map"))?;
    let mapping = Mapping::new(file.as_raw_fd(), len)?;
    Ok(FastPath::Mapped(mapping.as_slice().to_vec()))
}

/// Read-only private mapping, unmapped on drop.
struct Mapping {
    ptr: *mut libc::c_void,
    len: usize,
}

impl Mapping {
    fn new(fd: RawFd, len: usize) -> io::Result<Self> {
        // SAFETY: null hint, non-zero length, valid descriptor; the result is
        // checked against MAP_FAILED before use.
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_PRIVATE,
                fd,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { ptr, len })
    }

    fn as_slice(&self) -> &[u8] {
        // SAFETY: the mapping is `len` bytes, readable, and lives as long as
        // `self`. Truncation of the file by another process while mapped
        // raises SIGBUS; callers read fixtures that are not being written.
        unsafe { std::slice::from_raw_parts(self.ptr as *const u8, self.len) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` came from a successful mmap and are unmapped once.
        let rc = unsafe { libc::munmap(self.ptr, self.len) };
        if rc != 0 {
            debug!(error = %io::Error::last_os_error(), "munmap failed");
        }
    }
}

