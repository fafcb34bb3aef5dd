// src/io/mod.rs

//! Descriptor-level I/O.
//!
//! - [`bulk`] holds the retrying read-to-end / write-all loops used by the
//!   process orchestrator.
//! - [`file_reader`] reads whole files, memory-mapping regular files and
//!   streaming everything else through [`bulk`].

pub mod bulk;
pub mod file_reader;

pub use bulk::{read_all_bytes, write_all_bytes, DEFAULT_CHUNK_SIZE};
pub use file_reader::{read_file_bytes, read_fd_bytes};
