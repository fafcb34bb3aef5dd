// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Interrupted system calls never show up here; they are retried where they
//! happen. A child that exits non-zero is not an error either, its code is
//! ordinary data inside [`crate::ProcessOutput`].

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellExecError {
    /// The OS refused to create the child or wire its descriptors.
    #[error("spawn failed at {step}: {source}")]
    Spawn {
        step: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("wait for child failed: {0}")]
    Wait(#[source] io::Error),

    /// A write made no progress with `remaining` bytes still unsent.
    #[error("broken pipe: {remaining} bytes could not be written")]
    BrokenPipe { remaining: usize },

    /// A cancellable loop observed cancellation between two syscalls.
    #[error("operation cancelled")]
    Cancelled,

    /// A fixture name no resolver could map to a file.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShellExecError {
    pub(crate) fn spawn(step: &'static str, source: io::Error) -> Self {
        ShellExecError::Spawn { step, source }
    }

    /// Build a `Spawn` error from a `posix_spawn*` style return code
    /// (the error number itself, not -1/errno).
    pub(crate) fn spawn_rc(step: &'static str, rc: libc::c_int) -> Self {
        ShellExecError::Spawn {
            step,
            source: io::Error::from_raw_os_error(rc),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ShellExecError>;
