// src/exec/orchestrator.rs

//! Concurrent stdin feed, stdout/stderr drains and exit wait.
//!
//! Pipes have a bounded kernel buffer. A child that fills stdout before it
//! has consumed stdin (or before it exits) blocks until the parent reads, so
//! waiting for exit before draining would deadlock. All four activities
//! therefore run at the same time and are joined at the end; the result only
//! exists once EOF was seen on both output pipes and the child was reaped.

use std::fs::File;
use std::os::fd::OwnedFd;

use tokio::sync::mpsc;
use tokio::task::{spawn_blocking, JoinError};
use tracing::{debug, warn};

use crate::errors::{Result, ShellExecError};
use crate::exec::cancel::CancelToken;
use crate::exec::child::ChildHandle;
use crate::exec::spec::ProcessOutput;
use crate::io::bulk::{read_all_bytes, write_all_bytes};

/// Payload the parent pushes into the child's stdin pipe.
pub enum StdinFeed {
    Bytes(Vec<u8>),
    Stream(mpsc::Receiver<Vec<u8>>),
}

/// Parent-side ends of a freshly spawned child.
pub struct ChildPipes {
    pub pid: libc::pid_t,
    pub stdout: OwnedFd,
    pub stderr: OwnedFd,
    /// Write end of the stdin pipe plus what to write into it.
    pub stdin: Option<(OwnedFd, StdinFeed)>,
}

/// Run feed, drains and wait concurrently and combine their results.
pub async fn drive(
    pipes: ChildPipes,
    child: &ChildHandle,
    cancel: &CancelToken,
    chunk_size: usize,
) -> Result<ProcessOutput> {
    let ChildPipes {
        pid,
        stdout,
        stderr,
        stdin,
    } = pipes;

    let feed = {
        let cancel = cancel.clone();
        async move {
            match stdin {
                Some((write_end, feed)) => feed_stdin(write_end, feed, cancel).await,
                None => Ok(()),
            }
        }
    };

    // Each drain owns its buffer and its read end; both go away when the
    // worker returns, which is before the join below completes.
    let stdout_drain = spawn_blocking(move || {
        let mut reader = File::from(stdout);
        read_all_bytes(&mut reader, chunk_size, None)
    });
    let stderr_drain = spawn_blocking(move || {
        let mut reader = File::from(stderr);
        read_all_bytes(&mut reader, chunk_size, None)
    });
    let exit_wait = {
        let child = child.clone();
        spawn_blocking(move || child.wait_blocking(pid))
    };

    let (feed_res, out_res, err_res, wait_res) =
        tokio::join!(feed, stdout_drain, stderr_drain, exit_wait);

    let code = joined(wait_res)?;
    let stdout = joined(out_res)?;
    let stderr_raw = joined(err_res)?;

    match feed_res {
        Ok(()) => {}
        Err(ShellExecError::Cancelled) => {
            debug!(pid, "stdin feed stopped by cancellation");
        }
        Err(ShellExecError::BrokenPipe { remaining }) => {
            // The child closed its stdin before taking everything; its exit
            // code already says how it felt about that.
            debug!(pid, remaining, "child closed stdin early");
        }
        Err(e) => {
            warn!(pid, error = %e, "stdin feed failed");
            return Err(e);
        }
    }

    debug!(
        pid,
        code,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr_raw.len(),
        "invocation complete"
    );

    Ok(ProcessOutput {
        code,
        stdout,
        stderr: String::from_utf8_lossy(&stderr_raw).into_owned(),
    })
}

/// Write the payload into the child's stdin, then close it for EOF.
///
/// Every exit path drops the write end, so the child never waits on input
/// that will not arrive.
async fn feed_stdin(write_end: OwnedFd, feed: StdinFeed, cancel: CancelToken) -> Result<()> {
    let writer = File::from(write_end);

    match feed {
        StdinFeed::Bytes(bytes) => {
            joined(
                spawn_blocking(move || {
                    let mut writer = writer;
                    write_all_bytes(&mut writer, &bytes, Some(&cancel))
                })
                .await,
            )
        }
        StdinFeed::Stream(mut rx) => {
            let mut writer = writer;
            loop {
                let chunk = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(ShellExecError::Cancelled),
                    chunk = rx.recv() => match chunk {
                        Some(chunk) => chunk,
                        None => break,
                    },
                };

                let token = cancel.clone();
                writer = joined(
                    spawn_blocking(move || {
                        let mut writer = writer;
                        write_all_bytes(&mut writer, &chunk, Some(&token))?;
                        Ok(writer)
                    })
                    .await,
                )?;
            }
            Ok(())
        }
    }
}

fn joined<T>(res: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    res.map_err(|e| ShellExecError::Other(anyhow::Error::from(e)))?
}
