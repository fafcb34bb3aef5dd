// src/exec/child.rs

//! Shared lifecycle state of a spawned child.
//!
//! The pid and its live/reaped status are the only state shared between the
//! exit-wait worker and `interrupt`/`kill`. Reaping happens while holding the
//! lock, so a signal is never sent to a pid that has already been reaped (and
//! could have been reused).

use std::io;
use std::mem::MaybeUninit;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, info};

use crate::errors::{Result, ShellExecError};
use crate::exec::status::decode_wait_status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildState {
    Idle,
    Running(libc::pid_t),
    Reaped { pid: libc::pid_t, code: i32 },
}

/// Cloneable handle on the child of the current invocation.
#[derive(Debug, Clone)]
pub struct ChildHandle {
    state: Arc<Mutex<ChildState>>,
}

impl ChildHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChildState::Idle)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChildState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_running(&self, pid: libc::pid_t) {
        *self.lock() = ChildState::Running(pid);
    }

    /// Pid of the child, while it is running or after it has been reaped.
    pub fn pid(&self) -> Option<i32> {
        match *self.lock() {
            ChildState::Idle => None,
            ChildState::Running(pid) | ChildState::Reaped { pid, .. } => Some(pid),
        }
    }

    /// Normalised exit code once the child has been reaped.
    pub fn exit_code(&self) -> Option<i32> {
        match *self.lock() {
            ChildState::Reaped { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Send `signal` to the child if it has not been reaped yet.
    ///
    /// Returns `false` (and does nothing) when there is no live child.
    pub fn signal(&self, signal: Signal) -> Result<bool> {
        let state = self.lock();
        let ChildState::Running(pid) = *state else {
            debug!(?signal, "no running child; signal skipped");
            return Ok(false);
        };

        match kill(Pid::from_raw(pid), signal) {
            Ok(()) => {
                info!(pid, ?signal, "signalled child");
                Ok(true)
            }
            // Exited but not yet reaped by us is still a valid target; ESRCH
            // only shows up if someone else reaped it.
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(ShellExecError::Io(io::Error::from(e))),
        }
    }

    /// Deliver `SIGINT`. A no-op once the child is gone.
    pub fn interrupt(&self) -> Result<()> {
        self.signal(Signal::SIGINT).map(|_| ())
    }

    /// Deliver `SIGKILL`. A no-op once the child is gone.
    pub fn kill(&self) -> Result<()> {
        self.signal(Signal::SIGKILL).map(|_| ())
    }

    /// Block until `pid` exits, reap it and return its normalised exit code.
    ///
    /// Runs on a blocking worker. The first wait leaves the child waitable
    /// (`WNOWAIT`) so the actual reap can happen under the state lock.
    pub(crate) fn wait_blocking(&self, pid: libc::pid_t) -> Result<i32> {
        wait_exited_nowait(pid)?;

        let mut state = self.lock();
        let raw = reap(pid)?;
        let code = decode_wait_status(raw);
        *state = ChildState::Reaped { pid, code };
        debug!(pid, code, "child reaped");
        Ok(code)
    }
}

impl Default for ChildHandle {
    fn default() -> Self {
        Self::new()
    }
}

fn wait_exited_nowait(pid: libc::pid_t) -> Result<()> {
    loop {
        let mut info = MaybeUninit::<libc::siginfo_t>::zeroed();
        // SAFETY: `info` is writable storage for one siginfo_t.
        let rc = unsafe {
            libc::waitid(
                libc::P_PID,
                pid as libc::id_t,
                info.as_mut_ptr(),
                libc::WEXITED | libc::WNOWAIT,
            )
        };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            continue;
        }
        return Err(ShellExecError::Wait(err));
    }
}

fn reap(pid: libc::pid_t) -> Result<libc::c_int> {
    loop {
        let mut status: libc::c_int = 0;
        // SAFETY: `status` is a valid out-pointer.
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
        if rc == pid {
            return Ok(status);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            continue;
        }
        return Err(ShellExecError::Wait(err));
    }
}
