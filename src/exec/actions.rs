// src/exec/actions.rs

//! Pipe creation and `posix_spawn` file actions.
//!
//! Every descriptor change the child needs (dup2 onto 0/1/2, closing the
//! originals, `/dev/null` for an absent stdin, the cwd change) is recorded
//! here and applied by the kernel inside `posix_spawn` itself. Nothing is
//! done to the child's file table from parent code after the spawn call.

use std::ffi::CStr;
use std::io;
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd, RawFd};

use tracing::trace;

use crate::errors::{Result, ShellExecError};

unsafe extern "C" {
    // glibc >= 2.29, musl >= 1.1.24, macOS >= 10.15.
    fn posix_spawn_file_actions_addchdir_np(
        actions: *mut libc::posix_spawn_file_actions_t,
        path: *const libc::c_char,
    ) -> libc::c_int;
}

const DEV_NULL: &CStr = c"/dev/null";

/// Create a pipe whose both ends are close-on-exec.
///
/// Close-on-exec keeps the ends out of unrelated children spawned
/// concurrently; the dup2 actions clear the flag on the copies the intended
/// child receives.
pub fn pipe_cloexec() -> Result<(OwnedFd, OwnedFd)> {
    #[cfg(not(target_vendor = "apple"))]
    {
        use nix::fcntl::OFlag;

        nix::unistd::pipe2(OFlag::O_CLOEXEC)
            .map_err(|e| ShellExecError::spawn("pipe", io::Error::from(e)))
    }

    #[cfg(target_vendor = "apple")]
    {
        let (r, w) =
            nix::unistd::pipe().map_err(|e| ShellExecError::spawn("pipe", io::Error::from(e)))?;
        set_cloexec(r.as_raw_fd())?;
        set_cloexec(w.as_raw_fd())?;
        Ok((r, w))
    }
}

#[cfg(target_vendor = "apple")]
fn set_cloexec(fd: RawFd) -> Result<()> {
    // SAFETY: plain fcntl on a descriptor we own.
    let rc = unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) };
    if rc == -1 {
        return Err(ShellExecError::spawn("fcntl(FD_CLOEXEC)", io::Error::last_os_error()));
    }
    Ok(())
}

/// Owned `posix_spawn_file_actions_t`, destroyed on drop.
///
/// Boxed so the opaque object never moves after `init`.
pub struct FileActions {
    inner: Box<MaybeUninit<libc::posix_spawn_file_actions_t>>,
    /// Human-readable log of the registered actions, for tracing.
    recorded: Vec<String>,
}

impl FileActions {
    pub fn new() -> Result<Self> {
        let mut inner = Box::new(MaybeUninit::uninit());
        // SAFETY: `inner` points at writable storage for the object.
        let rc = unsafe { libc::posix_spawn_file_actions_init(inner.as_mut_ptr()) };
        if rc != 0 {
            return Err(ShellExecError::spawn_rc("posix_spawn_file_actions_init", rc));
        }
        Ok(Self {
            inner,
            recorded: Vec::new(),
        })
    }

    fn ptr(&mut self) -> *mut libc::posix_spawn_file_actions_t {
        self.inner.as_mut_ptr()
    }

    pub(crate) fn as_ptr(&self) -> *const libc::posix_spawn_file_actions_t {
        self.inner.as_ptr()
    }

    pub fn add_dup2(&mut self, from: RawFd, to: RawFd) -> Result<()> {
        // SAFETY: initialised in `new`.
        let rc = unsafe { libc::posix_spawn_file_actions_adddup2(self.ptr(), from, to) };
        if rc != 0 {
            return Err(ShellExecError::spawn_rc("posix_spawn_file_actions_adddup2", rc));
        }
        self.recorded.push(format!("dup2({from}, {to})"));
        Ok(())
    }

    pub fn add_close(&mut self, fd: RawFd) -> Result<()> {
        // SAFETY: initialised in `new`.
        let rc = unsafe { libc::posix_spawn_file_actions_addclose(self.ptr(), fd) };
        if rc != 0 {
            return Err(ShellExecError::spawn_rc("posix_spawn_file_actions_addclose", rc));
        }
        self.recorded.push(format!("close({fd})"));
        Ok(())
    }

    pub fn add_open(&mut self, fd: RawFd, path: &CStr, oflag: libc::c_int) -> Result<()> {
        // SAFETY: initialised in `new`; `path` is NUL-terminated and copied
        // by the call.
        let rc = unsafe {
            libc::posix_spawn_file_actions_addopen(self.ptr(), fd, path.as_ptr(), oflag, 0)
        };
        if rc != 0 {
            return Err(ShellExecError::spawn_rc("posix_spawn_file_actions_addopen", rc));
        }
        self.recorded.push(format!("open({path:?}) -> {fd}"));
        Ok(())
    }

    pub fn add_chdir(&mut self, dir: &CStr) -> Result<()> {
        // SAFETY: initialised in `new`; `dir` is NUL-terminated and copied by
        // the call.
        let rc = unsafe { posix_spawn_file_actions_addchdir_np(self.ptr(), dir.as_ptr()) };
        if rc != 0 {
            return Err(ShellExecError::spawn_rc("posix_spawn_file_actions_addchdir_np", rc));
        }
        self.recorded.push(format!("chdir({dir:?})"));
        Ok(())
    }

    /// Duplicate `from` onto `to`, optionally closing `from` in the child.
    pub fn add_dup2_and_close(&mut self, from: RawFd, to: RawFd, close_source: bool) -> Result<()> {
        self.add_dup2(from, to)?;
        if close_source && from != to {
            self.add_close(from)?;
        }
        Ok(())
    }

    pub fn recorded(&self) -> &[String] {
        &self.recorded
    }
}

impl Drop for FileActions {
    fn drop(&mut self) {
        // SAFETY: initialised in `new` and destroyed exactly once.
        unsafe {
            libc::posix_spawn_file_actions_destroy(self.inner.as_mut_ptr());
        }
    }
}

/// Owned `posix_spawnattr_t`, destroyed on drop.
///
/// The child starts with an empty signal mask and `SIGPIPE`/`SIGINT` back at
/// their default dispositions. The Rust runtime ignores `SIGPIPE`, a
/// background parent may ignore `SIGINT`, and an ignored disposition would
/// otherwise survive the exec (making `interrupt` a no-op).
pub struct SpawnAttr {
    inner: Box<MaybeUninit<libc::posix_spawnattr_t>>,
}

impl SpawnAttr {
    pub fn new() -> Result<Self> {
        let mut inner = Box::new(MaybeUninit::uninit());
        // SAFETY: `inner` points at writable storage for the object.
        let rc = unsafe { libc::posix_spawnattr_init(inner.as_mut_ptr()) };
        if rc != 0 {
            return Err(ShellExecError::spawn_rc("posix_spawnattr_init", rc));
        }
        let mut attr = Self { inner };
        attr.reset_signals()?;
        Ok(attr)
    }

    fn reset_signals(&mut self) -> Result<()> {
        // SAFETY: sigset_t is plain data initialised by sigemptyset; the attr
        // object was initialised in `new`.
        unsafe {
            let mut set = MaybeUninit::<libc::sigset_t>::uninit();
            libc::sigemptyset(set.as_mut_ptr());
            let rc = libc::posix_spawnattr_setsigmask(self.inner.as_mut_ptr(), set.as_ptr());
            if rc != 0 {
                return Err(ShellExecError::spawn_rc("posix_spawnattr_setsigmask", rc));
            }

            libc::sigaddset(set.as_mut_ptr(), libc::SIGPIPE);
            libc::sigaddset(set.as_mut_ptr(), libc::SIGINT);
            let rc = libc::posix_spawnattr_setsigdefault(self.inner.as_mut_ptr(), set.as_ptr());
            if rc != 0 {
                return Err(ShellExecError::spawn_rc("posix_spawnattr_setsigdefault", rc));
            }

            let flags = libc::POSIX_SPAWN_SETSIGMASK | libc::POSIX_SPAWN_SETSIGDEF;
            let rc = libc::posix_spawnattr_setflags(self.inner.as_mut_ptr(), flags as _);
            if rc != 0 {
                return Err(ShellExecError::spawn_rc("posix_spawnattr_setflags", rc));
            }
        }
        Ok(())
    }

    pub(crate) fn as_ptr(&self) -> *const libc::posix_spawnattr_t {
        self.inner.as_ptr()
    }
}

impl Drop for SpawnAttr {
    fn drop(&mut self) {
        // SAFETY: initialised in `new` and destroyed exactly once.
        unsafe {
            libc::posix_spawnattr_destroy(self.inner.as_mut_ptr());
        }
    }
}

/// How the child's fd 0 is wired.
#[derive(Debug, Clone, Copy)]
pub enum ChildStdin<'a> {
    /// Open `/dev/null` read-only in the child.
    DevNull,
    /// Duplicate a caller-provided or parent-opened descriptor. The source
    /// is left open in the child; the parent closes its own copy after spawn.
    Dup(BorrowedFd<'a>),
    /// Read end of a parent-fed pipe; duplicated and then closed in the child.
    PipeRead(BorrowedFd<'a>),
}

/// Build the action list for one child: stdin per `stdin`, stdout/stderr onto
/// the write ends of their pipes, then the optional cwd change.
pub fn build_file_actions(
    stdin: ChildStdin<'_>,
    stdout_w: BorrowedFd<'_>,
    stderr_w: BorrowedFd<'_>,
    cwd: Option<&CStr>,
) -> Result<FileActions> {
    let mut actions = FileActions::new()?;

    match stdin {
        ChildStdin::DevNull => {
            actions.add_open(libc::STDIN_FILENO, DEV_NULL, libc::O_RDONLY)?;
        }
        ChildStdin::Dup(fd) => {
            actions.add_dup2_and_close(fd.as_raw_fd(), libc::STDIN_FILENO, false)?;
        }
        ChildStdin::PipeRead(fd) => {
            actions.add_dup2_and_close(fd.as_raw_fd(), libc::STDIN_FILENO, true)?;
        }
    }

    actions.add_dup2_and_close(stdout_w.as_raw_fd(), libc::STDOUT_FILENO, true)?;
    actions.add_dup2_and_close(stderr_w.as_raw_fd(), libc::STDERR_FILENO, true)?;

    if let Some(dir) = cwd {
        actions.add_chdir(dir)?;
    }

    trace!(actions = ?actions.recorded(), "file actions prepared");
    Ok(actions)
}
