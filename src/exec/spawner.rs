// src/exec/spawner.rs

//! Child creation via `posix_spawn`.
//!
//! Creates the pipes, builds the file actions, spawns, and hands the parent
//! ends over to the orchestrator. Every descriptor created here is an
//! `OwnedFd`, so any early return closes whatever was opened so far and a
//! successful return leaves the parent holding only the read ends of
//! stdout/stderr and, when it feeds stdin, the write end of that pipe.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{CString, OsStr, OsString};
use std::fs::File;
use std::io;
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::ptr;

use tracing::{debug, info};

use crate::config::ExecConfig;
use crate::errors::{Result, ShellExecError};
use crate::exec::actions::{build_file_actions, pipe_cloexec, ChildStdin, SpawnAttr};
use crate::exec::child::ChildHandle;
use crate::exec::orchestrator::{ChildPipes, StdinFeed};
use crate::exec::spec::{ProcessSpec, StdinSource};
use crate::types::EnvMode;

/// Used when neither the overrides nor the parent define `PATH`.
const FALLBACK_PATH: &str = "/usr/bin:/bin";

/// Spawn the child described by `spec` and return the parent's pipe ends.
///
/// On success the child is registered with `child` as running.
pub fn spawn_child(
    spec: &ProcessSpec,
    stdin: StdinSource,
    config: &ExecConfig,
    child: &ChildHandle,
) -> Result<ChildPipes> {
    let (stdout_r, stdout_w) = pipe_cloexec()?;
    let (stderr_r, stderr_w) = pipe_cloexec()?;

    let stdin_kind = stdin.kind();
    let fed_by_parent = stdin.needs_pipe();

    // `handoff` is a descriptor the child gets a dup of; the parent's copy
    // is closed right after spawn. `feed` is a pipe the parent writes into.
    let mut handoff: Option<OwnedFd> = None;
    let mut feed: Option<(OwnedFd, OwnedFd, StdinFeed)> = None;
    match stdin {
        StdinSource::None => {}
        StdinSource::Descriptor(fd) => handoff = Some(fd),
        StdinSource::Path(path) => {
            let file = File::open(&path).map_err(|e| ShellExecError::spawn("open stdin file", e))?;
            handoff = Some(OwnedFd::from(file));
        }
        StdinSource::Bytes(bytes) => {
            let (r, w) = pipe_cloexec()?;
            feed = Some((r, w, StdinFeed::Bytes(bytes)));
        }
        StdinSource::Stream(rx) => {
            let (r, w) = pipe_cloexec()?;
            feed = Some((r, w, StdinFeed::Stream(rx)));
        }
    }

    let child_stdin = match (&handoff, &feed) {
        (Some(fd), _) => ChildStdin::Dup(fd.as_fd()),
        (None, Some((r, _, _))) => ChildStdin::PipeRead(r.as_fd()),
        (None, None) => ChildStdin::DevNull,
    };

    let cwd = spec.cwd.as_deref().or(config.default_cwd.as_deref());
    let cwd_c = cwd.map(|dir| to_cstring(dir.as_os_str())).transpose()?;

    let actions = build_file_actions(
        child_stdin,
        stdout_w.as_fd(),
        stderr_w.as_fd(),
        cwd_c.as_deref(),
    )?;
    let attr = SpawnAttr::new()?;

    let program = resolve_executable(&spec.executable, &spec.env, config.search_path)?;
    let program_c = to_cstring(program.as_os_str())?;

    let argv = build_argv(spec, cwd)?;
    let envp = build_envp(&spec.env, config.env_mode)?;
    let argv_ptrs = null_terminated(&argv);
    let envp_ptrs = null_terminated(&envp);

    let mut pid: libc::pid_t = 0;
    // SAFETY: every pointer refers to a live, NUL-terminated CString or to
    // the initialised actions/attr objects, all of which outlive the call.
    let rc = unsafe {
        libc::posix_spawn(
            &mut pid,
            program_c.as_ptr(),
            actions.as_ptr(),
            attr.as_ptr(),
            argv_ptrs.as_ptr(),
            envp_ptrs.as_ptr(),
        )
    };
    if rc != 0 {
        return Err(ShellExecError::spawn_rc("posix_spawn", rc));
    }
    child.set_running(pid);

    info!(
        pid,
        executable = %program.display(),
        args = argv.len() - 1,
        stdin = stdin_kind,
        cwd = ?cwd,
        "spawned child"
    );

    // The child owns the only copies of these now.
    drop(stdout_w);
    drop(stderr_w);
    drop(handoff);

    let stdin = feed.map(|(read_end, write_end, payload)| {
        drop(read_end);
        (write_end, payload)
    });
    debug_assert_eq!(stdin.is_some(), fed_by_parent);

    Ok(ChildPipes {
        pid,
        stdout: stdout_r,
        stderr: stderr_r,
        stdin,
    })
}

/// Turn `executable` into the path handed to `posix_spawn`.
///
/// Names containing `/` are used as given. Bare names are looked up in
/// `PATH` (the override's, if it sets one, else the parent's) when
/// `search_path` is on; a miss is `Spawn { step: "resolve executable" }`
/// with an `ErrorKind::NotFound` source.
pub fn resolve_executable(
    executable: &str,
    env_overrides: &BTreeMap<String, String>,
    search_path: bool,
) -> Result<PathBuf> {
    if executable.is_empty() {
        return Err(not_found("empty executable name".to_string()));
    }
    if executable.contains('/') || !search_path {
        return Ok(PathBuf::from(executable));
    }

    let path_var: OsString = match env_overrides.get("PATH") {
        Some(p) => OsString::from(p),
        None => env::var_os("PATH").unwrap_or_else(|| OsString::from(FALLBACK_PATH)),
    };

    for dir in env::split_paths(&path_var) {
        let dir = if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir
        };
        let candidate = dir.join(executable);
        if is_executable_file(&candidate) {
            debug!(executable, resolved = %candidate.display(), "resolved via PATH");
            return Ok(candidate);
        }
    }

    Err(not_found(format!("executable '{executable}' not found in PATH")))
}

/// A lookup miss is the same "never ran" failure `posix_spawn` reports for a
/// missing absolute path.
fn not_found(msg: String) -> ShellExecError {
    ShellExecError::spawn("resolve executable", io::Error::new(io::ErrorKind::NotFound, msg))
}

fn is_executable_file(path: &Path) -> bool {
    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// argv[0] is the executable as the caller named it.
fn build_argv(spec: &ProcessSpec, cwd: Option<&Path>) -> Result<Vec<CString>> {
    let mut argv = Vec::with_capacity(spec.args.len() + 1);
    argv.push(to_cstring(OsStr::new(&spec.executable))?);
    for arg in &spec.args {
        argv.push(to_cstring(&arg.render(cwd))?);
    }
    Ok(argv)
}

/// Serialise the child's environment as `NAME=VALUE` entries.
pub fn build_envp(overrides: &BTreeMap<String, String>, mode: EnvMode) -> Result<Vec<CString>> {
    let mut vars: BTreeMap<OsString, OsString> = BTreeMap::new();

    let inherit = overrides.is_empty() || mode == EnvMode::Merge;
    if inherit {
        vars.extend(env::vars_os());
    }
    for (name, value) in overrides {
        vars.insert(OsString::from(name), OsString::from(value));
    }

    vars.iter()
        .map(|(name, value)| {
            let mut entry = Vec::with_capacity(name.len() + value.len() + 1);
            entry.extend_from_slice(name.as_bytes());
            entry.push(b'=');
            entry.extend_from_slice(value.as_bytes());
            CString::new(entry).map_err(|e| {
                ShellExecError::spawn("environment", io::Error::new(io::ErrorKind::InvalidInput, e))
            })
        })
        .collect()
}

fn to_cstring(s: &OsStr) -> Result<CString> {
    CString::new(s.as_bytes()).map_err(|e| {
        ShellExecError::spawn("argument", io::Error::new(io::ErrorKind::InvalidInput, e))
    })
}

fn null_terminated(strings: &[CString]) -> Vec<*mut libc::c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr() as *mut libc::c_char)
        .chain(std::iter::once(ptr::null_mut()))
        .collect()
}
