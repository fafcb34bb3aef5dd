// src/exec/spec.rs

//! Value types describing one child invocation and its result.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

/// One argv entry.
///
/// `Path` arguments that live under the child's working directory are passed
/// relative to it; anything else is passed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Str(String),
    Path(PathBuf),
}

impl Arg {
    /// Render the argument as the child will see it, given its cwd.
    ///
    /// Path bytes are kept as-is; names that are not valid UTF-8 survive.
    pub fn render(&self, cwd: Option<&Path>) -> OsString {
        match self {
            Arg::Str(s) => OsString::from(s),
            Arg::Path(p) => {
                let rel = cwd.and_then(|dir| p.strip_prefix(dir).ok());
                match rel {
                    Some(r) if !r.as_os_str().is_empty() => r.as_os_str().to_os_string(),
                    _ => p.as_os_str().to_os_string(),
                }
            }
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::Str(s.clone())
    }
}

impl From<PathBuf> for Arg {
    fn from(p: PathBuf) -> Self {
        Arg::Path(p)
    }
}

impl From<&Path> for Arg {
    fn from(p: &Path) -> Self {
        Arg::Path(p.to_path_buf())
    }
}

/// Immutable description of a child invocation.
///
/// `args` excludes argv[0]; the executable path is used for that slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSpec {
    pub executable: String,
    pub args: Vec<Arg>,
    /// Environment overrides. Empty means "inherit the parent environment";
    /// how a non-empty map combines with it is decided by
    /// [`EnvMode`](crate::config::EnvMode).
    pub env: BTreeMap<String, String>,
    pub cwd: Option<PathBuf>,
}

impl ProcessSpec {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Where the child's stdin comes from.
///
/// `Bytes`/`Stream` are fed by the parent through a pipe. `Descriptor`/`Path`
/// are duplicated straight onto the child's fd 0, the parent never copies
/// their data.
#[derive(Default)]
pub enum StdinSource {
    /// `/dev/null`.
    #[default]
    None,
    Bytes(Vec<u8>),
    /// Ownership moves to the invocation; the parent's copy is closed once
    /// the child holds its own. Pass `fd.try_clone()` to keep using it.
    Descriptor(OwnedFd),
    Path(PathBuf),
    /// Chunks are written in order until the sender side is dropped.
    Stream(mpsc::Receiver<Vec<u8>>),
}

impl StdinSource {
    pub fn text(s: impl AsRef<str>) -> Self {
        StdinSource::Bytes(s.as_ref().as_bytes().to_vec())
    }

    /// True when the parent has to create a pipe and feed it.
    pub fn needs_pipe(&self) -> bool {
        matches!(self, StdinSource::Bytes(_) | StdinSource::Stream(_))
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            StdinSource::None => "none",
            StdinSource::Bytes(_) => "bytes",
            StdinSource::Descriptor(_) => "descriptor",
            StdinSource::Path(_) => "path",
            StdinSource::Stream(_) => "stream",
        }
    }
}

impl fmt::Debug for StdinSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StdinSource::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            StdinSource::Descriptor(fd) => write!(f, "Descriptor({fd:?})"),
            StdinSource::Path(p) => write!(f, "Path({p:?})"),
            StdinSource::None => f.write_str("None"),
            StdinSource::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<Vec<u8>> for StdinSource {
    fn from(bytes: Vec<u8>) -> Self {
        StdinSource::Bytes(bytes)
    }
}

impl From<&[u8]> for StdinSource {
    fn from(bytes: &[u8]) -> Self {
        StdinSource::Bytes(bytes.to_vec())
    }
}

impl From<&str> for StdinSource {
    fn from(s: &str) -> Self {
        StdinSource::text(s)
    }
}

impl From<String> for StdinSource {
    fn from(s: String) -> Self {
        StdinSource::Bytes(s.into_bytes())
    }
}

impl From<PathBuf> for StdinSource {
    fn from(p: PathBuf) -> Self {
        StdinSource::Path(p)
    }
}

impl From<OwnedFd> for StdinSource {
    fn from(fd: OwnedFd) -> Self {
        StdinSource::Descriptor(fd)
    }
}

impl From<mpsc::Receiver<Vec<u8>>> for StdinSource {
    fn from(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        StdinSource::Stream(rx)
    }
}

/// Result of a completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// 0..=255 for a normal exit, `128 + N` when killed by signal N.
    pub code: i32,
    pub stdout: Vec<u8>,
    /// Lossily decoded; malformed UTF-8 becomes U+FFFD.
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}
