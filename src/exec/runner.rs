// src/exec/runner.rs

//! Pluggable process runner.
//!
//! Front ends talk to a `ProcessRunner` rather than to [`ShellProcess`]
//! directly, so tests can swap in a runner that never spawns anything.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::config::ExecConfig;
use crate::errors::Result;
use crate::exec::cancel::CancelToken;
use crate::exec::child::ChildHandle;
use crate::exec::orchestrator::drive;
use crate::exec::spawner::spawn_child;
use crate::exec::spec::{ProcessOutput, ProcessSpec, StdinSource};

/// Trait abstracting how a process invocation is carried out.
pub trait ProcessRunner: Send + Sync {
    /// Run one invocation to completion.
    fn run_process(
        &self,
        spec: ProcessSpec,
        stdin: StdinSource,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + '_>>;

    /// Ask the running invocation to stop (SIGINT for real processes).
    fn interrupt(&self) -> Result<()>;
}

/// Handle on a single child invocation.
///
/// Clones share the same child and cancellation state, so one task can
/// `run` while another calls [`interrupt`](Self::interrupt) or
/// [`cancel`](Self::cancel). Cancellation is sticky: use a fresh handle per
/// invocation.
#[derive(Debug, Clone)]
pub struct ShellProcess {
    config: Arc<ExecConfig>,
    child: ChildHandle,
    cancel: CancelToken,
}

impl ShellProcess {
    pub fn new(config: ExecConfig) -> Self {
        Self {
            config: Arc::new(config),
            child: ChildHandle::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    /// Spawn the child, drive its I/O and reap it.
    ///
    /// Fails only if the child could not be created, an output pipe could
    /// not be read, the wait failed, or the stdin feed hit a real I/O error.
    /// A non-zero exit code is returned inside [`ProcessOutput`].
    pub async fn run(&self, spec: ProcessSpec, stdin: StdinSource) -> Result<ProcessOutput> {
        debug!(executable = %spec.executable, ?stdin, "starting invocation");
        let pipes = spawn_child(&spec, stdin, &self.config, &self.child)?;
        drive(pipes, &self.child, &self.cancel, self.config.read_chunk_size).await
    }

    /// Send SIGINT to the child. Does nothing before spawn or after reap.
    pub fn interrupt(&self) -> Result<()> {
        self.child.interrupt()
    }

    /// Send SIGKILL to the child. Does nothing before spawn or after reap.
    pub fn kill(&self) -> Result<()> {
        self.child.kill()
    }

    /// Stop feeding stdin and close it. Drains and the exit wait still run
    /// to completion; combine with [`interrupt`](Self::interrupt) to end the
    /// child itself.
    pub fn cancel(&self) {
        debug!(pid = ?self.child.pid(), "cancellation requested");
        self.cancel.cancel();
    }

    pub fn pid(&self) -> Option<i32> {
        self.child.pid()
    }

    /// Exit code once the child has been reaped.
    pub fn exit_code(&self) -> Option<i32> {
        self.child.exit_code()
    }
}

impl Default for ShellProcess {
    fn default() -> Self {
        Self::new(ExecConfig::default())
    }
}

impl ProcessRunner for ShellProcess {
    fn run_process(
        &self,
        spec: ProcessSpec,
        stdin: StdinSource,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + '_>> {
        Box::pin(self.run(spec, stdin))
    }

    fn interrupt(&self) -> Result<()> {
        ShellProcess::interrupt(self)
    }
}
