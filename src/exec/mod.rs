// src/exec/mod.rs

//! Process execution layer.
//!
//! Spawns a single binary with literal arguments through `posix_spawn`,
//! feeds its stdin, drains stdout/stderr and reaps it, all concurrently.
//!
//! - [`spec`] holds the invocation/result value types.
//! - [`actions`] creates pipes and the `posix_spawn` file actions.
//! - [`spawner`] resolves the executable, builds argv/envp and spawns.
//! - [`orchestrator`] runs feed, drains and exit-wait concurrently.
//! - [`child`] owns the pid/liveness state shared with `interrupt`.
//! - [`status`] decodes raw wait statuses.
//! - [`cancel`] is the cancellation token polled between syscalls.
//! - [`runner`] provides the `ProcessRunner` trait and [`ShellProcess`].

pub mod actions;
pub mod cancel;
pub mod child;
pub mod orchestrator;
pub mod runner;
pub mod spawner;
pub mod spec;
pub mod status;

pub use cancel::CancelToken;
pub use child::ChildHandle;
pub use runner::{ProcessRunner, ShellProcess};
pub use spec::{Arg, ProcessOutput, ProcessSpec, StdinSource};
pub use status::decode_wait_status;
