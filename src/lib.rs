// src/lib.rs

//! Subprocess execution engine.
//!
//! Spawns one binary with literal arguments through `posix_spawn`, drives
//! its stdin/stdout/stderr concurrently so a full pipe can never deadlock
//! the invocation, and returns a [`ProcessOutput`] holding the normalised
//! exit code, the raw stdout bytes and the stderr text.
//!
//! ```no_run
//! # async fn demo() -> shellexec::errors::Result<()> {
//! use shellexec::{spawn, ProcessSpec, StdinSource};
//!
//! let out = spawn(ProcessSpec::new("wc").arg("-c"), StdinSource::text("hello\n")).await?;
//! assert_eq!(out.code, 0);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fixtures;
pub mod io;
pub mod logging;
pub mod types;

use std::io::Write;
use std::os::fd::AsFd;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, RunArgs};
use crate::config::loader::default_config_path;
use crate::config::{apply_env_overrides, load_and_validate, ExecConfig};

pub use crate::exec::{
    Arg, CancelToken, ProcessOutput, ProcessRunner, ProcessSpec, ShellProcess, StdinSource,
};
pub use crate::fixtures::{read_fixture, ResolvePath};
pub use crate::io::read_file_bytes;

/// Run one invocation with the default configuration.
pub async fn spawn(spec: ProcessSpec, stdin: StdinSource) -> errors::Result<ProcessOutput> {
    ShellProcess::default().run(spec, stdin).await
}

/// High-level entry point used by `main.rs`. Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Run(run_args) => {
            let config = apply_run_flags(config, &run_args);
            let shell = Arc::new(ShellProcess::new(config));
            debug!(config = ?shell.config(), "effective exec config");
            forward_ctrl_c(shell.clone());

            let output = run_command(shell.as_ref(), &run_args).await?;
            emit_output(&output, &mut std::io::stdout(), &mut std::io::stderr())
                .context("forwarding child output")?;
            Ok(output.code)
        }
        Command::Cat { path } => {
            let bytes = read_file_bytes(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
            Ok(0)
        }
    }
}

/// Ctrl-C → interrupt the child; the normal join path still reaps it.
fn forward_ctrl_c(runner: Arc<dyn ProcessRunner>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; interrupting child");
        if let Err(e) = runner.interrupt() {
            eprintln!("failed to interrupt child: {e}");
        }
    });
}

/// Build the spec and stdin source for `args` and hand them to `runner`.
pub async fn run_command(runner: &dyn ProcessRunner, args: &RunArgs) -> Result<ProcessOutput> {
    let (executable, rest) = args
        .command
        .split_first()
        .context("missing executable")?;

    let mut spec = ProcessSpec::new(executable.clone()).args(rest);
    for (name, value) in &args.env {
        spec = spec.env(name.clone(), value.clone());
    }
    if let Some(ref cwd) = args.cwd {
        spec = spec.cwd(cwd.clone());
    }

    let stdin = stdin_source(args)?;
    debug!(?spec, ?stdin, "running command from CLI");

    let output = runner
        .run_process(spec, stdin)
        .await
        .with_context(|| format!("running '{executable}'"))?;
    Ok(output)
}

/// Write captured stdout bytes and stderr text to the given sinks.
pub fn emit_output<O: Write, E: Write>(
    output: &ProcessOutput,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<()> {
    out.write_all(&output.stdout)?;
    out.flush()?;
    err.write_all(output.stderr.as_bytes())?;
    err.flush()
}

fn stdin_source(args: &RunArgs) -> Result<StdinSource> {
    if let Some(ref path) = args.stdin_file {
        return Ok(StdinSource::Path(path.clone()));
    }
    if let Some(ref text) = args.stdin_text {
        return Ok(StdinSource::text(text));
    }
    if args.stdin_inherit {
        let fd = std::io::stdin()
            .as_fd()
            .try_clone_to_owned()
            .context("duplicating our stdin")?;
        return Ok(StdinSource::Descriptor(fd));
    }
    Ok(StdinSource::None)
}

/// Config file (explicit, or `shellexec.toml` if present) plus env overrides.
fn load_config(path: Option<&str>) -> Result<ExecConfig> {
    let base = match path {
        Some(p) => load_and_validate(PathBuf::from(p))?,
        None => {
            let default = default_config_path();
            if default.is_file() {
                load_and_validate(default)?
            } else {
                ExecConfig::default()
            }
        }
    };
    Ok(apply_env_overrides(base, |k| std::env::var(k).ok())?)
}

/// CLI flags are the strongest override layer.
pub fn apply_run_flags(mut config: ExecConfig, args: &RunArgs) -> ExecConfig {
    if let Some(mode) = args.env_mode {
        config.env_mode = mode;
    }
    if args.no_search_path {
        config.search_path = false;
    }
    config
}
