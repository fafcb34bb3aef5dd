// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::EnvMode;

/// Command-line arguments for `shellexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shellexec",
    version,
    about = "Run a binary with captured output, or read a file in bulk.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `shellexec.toml` in the current directory, if it exists.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHELLEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Spawn EXE with ARGS; forward its stdout/stderr and exit with its code.
    Run(RunArgs),

    /// Print the contents of a file (memory-mapped when possible).
    Cat {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Working directory for the child.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Environment override; repeatable.
    #[arg(long = "env", value_name = "NAME=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// How overrides combine with the inherited environment.
    #[arg(long, value_name = "MODE")]
    pub env_mode: Option<EnvMode>,

    /// Do not resolve a bare EXE name through PATH.
    #[arg(long)]
    pub no_search_path: bool,

    /// Feed this file to the child's stdin.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["stdin_text", "stdin_inherit"])]
    pub stdin_file: Option<PathBuf>,

    /// Feed this text to the child's stdin.
    #[arg(long, value_name = "TEXT", conflicts_with = "stdin_inherit")]
    pub stdin_text: Option<String>,

    /// Hand our own stdin to the child (default is /dev/null).
    #[arg(long)]
    pub stdin_inherit: bool,

    /// Executable followed by its arguments.
    #[arg(
        value_name = "EXE",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {s:?}")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
