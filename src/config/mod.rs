// src/config/mod.rs

//! Execution configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer `SHELLEXEC_*` overrides on top
//!   (`loader.rs`).
//! - Validate the result (`validate.rs`).
//!
//! Override order, strongest first: CLI flags, environment variables, the
//! config file, built-in defaults.

pub mod loader;
pub mod model;
pub mod validate;

pub use crate::types::EnvMode;
pub use loader::{apply_env_overrides, load_and_validate, load_from_path};
pub use model::{ExecConfig, ExecSection, RawConfigFile, DEFAULT_TMP_DIR};
