// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ExecConfig, RawConfigFile};
use crate::config::validate::validate_config;
use crate::errors::{Result, ShellExecError};
use crate::types::EnvMode;

/// Environment variables consulted by [`apply_env_overrides`].
pub const ENV_ENV_MODE: &str = "SHELLEXEC_ENV_MODE";
pub const ENV_SEARCH_PATH: &str = "SHELLEXEC_SEARCH_PATH";
pub const ENV_TMPDIR: &str = "SHELLEXEC_TMPDIR";

/// Load a configuration file and return the raw, unvalidated model.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and validate it.
///
/// Environment overrides are applied separately with
/// [`apply_env_overrides`] so callers decide where variables come from.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ExecConfig> {
    let raw = load_from_path(&path)?;
    let config = ExecConfig::try_from(raw)?;
    debug!(path = %path.as_ref().display(), ?config, "loaded config");
    Ok(config)
}

/// Layer `SHELLEXEC_*` variables (and `TMPDIR` as the scratch-dir fallback)
/// over `cfg`, reading them through `lookup`.
///
/// Pass `|k| std::env::var(k).ok()` for the real process environment.
pub fn apply_env_overrides<F>(mut cfg: ExecConfig, lookup: F) -> Result<ExecConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(mode) = lookup(ENV_ENV_MODE) {
        cfg.env_mode = mode
            .parse::<EnvMode>()
            .map_err(|e| ShellExecError::Config(format!("{ENV_ENV_MODE}: {e}")))?;
    }

    if let Some(flag) = lookup(ENV_SEARCH_PATH) {
        cfg.search_path = parse_bool(&flag).ok_or_else(|| {
            ShellExecError::Config(format!(
                "{ENV_SEARCH_PATH}: expected a boolean, got {flag:?}"
            ))
        })?;
    }

    if let Some(dir) = lookup(ENV_TMPDIR) {
        cfg.tmp_dir = Some(PathBuf::from(dir));
    } else if cfg.tmp_dir.is_none() {
        cfg.tmp_dir = lookup("TMPDIR")
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);
    }

    validate_config(&cfg)?;
    Ok(cfg)
}

/// Default config location: `shellexec.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("shellexec.toml")
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
