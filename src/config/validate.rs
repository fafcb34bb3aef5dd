// src/config/validate.rs

use crate::config::model::{ExecConfig, ExecSection, RawConfigFile};
use crate::errors::{Result, ShellExecError};

impl TryFrom<RawConfigFile> for ExecConfig {
    type Error = ShellExecError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_exec_section(&raw.exec)?;
        Ok(ExecConfig::new_unchecked(raw.exec))
    }
}

/// Check invariants that serde cannot express.
pub fn validate_exec_section(section: &ExecSection) -> Result<()> {
    if section.read_chunk_size == 0 {
        return Err(ShellExecError::Config(
            "[exec].read_chunk_size must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(ref cwd) = section.default_cwd {
        if !cwd.is_absolute() {
            return Err(ShellExecError::Config(format!(
                "[exec].default_cwd must be an absolute path (got {})",
                cwd.display()
            )));
        }
    }

    if let Some(ref tmp) = section.tmp_dir {
        if tmp.as_os_str().is_empty() {
            return Err(ShellExecError::Config(
                "[exec].tmp_dir must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Re-validate a config after overrides were applied on top of it.
pub fn validate_config(cfg: &ExecConfig) -> Result<()> {
    validate_exec_section(&ExecSection {
        env_mode: cfg.env_mode,
        search_path: cfg.search_path,
        default_cwd: cfg.default_cwd.clone(),
        read_chunk_size: cfg.read_chunk_size,
        tmp_dir: cfg.tmp_dir.clone(),
    })
}
