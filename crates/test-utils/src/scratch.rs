//! Temp-file helpers for tests.
//!
//! Scratch directories are created under the configured
//! [`ExecConfig::tmp_dir`], never under an ad-hoc lookup of `TMPDIR`.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use shellexec::config::{apply_env_overrides, ExecConfig};
use tempfile::TempDir;

/// Default config with the `SHELLEXEC_*` / `TMPDIR` overrides applied.
pub fn scratch_config() -> Result<ExecConfig> {
    Ok(apply_env_overrides(ExecConfig::default(), |k| {
        std::env::var(k).ok()
    })?)
}

/// A scratch directory that is removed on drop.
pub fn tmpdir() -> Result<TempDir> {
    tmpdir_in(&scratch_config()?)
}

/// A scratch directory under `cfg.tmp_dir()`, removed on drop.
pub fn tmpdir_in(cfg: &ExecConfig) -> Result<TempDir> {
    Ok(tempfile::Builder::new()
        .prefix("shellexec-")
        .tempdir_in(cfg.tmp_dir())?)
}

/// Create `name` inside `dir` (parents included) holding `contents`.
pub fn tmpfile(dir: &TempDir, name: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

/// Deterministic, non-repeating-looking payload of `len` bytes.
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 251) % 256) as u8).collect()
}
