// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::io::DEFAULT_CHUNK_SIZE;
use crate::types::EnvMode;

/// Fallback scratch directory when neither the config nor the environment
/// names one.
pub const DEFAULT_TMP_DIR: &str = "/tmp";

/// Configuration file as read from TOML.
///
/// ```toml
/// [exec]
/// env_mode = "merge"
/// search_path = true
/// default_cwd = "/srv/fixtures"
/// read_chunk_size = 65536
/// tmp_dir = "/var/tmp"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub exec: ExecSection,
}

/// `[exec]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecSection {
    #[serde(default)]
    pub env_mode: EnvMode,

    /// Resolve bare executable names through `PATH`.
    #[serde(default = "default_search_path")]
    pub search_path: bool,

    /// Working directory for specs that do not name one. Must be absolute.
    #[serde(default)]
    pub default_cwd: Option<PathBuf>,

    #[serde(default = "default_read_chunk_size")]
    pub read_chunk_size: usize,

    #[serde(default)]
    pub tmp_dir: Option<PathBuf>,
}

fn default_search_path() -> bool {
    true
}

fn default_read_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            env_mode: EnvMode::default(),
            search_path: default_search_path(),
            default_cwd: None,
            read_chunk_size: default_read_chunk_size(),
            tmp_dir: None,
        }
    }
}

/// Validated configuration threaded through every spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecConfig {
    pub env_mode: EnvMode,
    pub search_path: bool,
    pub default_cwd: Option<PathBuf>,
    pub read_chunk_size: usize,
    pub tmp_dir: Option<PathBuf>,
}

impl ExecConfig {
    pub(crate) fn new_unchecked(section: ExecSection) -> Self {
        Self {
            env_mode: section.env_mode,
            search_path: section.search_path,
            default_cwd: section.default_cwd,
            read_chunk_size: section.read_chunk_size,
            tmp_dir: section.tmp_dir,
        }
    }

    /// Scratch directory for temp-file collaborators.
    pub fn tmp_dir(&self) -> &Path {
        self.tmp_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TMP_DIR))
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self::new_unchecked(ExecSection::default())
    }
}
