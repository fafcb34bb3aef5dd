#![allow(dead_code)]

use std::path::PathBuf;

use shellexec::config::{EnvMode, ExecConfig};

/// Builder for `ExecConfig` to simplify test setup.
pub struct ExecConfigBuilder {
    config: ExecConfig,
}

impl ExecConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ExecConfig::default(),
        }
    }

    pub fn env_mode(mut self, mode: EnvMode) -> Self {
        self.config.env_mode = mode;
        self
    }

    pub fn search_path(mut self, val: bool) -> Self {
        self.config.search_path = val;
        self
    }

    pub fn default_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.default_cwd = Some(dir.into());
        self
    }

    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    pub fn tmp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.tmp_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> ExecConfig {
        self.config
    }
}

impl Default for ExecConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
