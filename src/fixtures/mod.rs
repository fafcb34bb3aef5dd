// src/fixtures/mod.rs

//! Fixture lookup.
//!
//! Resolution (bundle layout, working-directory conventions) belongs to the
//! caller; this module only defines the interface and two simple
//! implementations, plus the helpers that read a resolved fixture through
//! the fast file reader.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::errors::{Result, ShellExecError};
use crate::io::read_file_bytes;

/// Turns a symbolic resource name into a concrete filesystem path.
pub trait ResolvePath: Send + Sync + Debug {
    fn resolve_path(&self, logical_name: &str) -> Result<PathBuf>;
}

/// Fixtures stored as plain files under one root directory.
#[derive(Debug, Clone)]
pub struct FixtureDir {
    root: PathBuf,
}

impl FixtureDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<CARGO_MANIFEST_DIR>/<relative>` style roots are the common case.
    pub fn under(base: impl AsRef<Path>, relative: impl AsRef<Path>) -> Self {
        Self::new(base.as_ref().join(relative))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResolvePath for FixtureDir {
    fn resolve_path(&self, logical_name: &str) -> Result<PathBuf> {
        let candidate = self.root.join(logical_name);
        if candidate.exists() {
            Ok(candidate)
        } else {
            Err(ShellExecError::NotFound(format!(
                "fixture '{logical_name}' (looked in {})",
                self.root.display()
            )))
        }
    }
}

/// Name-to-path table, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    entries: Arc<Mutex<HashMap<String, PathBuf>>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, logical_name: impl Into<String>, path: impl Into<PathBuf>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(logical_name.into(), path.into());
    }
}

impl ResolvePath for MemoryResolver {
    fn resolve_path(&self, logical_name: &str) -> Result<PathBuf> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(logical_name)
            .cloned()
            .ok_or_else(|| ShellExecError::NotFound(format!("fixture '{logical_name}'")))
    }
}

/// Resolve `name` and read the file's bytes.
pub fn read_fixture(resolver: &dyn ResolvePath, name: &str) -> Result<Vec<u8>> {
    let path = resolver.resolve_path(name)?;
    debug!(fixture = name, path = %path.display(), "loading fixture");
    read_file_bytes(&path)
}

/// Resolve `name` and read it as UTF-8 text; invalid UTF-8 is an error.
pub fn read_fixture_string(resolver: &dyn ResolvePath, name: &str) -> Result<String> {
    let bytes = read_fixture(resolver, name)?;
    String::from_utf8(bytes).map_err(|e| {
        ShellExecError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("fixture '{name}' is not valid UTF-8: {e}"),
        ))
    })
}
