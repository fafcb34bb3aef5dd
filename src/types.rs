// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// How a non-empty set of environment overrides combines with the parent
/// environment.
///
/// - `Replace`: the overrides are the child's entire environment (default).
/// - `Merge`: the overrides are layered on top of the inherited variables.
///
/// An empty override set always means "inherit unchanged".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvMode {
    Replace,
    Merge,
}

impl Default for EnvMode {
    fn default() -> Self {
        EnvMode::Replace
    }
}

impl FromStr for EnvMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(EnvMode::Replace),
            "merge" => Ok(EnvMode::Merge),
            other => Err(format!(
                "invalid env_mode: {other} (expected \"replace\" or \"merge\")"
            )),
        }
    }
}
