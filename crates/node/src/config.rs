// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Node configuration (spec.md §6: `comm.module`, `s4.logger_level`,
//! `appsDir`), resolved the way the teacher's `env.rs` centralizes
//! environment lookups: one env var per setting, falling back to a
//! `flux-node.toml` file, falling back to a hardcoded default.

use std::path::{Path, PathBuf};

use flux_adapters::PartitionTableConfig;
use serde::Deserialize;

use crate::errors::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "flux-node.toml";
const DEFAULT_COMM_MODULE: &str = "loopback";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_APPS_DIR: &str = "apps";
const DEFAULT_PARTITION_COUNT: u32 = 1;

/// The on-disk shape of `flux-node.toml`. Every field is optional — a
/// missing file, or a file missing some fields, is not itself an error;
/// [`NodeConfig::load`] only fails when a *resolved* value (after env
/// and file are both consulted) is missing or malformed.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    comm_module: Option<String>,
    log_level: Option<String>,
    apps_dir: Option<String>,
    partition_count: Option<u32>,
    local_partitions: Option<Vec<u32>>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFailed { path: path.to_path_buf(), source })?;
        toml::from_str(&text)
            .map_err(|source| ConfigError::ParseFailed { path: path.to_path_buf(), source })
    }
}

/// Resolved node configuration a `flux-node` process runs with.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub comm_module: String,
    pub log_level: String,
    pub apps_dir: PathBuf,
    /// This node's view of the cluster's partition assignment (spec.md
    /// §6 `Assignment`/`Topology`). Defaults to a single-node table
    /// owning partition 0, matching the hardcoded topology a loopback
    /// deployment always used before this was configurable.
    pub partitions: PartitionTableConfig,
}

/// Env var first, then the file value, then `default` — the precedence
/// `flux-node.toml` and every `FLUX_*` var share. Pulled out of
/// [`NodeConfig::load`] as a pure function so the precedence rule itself
/// is unit-testable without touching real process environment (parallel
/// `#[test]` functions would otherwise race on shared env state).
fn resolve(env_value: Option<String>, file_value: Option<String>, default: Option<&str>) -> Option<String> {
    env_value.or(file_value).or_else(|| default.map(str::to_string))
}

impl NodeConfig {
    /// Load configuration, preferring `FLUX_*` env vars over
    /// `config_path` (or `./flux-node.toml` if it exists and no explicit
    /// path was given) over the hardcoded defaults above.
    ///
    /// Per spec.md §7, a `ConfigError` here is fatal: the node refuses
    /// to start rather than guess at `comm.module` or `appsDir`.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        let file = match config_path {
            Some(path) => FileConfig::read(path)?,
            None if default_path.exists() => FileConfig::read(default_path)?,
            None => FileConfig::default(),
        };

        let comm_module = resolve(
            std::env::var("FLUX_COMM_MODULE").ok(),
            file.comm_module,
            Some(DEFAULT_COMM_MODULE),
        )
        .ok_or(ConfigError::Missing("comm_module", "FLUX_COMM_MODULE"))?;

        let log_level = resolve(
            std::env::var("FLUX_LOG_LEVEL").ok(),
            file.log_level,
            Some(DEFAULT_LOG_LEVEL),
        )
        .ok_or(ConfigError::Missing("log_level", "FLUX_LOG_LEVEL"))?;

        let apps_dir = resolve(
            std::env::var("FLUX_APPS_DIR").ok(),
            file.apps_dir,
            Some(DEFAULT_APPS_DIR),
        )
        .ok_or(ConfigError::Missing("apps_dir", "FLUX_APPS_DIR"))?;

        let partition_count = std::env::var("FLUX_PARTITION_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(file.partition_count)
            .unwrap_or(DEFAULT_PARTITION_COUNT);
        let local_partitions =
            file.local_partitions.unwrap_or_else(|| (0..partition_count).collect());
        let partitions = PartitionTableConfig { partition_count, local_partitions };

        Ok(Self { comm_module, log_level, apps_dir: PathBuf::from(apps_dir), partitions })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
