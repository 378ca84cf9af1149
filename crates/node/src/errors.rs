// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Node-level failures: configuration and app-loading (spec.md §7
//! `ConfigError`/`LoadError`). Both are distinct from
//! `flux_runtime::RuntimeError`: they happen before any event is ever
//! dispatched.

use std::path::PathBuf;

/// Fatal at startup — the node refuses to run rather than guess at a
/// missing or malformed setting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {path:?} could not be read: {source}")]
    ReadFailed { path: PathBuf, #[source] source: std::io::Error },

    #[error("config file {path:?} is not valid TOML: {source}")]
    ParseFailed { path: PathBuf, #[source] source: toml::de::Error },

    #[error("{0} must be set (env var {1}, or the matching key in flux-node.toml)")]
    Missing(&'static str, &'static str),

    #[error("{field} has an invalid value {value:?}: {reason}")]
    Invalid { field: &'static str, value: String, reason: String },
}

/// Raised while scanning `appsDir` for application archives (spec.md §6
/// `"*.s4r archives... with a manifest"`). Per §7, a single bad archive
/// is logged and skipped rather than failing the whole node.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("archive {path:?} has no manifest.toml")]
    MissingManifest { path: PathBuf },

    #[error("manifest at {path:?} is not valid TOML: {source}")]
    InvalidManifest { path: PathBuf, #[source] source: toml::de::Error },

    #[error("manifest at {path:?} names unknown app class {class:?}")]
    UnknownAppClass { path: PathBuf, class: String },
}
