// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Application discovery (spec.md §6): scan `appsDir` for archives and
//! read each one's manifest.
//!
//! spec.md §6 describes a `*.s4r` archive carrying a manifest entry
//! `App-Class: <fully-qualified-name>`, loaded in its own class-loading
//! scope. Rust apps are statically linked into this same binary, so
//! there is no archive format or class loader to speak of — an
//! "archive" here is simply a directory under `appsDir` holding a
//! `manifest.toml` naming the `app_class` to resolve through
//! [`crate::apps::AppRegistry`] (see DESIGN.md's Open Question entry).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::LoadError;

/// The manifest every discovered app directory must carry.
#[derive(Debug, Clone, Deserialize)]
pub struct AppManifest {
    pub app_class: String,
}

impl AppManifest {
    fn read(dir: &Path) -> Result<Self, LoadError> {
        let path = dir.join("manifest.toml");
        let text = std::fs::read_to_string(&path)
            .map_err(|_| LoadError::MissingManifest { path: path.clone() })?;
        toml::from_str(&text).map_err(|source| LoadError::InvalidManifest { path, source })
    }
}

/// An app directory found under `appsDir`, paired with the result of
/// reading its manifest.
///
/// The `Result` is carried per-entry rather than short-circuiting the
/// whole scan: per spec.md §7 "failures loading one archive do not
/// affect others," one malformed manifest must not prevent sibling apps
/// from loading.
pub struct DiscoveredApp {
    pub dir: PathBuf,
    pub manifest: Result<AppManifest, LoadError>,
}

/// List every immediate subdirectory of `apps_dir` and read its
/// manifest, in directory-entry order.
///
/// Returns `Err` only when `apps_dir` itself cannot be listed (missing,
/// not a directory, permissions) — the caller decides whether a missing
/// `appsDir` is fatal or just means "no apps configured yet".
pub fn scan(apps_dir: &Path) -> std::io::Result<Vec<DiscoveredApp>> {
    let mut discovered = Vec::new();
    for entry in std::fs::read_dir(apps_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let dir = entry.path();
        let manifest = AppManifest::read(&dir);
        discovered.push(DiscoveredApp { dir, manifest });
    }
    discovered.sort_by(|a, b| a.dir.cmp(&b.dir));
    Ok(discovered)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
