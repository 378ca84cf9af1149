// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Error taxonomy shared across dispatch and the instance lifecycle.
//!
//! spec.md §7 assigns each failure mode a distinct shape so callers can
//! apply the right propagation policy (fatal vs. logged-and-dropped vs.
//! logged-and-continued). This module carries the two taxonomy entries
//! that belong to the data model itself; `flux-runtime` and `flux-node`
//! add the entries specific to their own layer (`DispatchMiss`,
//! `TransportError`, `ConfigError`, `LoadError`, `QueueOverflow`).

use std::fmt;

/// A failure raised by user code inside `onCreate`, an input/output
/// handler, or `onRemove`.
///
/// Per spec.md §7, a `UserHandlerError` never rolls back instance state
/// and never crashes the node — it is logged with the PE class, key, and
/// event variant by the caller and the event is considered processed.
#[derive(Debug)]
pub struct UserHandlerError {
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl UserHandlerError {
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self { source: Box::new(source) }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self { source: Box::new(MessageError(message.into())) }
    }
}

impl fmt::Display for UserHandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for UserHandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MessageError {}

/// Instance-lifecycle failures raised by [`crate::registry::Registry`]
/// (spec.md §4.2).
///
/// `CreateFailed` is the only failure mode the registry itself can
/// surface: per §4.2, "instance creation is infallible except for user
/// code in onCreate. An onCreate that fails must leave the registry
/// unchanged" — the registry never inserts the failed candidate, so the
/// next `get_or_create` for that key retries from scratch.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("onCreate failed for key {key:?}: {source}")]
    CreateFailed { key: String, #[source] source: UserHandlerError },
}
