// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Glue-layer failures spanning `flux-core`'s registry errors and
//! `flux-wire`'s transport errors — assembled here because this is the
//! first layer that actually needs to propagate either one to a caller
//! (spec.md §7's taxonomy entries live in the crate that raises them).

use flux_core::RegistryError;
use flux_wire::WireError;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("stream \"{0}\" is closed")]
    StreamClosed(String),
    #[error("bounded queue for stream \"{0}\" is full")]
    QueueFull(String),
}
