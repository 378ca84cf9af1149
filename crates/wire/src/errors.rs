// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! `TransportError` and serialization failures (spec.md §7).

/// A failure at the comm-layer boundary: serialization, or the
/// transport send/recv seams.
///
/// Per spec.md §7, a send failure drops the event; a recv failure is
/// the comm-module's own business (reconnect/retry policy) and is
/// surfaced here only so the caller can log it.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("failed to encode event of type {type_name}: {reason}")]
    Encode { type_name: &'static str, reason: String },

    #[error("failed to decode event: {0}")]
    Decode(String),

    #[error("no serializer registered for wire tag {0:?}")]
    UnknownTag(String),

    #[error("transport send failed: {0}")]
    Send(String),

    #[error("transport recv failed: {0}")]
    Recv(String),
}
