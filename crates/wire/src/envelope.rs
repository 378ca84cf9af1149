// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! The wire envelope: the unit actually handed to [`crate::Emitter::send`]
//! and produced by [`crate::Listener::recv`].
//!
//! spec.md §6 describes the comm layer as moving opaque `bytes`; in
//! practice the receiving node needs to know which local stream an
//! inbound event belongs to and which concrete type to decode its
//! payload as, so the envelope carries both alongside the serialized
//! payload rather than leaving that to a side channel.

use serde::{Deserialize, Serialize};

/// A routed, serialized event as it crosses the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    /// Name of the destination stream on the receiving node.
    pub stream: String,
    /// Registered wire tag identifying the event's concrete type, used
    /// by [`crate::Serializer::decode`] to pick a decoder.
    pub tag: String,
    /// The event's own fields, serialized.
    pub payload: serde_json::Value,
}

impl Envelope {
    pub fn new(stream: impl Into<String>, tag: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { stream: stream.into(), tag: tag.into(), payload }
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
