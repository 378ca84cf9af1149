// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! `Emitter`/`Listener`: the boundary to the comm layer (spec.md §6,
//! §2.6). Concrete transports (UDP, in-process loopback) live in
//! `flux-adapters`; `flux-runtime`'s `Sender`/`Receiver` glue only ever
//! talks to these traits.

use async_trait::async_trait;

use crate::errors::WireError;

/// Transmits a serialized envelope to the node that owns `partition`.
///
/// spec.md §6: "synchronous or asynchronous transmit; errors are logged
/// and the event dropped" — a `send` failure is always terminal for
/// that one event, never retried by the emitter itself.
#[async_trait]
pub trait Emitter: Send + Sync {
    async fn send(&self, partition: u32, bytes: Vec<u8>) -> Result<(), WireError>;
}

/// Blocking (from the caller's point of view) pull of the next inbound
/// envelope's raw bytes.
///
/// spec.md §6: "blocking pull of the next inbound event's raw bytes."
/// Reconnect/retry policy on a recv failure is the comm-module's own
/// business (spec.md §7 `TransportError`); this trait only reports the
/// failure upward.
#[async_trait]
pub trait Listener: Send + Sync {
    async fn recv(&self) -> Result<Vec<u8>, WireError>;
}
