// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! `Sender`/`Receiver`: the glue between `flux-runtime`'s stream fabric
//! and `flux-wire`'s comm-layer seams (spec.md §2 "Sender / Receiver",
//! §6).
//!
//! Neither type talks to a concrete transport directly — both are
//! generic over [`Emitter`]/[`Listener`]/[`Serializer`], so `flux-node`
//! can wire in a UDP transport for a real cluster or the in-process
//! loopback pair for a single-node deployment without this crate caring
//! which.

use std::sync::Arc;

use flux_core::Event;
use flux_wire::{Emitter, Listener, Serializer};

use crate::errors::RuntimeError;
use crate::stream::StreamRegistry;

/// Forwards an event to the node that owns `partition` when a
/// [`crate::Stream`]'s own topology says it isn't local (spec.md §4.6).
pub struct Sender {
    emitter: Arc<dyn Emitter>,
    serializer: Arc<dyn Serializer>,
}

impl Sender {
    pub fn new(emitter: Arc<dyn Emitter>, serializer: Arc<dyn Serializer>) -> Self {
        Self { emitter, serializer }
    }

    /// Encode `event` for `stream` and hand it to the emitter. Per
    /// spec.md §6, a send failure is logged by the caller and the event
    /// is dropped — this method never retries.
    pub async fn send(
        &self,
        stream: &str,
        partition: u32,
        event: Arc<dyn Event>,
    ) -> Result<(), RuntimeError> {
        let bytes = self.serializer.encode(stream, event.as_ref())?;
        self.emitter.send(partition, bytes).await?;
        Ok(())
    }
}

/// Pulls inbound envelopes off a [`Listener`] and re-delivers them onto
/// the matching local [`crate::Stream`] by name (spec.md §2 "Receiver
/// pushes inbound events onto the correct local stream").
pub struct Receiver {
    listener: Arc<dyn Listener>,
    serializer: Arc<dyn Serializer>,
    streams: Arc<StreamRegistry>,
}

impl Receiver {
    pub fn new(
        listener: Arc<dyn Listener>,
        serializer: Arc<dyn Serializer>,
        streams: Arc<StreamRegistry>,
    ) -> Self {
        Self { listener, serializer, streams }
    }

    /// Runs until the listener itself gives up (spec.md §7
    /// `TransportError`: "for recv, the listener reconnects or retries
    /// per comm-module policy" — this loop simply keeps calling `recv`
    /// and logging failures, leaving any reconnect backoff to the
    /// concrete [`Listener`] implementation).
    pub async fn run(self: Arc<Self>) {
        loop {
            match self.listener.recv().await {
                Ok(bytes) => self.deliver(&bytes).await,
                Err(err) => {
                    tracing::warn!(error = %err, "listener recv failed");
                }
            }
        }
    }

    async fn deliver(&self, bytes: &[u8]) {
        let (stream_name, event) = match self.serializer.decode(bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::warn!(error = %err, "failed to decode inbound event");
                return;
            }
        };
        let Some(stream) = self.streams.get(&stream_name) else {
            tracing::warn!(stream = stream_name, "no local stream registered for inbound event");
            return;
        };
        let event: Arc<dyn Event> = Arc::from(event);
        if let Err(err) = stream.put(event).await {
            tracing::warn!(stream = stream_name, error = %err, "failed to enqueue inbound event");
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
