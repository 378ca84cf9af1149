// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! In-process `Emitter`/`Listener` pair for single-node deployments and
//! tests, where every partition this node is asked to send to is,
//! definitionally, local — spec.md §9's "Design Notes" call out
//! single-node use as a case worth a dedicated, trivial transport
//! rather than routing through a real socket.

use async_trait::async_trait;
use flux_wire::{Emitter, Listener, WireError};
use tokio::sync::mpsc;

/// The sending half of a loopback pair. `partition` is accepted but
/// ignored — there is only one node, so every partition is local.
pub struct LoopbackEmitter {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

#[async_trait]
impl Emitter for LoopbackEmitter {
    async fn send(&self, _partition: u32, bytes: Vec<u8>) -> Result<(), WireError> {
        self.tx.send(bytes).map_err(|_| WireError::Send("loopback receiver dropped".to_string()))
    }
}

/// The receiving half of a loopback pair.
pub struct LoopbackListener {
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

#[async_trait]
impl Listener for LoopbackListener {
    async fn recv(&self) -> Result<Vec<u8>, WireError> {
        self.rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| WireError::Recv("loopback sender dropped".to_string()))
    }
}

/// Build a connected emitter/listener pair sharing one channel.
pub fn loopback_pair() -> (LoopbackEmitter, LoopbackListener) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LoopbackEmitter { tx }, LoopbackListener { rx: tokio::sync::Mutex::new(rx) })
}

#[cfg(test)]
#[path = "loopback_tests.rs"]
mod tests;
