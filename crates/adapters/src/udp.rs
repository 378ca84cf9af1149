// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! UDP `Emitter`/`Listener` pair — the default multi-node transport.
//!
//! spec.md §6 leaves the transport's reliability characteristics to the
//! comm-module; UDP matches the spec's own non-goals ("at-most-once,
//! best-effort event processing") without needing any acknowledgement
//! or retry machinery in this crate.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use flux_wire::{Emitter, Listener, WireError};
use tokio::net::UdpSocket;

/// Largest datagram this listener will accept. UDP's practical ceiling
/// well under IPv4 fragmentation limits on typical cluster networks.
const MAX_DATAGRAM_BYTES: usize = 64 * 1024;

/// Sends envelopes to the node that owns each partition, resolved via a
/// fixed partition-to-address table (spec.md §6 `Assignment`/`Topology`
/// supplies the partition numbers; this table supplies where to reach
/// the node that owns them).
pub struct UdpEmitter {
    socket: Arc<UdpSocket>,
    partition_addrs: HashMap<u32, SocketAddr>,
}

impl UdpEmitter {
    pub async fn bind(
        local_addr: SocketAddr,
        partition_addrs: HashMap<u32, SocketAddr>,
    ) -> Result<Self, WireError> {
        let socket =
            UdpSocket::bind(local_addr).await.map_err(|e| WireError::Send(e.to_string()))?;
        Ok(Self { socket: Arc::new(socket), partition_addrs })
    }
}

#[async_trait]
impl Emitter for UdpEmitter {
    async fn send(&self, partition: u32, bytes: Vec<u8>) -> Result<(), WireError> {
        let addr = self
            .partition_addrs
            .get(&partition)
            .ok_or_else(|| WireError::Send(format!("no address for partition {partition}")))?;
        self.socket
            .send_to(&bytes, addr)
            .await
            .map_err(|e| WireError::Send(e.to_string()))?;
        Ok(())
    }
}

/// Blocking pull of the next inbound datagram (spec.md §6
/// `Listener.recv`).
pub struct UdpListener {
    socket: UdpSocket,
}

impl UdpListener {
    pub async fn bind(local_addr: SocketAddr) -> Result<Self, WireError> {
        let socket =
            UdpSocket::bind(local_addr).await.map_err(|e| WireError::Recv(e.to_string()))?;
        Ok(Self { socket })
    }
}

#[async_trait]
impl Listener for UdpListener {
    async fn recv(&self) -> Result<Vec<u8>, WireError> {
        let mut buf = vec![0u8; MAX_DATAGRAM_BYTES];
        let (len, _from) =
            self.socket.recv_from(&mut buf).await.map_err(|e| WireError::Recv(e.to_string()))?;
        buf.truncate(len);
        Ok(buf)
    }
}

#[cfg(test)]
#[path = "udp_tests.rs"]
mod tests;
