// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Resolves `comm.module` (spec.md §6) to a concrete `Emitter`/`Listener`
//! pair. This is the node binary's one hardwired choice of adapter —
//! `flux-runtime`/`flux-wire` never know which transport they're driving.

use std::net::SocketAddr;
use std::sync::Arc;

use flux_adapters::{loopback_pair, LoopbackEmitter, LoopbackListener, UdpEmitter, UdpListener};
use flux_wire::{Emitter, Listener};

use crate::errors::ConfigError;

/// A built `Emitter`/`Listener` pair, already split into the trait
/// objects [`flux_runtime::Sender`]/[`flux_runtime::Receiver`] expect.
pub enum CommPair {
    Loopback(LoopbackEmitter, LoopbackListener),
    Udp(UdpEmitter, UdpListener),
}

impl CommPair {
    pub fn split(self) -> (Arc<dyn Emitter>, Arc<dyn Listener>) {
        match self {
            CommPair::Loopback(emitter, listener) => {
                (Arc::new(emitter) as Arc<dyn Emitter>, Arc::new(listener) as Arc<dyn Listener>)
            }
            CommPair::Udp(emitter, listener) => {
                (Arc::new(emitter) as Arc<dyn Emitter>, Arc::new(listener) as Arc<dyn Listener>)
            }
        }
    }
}

/// Build the comm pair named by `comm_module`.
///
/// `"udp"` binds with an empty partition-address table: this binary has
/// no cluster membership service to learn peer addresses from (spec.md
/// §1 places membership out of core scope), so a UDP deployment today
/// only has a working `Listener` until that table is populated some
/// other way (see DESIGN.md).
pub async fn build(comm_module: &str, bind_addr: SocketAddr) -> Result<CommPair, ConfigError> {
    match comm_module {
        "loopback" => {
            let (emitter, listener) = loopback_pair();
            Ok(CommPair::Loopback(emitter, listener))
        }
        "udp" => {
            let listener = UdpListener::bind(bind_addr)
                .await
                .map_err(|e| ConfigError::Invalid {
                    field: "comm_module",
                    value: "udp".to_string(),
                    reason: e.to_string(),
                })?;
            let emitter = UdpEmitter::bind(bind_addr, std::collections::HashMap::new())
                .await
                .map_err(|e| ConfigError::Invalid {
                    field: "comm_module",
                    value: "udp".to_string(),
                    reason: e.to_string(),
                })?;
            Ok(CommPair::Udp(emitter, listener))
        }
        other => Err(ConfigError::Invalid {
            field: "comm_module",
            value: other.to_string(),
            reason: "expected \"loopback\" or \"udp\"".to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "comm_tests.rs"]
mod tests;
