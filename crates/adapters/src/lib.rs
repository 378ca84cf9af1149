// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flux-adapters: concrete implementations of the `flux-wire` seams.
//!
//! - [`udp`] — a UDP `Emitter`/`Listener` pair for real multi-node
//!   deployments.
//! - [`loopback`] — an in-process `Emitter`/`Listener` pair for
//!   single-node deployments and tests, where every partition is always
//!   local.
//! - [`topology`] — a config-file-backed [`flux_wire::Topology`].

pub mod loopback;
pub mod topology;
pub mod udp;

pub use loopback::{LoopbackEmitter, LoopbackListener, loopback_pair};
pub use topology::PartitionTableConfig;
pub use udp::{UdpEmitter, UdpListener};
