// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flux-wire: the comm-layer seams spec.md §6 places out of THE CORE's
//! scope, but a runnable node still needs concrete traits for.
//!
//! This crate defines the interfaces only — `Serializer`, `Emitter`,
//! `Listener`, `Hasher`, and `Topology` — plus the wire envelope type
//! that carries a routed event's stream name and type tag across them.
//! Concrete implementations (UDP transport, a stable hash, a
//! config-driven topology) live in `flux-adapters`; `flux-runtime`
//! depends only on the traits here, never on a specific transport.

pub mod envelope;
pub mod errors;
pub mod hasher;
pub mod serializer;
pub mod topology;
pub mod transport;

pub use envelope::Envelope;
pub use errors::WireError;
pub use hasher::{Fnv1aHasher, Hasher};
pub use serializer::{JsonSerializer, Serializer};
pub use topology::{StaticTopology, Topology};
pub use transport::{Emitter, Listener};
