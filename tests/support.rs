// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Shared harness for the end-to-end scenario tests in spec.md §8: build
//! a minimal `App` with one stream wired to a registered prototype, the
//! same way `flux-node`'s `apps.rs` would on a real node, but without
//! the manifest/CLI scaffolding around it.

use std::sync::Arc;

use flux_core::Event;
use flux_runtime::{App, Backpressure, Stats, Stream};
use flux_wire::{Fnv1aHasher, StaticTopology};

/// Register a single-node, block-on-full stream named `name` on `app`,
/// extracting keys with `key_of`.
pub fn register_stream(
    app: &Arc<App>,
    name: &str,
    key_of: impl Fn(&dyn Event) -> String + Send + Sync + 'static,
) {
    app.register_stream(Stream::new(
        name,
        Arc::new(key_of),
        Arc::new(Fnv1aHasher),
        Arc::new(StaticTopology::single_node(1)),
        None,
        64,
        Backpressure::Block,
        app.stats_handle(),
    ));
}

pub fn stats() -> Arc<Stats> {
    Arc::new(Stats::new())
}
