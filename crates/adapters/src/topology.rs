// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! A config-file-backed [`flux_wire::Topology`].
//!
//! spec.md §6: `Assignment`/`Topology` "provides local partition set and
//! total partition count; polled at start and on topology change." This
//! implementation reads a fixed snapshot from node configuration rather
//! than polling a live membership service — an adequate stand-in for
//! the cluster membership service spec.md §1 places out of core scope.

use flux_wire::{StaticTopology, Topology};
use serde::{Deserialize, Serialize};

/// The on-disk/config shape for a node's partition assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionTableConfig {
    pub partition_count: u32,
    pub local_partitions: Vec<u32>,
}

impl PartitionTableConfig {
    pub fn single_node(partition_count: u32) -> Self {
        Self { partition_count, local_partitions: (0..partition_count).collect() }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_topology(&self) -> StaticTopology {
        StaticTopology::new(self.partition_count, self.local_partitions.clone())
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
