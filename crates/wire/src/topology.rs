// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! `Topology`/`Assignment`: the cluster membership and partition
//! assignment seam (spec.md §6). Out of core scope — the core only
//! needs to know the total partition count and which partitions this
//! node owns, not how that assignment is computed or kept current.

/// The local node's view of the cluster's partition assignment.
///
/// spec.md §6: "polled at start and on topology change" — `flux-node`
/// re-reads this when the underlying assignment service signals a
/// change; the trait itself is a point-in-time snapshot.
pub trait Topology: Send + Sync {
    /// Total number of partitions across the cluster.
    fn partition_count(&self) -> u32;

    /// Partitions this node currently owns.
    fn local_partitions(&self) -> Vec<u32>;

    /// Whether `partition` is owned by this node.
    fn is_local(&self, partition: u32) -> bool {
        self.local_partitions().contains(&partition)
    }
}

/// A fixed topology read once from node configuration. Adequate for a
/// single-node deployment or a test harness; `flux-adapters` is free to
/// add a dynamic, service-backed implementation without changing this
/// trait.
#[derive(Debug, Clone)]
pub struct StaticTopology {
    partition_count: u32,
    local_partitions: Vec<u32>,
}

impl StaticTopology {
    pub fn new(partition_count: u32, local_partitions: Vec<u32>) -> Self {
        Self { partition_count, local_partitions }
    }

    /// A single-node topology owning every partition.
    pub fn single_node(partition_count: u32) -> Self {
        Self { partition_count, local_partitions: (0..partition_count).collect() }
    }
}

impl Topology for StaticTopology {
    fn partition_count(&self) -> u32 {
        self.partition_count
    }

    fn local_partitions(&self) -> Vec<u32> {
        self.local_partitions.clone()
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
