// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

use super::*;

#[test]
fn single_node_owns_every_partition() {
    let topo = StaticTopology::single_node(4);
    assert_eq!(topo.partition_count(), 4);
    for p in 0..4 {
        assert!(topo.is_local(p));
    }
}

#[test]
fn partial_assignment_only_reports_its_own_partitions() {
    let topo = StaticTopology::new(8, vec![0, 2, 4]);
    assert!(topo.is_local(2));
    assert!(!topo.is_local(3));
}
