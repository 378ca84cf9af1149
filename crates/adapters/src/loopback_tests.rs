// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

use super::*;

#[tokio::test]
async fn sent_bytes_arrive_at_the_paired_listener_regardless_of_partition() {
    let (emitter, listener) = loopback_pair();
    emitter.send(42, b"payload".to_vec()).await.unwrap();
    assert_eq!(listener.recv().await.unwrap(), b"payload");
}

#[tokio::test]
async fn recv_errors_once_the_emitter_is_dropped() {
    let (emitter, listener) = loopback_pair();
    drop(emitter);
    assert!(listener.recv().await.is_err());
}
