// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

use super::*;

#[test]
fn envelope_round_trips_through_json() {
    let env = Envelope::new("clicks", "Click", serde_json::json!({"x": 1}));
    let bytes = serde_json::to_vec(&env).unwrap();
    let back: Envelope = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(env, back);
}
