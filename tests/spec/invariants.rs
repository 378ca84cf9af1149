// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Quantified invariants from spec.md §8 not already covered by one of
//! the six end-to-end scenarios: instance identity, round-trip
//! serialization, and idempotent close.

use std::sync::{Arc, OnceLock};

use flux_core::{
    DispatchTable, DispatchTableBuilder, Event, OutputDispatchTable, PeClass, PeOptions,
    UserHandlerError,
};
use flux_runtime::App;
use flux_wire::{JsonSerializer, Serializer};
use serde::{Deserialize, Serialize};

use crate::support;

#[derive(Debug)]
struct Ping(String);
impl Event for Ping {}

#[derive(Default)]
struct NoteState;

struct NoteClass {
    input: OnceLock<DispatchTable<NoteState>>,
    output: OnceLock<OutputDispatchTable<NoteState>>,
}

impl PeClass for NoteClass {
    type State = NoteState;
    fn class_name(&self) -> &'static str {
        "NoteClass"
    }
    fn options(&self) -> PeOptions {
        PeOptions::default()
    }
    fn on_create(&self, _key: &str) -> Result<Self::State, UserHandlerError> {
        Ok(NoteState)
    }
    fn dispatch_table(&self) -> &DispatchTable<Self::State> {
        self.input.get_or_init(|| {
            DispatchTableBuilder::new("NoteClass").on::<Ping, _>(|_s, _e| Ok(())).build()
        })
    }
    fn output_table(&self) -> &OutputDispatchTable<Self::State> {
        self.output.get_or_init(|| OutputDispatchTable::empty("NoteClass"))
    }
}

#[tokio::test]
async fn every_registry_entrys_instance_id_equals_its_key() {
    let app = App::new("invariants-identity");
    support::register_stream(&app, "in", |e| {
        e.as_any().downcast_ref::<Ping>().map(|p| p.0.clone()).unwrap_or_default()
    });
    let prototype = app.register_prototype(
        NoteClass { input: OnceLock::new(), output: OnceLock::new() },
        "in",
    ).unwrap();

    let stream = app.streams().get("in").unwrap();
    for key in ["alpha", "beta", "gamma"] {
        stream.put(Arc::new(Ping(key.to_string()))).await.unwrap();
    }
    tokio::task::yield_now().await;

    for key in ["alpha", "beta", "gamma"] {
        let instance = prototype.registry().get(key).expect("instance must exist for its own key");
        assert_eq!(instance.key(), key);
    }
    assert_eq!(prototype.instance_count(), 3, "a key is never present in two registry entries");
}

#[tokio::test]
async fn closing_an_app_twice_is_idempotent() {
    let app = App::new("invariants-close");
    support::register_stream(&app, "in", |e| {
        e.as_any().downcast_ref::<Ping>().map(|p| p.0.clone()).unwrap_or_default()
    });
    app.register_prototype(NoteClass { input: OnceLock::new(), output: OnceLock::new() }, "in").unwrap();

    app.streams().get("in").unwrap().put(Arc::new(Ping("k".to_string()))).await.unwrap();
    tokio::task::yield_now().await;

    app.close().await;
    app.close().await;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    value: f64,
}
impl Event for Reading {}

#[test]
fn encoding_then_decoding_an_event_preserves_its_variant_and_payload() {
    let serializer = JsonSerializer::new().register::<Reading>("Reading");
    let original = Reading { sensor: "temp-1".to_string(), value: 21.5 };

    let bytes = serializer.encode("readings", &original).unwrap();
    let (stream, decoded) = serializer.decode(&bytes).unwrap();

    similar_asserts::assert_eq!(stream, "readings".to_string());
    let decoded = decoded.as_any().downcast_ref::<Reading>().unwrap();
    similar_asserts::assert_eq!(decoded, &original);
}
