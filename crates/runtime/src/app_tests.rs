// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use flux_core::{DispatchTable, DispatchTableBuilder, Event, OutputDispatchTable, UserHandlerError};

use super::*;
use crate::stream::Backpressure;

#[derive(Debug)]
struct Word(String);
impl Event for Word {}

#[derive(Default)]
struct EchoState {
    seen: Vec<String>,
}

struct EchoClass {
    input: OnceLock<DispatchTable<EchoState>>,
    output: OnceLock<OutputDispatchTable<EchoState>>,
}

impl EchoClass {
    fn new() -> Self {
        Self { input: OnceLock::new(), output: OnceLock::new() }
    }
}

impl PeClass for EchoClass {
    type State = EchoState;

    fn class_name(&self) -> &'static str {
        "EchoClass"
    }

    fn on_create(&self, _key: &str) -> Result<Self::State, UserHandlerError> {
        Ok(EchoState::default())
    }

    fn dispatch_table(&self) -> &DispatchTable<Self::State> {
        self.input.get_or_init(|| {
            DispatchTableBuilder::new("EchoClass")
                .on::<Word, _>(|state, event| {
                    let word = event.as_any().downcast_ref::<Word>().expect("registered for Word");
                    state.seen.push(word.0.clone());
                    Ok(())
                })
                .build()
        })
    }

    fn output_table(&self) -> &OutputDispatchTable<Self::State> {
        self.output.get_or_init(|| OutputDispatchTable::empty("EchoClass"))
    }
}

fn build_stream(app: &App, name: &str) -> Arc<AtomicUsize> {
    let delivered = Arc::new(AtomicUsize::new(0));
    app.register_stream(Stream::new(
        name,
        Arc::new(|event: &dyn Event| {
            event.as_any().downcast_ref::<Word>().map(|w| w.0.clone()).unwrap_or_default()
        }),
        Arc::new(flux_wire::Fnv1aHasher),
        Arc::new(flux_wire::StaticTopology::single_node(1)),
        None,
        16,
        Backpressure::Block,
        app.stats_handle(),
    ));
    delivered
}

#[tokio::test]
async fn register_prototype_subscribes_it_to_the_named_stream() {
    let app = App::new("words");
    build_stream(&app, "words-in");

    let prototype = app.register_prototype(EchoClass::new(), "words-in").unwrap();

    let stream = app.streams().get("words-in").unwrap();
    stream.put(Arc::new(Word("hello".to_string()))).await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(prototype.registry().get("hello").unwrap().lock().seen, vec!["hello".to_string()]);
}

#[tokio::test]
async fn register_prototype_fails_for_an_unregistered_stream() {
    let app = App::new("words");
    let err = app.register_prototype(EchoClass::new(), "missing").unwrap_err();
    assert!(matches!(err, RuntimeError::StreamClosed(name) if name == "missing"));
}

#[tokio::test]
async fn close_tears_down_instances_and_closes_every_stream() {
    let app = App::new("words");
    build_stream(&app, "words-in");
    let prototype = app.register_prototype(EchoClass::new(), "words-in").unwrap();

    let stream = app.streams().get("words-in").unwrap();
    stream.put(Arc::new(Word("hello".to_string()))).await.unwrap();
    tokio::task::yield_now().await;
    assert_eq!(prototype.instance_count(), 1);

    app.close().await;
    assert_eq!(prototype.instance_count(), 0, "close must evict every PE instance");

    let err = stream.put(Arc::new(Word("late".to_string()))).await;
    assert!(err.is_ok(), "put on a closed stream is a documented no-op, not an error");
}
