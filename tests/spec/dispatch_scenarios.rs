// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! End-to-end dispatch scenarios (spec.md §8, scenarios 1-3): exact-type
//! match, most-specific-supertype match, and no matching handler.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use flux_core::{
    DispatchTable, DispatchTableBuilder, Event, OutputDispatchTable, PeClass, PeOptions,
    UserHandlerError,
};
use flux_runtime::App;

use crate::support;

#[derive(Debug)]
struct Event1;
impl Event for Event1 {}

#[derive(Debug)]
struct Event2;
impl Event for Event2 {}

#[derive(Debug)]
struct Event1a;
flux_core::event_supertypes!(Event1a => [Event1]);

#[derive(Default)]
struct Counts {
    h1: AtomicU32,
    h2: AtomicU32,
}

#[derive(Default)]
struct RecordingState;

struct RecordingClass {
    counts: Arc<Counts>,
    input: OnceLock<DispatchTable<RecordingState>>,
    output: OnceLock<OutputDispatchTable<RecordingState>>,
}

impl RecordingClass {
    fn new(counts: Arc<Counts>) -> Self {
        Self { counts, input: OnceLock::new(), output: OnceLock::new() }
    }
}

impl PeClass for RecordingClass {
    type State = RecordingState;

    fn class_name(&self) -> &'static str {
        "RecordingClass"
    }

    fn options(&self) -> PeOptions {
        PeOptions::default()
    }

    fn on_create(&self, _key: &str) -> Result<Self::State, UserHandlerError> {
        Ok(RecordingState)
    }

    fn dispatch_table(&self) -> &DispatchTable<Self::State> {
        let counts = Arc::clone(&self.counts);
        self.input.get_or_init(move || {
            let h1_counts = Arc::clone(&counts);
            let h2_counts = Arc::clone(&counts);
            DispatchTableBuilder::new("RecordingClass")
                .on::<Event1, _>(move |_state, _event| {
                    h1_counts.h1.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .on::<Event2, _>(move |_state, _event| {
                    h2_counts.h2.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        })
    }

    fn output_table(&self) -> &OutputDispatchTable<Self::State> {
        self.output.get_or_init(|| OutputDispatchTable::empty("RecordingClass"))
    }
}

#[tokio::test]
async fn exact_match_dispatch_invokes_only_the_handler_for_the_events_own_type() {
    let counts = Arc::new(Counts::default());
    let app = App::new("scenario-1");
    support::register_stream(&app, "in", |_e| "k".to_string());
    let prototype = app.register_prototype(RecordingClass::new(Arc::clone(&counts)), "in").unwrap();

    app.streams().get("in").unwrap().put(Arc::new(Event1)).await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(prototype.instance_count(), 1);
    assert_eq!(counts.h1.load(Ordering::SeqCst), 1);
    assert_eq!(counts.h2.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn subtype_dispatch_picks_the_most_specific_ancestor_with_a_handler() {
    let counts = Arc::new(Counts::default());
    let app = App::new("scenario-2");
    support::register_stream(&app, "in", |_e| "k".to_string());
    app.register_prototype(RecordingClass::new(Arc::clone(&counts)), "in").unwrap();

    app.streams().get("in").unwrap().put(Arc::new(Event1a)).await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(counts.h1.load(Ordering::SeqCst), 1, "Event1a should match the Event1 handler");
    assert_eq!(counts.h2.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_matching_handler_drops_the_event_and_records_a_dispatch_miss() {
    #[derive(Default)]
    struct OnlyH1State;

    struct OnlyH1Class {
        input: OnceLock<DispatchTable<OnlyH1State>>,
        output: OnceLock<OutputDispatchTable<OnlyH1State>>,
    }
    impl PeClass for OnlyH1Class {
        type State = OnlyH1State;
        fn class_name(&self) -> &'static str {
            "OnlyH1Class"
        }
        fn options(&self) -> PeOptions {
            PeOptions::default()
        }
        fn on_create(&self, _key: &str) -> Result<Self::State, UserHandlerError> {
            Ok(OnlyH1State)
        }
        fn dispatch_table(&self) -> &DispatchTable<Self::State> {
            self.input.get_or_init(|| {
                DispatchTableBuilder::new("OnlyH1Class").on::<Event1, _>(|_s, _e| Ok(())).build()
            })
        }
        fn output_table(&self) -> &OutputDispatchTable<Self::State> {
            self.output.get_or_init(|| OutputDispatchTable::empty("OnlyH1Class"))
        }
    }

    let app = App::new("scenario-3");
    support::register_stream(&app, "in", |_e| "k".to_string());
    let class = OnlyH1Class { input: OnceLock::new(), output: OnceLock::new() };
    app.register_prototype(class, "in").unwrap();

    app.streams().get("in").unwrap().put(Arc::new(Event2)).await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(app.stats().dispatch_misses, 1, "an unmatched event must register exactly one dispatch miss");
}
