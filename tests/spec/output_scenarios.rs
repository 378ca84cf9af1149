// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! End-to-end output-scheduler scenarios (spec.md §8, scenarios 4-5):
//! count-based triggering and asynchronous time-based triggering.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use flux_core::{
    DispatchTable, DispatchTableBuilder, Event, OutputDispatchTable, OutputDispatchTableBuilder,
    OutputPolicy, PeClass, PeOptions, TimerEvent, UserHandlerError,
};
use flux_runtime::App;

use crate::support;

#[derive(Debug)]
struct Tick(String);
impl Event for Tick {}

#[derive(Default)]
struct TallyState;

struct TallyClass {
    options: PeOptions,
    output_runs: Arc<AtomicU32>,
    input: OnceLock<DispatchTable<TallyState>>,
    output: OnceLock<OutputDispatchTable<TallyState>>,
}

impl TallyClass {
    fn new(options: PeOptions, output_runs: Arc<AtomicU32>) -> Self {
        Self { options, output_runs, input: OnceLock::new(), output: OnceLock::new() }
    }
}

impl PeClass for TallyClass {
    type State = TallyState;

    fn class_name(&self) -> &'static str {
        "TallyClass"
    }

    fn options(&self) -> PeOptions {
        self.options
    }

    fn on_create(&self, _key: &str) -> Result<Self::State, UserHandlerError> {
        Ok(TallyState)
    }

    fn dispatch_table(&self) -> &DispatchTable<Self::State> {
        self.input.get_or_init(|| {
            DispatchTableBuilder::new("TallyClass").on::<Tick, _>(|_state, _event| Ok(())).build()
        })
    }

    fn output_table(&self) -> &OutputDispatchTable<Self::State> {
        let runs = Arc::clone(&self.output_runs);
        self.output.get_or_init(move || {
            let runs_for_tick = Arc::clone(&runs);
            OutputDispatchTableBuilder::new("TallyClass")
                .on::<Tick, _>(move |_state, _event, _ctx| {
                    runs_for_tick.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .on::<TimerEvent, _>(move |_state, _event, _ctx| {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        })
    }
}

#[tokio::test]
async fn count_based_output_fires_every_nth_event_on_the_same_key() {
    let runs = Arc::new(AtomicU32::new(0));
    let app = App::new("scenario-4");
    support::register_stream(&app, "ticks", |e| {
        e.as_any().downcast_ref::<Tick>().map(|t| t.0.clone()).unwrap_or_default()
    });
    let options =
        PeOptions::builder().output(OutputPolicy { every_n_events: 3, ..Default::default() }).build();
    let prototype = app.register_prototype(TallyClass::new(options, Arc::clone(&runs)), "ticks").unwrap();

    let stream = app.streams().get("ticks").unwrap();
    for _ in 0..7 {
        stream.put(Arc::new(Tick("same-key".to_string()))).await.unwrap();
    }
    tokio::task::yield_now().await;

    assert_eq!(runs.load(Ordering::SeqCst), 2, "output must fire after events 3 and 6, not 7");
    assert_eq!(prototype.instance_count(), 1);
}

#[tokio::test]
async fn time_based_asynchronous_output_ticks_every_instance_until_close() {
    let runs = Arc::new(AtomicU32::new(0));
    let app = App::new("scenario-5");
    support::register_stream(&app, "ticks", |e| {
        e.as_any().downcast_ref::<Tick>().map(|t| t.0.clone()).unwrap_or_default()
    });
    let options = PeOptions::builder()
        .output(OutputPolicy { interval: Duration::from_millis(50), on_event: false, ..Default::default() })
        .build();
    app.register_prototype(TallyClass::new(options, Arc::clone(&runs)), "ticks").unwrap();

    let stream = app.streams().get("ticks").unwrap();
    for key in ["a", "b", "c", "d"] {
        stream.put(Arc::new(Tick(key.to_string()))).await.unwrap();
    }
    tokio::task::yield_now().await;

    app.start();
    tokio::time::sleep(Duration::from_millis(175)).await;

    let runs_before_close = runs.load(Ordering::SeqCst);
    assert!(
        runs_before_close >= 3 * 4,
        "expected at least 3 ticks across 4 keys, got {runs_before_close}"
    );

    app.close().await;
    let runs_at_close = runs.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(runs.load(Ordering::SeqCst), runs_at_close, "no further output after close returns");
}
