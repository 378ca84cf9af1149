// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! End-to-end expiration scenario (spec.md §8, scenario 6): an idle
//! instance is evicted with `onRemove` run exactly once, and a later
//! event for the same key creates a fresh instance.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use flux_core::{
    DispatchTable, DispatchTableBuilder, Event, ExpirationPolicy, OutputDispatchTable, PeClass,
    PeOptions, UserHandlerError,
};
use flux_runtime::App;

use crate::support;

#[derive(Debug)]
struct Touch(String);
impl Event for Touch {}

#[derive(Default)]
struct SessionState;

struct SessionClass {
    on_create_runs: Arc<AtomicU32>,
    on_remove_runs: Arc<AtomicU32>,
    input: OnceLock<DispatchTable<SessionState>>,
    output: OnceLock<OutputDispatchTable<SessionState>>,
}

impl PeClass for SessionClass {
    type State = SessionState;

    fn class_name(&self) -> &'static str {
        "SessionClass"
    }

    fn options(&self) -> PeOptions {
        PeOptions::builder()
            .expiration(ExpirationPolicy::AfterIdle { idle: Duration::from_millis(100) })
            .build()
    }

    fn on_create(&self, _key: &str) -> Result<Self::State, UserHandlerError> {
        self.on_create_runs.fetch_add(1, Ordering::SeqCst);
        Ok(SessionState)
    }

    fn dispatch_table(&self) -> &DispatchTable<Self::State> {
        self.input.get_or_init(|| {
            DispatchTableBuilder::new("SessionClass").on::<Touch, _>(|_s, _e| Ok(())).build()
        })
    }

    fn output_table(&self) -> &OutputDispatchTable<Self::State> {
        self.output.get_or_init(|| OutputDispatchTable::empty("SessionClass"))
    }

    fn on_remove(&self, _state: &mut Self::State) {
        self.on_remove_runs.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn an_idle_instance_expires_exactly_once_and_a_later_event_recreates_it() {
    let on_create_runs = Arc::new(AtomicU32::new(0));
    let on_remove_runs = Arc::new(AtomicU32::new(0));
    let app = App::new("scenario-6");
    support::register_stream(&app, "touches", |e| {
        e.as_any().downcast_ref::<Touch>().map(|t| t.0.clone()).unwrap_or_default()
    });
    let class = SessionClass {
        on_create_runs: Arc::clone(&on_create_runs),
        on_remove_runs: Arc::clone(&on_remove_runs),
        input: OnceLock::new(),
        output: OnceLock::new(),
    };
    let prototype = app.register_prototype(class, "touches").unwrap();
    app.start();

    let stream = app.streams().get("touches").unwrap();
    stream.put(Arc::new(Touch("session-a".to_string()))).await.unwrap();
    tokio::task::yield_now().await;
    assert_eq!(on_create_runs.load(Ordering::SeqCst), 1);
    assert_eq!(prototype.instance_count(), 1);

    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(on_remove_runs.load(Ordering::SeqCst), 1, "idle instance must expire exactly once");
    assert_eq!(prototype.instance_count(), 0);

    stream.put(Arc::new(Touch("session-a".to_string()))).await.unwrap();
    tokio::task::yield_now().await;
    assert_eq!(on_create_runs.load(Ordering::SeqCst), 2, "the same key must get a fresh instance");

    app.close().await;
}
