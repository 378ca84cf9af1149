// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! `App`: the container a node loads one instance of per application
//! (spec.md §4.7 "App"). Owns the app's stream table, its PE prototypes,
//! and the background receiver task that feeds inbound events from the
//! comm layer onto local streams.
//!
//! `App` itself knows nothing about any concrete PE class — prototypes
//! are registered as `Arc<dyn PrototypeLifecycle>` so one app can mix
//! classes with unrelated `PeClass::State` types in a single container,
//! the way spec.md §4.7 describes an app as "a named bundle of PE
//! classes and the streams wiring them together," not a single
//! monomorphic pipeline.

use std::sync::Arc;

use flux_core::{Clock, PeClass};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::errors::RuntimeError;
use crate::prototype::{Prototype, PrototypeLifecycle};
use crate::stats::{Stats, StatsSnapshot};
use crate::stream::{Stream, StreamRegistry};
use crate::transport::Receiver;

/// A named bundle of streams and PE prototypes (spec.md §4.7).
pub struct App {
    name: String,
    streams: Arc<StreamRegistry>,
    prototypes: RwLock<Vec<Arc<dyn PrototypeLifecycle>>>,
    receiver: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<Stats>,
}

impl App {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_streams(name, StreamRegistry::new())
    }

    /// As [`Self::new`], but sharing an already-built [`StreamRegistry`]
    /// rather than allocating a fresh one.
    ///
    /// `flux-node` uses this to give every app loaded on one node the
    /// same stream namespace (spec.md §4.6: "Streams have stable names
    /// used to wire cross-app dependencies") so one app's exported
    /// stream is reachable by name from another app's subscription,
    /// without either app needing a reference to the other.
    pub fn with_streams(name: impl Into<String>, streams: Arc<StreamRegistry>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            streams,
            prototypes: RwLock::new(Vec::new()),
            receiver: Mutex::new(None),
            stats: Arc::new(Stats::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn streams(&self) -> &Arc<StreamRegistry> {
        &self.streams
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Counters shared with every stream and prototype this app owns;
    /// `flux-node` hands this `Arc` to a status endpoint or CLI report.
    pub fn stats_handle(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    pub fn register_stream(&self, stream: Arc<Stream>) {
        self.streams.register(stream);
    }

    /// Build and register the prototype for `class`, wiring it as a
    /// subscriber of `input_stream` (spec.md §4.4 "events arrive on a
    /// stream and are delivered to every PE prototype subscribed to
    /// it").
    pub fn register_prototype<C: PeClass>(
        &self,
        class: C,
        input_stream: &str,
    ) -> Result<Arc<Prototype<C>>, RuntimeError> {
        let prototype =
            Prototype::new(class, Arc::downgrade(&self.streams), Arc::clone(&self.stats));
        self.attach_prototype(Arc::clone(&prototype), input_stream)?;
        Ok(prototype)
    }

    /// As [`Self::register_prototype`], but for a prototype already
    /// built with a non-default clock — the path tests use to drive a
    /// PE's expiration and output timing with
    /// [`flux_core::FakeClock`].
    pub fn attach_prototype<C: PeClass, Clk: Clock + 'static>(
        &self,
        prototype: Arc<Prototype<C, Clk>>,
        input_stream: &str,
    ) -> Result<(), RuntimeError> {
        let stream = self
            .streams
            .get(input_stream)
            .ok_or_else(|| RuntimeError::StreamClosed(input_stream.to_string()))?;
        stream.add_subscriber(Arc::clone(&prototype) as Arc<dyn crate::stream::Subscriber>);
        self.prototypes.write().push(prototype as Arc<dyn PrototypeLifecycle>);
        Ok(())
    }

    /// Spawn `receiver`'s run loop, tracked so [`Self::close`] can abort
    /// it during teardown.
    pub fn spawn_receiver(&self, receiver: Arc<Receiver>) {
        let handle = tokio::spawn(async move { receiver.run().await });
        *self.receiver.lock() = Some(handle);
    }

    /// Start every registered prototype's background timers (spec.md
    /// §4.5). Call once, after every stream and prototype this app needs
    /// has been registered.
    pub fn start(&self) {
        for prototype in self.prototypes.read().iter() {
            tracing::info!(app = self.name, pe_class = prototype.class_name(), "starting PE prototype");
            Arc::clone(prototype).start();
        }
    }

    /// Tear the app down: cancel the receiver task, evict every PE
    /// instance (invoking `onRemove` on each), and close every stream
    /// (spec.md §4.2 "Teardown").
    pub async fn close(&self) {
        if let Some(handle) = self.receiver.lock().take() {
            handle.abort();
        }
        for prototype in self.prototypes.read().iter() {
            prototype.remove_all();
        }
        for name in self.streams.names() {
            if let Some(stream) = self.streams.get(&name) {
                stream.close().await;
            }
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
