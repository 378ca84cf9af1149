// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! The stream fabric (spec.md §2 "Stream", §4.6): a named routed queue
//! from a producer (an external `App`-level `put`, or a PE's own output
//! handler) to the PE prototypes subscribed to it.
//!
//! One background task per [`Stream`] owns the routing decision: it pops
//! `(key, event)` pairs off a bounded channel in arrival order and, for
//! each, hashes the key to a partition and either fans the event out to
//! every local subscriber or hands it to the configured [`crate::Sender`]
//! for the owning node. Resolving locality at dequeue time rather than
//! enqueue time is a deliberate simplification over spec.md §4.6's literal
//! wording — dynamic rebalancing is an explicit non-goal, so the
//! topology answer can't usefully change between one queue slot and the
//! next, and this keeps `put`/`emit` themselves free of any `Sender`
//! dependency.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use flux_core::Event;
use flux_core::pe::{StreamEmitError, StreamEmitter};
use flux_wire::{Hasher, Topology};

use crate::errors::RuntimeError;
use crate::stats::Stats;
use crate::transport::Sender;

/// A function extracting a routing key from an event (spec.md §2 "key
/// extractor").
pub type KeyExtractor = Arc<dyn Fn(&dyn Event) -> String + Send + Sync>;

/// Receives `(key, event)` pairs once a [`Stream`] has routed them to a
/// local PE prototype (spec.md §4.4 step 1: "locate or create the
/// instance").
///
/// Implemented by [`crate::Prototype`]; a `Stream` holds its subscribers
/// as `Arc<dyn Subscriber>` because one stream can feed several
/// differently-typed PE classes at once.
pub trait Subscriber: Send + Sync {
    fn deliver(&self, key: String, event: Arc<dyn Event>);
}

/// What happens when a stream's bounded queue is full (spec.md §7
/// `QueueOverflow`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backpressure {
    /// The default per spec.md §5: the producer blocks until space frees
    /// up or the stream closes.
    Block,
    /// Drop the event, log a warning, and increment the overflow counter
    /// — the mode spec.md §4.4 describes PE-emitted output as using
    /// ("put is non-blocking from the handler's point of view").
    DropWithWarning,
}

struct QueueItem {
    key: String,
    event: Arc<dyn Event>,
}

/// A named routing channel (spec.md §2 "Stream", §4.6).
pub struct Stream {
    name: String,
    key_extractor: KeyExtractor,
    hasher: Arc<dyn Hasher>,
    topology: Arc<dyn Topology>,
    sender: Option<Arc<Sender>>,
    subscribers: RwLock<Vec<Arc<dyn Subscriber>>>,
    tx: RwLock<Option<mpsc::Sender<QueueItem>>>,
    worker: parking_lot::Mutex<Option<JoinHandle<()>>>,
    backpressure: Backpressure,
    stats: Arc<Stats>,
}

impl Stream {
    /// Build a stream and spawn its routing worker. `sender` is `None`
    /// for a stream that never forwards to a remote node (e.g. a
    /// single-node deployment where every partition is always local).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        key_extractor: KeyExtractor,
        hasher: Arc<dyn Hasher>,
        topology: Arc<dyn Topology>,
        sender: Option<Arc<Sender>>,
        queue_capacity: usize,
        backpressure: Backpressure,
        stats: Arc<Stats>,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let stream = Arc::new(Self {
            name: name.into(),
            key_extractor,
            hasher,
            topology,
            sender,
            subscribers: RwLock::new(Vec::new()),
            tx: RwLock::new(Some(tx)),
            worker: parking_lot::Mutex::new(None),
            backpressure,
            stats,
        });
        let worker_stream = Arc::clone(&stream);
        let handle = tokio::spawn(async move { worker_stream.run(rx).await });
        *stream.worker.lock() = Some(handle);
        stream
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_subscriber(&self, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.write().push(subscriber);
    }

    fn partition_for(&self, key: &str) -> u32 {
        let count = self.topology.partition_count().max(1) as u64;
        (self.hasher.hash(key) % count) as u32
    }

    async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<QueueItem>) {
        while let Some(item) = rx.recv().await {
            let partition = self.partition_for(&item.key);
            if self.topology.is_local(partition) {
                for subscriber in self.subscribers.read().iter() {
                    subscriber.deliver(item.key.clone(), Arc::clone(&item.event));
                }
            } else if let Some(sender) = &self.sender {
                if let Err(err) = sender.send(&self.name, partition, Arc::clone(&item.event)).await
                {
                    tracing::warn!(
                        stream = self.name,
                        partition,
                        error = %err,
                        "failed to forward event to remote partition owner"
                    );
                }
            } else {
                tracing::warn!(
                    stream = self.name,
                    partition,
                    "event routed to a non-local partition but no sender is configured; dropping"
                );
            }
        }
    }

    /// Blocking (from the producer's point of view, per its configured
    /// [`Backpressure`]) enqueue — the path for `App`-level and external
    /// producers (spec.md §4.6 `put`).
    pub async fn put(&self, event: Arc<dyn Event>) -> Result<(), RuntimeError> {
        let key = (self.key_extractor)(event.as_ref());
        let item = QueueItem { key, event };
        let guard = self.tx.read();
        let Some(tx) = guard.as_ref() else {
            tracing::warn!(stream = self.name, "put on a closed stream is a no-op");
            return Ok(());
        };
        match self.backpressure {
            Backpressure::Block => {
                tx.send(item).await.map_err(|_| RuntimeError::StreamClosed(self.name.clone()))
            }
            Backpressure::DropWithWarning => match tx.try_send(item) {
                Ok(()) => Ok(()),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.stats.record_queue_overflow();
                    tracing::warn!(stream = self.name, "queue full, dropping event");
                    Ok(())
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    Err(RuntimeError::StreamClosed(self.name.clone()))
                }
            },
        }
    }

    /// Non-blocking enqueue used when a PE's output handler emits a
    /// derived event (spec.md §4.4: "put is non-blocking from the
    /// handler's point of view in the common case").
    pub fn emit_from_handler(&self, event: Arc<dyn Event>) -> Result<(), StreamEmitError> {
        let key = (self.key_extractor)(event.as_ref());
        let item = QueueItem { key, event };
        let guard = self.tx.read();
        let Some(tx) = guard.as_ref() else {
            return Err(StreamEmitError::UnknownStream(self.name.clone()));
        };
        match tx.try_send(item) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.record_queue_overflow();
                Err(StreamEmitError::QueueFull(self.name.clone()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(StreamEmitError::UnknownStream(self.name.clone()))
            }
        }
    }

    /// Drain and shut down the queue (spec.md §4.6 `close`). Idempotent:
    /// a second call observes `tx` already taken and returns immediately.
    pub async fn close(&self) {
        let handle = {
            let mut guard = self.tx.write();
            if guard.take().is_none() {
                return;
            }
            self.worker.lock().take()
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

/// Emits an event onto a named stream, looking the stream up by name
/// each call — the seam [`crate::Prototype`] hands to a PE's output
/// handlers as a [`StreamEmitter`] (spec.md §4.4, §4.6).
pub struct HandlerEmitter<'a> {
    streams: &'a StreamRegistry,
}

impl<'a> HandlerEmitter<'a> {
    pub fn new(streams: &'a StreamRegistry) -> Self {
        Self { streams }
    }
}

impl StreamEmitter for HandlerEmitter<'_> {
    fn emit(&mut self, stream: &str, event: Arc<dyn Event>) -> Result<(), StreamEmitError> {
        match self.streams.get(stream) {
            Some(s) => s.emit_from_handler(event),
            None => Err(StreamEmitError::UnknownStream(stream.to_string())),
        }
    }
}

/// The `name -> Stream` table one [`crate::App`] owns (spec.md §4.7:
/// "exposes `eventSources`... and `streams`... for inter-app wiring").
#[derive(Default)]
pub struct StreamRegistry {
    streams: RwLock<HashMap<String, Arc<Stream>>>,
}

impl StreamRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, stream: Arc<Stream>) {
        self.streams.write().insert(stream.name().to_string(), stream);
    }

    pub fn get(&self, name: &str) -> Option<Arc<Stream>> {
        self.streams.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.streams.read().keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
