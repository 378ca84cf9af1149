// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! The PE prototype contract (spec.md §4.2, §4.3, §4.6) and the output
//! stage's emit capability.

use std::sync::Arc;

use crate::dispatch::{DispatchTable, OutputDispatchTable};
use crate::errors::UserHandlerError;
use crate::event::Event;
use crate::options::PeOptions;

/// Failure emitting an event onto an output stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamEmitError {
    #[error("no stream named \"{0}\" is configured for this application")]
    UnknownStream(String),
    #[error("output queue for stream \"{0}\" is full")]
    QueueFull(String),
}

/// Capability the output stage uses to publish derived events onto named
/// output streams (spec.md §4.6). Concrete implementations live in
/// `flux-runtime`, backed by the stream fabric; tests can supply a stub.
pub trait StreamEmitter: Send {
    fn emit(&mut self, stream: &str, event: Arc<dyn Event>) -> Result<(), StreamEmitError>;
}

/// Per-instance context handed to the output stage.
///
/// Bundles the instance's own key — output handlers frequently stamp or
/// route derived events on it — with the emitter capability, so a
/// handler can both read its identity and publish without the runtime
/// needing a wider call signature per invocation.
pub struct PeContext<'a> {
    key: &'a str,
    emitter: &'a mut dyn StreamEmitter,
}

impl<'a> PeContext<'a> {
    pub fn new(key: &'a str, emitter: &'a mut dyn StreamEmitter) -> Self {
        Self { key, emitter }
    }

    pub fn key(&self) -> &str {
        self.key
    }

    pub fn emit(&mut self, stream: &str, event: Arc<dyn Event>) -> Result<(), StreamEmitError> {
        self.emitter.emit(stream, event)
    }
}

/// A PE prototype: the immutable, shared definition of a PE class.
///
/// One `PeClass` implementation is shared by every keyed instance of
/// that class; per-key mutable data lives in `State` and is created by
/// [`Self::on_create`] the first time a key is seen (spec.md §4.2, §4.3).
/// Input handlers (registered in [`Self::dispatch_table`]) mutate
/// `State`; output handlers (registered in [`Self::output_table`]) may
/// additionally publish derived events, and run according to this
/// class's [`crate::options::OutputPolicy`] rather than after every
/// input event (spec.md §4.5).
pub trait PeClass: Send + Sync + 'static {
    type State: Send + 'static;

    fn class_name(&self) -> &'static str;

    fn options(&self) -> PeOptions {
        PeOptions::default()
    }

    /// Construct the state for a newly seen key.
    ///
    /// Per spec.md §4.2, a failure here must leave the registry
    /// unchanged: the candidate instance is discarded rather than
    /// inserted, and the error propagates to the caller of the
    /// triggering event delivery.
    fn on_create(&self, key: &str) -> Result<Self::State, UserHandlerError>;

    /// The input dispatch table for this class, built once and reused
    /// for every instance.
    fn dispatch_table(&self) -> &DispatchTable<Self::State>;

    /// The output dispatch table for this class, built once and reused
    /// for every instance. Classes with no output behavior return
    /// [`OutputDispatchTable::empty`].
    fn output_table(&self) -> &OutputDispatchTable<Self::State>;

    /// Run when an instance is reclaimed (spec.md §4.3). Default is a
    /// no-op.
    fn on_remove(&self, _state: &mut Self::State) {}
}

#[cfg(test)]
#[path = "pe_tests.rs"]
mod tests;
