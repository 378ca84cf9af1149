// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! The per-PE-class dispatch tables (spec.md §3, §4.1, §4.2).
//!
//! Each PE class owns two of these: an input [`DispatchTable`] and an
//! output [`OutputDispatchTable`] (spec.md §3: "Two tables per PE class:
//! one for input handlers, one for output handlers"). Both bind event
//! types to handler closures over a PE's state type `S`; the only
//! difference is that output handlers additionally receive a
//! [`crate::pe::PeContext`] so they can publish derived events onto
//! streams (spec.md §4.4's "output events emitted by user code").
//!
//! Registration order does not matter: at dispatch time an exact
//! [`TypeId`] match always wins, and failing that the table walks the
//! incoming event's own declared [`Event::supertypes`] chain (nearest
//! ancestor first) looking for a handler registered against an ancestor
//! type. This reproduces "most specific match wins" without sorting the
//! table itself — specificity lives in the event's own ancestor
//! declaration, not in table order.
//!
//! A handler registered for type `E` may be invoked with an event whose
//! concrete type is some descendant of `E`, not `E` itself — there is no
//! real Rust value of type `E` to hand it in that case, only a `dyn
//! Event`. Handlers therefore always receive `&dyn Event` and downcast
//! with [`Event::as_any`] if they need the concrete payload; this is the
//! one place the dispatcher's "most specific match" contract costs some
//! ergonomics relative to a handler over a concrete `&E`.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::errors::UserHandlerError;
use crate::event::Event;
use crate::pe::PeContext;

/// Look up the entry matching `event`'s exact type, falling back to its
/// declared ancestor chain nearest-first. Shared by [`DispatchTable`] and
/// [`OutputDispatchTable`] so both tables apply the same "most specific
/// match wins" rule.
fn find_match<'a, V>(entries: &'a HashMap<TypeId, V>, event: &dyn Event) -> Option<&'a V> {
    let exact = event.as_any().type_id();
    if let Some(v) = entries.get(&exact) {
        return Some(v);
    }
    event.supertypes().iter().find_map(|supertype| entries.get(supertype))
}

type HandlerFn<S> = Box<dyn Fn(&mut S, &dyn Event) -> Result<(), UserHandlerError> + Send + Sync>;

struct DispatchEntry<S> {
    type_name: &'static str,
    handler: HandlerFn<S>,
}

/// Raised when no handler in a dispatch table matches an event's exact
/// type or any type in its declared ancestor chain.
#[derive(Debug)]
pub struct DispatchError {
    event_type: &'static str,
    pe_class: &'static str,
}

impl DispatchError {
    fn new(event: &dyn Event, pe_class: &'static str) -> Self {
        Self { event_type: event.type_name(), pe_class }
    }

    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    pub fn pe_class(&self) -> &'static str {
        self.pe_class
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot dispatch event of type [{}] to PE of type [{}] : no matching handler",
            self.event_type, self.pe_class
        )
    }
}

impl std::error::Error for DispatchError {}

/// Builds an immutable [`DispatchTable`] for a PE state type `S`.
///
/// Handlers are registered one event type at a time with [`Self::on`].
/// Registering the same type twice replaces the earlier handler — the
/// last registration for a given type wins.
pub struct DispatchTableBuilder<S> {
    pe_class: &'static str,
    entries: HashMap<TypeId, DispatchEntry<S>>,
}

impl<S> DispatchTableBuilder<S> {
    pub fn new(pe_class: &'static str) -> Self {
        Self { pe_class, entries: HashMap::new() }
    }

    /// Register a handler for event type `E`.
    ///
    /// The handler is invoked when an incoming event's exact type is `E`,
    /// or when `E` appears in the incoming event's declared ancestor
    /// chain and no handler is registered for a nearer ancestor. In
    /// either case the handler only ever sees `&dyn Event` — downcast
    /// with [`Event::as_any`] when `E`'s own fields are needed, which is
    /// only sound on the exact-match path.
    pub fn on<E, F>(mut self, handler: F) -> Self
    where
        E: Event + 'static,
        F: Fn(&mut S, &dyn Event) -> Result<(), UserHandlerError> + Send + Sync + 'static,
    {
        let entry = DispatchEntry {
            type_name: std::any::type_name::<E>(),
            handler: Box::new(handler),
        };
        self.entries.insert(TypeId::of::<E>(), entry);
        self
    }

    pub fn build(self) -> DispatchTable<S> {
        DispatchTable { pe_class: self.pe_class, entries: self.entries }
    }
}

/// Immutable, thread-safe event-type-to-handler binding for one PE
/// class's input handlers.
pub struct DispatchTable<S> {
    pe_class: &'static str,
    entries: HashMap<TypeId, DispatchEntry<S>>,
}

impl<S> DispatchTable<S> {
    /// Dispatch `event` against `state`, trying the event's exact type
    /// first and then each declared ancestor in order.
    ///
    /// A handler returning [`UserHandlerError`] is logged and the event
    /// is still considered processed — per spec.md §7 a handler failure
    /// never surfaces as a dispatch miss. Returns `Ok(false)` in that
    /// case (instead of `Ok(true)`) so a caller tracking
    /// `UserHandlerError` counts separately from dispatch misses can
    /// tell the two "no error propagated" outcomes apart.
    pub fn dispatch(&self, state: &mut S, event: &dyn Event) -> Result<bool, DispatchError> {
        match find_match(&self.entries, event) {
            Some(entry) => match (entry.handler)(state, event) {
                Ok(()) => Ok(true),
                Err(err) => {
                    tracing::warn!(
                        pe_class = self.pe_class,
                        handler_type = entry.type_name,
                        event_type = event.type_name(),
                        error = %err,
                        "user handler returned an error"
                    );
                    Ok(false)
                }
            },
            None => Err(DispatchError::new(event, self.pe_class)),
        }
    }
}

type OutputHandlerFn<S> =
    Box<dyn Fn(&mut S, &dyn Event, &mut PeContext<'_>) -> Result<(), UserHandlerError> + Send + Sync>;

struct OutputDispatchEntry<S> {
    type_name: &'static str,
    handler: OutputHandlerFn<S>,
}

/// Builds an immutable [`OutputDispatchTable`] for a PE state type `S`.
///
/// Mirrors [`DispatchTableBuilder`], with handlers additionally given a
/// [`PeContext`] so they can emit derived events onto streams.
pub struct OutputDispatchTableBuilder<S> {
    pe_class: &'static str,
    entries: HashMap<TypeId, OutputDispatchEntry<S>>,
}

impl<S> OutputDispatchTableBuilder<S> {
    pub fn new(pe_class: &'static str) -> Self {
        Self { pe_class, entries: HashMap::new() }
    }

    pub fn on<E, F>(mut self, handler: F) -> Self
    where
        E: Event + 'static,
        F: Fn(&mut S, &dyn Event, &mut PeContext<'_>) -> Result<(), UserHandlerError>
            + Send
            + Sync
            + 'static,
    {
        let entry = OutputDispatchEntry {
            type_name: std::any::type_name::<E>(),
            handler: Box::new(handler),
        };
        self.entries.insert(TypeId::of::<E>(), entry);
        self
    }

    pub fn build(self) -> OutputDispatchTable<S> {
        OutputDispatchTable { pe_class: self.pe_class, entries: self.entries }
    }
}

/// Immutable, thread-safe event-type-to-handler binding for one PE
/// class's output handlers (spec.md §4.5).
///
/// The runtime consults this table with the same event that drove the
/// delivery — the just-processed input event for count-based and
/// event-coupled time-based triggers, or a synthetic
/// [`crate::event::TimerEvent`] for the asynchronous time-based trigger
/// (spec.md §4.4 step 5, §4.5).
pub struct OutputDispatchTable<S> {
    pe_class: &'static str,
    entries: HashMap<TypeId, OutputDispatchEntry<S>>,
}

impl<S> OutputDispatchTable<S> {
    /// A PE class with no output handlers at all — output triggers never
    /// produce a dispatch miss for it, they're simply no-ops.
    pub fn empty(pe_class: &'static str) -> Self {
        Self { pe_class, entries: HashMap::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dispatch(
        &self,
        state: &mut S,
        event: &dyn Event,
        ctx: &mut PeContext<'_>,
    ) -> Result<bool, DispatchError> {
        match find_match(&self.entries, event) {
            Some(entry) => match (entry.handler)(state, event, ctx) {
                Ok(()) => Ok(true),
                Err(err) => {
                    tracing::warn!(
                        pe_class = self.pe_class,
                        handler_type = entry.type_name,
                        event_type = event.type_name(),
                        error = %err,
                        "user output handler returned an error"
                    );
                    Ok(false)
                }
            },
            None => Err(DispatchError::new(event, self.pe_class)),
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
