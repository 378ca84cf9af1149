// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! The PE prototype's runtime half: per-key delivery with serialization
//! (spec.md §4.4), the output-triggering engine (spec.md §4.5), and
//! expiration (spec.md §4.2). `flux_core::PeClass` + `flux_core::Registry`
//! supply the data model; this module is the driver that actually calls
//! `get_or_create`, holds the per-instance lock for one dispatch-and-
//! output block, and owns the prototype-scoped background timers.

use std::sync::{Arc, Weak};
use std::time::Duration;

use flux_core::{Clock, Event, PeClass, PeContext, PeOptions, Registry, SystemClock};
use flux_core::options::ExpirationPolicy;

use crate::errors::RuntimeError;
use crate::scheduler;
use crate::stats::Stats;
use crate::stream::{HandlerEmitter, StreamRegistry, Subscriber};

/// The minimum interval between expiration sweeps, regardless of how
/// short an `expireAfterAccess` is configured — spec.md §9 documents
/// eviction timing as best-effort, not exact, so there is no need to
/// sweep faster than this just to shave a few milliseconds off the
/// worst case.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(25);

/// The live runtime counterpart of one [`PeClass`]: owns the instance
/// registry, the cached [`PeOptions`], and the prototype-scoped output
/// timer / expiration sweeper (spec.md §3 "PE Prototype").
///
/// Generic over the clock so tests can drive expiration and output
/// timing with [`flux_core::FakeClock`] instead of real sleeps; a
/// running node always uses the default [`SystemClock`].
pub struct Prototype<C: PeClass, Clk: Clock = SystemClock> {
    class: C,
    registry: Registry<C::State>,
    options: PeOptions,
    clock: Clk,
    streams: Weak<StreamRegistry>,
    stats: Arc<Stats>,
    output_timer: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
    sweep_timer: parking_lot::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl<C: PeClass> Prototype<C, SystemClock> {
    pub fn new(class: C, streams: Weak<StreamRegistry>, stats: Arc<Stats>) -> Arc<Self> {
        Self::with_clock(class, SystemClock, streams, stats)
    }
}

impl<C: PeClass, Clk: Clock> Prototype<C, Clk> {
    pub fn with_clock(
        class: C,
        clock: Clk,
        streams: Weak<StreamRegistry>,
        stats: Arc<Stats>,
    ) -> Arc<Self> {
        let options = class.options();
        Arc::new(Self {
            class,
            registry: Registry::new(),
            options,
            clock,
            streams,
            stats,
            output_timer: parking_lot::Mutex::new(None),
            sweep_timer: parking_lot::Mutex::new(None),
        })
    }

    pub fn class(&self) -> &C {
        &self.class
    }

    pub fn registry(&self) -> &Registry<C::State> {
        &self.registry
    }

    pub fn instance_count(&self) -> usize {
        self.registry.len()
    }

    /// The delivery path (spec.md §4.4): locate-or-create the instance
    /// for `key`, acquire its serialization lock, run the input handler,
    /// then trigger output once per due policy — the count-based and
    /// event-coupled time-based triggers are independent, so both firing
    /// on the same event runs the output handler twice (spec.md §4.5).
    pub fn handle(&self, key: &str, event: &dyn Event) -> Result<(), RuntimeError> {
        let now = self.clock.epoch_ms();
        let (instance, created) =
            self.registry.get_or_create(key, now, |k| self.class.on_create(k))?;
        if created {
            tracing::debug!(pe_class = self.class.class_name(), key, "created new PE instance");
        }

        let mut state = instance.lock();
        let count = instance.increment_event_count();

        match self.class.dispatch_table().dispatch(&mut state, event) {
            Ok(true) => {}
            Ok(false) => self.stats.record_user_handler_error(),
            Err(err) => {
                self.stats.record_dispatch_miss();
                tracing::error!("{err}");
            }
        }

        let count_due = self.options.output.count_due(count);
        let timer_due = self.options.output.on_event && instance.take_pending_timed_output();

        // Independent triggers (spec.md §4.5): both can signal on the same
        // input event, and the output handler then runs twice — not an
        // `||` collapse into a single dispatch.
        if !self.class.output_table().is_empty() {
            if count_due {
                self.dispatch_output(key, event, &mut state);
            }
            if timer_due {
                self.dispatch_output(key, event, &mut state);
            }
        }

        Ok(())
    }

    fn dispatch_output(&self, key: &str, event: &dyn Event, state: &mut C::State) {
        let Some(streams) = self.streams.upgrade() else {
            return;
        };
        let mut emitter = HandlerEmitter::new(&streams);
        let mut ctx = PeContext::new(key, &mut emitter);
        match self.class.output_table().dispatch(state, event, &mut ctx) {
            Ok(true) => {}
            Ok(false) => self.stats.record_user_handler_error(),
            Err(err) => {
                self.stats.record_dispatch_miss();
                tracing::error!("{err}");
            }
        }
    }

    /// Asynchronous time-based output (spec.md §4.5, `outputOnEvent =
    /// false`): dispatch a synthetic [`flux_core::TimerEvent`] through
    /// the output table for every instance currently registered,
    /// bypassing the input handler entirely.
    fn tick_async_output(&self) {
        if self.class.output_table().is_empty() {
            return;
        }
        for key in self.registry.keys() {
            let Some(instance) = self.registry.get(&key) else { continue };
            // Thread-safe classes don't get a stronger guarantee here than
            // a busy tick being skipped — see DESIGN.md's note on the
            // thread-safe opt-out.
            let Some(mut state) = instance.try_lock() else { continue };
            self.dispatch_output(&key, &flux_core::TimerEvent, &mut state);
        }
    }

    /// Event-coupled time-based output (spec.md §4.5, `outputOnEvent =
    /// true`): arm every instance's pending flag; each instance consumes
    /// it on its own next input event.
    fn tick_pending_flags(&self) {
        for key in self.registry.keys() {
            if let Some(instance) = self.registry.get(&key) {
                instance.set_pending_timed_output();
            }
        }
    }

    /// Evict instances idle for at least the configured
    /// `expireAfterAccess`, invoking `onRemove` on each (spec.md §4.2
    /// "Expiration").
    fn sweep_expired(&self) {
        if let ExpirationPolicy::AfterIdle { idle } = self.options.expiration {
            let now = self.clock.epoch_ms();
            let idle_ms = idle.as_millis() as u64;
            for (key, instance) in self.registry.sweep_expired(now, idle_ms) {
                let mut state = instance.lock();
                self.class.on_remove(&mut state);
                tracing::debug!(pe_class = self.class.class_name(), key, "expired PE instance");
            }
        }
    }
}

impl<C: PeClass, Clk: Clock> Subscriber for Prototype<C, Clk> {
    fn deliver(&self, key: String, event: Arc<dyn Event>) {
        if let Err(err) = self.handle(&key, event.as_ref()) {
            tracing::error!(
                pe_class = self.class.class_name(),
                key,
                error = %err,
                "failed to deliver event to PE instance"
            );
        }
    }
}

/// The subset of [`Prototype`]'s lifecycle `flux_runtime::App` drives
/// without needing to know the concrete PE class or clock type.
pub trait PrototypeLifecycle: Send + Sync {
    /// Start the prototype-owned background timers (output scheduler,
    /// expiration sweeper) if this class's options configure any.
    fn start(self: Arc<Self>);

    /// Tear down every instance, invoking `onRemove` on each, and cancel
    /// this prototype's timers (spec.md §4.2 "Teardown").
    fn remove_all(&self);

    fn class_name(&self) -> &'static str;
}

impl<C: PeClass, Clk: Clock + 'static> PrototypeLifecycle for Prototype<C, Clk> {
    fn start(self: Arc<Self>) {
        if self.options.output.timer_enabled() {
            let proto = Arc::clone(&self);
            let on_event = self.options.output.on_event;
            let handle = scheduler::spawn_ticker(self.options.output.interval, move || {
                let proto = Arc::clone(&proto);
                async move {
                    if on_event {
                        proto.tick_pending_flags();
                    } else {
                        proto.tick_async_output();
                    }
                }
            });
            *self.output_timer.lock() = Some(handle);
        }

        if let ExpirationPolicy::AfterIdle { idle } = self.options.expiration {
            let proto = Arc::clone(&self);
            let sweep_interval = (idle / 4).max(MIN_SWEEP_INTERVAL);
            let handle = scheduler::spawn_ticker(sweep_interval, move || {
                let proto = Arc::clone(&proto);
                async move { proto.sweep_expired() }
            });
            *self.sweep_timer.lock() = Some(handle);
        }
    }

    fn remove_all(&self) {
        if let Some(handle) = self.output_timer.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.sweep_timer.lock().take() {
            handle.abort();
        }
        for (key, instance) in self.registry.drain_all() {
            let mut state = instance.lock();
            self.class.on_remove(&mut state);
            tracing::debug!(pe_class = self.class.class_name(), key, "removed PE instance");
        }
    }

    fn class_name(&self) -> &'static str {
        self.class.class_name()
    }
}

#[cfg(test)]
#[path = "prototype_tests.rs"]
mod tests;
