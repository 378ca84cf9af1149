// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Per-PE-class configuration: expiration and output scheduling
//! (spec.md §4.3, §4.5) plus the thread-safety opt-out (§5).

use std::time::Duration;

/// When an idle PE instance is reclaimed.
///
/// spec.md §4.3: instances are garbage the runtime is free to drop once
/// idle, not durable state — `Never` opts a class out of that reclamation
/// for cases (singleton aggregators, etc.) where recreation would be
/// observably wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// Reclaim the instance after no input event touched it for `idle`.
    AfterIdle { idle: Duration },
    /// Never reclaim; the instance lives for the node's lifetime.
    Never,
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        ExpirationPolicy::Never
    }
}

/// When a PE instance's output stage runs (spec.md §4.5).
///
/// The three knobs are independent, not mutually exclusive: a class can
/// configure both `every_n_events` and `interval` at once, and a single
/// input event can trigger the output handler from the count check while
/// an unrelated timer tick also fires it — spec.md §4.5 documents this as
/// "the output handler may run twice" and this type makes no attempt to
/// collapse the two triggers into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPolicy {
    /// Run output inline after every Nth input event the instance
    /// processes. `0` disables the count-based trigger.
    pub every_n_events: u32,
    /// Period of the prototype-owned output timer. [`Duration::ZERO`]
    /// disables the time-based trigger entirely.
    pub interval: Duration,
    /// Only meaningful when `interval` is non-zero:
    /// - `true`: each tick arms a per-instance pending flag, consumed by
    ///   that instance's next input event (event-coupled async output).
    /// - `false`: each tick dispatches a synthetic
    ///   [`crate::event::TimerEvent`] straight through the output table
    ///   for every instance currently registered, with no input handler
    ///   involved.
    pub on_event: bool,
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self { every_n_events: 0, interval: Duration::ZERO, on_event: false }
    }
}

impl OutputPolicy {
    /// Whether the count-based trigger fires immediately after an
    /// instance's `event_count`-th input event.
    pub fn count_due(&self, event_count: u64) -> bool {
        self.every_n_events > 0 && event_count % self.every_n_events as u64 == 0
    }

    /// Whether the time-based trigger is configured at all.
    pub fn timer_enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}

/// Full per-class configuration a [`crate::pe::PeClass`] carries.
#[derive(Debug, Clone, Copy)]
pub struct PeOptions {
    pub expiration: ExpirationPolicy,
    pub output: OutputPolicy,
    /// spec.md §5: when true, the runtime's per-instance serialization
    /// discipline is relaxed and handlers for the same instance may run
    /// concurrently. The PE author is then responsible for any internal
    /// synchronization the state type needs.
    pub thread_safe: bool,
}

impl Default for PeOptions {
    fn default() -> Self {
        Self {
            expiration: ExpirationPolicy::default(),
            output: OutputPolicy::default(),
            thread_safe: false,
        }
    }
}

impl PeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expiration(mut self, expiration: ExpirationPolicy) -> Self {
        self.expiration = expiration;
        self
    }

    pub fn with_output(mut self, output: OutputPolicy) -> Self {
        self.output = output;
        self
    }

    pub fn with_thread_safe(mut self, thread_safe: bool) -> Self {
        self.thread_safe = thread_safe;
        self
    }
}

crate::builder! {
    pub struct PeOptionsBuilder => PeOptions {
        set {
            expiration: ExpirationPolicy = ExpirationPolicy::default(),
            output: OutputPolicy = OutputPolicy::default(),
            thread_safe: bool = false,
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
