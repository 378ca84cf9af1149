// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Metrics-lite counters for the error-taxonomy entries that are
//! expected to happen in normal operation (spec.md §7: `DispatchMiss`,
//! `QueueOverflow`) rather than tracked only as log lines. Mirrors the
//! teacher's `usage_metrics`/health-snapshot style: plain atomics behind
//! a small snapshot struct, no metrics crate pulled in for this.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Running counters, safe to share across every prototype and stream in
/// one [`crate::app::App`].
#[derive(Debug, Default)]
pub struct Stats {
    dispatch_misses: AtomicU64,
    queue_overflows: AtomicU64,
    user_handler_errors: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch_miss(&self) {
        self.dispatch_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queue_overflow(&self) {
        self.queue_overflows.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_user_handler_error(&self) {
        self.user_handler_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatch_misses: self.dispatch_misses.load(Ordering::Relaxed),
            queue_overflows: self.queue_overflows.load(Ordering::Relaxed),
            user_handler_errors: self.user_handler_errors.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time read of [`Stats`], serializable for a status endpoint
/// or CLI `check-config`-style report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub dispatch_misses: u64,
    pub queue_overflows: u64,
    pub user_handler_errors: u64,
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
