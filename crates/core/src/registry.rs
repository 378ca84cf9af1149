// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! The PE instance registry (spec.md §3, §4.2): the concurrent `key ->
//! instance` map a prototype owns, with lazy creation, access-based
//! expiration, and one-shot teardown.
//!
//! Per-instance mutual exclusion lives on [`Instance`] itself as a
//! [`parking_lot::Mutex`] over the PE's state — the "per-instance lock"
//! option spec.md §5 and §9 call out as the simpler of the two
//! documented serialization strategies (the alternative, a single-
//! consumer mailbox, is `flux-runtime`'s to choose if a PE class opts
//! into it; the registry itself is agnostic).
//!
//! [`Registry::get_or_create`] holds the registry-wide lock for the
//! duration of a cache miss, including the user's `on_create` call. This
//! is a stronger guarantee than spec.md's literal "optimistic insert,
//! discard the loser" race — it costs a moment of cross-key contention
//! on a miss, but makes "onCreate runs at most once per key" structural
//! rather than best-effort, and `on_create` is expected to be cheap
//! (spec.md §4.2 treats it as infallible except for user error, not as a
//! blocking operation).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::errors::RegistryError;
use crate::errors::UserHandlerError;

/// A live per-key copy of a prototype (spec.md §3 "PE Instance").
pub struct Instance<S> {
    key: String,
    state: Mutex<S>,
    event_count: AtomicU64,
    pending_timed_output: AtomicBool,
    last_access_ms: AtomicU64,
}

impl<S> Instance<S> {
    fn new(key: &str, state: S, now_ms: u64) -> Self {
        Self {
            key: key.to_string(),
            state: Mutex::new(state),
            event_count: AtomicU64::new(0),
            pending_timed_output: AtomicBool::new(false),
            last_access_ms: AtomicU64::new(now_ms),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Acquire the per-instance serialization lock. Held for the
    /// duration of one dispatch-and-output block (spec.md §4.4).
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock()
    }

    /// Non-blocking lock attempt. Used by the output scheduler for
    /// thread-safe classes (spec.md §5's thread-safe opt-out): a busy
    /// instance simply has its tick skipped rather than stalling the
    /// scheduler on a contended lock.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, S>> {
        self.state.try_lock()
    }

    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::Acquire)
    }

    /// Increment the instance's event counter; spec.md §3 requires this
    /// happen exactly once per delivered input event.
    pub fn increment_event_count(&self) -> u64 {
        self.event_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Arm the pending-timed-output flag (spec.md §4.5,
    /// `outputOnEvent = true`): set by a timer tick, consumed by the
    /// instance's next input event.
    pub fn set_pending_timed_output(&self) {
        self.pending_timed_output.store(true, Ordering::Release);
    }

    /// Consume the pending-timed-output flag, returning whether it was
    /// armed.
    pub fn take_pending_timed_output(&self) -> bool {
        self.pending_timed_output.swap(false, Ordering::AcqRel)
    }

    pub fn last_access_ms(&self) -> u64 {
        self.last_access_ms.load(Ordering::Acquire)
    }

    pub fn touch(&self, now_ms: u64) {
        self.last_access_ms.store(now_ms, Ordering::Release);
    }
}

/// The concurrent `key -> instance` map owned by one PE prototype.
///
/// Generic over the PE's state type `S`; holds no reference to the
/// owning [`crate::pe::PeClass`], so lifecycle hooks (`on_create`,
/// `on_remove`) are the caller's responsibility to invoke around the
/// registry operations that create or evict entries.
pub struct Registry<S> {
    entries: RwLock<HashMap<String, Arc<Instance<S>>>>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<Arc<Instance<S>>> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Look up an existing instance for `key`, or construct and insert
    /// one via `ctor` (spec.md §4.2 steps 1-5).
    ///
    /// Returns `(instance, created)`. `ctor` only runs when no entry for
    /// `key` exists; on failure the registry is left unchanged and the
    /// error is returned to the caller (`RegistryError::CreateFailed`).
    pub fn get_or_create(
        &self,
        key: &str,
        now_ms: u64,
        ctor: impl FnOnce(&str) -> Result<S, UserHandlerError>,
    ) -> Result<(Arc<Instance<S>>, bool), RegistryError> {
        if let Some(existing) = self.entries.read().get(key) {
            existing.touch(now_ms);
            return Ok((existing.clone(), false));
        }

        let mut guard = self.entries.write();
        if let Some(existing) = guard.get(key) {
            existing.touch(now_ms);
            return Ok((existing.clone(), false));
        }

        let state = ctor(key)
            .map_err(|source| RegistryError::CreateFailed { key: key.to_string(), source })?;
        let instance = Arc::new(Instance::new(key, state, now_ms));
        guard.insert(key.to_string(), instance.clone());
        Ok((instance, true))
    }

    /// Remove a single entry, returning it if present. The caller is
    /// responsible for invoking `on_remove` on the returned instance.
    pub fn remove(&self, key: &str) -> Option<Arc<Instance<S>>> {
        self.entries.write().remove(key)
    }

    /// Remove and return every entry whose instance has been idle for at
    /// least `idle_ms` as of `now_ms` (spec.md §4.2 "Expiration").
    /// Eviction timing is best-effort per spec.md §9's open question —
    /// this only reclaims entries a caller actually sweeps.
    pub fn sweep_expired(&self, now_ms: u64, idle_ms: u64) -> Vec<(String, Arc<Instance<S>>)> {
        if idle_ms == 0 {
            return Vec::new();
        }
        let expired_keys: Vec<String> = self
            .entries
            .read()
            .iter()
            .filter(|(_, inst)| now_ms.saturating_sub(inst.last_access_ms()) >= idle_ms)
            .map(|(k, _)| k.clone())
            .collect();

        if expired_keys.is_empty() {
            return Vec::new();
        }

        let mut guard = self.entries.write();
        expired_keys
            .into_iter()
            .filter_map(|key| {
                // Re-check under the write lock: the entry may have been
                // touched or removed between the scan above and here.
                let still_expired = guard
                    .get(&key)
                    .map(|inst| now_ms.saturating_sub(inst.last_access_ms()) >= idle_ms)
                    .unwrap_or(false);
                if still_expired { guard.remove(&key).map(|inst| (key, inst)) } else { None }
            })
            .collect()
    }

    /// Remove every entry (spec.md §4.2 "Teardown" / "Reconfiguration").
    /// The caller is responsible for invoking `on_remove` on each
    /// returned instance.
    pub fn drain_all(&self) -> Vec<(String, Arc<Instance<S>>)> {
        self.entries.write().drain().collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
