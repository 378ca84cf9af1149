// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! Event trait and the subtype-declaration mechanism dispatch selection
//! relies on.
//!
//! Events are arbitrary user types. The only thing the dispatcher needs
//! from a concrete event, beyond its own runtime type, is the ordered
//! chain of declared ancestor types it should also match against (most
//! specific first) — see [`Event::supertypes`].

use std::any::{Any, TypeId};
use std::fmt;

/// A routed, immutable-once-emitted unit of data flowing through a stream.
///
/// Implementors are ordinary Rust structs/enums. Use [`event_supertypes!`]
/// to declare that a concrete event type should also satisfy handlers
/// registered for one or more ancestor types — this is how `flux-core`
/// expresses the "event variant hierarchy" spec.md describes without
/// relying on Rust's (nonexistent) structural subtyping.
pub trait Event: Any + Send + Sync + fmt::Debug {
    /// Declared ancestor types, nearest first. Empty for a leaf event with
    /// no declared supertypes — only its own exact type can match it.
    fn supertypes(&self) -> &'static [TypeId] {
        &[]
    }

    /// Downcasting hook for dispatch handlers.
    fn as_any(&self) -> &dyn Any {
        self
    }

    /// Human-readable type name used in log messages and dispatch-miss errors.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Synthetic event the output scheduler delivers on a time-based tick when
/// `outputOnEvent = false` (spec.md §4.5). Carries no payload beyond the
/// fact that a tick occurred.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerEvent;

impl Event for TimerEvent {}

/// Declare the ancestor chain for a concrete event type.
///
/// ```ignore
/// #[derive(Debug)]
/// struct Click;
/// impl flux_core::Event for Click {}
///
/// #[derive(Debug)]
/// struct LeftClick;
/// flux_core::event_supertypes!(LeftClick => [Click]);
/// ```
#[macro_export]
macro_rules! event_supertypes {
    ($ty:ty => [$($super:ty),+ $(,)?]) => {
        impl $crate::event::Event for $ty {
            fn supertypes(&self) -> &'static [::std::any::TypeId] {
                static CELL: ::std::sync::OnceLock<Vec<::std::any::TypeId>> =
                    ::std::sync::OnceLock::new();
                CELL.get_or_init(|| vec![$(::std::any::TypeId::of::<$super>()),+])
            }
        }
    };
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
