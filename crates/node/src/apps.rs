// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! The compile-time substitute for spec.md §6's dynamic `*.s4r`
//! class-loading.
//!
//! An [`AppFactory`] is the Rust analogue of the JVM `App-Class` named
//! in a manifest: rather than resolving a class name at runtime through
//! a class loader, `flux-node` ships with a fixed [`AppRegistry`] of
//! factories known at compile time, keyed by the same string the
//! manifest names. The *observable* contract spec.md §6 describes
//! (scan `appsDir`, read a manifest, instantiate the named App,
//! bind Sender/Receiver, call `init` then `start`) is preserved; only
//! the class-loading isolation is not, since every app factory is
//! statically linked into one binary (see DESIGN.md).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use flux_core::UserHandlerError;
use flux_runtime::App;
use flux_wire::{Hasher, JsonSerializer, Serializer, Topology};
use flux_runtime::Sender;

/// Per-node collaborators an [`AppModule`] needs to wire its prototypes
/// and streams (spec.md §6's comm-layer seams, bound once at node
/// startup and handed to every app the same way).
#[derive(Clone)]
pub struct NodeContext {
    pub hasher: Arc<dyn Hasher>,
    pub topology: Arc<dyn Topology>,
    /// `None` when no remote partitions exist to forward to (e.g. a
    /// single-node deployment using the loopback comm module).
    pub sender: Option<Arc<Sender>>,
    pub serializer: Arc<dyn Serializer>,
}

/// The runtime behavior of one loaded application (spec.md §4.7
/// "App" lifecycle `init()`/`start()`).
pub trait AppModule: Send + Sync {
    /// Register this app's streams and PE prototypes on `app`. Runs
    /// once, before [`Self::start`].
    fn init(&self, app: &Arc<App>, ctx: &NodeContext) -> Result<(), UserHandlerError>;

    /// The app's own `start()` hook (spec.md §4.7). Most apps need no
    /// behavior here beyond what [`App::start`] already does for their
    /// prototypes' timers; override when an app needs its own startup
    /// side effect (e.g. seeding an initial event).
    fn start(&self, _app: &Arc<App>) {}
}

/// Resolves a manifest's `app_class` to a concrete [`AppModule`]
/// (spec.md §6: "instantiates the App").
pub trait AppFactory: Send + Sync {
    /// The `app_class` string this factory answers to, matched exactly
    /// against [`crate::manifest::AppManifest::app_class`].
    fn app_class(&self) -> &'static str;

    /// Register this app's event types on the node-wide wire
    /// serializer, before any app is instantiated. Default is a no-op
    /// for apps with no cross-node streams.
    fn register_events(&self, serializer: JsonSerializer) -> JsonSerializer {
        serializer
    }

    fn build(&self) -> Box<dyn AppModule>;
}

/// The compile-time table of known `app_class` names to factories.
#[derive(Default)]
pub struct AppRegistry {
    factories: RwLock<HashMap<&'static str, Arc<dyn AppFactory>>>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, factory: Arc<dyn AppFactory>) {
        self.factories.write().insert(factory.app_class(), factory);
    }

    pub fn get(&self, app_class: &str) -> Option<Arc<dyn AppFactory>> {
        self.factories.read().get(app_class).cloned()
    }

    pub fn factories(&self) -> Vec<Arc<dyn AppFactory>> {
        self.factories.read().values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "apps_tests.rs"]
mod tests;
