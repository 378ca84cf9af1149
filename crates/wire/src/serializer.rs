// SPDX-License-Identifier: MIT
// Copyright (c) 2026 flux-node contributors

//! `Serializer`: round-trip encode/decode of events across the wire
//! (spec.md §6), preserving the event's runtime variant tag.
//!
//! `flux-core::Event` is a plain trait object — it carries no
//! serialization capability of its own, by design (`flux-core` stays
//! free of any comm-layer dependency). [`JsonSerializer`] bridges that
//! gap with a small runtime registry: each concrete event type is
//! registered once, at application wiring time, against a string tag;
//! encoding downcasts a `&dyn Event` back to its concrete type to call
//! `serde_json::to_value`, and decoding looks the tag up to find the
//! matching `serde_json::from_value`. This is the same
//! "register once, look up by tag at runtime" shape spec.md §4.1/§9
//! recommends for dispatch, applied here to serialization instead.

use std::any::TypeId;
use std::collections::HashMap;

use flux_core::Event;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::envelope::Envelope;
use crate::errors::WireError;

/// Encodes/decodes events for wire transmission.
pub trait Serializer: Send + Sync {
    fn encode(&self, stream: &str, event: &dyn Event) -> Result<Vec<u8>, WireError>;
    fn decode(&self, bytes: &[u8]) -> Result<(String, Box<dyn Event>), WireError>;
}

type EncodeFn = Box<dyn Fn(&dyn Event) -> serde_json::Value + Send + Sync>;
type DecodeFn = Box<dyn Fn(serde_json::Value) -> Result<Box<dyn Event>, WireError> + Send + Sync>;

/// A [`Serializer`] backed by `serde_json` and a type registry.
///
/// Registering the same Rust type twice under different tags, or two
/// types under the same tag, replaces the earlier registration — last
/// write wins, same as [`flux_core::DispatchTableBuilder`].
#[derive(Default)]
pub struct JsonSerializer {
    encoders: HashMap<TypeId, (&'static str, EncodeFn)>,
    decoders: HashMap<String, DecodeFn>,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register event type `E` under `tag`. Both `encode` and `decode`
    /// only work for types registered here.
    pub fn register<E>(mut self, tag: &'static str) -> Self
    where
        E: Event + Serialize + DeserializeOwned + 'static,
    {
        self.encoders.insert(
            TypeId::of::<E>(),
            (
                tag,
                Box::new(|event: &dyn Event| {
                    let concrete = event
                        .as_any()
                        .downcast_ref::<E>()
                        .expect("encoder registered against the wrong concrete type");
                    serde_json::to_value(concrete).unwrap_or(serde_json::Value::Null)
                }),
            ),
        );
        self.decoders.insert(
            tag.to_string(),
            Box::new(|value: serde_json::Value| {
                serde_json::from_value::<E>(value)
                    .map(|event| Box::new(event) as Box<dyn Event>)
                    .map_err(|e| WireError::Decode(e.to_string()))
            }),
        );
        self
    }
}

impl Serializer for JsonSerializer {
    fn encode(&self, stream: &str, event: &dyn Event) -> Result<Vec<u8>, WireError> {
        let (tag, encoder) =
            self.encoders.get(&event.as_any().type_id()).ok_or_else(|| WireError::Encode {
                type_name: event.type_name(),
                reason: "no encoder registered for this concrete type".to_string(),
            })?;
        let payload = encoder(event);
        let envelope = Envelope::new(stream, *tag, payload);
        serde_json::to_vec(&envelope)
            .map_err(|e| WireError::Encode { type_name: event.type_name(), reason: e.to_string() })
    }

    fn decode(&self, bytes: &[u8]) -> Result<(String, Box<dyn Event>), WireError> {
        let envelope: Envelope =
            serde_json::from_slice(bytes).map_err(|e| WireError::Decode(e.to_string()))?;
        let decoder =
            self.decoders.get(&envelope.tag).ok_or_else(|| WireError::UnknownTag(envelope.tag.clone()))?;
        let event = decoder(envelope.payload)?;
        Ok((envelope.stream, event))
    }
}

#[cfg(test)]
#[path = "serializer_tests.rs"]
mod tests;
