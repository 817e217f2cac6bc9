//! Packet types flowing through the ingestion pipeline

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::SystemTime;

use super::Value;

/// Raw datagram as received from a packet source.
///
/// This is the unit that flows from sources into the decoder.
#[derive(Debug, Clone)]
pub struct RawPacket {
    /// Packet bytes (shared, never mutated)
    pub data: Arc<[u8]>,

    /// Per-source monotonic counter
    pub sequence: u64,

    /// Wall-clock receive time; used as the event timestamp when storing
    pub received_at: SystemTime,
}

impl RawPacket {
    pub fn new(data: impl Into<Arc<[u8]>>, sequence: u64, received_at: SystemTime) -> Self {
        Self { data: data.into(), sequence, received_at }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Output of one decode call: measurements under `fields`, string-rendered
/// dimensions under `tags`.
///
/// Owns all of its data; the input buffer can be reused as soon as decoding
/// returns. Maps are ordered so iteration (and serialization) is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedPacket {
    fields: BTreeMap<String, Value>,
    tags: BTreeMap<String, String>,
}

impl DecodedPacket {
    pub fn from_parts(fields: BTreeMap<String, Value>, tags: BTreeMap<String, String>) -> Self {
        Self { fields, tags }
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn field(&self, label: &str) -> Option<Value> {
        self.fields.get(label).copied()
    }

    pub fn tag(&self, label: &str) -> Option<&str> {
        self.tags.get(label).map(String::as_str)
    }

    /// Every emitted label, fields first.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().chain(self.tags.keys()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.tags.is_empty()
    }
}
