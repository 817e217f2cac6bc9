//! Schema-driven packet decoding.
//!
//! [`decode`] walks a buffer with a single forward-only [`Cursor`], one
//! descriptor at a time:
//!
//! 1. take the descriptor's window and advance the cursor
//! 2. decode the window (skips yield nothing)
//! 3. run the transform, if any; an absent result suppresses the descriptor
//! 4. drop anything not classified as a field or tag
//! 5. consult the [`LabelFilter`]
//! 6. insert fields as values and tags as their string rendering
//!
//! Filtering only ever affects output. Byte consumption is fixed by the
//! schema, so every descriptor's window is read regardless of the filter.
//!
//! Buffers must be exactly as wide as the schema. Short buffers fail with
//! [`TelemetryError::Truncated`], long ones with [`TelemetryError::Oversized`],
//! before any field is extracted. A failed decode never yields a partial
//! packet.
//!
//! ```rust
//! use paddock::{decode, LabelFilter};
//! use paddock::types::{FieldDescriptor, PacketSchema, Value};
//!
//! let schema = PacketSchema::new(vec![
//!     FieldDescriptor::s32("is_race_on").tag(),
//!     FieldDescriptor::u32("timestamp_ms").timestamp(),
//!     FieldDescriptor::f32("speed").field(),
//! ])?;
//!
//! let buffer = [0x01, 0, 0, 0, 0x64, 0, 0, 0, 0, 0, 0x20, 0x41];
//! let packet = decode(&buffer, &schema, &LabelFilter::allow_all())?;
//!
//! assert_eq!(packet.tag("is_race_on"), Some("1"));
//! assert_eq!(packet.field("speed"), Some(Value::Float32(10.0)));
//! assert_eq!(packet.field("timestamp_ms"), None);
//! # Ok::<(), paddock::TelemetryError>(())
//! ```

mod cursor;

pub use cursor::Cursor;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::filter::LabelFilter;
use crate::types::{Classification, DecodedPacket, PacketSchema};
use crate::{Result, TelemetryError};

/// Decode one packet.
///
/// Pure and synchronous: no I/O, no logging, no shared mutable state. Safe to
/// call concurrently with the same schema and filter.
pub fn decode(buffer: &[u8], schema: &PacketSchema, filter: &LabelFilter) -> Result<DecodedPacket> {
    check_length(buffer, schema)?;

    let mut cursor = Cursor::new(buffer);
    let mut fields = BTreeMap::new();
    let mut tags = BTreeMap::new();

    for descriptor in schema {
        let window = cursor.take(descriptor.width())?;
        let Some(value) = descriptor.evaluate(window)? else {
            continue;
        };

        let classification = descriptor.classification();
        if !classification.is_emitted() {
            continue;
        }

        // Validated schemas label every field and tag.
        let Some(label) = descriptor.label() else {
            continue;
        };
        if !filter.allows(label) {
            continue;
        }

        match classification {
            Classification::Field => {
                fields.insert(label.to_string(), value);
            }
            Classification::Tag => {
                tags.insert(label.to_string(), value.to_string());
            }
            Classification::Timestamp | Classification::None => {}
        }
    }

    Ok(DecodedPacket::from_parts(fields, tags))
}

fn check_length(buffer: &[u8], schema: &PacketSchema) -> Result<()> {
    match buffer.len().cmp(&schema.width()) {
        Ordering::Equal => Ok(()),
        Ordering::Less => {
            Err(TelemetryError::Truncated { needed: schema.width(), actual: buffer.len() })
        }
        Ordering::Greater => {
            Err(TelemetryError::Oversized { expected: schema.width(), actual: buffer.len() })
        }
    }
}

/// A schema bound to a filter, cheap to clone and share between tasks.
#[derive(Debug, Clone)]
pub struct Decoder {
    schema: Arc<PacketSchema>,
    filter: Arc<LabelFilter>,
}

impl Decoder {
    pub fn new(schema: impl Into<Arc<PacketSchema>>, filter: impl Into<Arc<LabelFilter>>) -> Self {
        Self { schema: schema.into(), filter: filter.into() }
    }

    pub fn schema(&self) -> &PacketSchema {
        &self.schema
    }

    pub fn filter(&self) -> &LabelFilter {
        &self.filter
    }

    pub fn decode(&self, buffer: &[u8]) -> Result<DecodedPacket> {
        decode(buffer, &self.schema, &self.filter)
    }
}
