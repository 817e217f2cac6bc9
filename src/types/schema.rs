//! Packet schema: the ordered byte layout of one packet version

use std::collections::HashSet;

use super::{Classification, FieldDescriptor};
use crate::{Result, TelemetryError};

/// Immutable, validated sequence of [`FieldDescriptor`]s.
///
/// Validation happens once, in the constructors, so a `PacketSchema` value is
/// always well formed:
/// - every field, tag and timestamp descriptor has a label
/// - labels are unique within the schema
/// - skip rules are never classified
/// - the total width fits in `usize` (and matches the declared packet size,
///   when one is given)
///
/// Schemas carry no per-decode state and are `Send + Sync`; share one behind
/// an `Arc` for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct PacketSchema {
    descriptors: Vec<FieldDescriptor>,
    width: usize,
}

impl PacketSchema {
    /// Build a schema from descriptors in packet order.
    pub fn new(descriptors: Vec<FieldDescriptor>) -> Result<Self> {
        let width = validate(&descriptors)?;
        Ok(Self { descriptors, width })
    }

    /// Build a schema and check that it covers exactly `packet_size` bytes.
    pub fn with_packet_size(descriptors: Vec<FieldDescriptor>, packet_size: usize) -> Result<Self> {
        let schema = Self::new(descriptors)?;
        if schema.width != packet_size {
            return Err(TelemetryError::schema_validation_error(format!(
                "descriptors cover {} bytes but the packet is {} bytes",
                schema.width, packet_size
            )));
        }
        Ok(schema)
    }

    /// Total number of bytes a packet must have.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.descriptors.iter()
    }

    /// Get a descriptor by label.
    pub fn get(&self, label: &str) -> Option<&FieldDescriptor> {
        self.descriptors.iter().find(|d| d.label() == Some(label))
    }

    /// Byte offset of the labeled descriptor within the packet.
    pub fn offset_of(&self, label: &str) -> Option<usize> {
        let mut offset = 0;
        for descriptor in &self.descriptors {
            if descriptor.label() == Some(label) {
                return Some(offset);
            }
            offset += descriptor.width();
        }
        None
    }

    /// Labels carrying the given classification, in packet order.
    pub fn labels(&self, classification: Classification) -> impl Iterator<Item = &str> + '_ {
        self.descriptors
            .iter()
            .filter(move |d| d.classification() == classification)
            .filter_map(FieldDescriptor::label)
    }
}

impl<'a> IntoIterator for &'a PacketSchema {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

fn validate(descriptors: &[FieldDescriptor]) -> Result<usize> {
    let mut seen = HashSet::with_capacity(descriptors.len());
    let mut width = 0usize;

    for (index, descriptor) in descriptors.iter().enumerate() {
        let classification = descriptor.classification();

        if descriptor.rule().is_skip() && classification != Classification::None {
            return Err(TelemetryError::schema_validation_error(format!(
                "descriptor {} is a skip rule but is classified as {:?}",
                index, classification
            )));
        }

        match descriptor.label() {
            Some(label) => {
                if label.is_empty() {
                    return Err(TelemetryError::schema_validation_error(format!(
                        "descriptor {} has an empty label",
                        index
                    )));
                }
                if !seen.insert(label) {
                    return Err(TelemetryError::schema_validation_error(format!(
                        "duplicate label '{}' at descriptor {}",
                        label, index
                    )));
                }
            }
            None if classification != Classification::None => {
                return Err(TelemetryError::schema_validation_error(format!(
                    "descriptor {} is classified as {:?} but has no label",
                    index, classification
                )));
            }
            None => {}
        }

        width = width.checked_add(descriptor.width()).ok_or_else(|| {
            TelemetryError::schema_validation_error("total schema width overflowed")
        })?;
    }

    Ok(width)
}
