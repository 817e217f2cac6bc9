//! YAML packet layouts.
//!
//! A layout file lists descriptors in packet order:
//!
//! ```yaml
//! packet_size: 12
//! fields:
//!   - { kind: s32, label: is_race_on, class: tag }
//!   - { kind: u32, label: timestamp_ms, class: timestamp }
//!   - { kind: skip, width: 0 }
//!   - { kind: f32, label: speed, class: field }
//! ```
//!
//! `class` defaults to `none`. `width` is only meaningful for `skip` entries.
//! Transforms cannot be expressed in a layout file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{Classification, DecodeRule, FieldDescriptor, PacketSchema, PrimitiveKind};
use crate::{Result, TelemetryError};

/// Wire kind of a layout entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    S8,
    S16,
    S32,
    U8,
    U16,
    U32,
    F32,
    Skip,
}

impl EntryKind {
    fn primitive(self) -> Option<PrimitiveKind> {
        match self {
            EntryKind::S8 => Some(PrimitiveKind::Int8),
            EntryKind::S16 => Some(PrimitiveKind::Int16),
            EntryKind::S32 => Some(PrimitiveKind::Int32),
            EntryKind::U8 => Some(PrimitiveKind::UInt8),
            EntryKind::U16 => Some(PrimitiveKind::UInt16),
            EntryKind::U32 => Some(PrimitiveKind::UInt32),
            EntryKind::F32 => Some(PrimitiveKind::Float32),
            EntryKind::Skip => None,
        }
    }
}

/// One descriptor as written in a layout file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutEntry {
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub class: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
}

impl LayoutEntry {
    fn into_descriptor(self, index: usize) -> Result<FieldDescriptor> {
        let rule = match (self.kind.primitive(), self.width) {
            (None, Some(width)) => DecodeRule::Skip(width),
            (None, None) => {
                return Err(TelemetryError::schema_validation_error(format!(
                    "layout entry {index} is a skip without a width"
                )));
            }
            (Some(kind), None) => DecodeRule::primitive(kind),
            (Some(kind), Some(width)) if width == kind.size() => DecodeRule::primitive(kind),
            (Some(kind), Some(width)) => {
                return Err(TelemetryError::schema_validation_error(format!(
                    "layout entry {index} declares width {width} but {kind:?} is {} bytes",
                    kind.size()
                )));
            }
        };
        Ok(FieldDescriptor::new(rule, self.class, self.label))
    }
}

/// Top-level layout document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutFile {
    /// Expected packet size; checked against the summed entry widths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_size: Option<usize>,
    pub fields: Vec<LayoutEntry>,
}

impl LayoutFile {
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            TelemetryError::schema_validation_error(format!("invalid layout document: {e}"))
        })
    }

    /// Validate the layout and build a schema from it.
    pub fn into_schema(self) -> Result<PacketSchema> {
        let descriptors = self
            .fields
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_descriptor(index))
            .collect::<Result<Vec<_>>>()?;

        match self.packet_size {
            Some(size) => PacketSchema::with_packet_size(descriptors, size),
            None => PacketSchema::new(descriptors),
        }
    }
}

impl PacketSchema {
    /// Build a schema from a YAML layout document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        LayoutFile::parse(yaml)?.into_schema()
    }

    /// Read and build a schema from a YAML layout file on disk.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml(&yaml)
    }
}
