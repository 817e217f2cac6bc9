//! Field descriptors: one schema entry per region of the packet

use serde::{Deserialize, Serialize};

use super::{PrimitiveKind, Value};
use crate::{Result, TelemetryError};

/// Optional post-decode hook. Returning `None` suppresses the descriptor's
/// output for that packet.
pub type Transform = fn(Value) -> Option<Value>;

/// How a descriptor's bytes are turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeRule {
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Float32,
    /// Consume the given number of bytes without producing a value.
    Skip(usize),
}

impl DecodeRule {
    /// Rule that decodes the given primitive kind.
    pub const fn primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Int8 => DecodeRule::Int8,
            PrimitiveKind::Int16 => DecodeRule::Int16,
            PrimitiveKind::Int32 => DecodeRule::Int32,
            PrimitiveKind::UInt8 => DecodeRule::UInt8,
            PrimitiveKind::UInt16 => DecodeRule::UInt16,
            PrimitiveKind::UInt32 => DecodeRule::UInt32,
            PrimitiveKind::Float32 => DecodeRule::Float32,
        }
    }

    /// Primitive kind produced by this rule; `None` for skips.
    pub const fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            DecodeRule::Int8 => Some(PrimitiveKind::Int8),
            DecodeRule::Int16 => Some(PrimitiveKind::Int16),
            DecodeRule::Int32 => Some(PrimitiveKind::Int32),
            DecodeRule::UInt8 => Some(PrimitiveKind::UInt8),
            DecodeRule::UInt16 => Some(PrimitiveKind::UInt16),
            DecodeRule::UInt32 => Some(PrimitiveKind::UInt32),
            DecodeRule::Float32 => Some(PrimitiveKind::Float32),
            DecodeRule::Skip(_) => None,
        }
    }

    /// Number of bytes this rule consumes.
    pub const fn width(&self) -> usize {
        match self {
            DecodeRule::Skip(count) => *count,
            _ => match self.kind() {
                Some(kind) => kind.size(),
                None => 0,
            },
        }
    }

    pub const fn is_skip(&self) -> bool {
        matches!(self, DecodeRule::Skip(_))
    }

    /// Decode a window of exactly [`width`](Self::width) bytes.
    ///
    /// A window of any other length is rejected rather than padded, so a
    /// short read can never masquerade as a full-width value.
    pub fn decode(&self, window: &[u8]) -> Result<Option<Value>> {
        let value = match self {
            DecodeRule::Int8 => Value::Int8(i8::from_le_bytes(le_window(window)?)),
            DecodeRule::Int16 => Value::Int16(i16::from_le_bytes(le_window(window)?)),
            DecodeRule::Int32 => Value::Int32(i32::from_le_bytes(le_window(window)?)),
            DecodeRule::UInt8 => Value::UInt8(u8::from_le_bytes(le_window(window)?)),
            DecodeRule::UInt16 => Value::UInt16(u16::from_le_bytes(le_window(window)?)),
            DecodeRule::UInt32 => Value::UInt32(u32::from_le_bytes(le_window(window)?)),
            DecodeRule::Float32 => Value::Float32(f32::from_le_bytes(le_window(window)?)),
            DecodeRule::Skip(count) => {
                if window.len() != *count {
                    return Err(TelemetryError::Truncated { needed: *count, actual: window.len() });
                }
                return Ok(None);
            }
        };
        Ok(Some(value))
    }
}

fn le_window<const N: usize>(window: &[u8]) -> Result<[u8; N]> {
    window.try_into().map_err(|_| TelemetryError::Truncated { needed: N, actual: window.len() })
}

/// Where a decoded value goes in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Consumed for cursor advancement only
    #[default]
    None,
    /// Game-side clock; never emitted, the store uses the receive time
    Timestamp,
    /// Numeric measurement
    Field,
    /// Indexed dimension, emitted as its string rendering
    Tag,
}

impl Classification {
    /// Whether descriptors with this classification can appear in the output.
    pub const fn is_emitted(&self) -> bool {
        matches!(self, Classification::Field | Classification::Tag)
    }
}

/// A single schema entry.
///
/// Built with the declarative constructors, one per primitive kind:
///
/// ```rust
/// use paddock::types::{Classification, FieldDescriptor};
///
/// let race_on = FieldDescriptor::s32("is_race_on").tag();
/// let speed = FieldDescriptor::f32("speed").field();
/// let padding = FieldDescriptor::skip(12);
///
/// assert_eq!(race_on.classification(), Classification::Tag);
/// assert_eq!(speed.width(), 4);
/// assert_eq!(padding.label(), None);
/// ```
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    label: Option<String>,
    rule: DecodeRule,
    classification: Classification,
    transform: Option<Transform>,
}

impl FieldDescriptor {
    pub fn new(rule: DecodeRule, classification: Classification, label: Option<String>) -> Self {
        Self { label, rule, classification, transform: None }
    }

    fn labeled(rule: DecodeRule, label: impl Into<String>) -> Self {
        Self::new(rule, Classification::None, Some(label.into()))
    }

    pub fn s8(label: impl Into<String>) -> Self {
        Self::labeled(DecodeRule::Int8, label)
    }

    pub fn s16(label: impl Into<String>) -> Self {
        Self::labeled(DecodeRule::Int16, label)
    }

    pub fn s32(label: impl Into<String>) -> Self {
        Self::labeled(DecodeRule::Int32, label)
    }

    pub fn u8(label: impl Into<String>) -> Self {
        Self::labeled(DecodeRule::UInt8, label)
    }

    pub fn u16(label: impl Into<String>) -> Self {
        Self::labeled(DecodeRule::UInt16, label)
    }

    pub fn u32(label: impl Into<String>) -> Self {
        Self::labeled(DecodeRule::UInt32, label)
    }

    pub fn f32(label: impl Into<String>) -> Self {
        Self::labeled(DecodeRule::Float32, label)
    }

    /// Unlabeled padding of `count` bytes.
    pub fn skip(count: usize) -> Self {
        Self::new(DecodeRule::Skip(count), Classification::None, None)
    }

    pub fn field(self) -> Self {
        self.classified(Classification::Field)
    }

    pub fn tag(self) -> Self {
        self.classified(Classification::Tag)
    }

    pub fn timestamp(self) -> Self {
        self.classified(Classification::Timestamp)
    }

    pub fn classified(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn rule(&self) -> DecodeRule {
        self.rule
    }

    pub fn width(&self) -> usize {
        self.rule.width()
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn transform(&self) -> Option<Transform> {
        self.transform
    }

    /// Decode this descriptor's window and run the transform, if any.
    pub fn evaluate(&self, window: &[u8]) -> Result<Option<Value>> {
        let value = self.rule.decode(window)?;
        Ok(match self.transform {
            Some(transform) => value.and_then(transform),
            None => value,
        })
    }
}
