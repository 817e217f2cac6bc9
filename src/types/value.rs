//! Primitive telemetry value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width primitive kinds that appear in telemetry packets.
///
/// All kinds are encoded little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 32-bit IEEE-754 floating point
    Float32,
}

impl PrimitiveKind {
    /// Returns the size in bytes of this kind.
    pub const fn size(&self) -> usize {
        match self {
            PrimitiveKind::Int8 | PrimitiveKind::UInt8 => 1,
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 => 2,
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 | PrimitiveKind::Float32 => 4,
        }
    }
}

/// A decoded primitive value.
///
/// Equality is bitwise for `Float32`, so two values compare equal exactly when
/// they were decoded from the same bytes (`NaN == NaN`, `0.0 != -0.0`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    Float32(f32),
}

impl Value {
    /// The primitive kind this value was decoded as.
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Value::Int8(_) => PrimitiveKind::Int8,
            Value::Int16(_) => PrimitiveKind::Int16,
            Value::Int32(_) => PrimitiveKind::Int32,
            Value::UInt8(_) => PrimitiveKind::UInt8,
            Value::UInt16(_) => PrimitiveKind::UInt16,
            Value::UInt32(_) => PrimitiveKind::UInt32,
            Value::Float32(_) => PrimitiveKind::Float32,
        }
    }

    /// Integer view of the value; `None` for floats.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int8(v) => Some(v.into()),
            Value::Int16(v) => Some(v.into()),
            Value::Int32(v) => Some(v.into()),
            Value::UInt8(v) => Some(v.into()),
            Value::UInt16(v) => Some(v.into()),
            Value::UInt32(v) => Some(v.into()),
            Value::Float32(_) => None,
        }
    }

    /// Lossless widening to `f64`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Int8(v) => v.into(),
            Value::Int16(v) => v.into(),
            Value::Int32(v) => v.into(),
            Value::UInt8(v) => v.into(),
            Value::UInt16(v) => v.into(),
            Value::UInt32(v) => v.into(),
            Value::Float32(v) => v.into(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::UInt8(a), Value::UInt8(b)) => a == b,
            (Value::UInt16(a), Value::UInt16(b)) => a == b,
            (Value::UInt32(a), Value::UInt32(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Renders the value the way tags are stored: shortest decimal form, no
/// type suffix (`1`, `-127`, `9.988055`, `10`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int8(v) => v.fmt(f),
            Value::Int16(v) => v.fmt(f),
            Value::Int32(v) => v.fmt(f),
            Value::UInt8(v) => v.fmt(f),
            Value::UInt16(v) => v.fmt(f),
            Value::UInt32(v) => v.fmt(f),
            Value::Float32(v) => v.fmt(f),
        }
    }
}
