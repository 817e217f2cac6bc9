//! Core types for telemetry packet representation.
//!
//! ## Architecture
//!
//! - [`Value`] is a tagged primitive decoded from the wire (`i8`..`u32`, `f32`)
//! - [`FieldDescriptor`] describes one region of a packet: decode rule,
//!   classification, label and optional [`Transform`]
//! - [`PacketSchema`] is the validated, ordered layout of a whole packet
//! - [`DecodedPacket`] is the classified output of one decode call
//! - [`RawPacket`] is the received datagram before decoding
//!
//! ## Usage Example
//!
//! ```rust
//! use paddock::types::{FieldDescriptor, PacketSchema};
//!
//! let schema = PacketSchema::new(vec![
//!     FieldDescriptor::s32("is_race_on").tag(),
//!     FieldDescriptor::u32("timestamp_ms").timestamp(),
//!     FieldDescriptor::skip(4),
//!     FieldDescriptor::f32("speed").field(),
//! ])
//! .unwrap();
//!
//! assert_eq!(schema.width(), 16);
//! assert_eq!(schema.offset_of("speed"), Some(12));
//! ```

mod descriptor;
mod packet;
mod schema;
mod value;

pub use descriptor::{Classification, DecodeRule, FieldDescriptor, Transform};
pub use packet::{DecodedPacket, RawPacket};
pub use schema::PacketSchema;
pub use value::{PrimitiveKind, Value};
