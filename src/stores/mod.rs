//! Packet store implementations

pub mod influx;
pub mod line_protocol;
pub mod memory;

pub use influx::{InfluxSettings, InfluxStore};
pub use memory::{MemoryStore, StoredPacket};
