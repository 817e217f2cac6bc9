//! Packet store trait

use std::time::SystemTime;

use crate::Result;
use crate::types::DecodedPacket;

/// Trait for decoded packet sinks
///
/// Writes may be issued concurrently from several tasks; implementations
/// must tolerate overlapping calls.
#[async_trait::async_trait]
pub trait PacketStore: Send + Sync + 'static {
    /// Persist one decoded packet under the given event time.
    ///
    /// The timestamp is supplied by the caller (normally the receive time);
    /// stores never read the clock themselves.
    async fn write_packet(&self, packet: &DecodedPacket, timestamp: SystemTime) -> Result<()>;
}
