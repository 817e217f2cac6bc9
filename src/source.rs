//! Packet source trait

use crate::Result;
use crate::types::RawPacket;

/// Trait for raw packet sources
///
/// Sources own their timing: a UDP source waits on the socket, a simulated
/// source waits on its interval. The pipeline only ever asks for the next
/// packet.
#[async_trait::async_trait]
pub trait PacketSource: Send + 'static {
    /// Get the next raw packet
    ///
    /// Returns:
    /// - `Ok(Some(packet))` - New packet available
    /// - `Ok(None)` - Source exhausted (normal termination)
    /// - `Err(e)` - Receive failed; the caller decides whether to retry
    async fn next_packet(&mut self) -> Result<Option<RawPacket>>;
}

#[async_trait::async_trait]
impl PacketSource for Box<dyn PacketSource> {
    async fn next_packet(&mut self) -> Result<Option<RawPacket>> {
        (**self).next_packet().await
    }
}
