//! In-memory store keeping the most recent packets

use std::collections::VecDeque;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::store::PacketStore;
use crate::types::DecodedPacket;
use crate::{Result, TelemetryError};

/// Default number of packets retained.
pub const DEFAULT_CAPACITY: usize = 50;

/// A packet together with the time it was written under.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPacket {
    pub packet: DecodedPacket,
    pub timestamp: SystemTime,
}

/// Bounded ring of the most recently written packets, oldest first.
///
/// Holds at most `capacity` packets at all times; the store never needs to
/// be full before trimming starts.
#[derive(Debug)]
pub struct MemoryStore {
    capacity: usize,
    packets: Mutex<VecDeque<StoredPacket>>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TelemetryError::config_error("memory store capacity must be non-zero"));
        }
        Ok(Self { capacity, packets: Mutex::new(VecDeque::with_capacity(capacity)) })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn len(&self) -> usize {
        self.packets.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.packets.lock().await.is_empty()
    }

    /// Copy of the retained packets, oldest first.
    pub async fn snapshot(&self) -> Vec<StoredPacket> {
        self.packets.lock().await.iter().cloned().collect()
    }

    pub async fn latest(&self) -> Option<StoredPacket> {
        self.packets.lock().await.back().cloned()
    }
}

#[async_trait::async_trait]
impl PacketStore for MemoryStore {
    async fn write_packet(&self, packet: &DecodedPacket, timestamp: SystemTime) -> Result<()> {
        let mut packets = self.packets.lock().await;
        packets.push_back(StoredPacket { packet: packet.clone(), timestamp });
        while packets.len() > self.capacity {
            packets.pop_front();
        }

        debug!("Stored packet at {:?} ({}/{} retained)", timestamp, packets.len(), self.capacity);
        trace!("Packet contents: {:?}", packet);
        Ok(())
    }
}
