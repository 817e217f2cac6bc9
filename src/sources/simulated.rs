//! Simulated packet source replaying a fixed payload on an interval

use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::Result;
use crate::source::PacketSource;
use crate::types::RawPacket;

/// Default gap between simulated packets.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A captured Forza Horizon 4 packet: race on, car 1060 (class 3, PI 800,
/// AWD, 4 cylinders), first gear, full throttle.
const FH4_SAMPLE: &[u8] = include_bytes!("../../test-data/fh4_sample.bin");

/// Emits the same payload every `interval`, with no external dependencies.
///
/// The first packet is emitted one full interval after the first read,
/// matching a source that has to wait for the game. The timer is created on
/// that first read, so the source can be built outside a Tokio runtime.
pub struct SimulatedSource {
    payload: Arc<[u8]>,
    period: Duration,
    interval: Option<Interval>,
    sequence: u64,
    limit: Option<u64>,
}

impl SimulatedSource {
    /// Intervals shorter than one millisecond are clamped up.
    pub fn new(payload: impl Into<Arc<[u8]>>, interval: Duration) -> Self {
        Self {
            payload: payload.into(),
            period: interval.max(MIN_INTERVAL),
            interval: None,
            sequence: 0,
            limit: None,
        }
    }

    /// Source replaying the bundled Forza Horizon 4 sample packet.
    pub fn fh4_sample(interval: Duration) -> Self {
        info!("Simulating packets every {:?}", interval);
        Self::new(FH4_SAMPLE, interval)
    }

    /// Stop after `count` packets instead of running forever.
    pub fn with_limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait::async_trait]
impl PacketSource for SimulatedSource {
    async fn next_packet(&mut self) -> Result<Option<RawPacket>> {
        if self.limit.is_some_and(|limit| self.sequence >= limit) {
            debug!("Simulated source exhausted after {} packets", self.sequence);
            return Ok(None);
        }

        let period = self.period;
        let ticker = self.interval.get_or_insert_with(|| {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;
        self.sequence += 1;

        Ok(Some(RawPacket::new(Arc::clone(&self.payload), self.sequence, SystemTime::now())))
    }
}
