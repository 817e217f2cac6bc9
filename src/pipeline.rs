//! Ingestion pipeline: read, decode, filter pauses, store
//!
//! The pipeline owns its source and runs on the calling task. Every packet is
//! stamped with its receive time, decoded, checked for the pause state and
//! handed to the store on a separate task, so a slow database never stalls
//! the socket.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::decoder::Decoder;
use crate::source::PacketSource;
use crate::store::PacketStore;
use crate::types::DecodedPacket;

/// Tag carrying the game's race state.
pub const RACE_ON_TAG: &str = "is_race_on";

/// Behavior knobs for [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Drop packets whose race-state tag reads `"0"` (menus, pause screen).
    pub filter_pause: bool,
    /// Consecutive source errors tolerated before the pipeline stops.
    pub max_consecutive_errors: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { filter_pause: true, max_consecutive_errors: 10 }
    }
}

/// Counters reported when the pipeline stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub received: u64,
    pub decoded: u64,
    pub dropped_malformed: u64,
    pub dropped_paused: u64,
    pub written: u64,
    pub write_failures: u64,
    pub source_errors: u64,
}

/// Why [`Pipeline::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    SourceExhausted,
    TooManyErrors,
}

pub struct Pipeline<S> {
    decoder: Decoder,
    source: S,
    store: Arc<dyn PacketStore>,
    options: PipelineOptions,
}

impl<S> Pipeline<S>
where
    S: PacketSource,
{
    pub fn new(decoder: Decoder, source: S, store: Arc<dyn PacketStore>) -> Self {
        Self { decoder, source, store, options: PipelineOptions::default() }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run until cancelled, until the source ends, or until the source fails
    /// too many times in a row.
    ///
    /// Writes still in flight when the loop stops are awaited before
    /// returning, so the stats include their outcome.
    pub async fn run(self, cancel: CancellationToken) -> (PipelineStats, StopReason) {
        let Pipeline { decoder, mut source, store, options } = self;

        info!("Pipeline started (filter_pause={})", options.filter_pause);
        let mut stats = PipelineStats::default();
        let mut writes = JoinSet::new();
        let mut error_count = 0u32;

        let reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Pipeline cancelled during read");
                    break StopReason::Cancelled;
                }
                result = source.next_packet() => result,
            };

            let raw = match result {
                Ok(Some(raw)) => {
                    error_count = 0;
                    raw
                }
                Ok(None) => {
                    info!("Packet source ended after {} packets", stats.received);
                    break StopReason::SourceExhausted;
                }
                Err(e) => {
                    error_count += 1;
                    stats.source_errors += 1;
                    error!(
                        "Source error ({}/{}): {}",
                        error_count, options.max_consecutive_errors, e
                    );

                    if error_count >= options.max_consecutive_errors {
                        error!("Too many source errors, stopping pipeline");
                        break StopReason::TooManyErrors;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = cancel.cancelled() => break StopReason::Cancelled,
                        _ = tokio::time::sleep(backoff) => continue,
                    }
                }
            };

            stats.received += 1;
            trace!("Packet {}: {} bytes", raw.sequence, raw.len());

            let packet = match decoder.decode(&raw.data) {
                Ok(packet) => packet,
                Err(e) => {
                    stats.dropped_malformed += 1;
                    warn!("Dropping packet {}: {}", raw.sequence, e);
                    continue;
                }
            };
            stats.decoded += 1;

            if options.filter_pause && is_paused(&packet) {
                stats.dropped_paused += 1;
                trace!("Dropping packet {} while paused", raw.sequence);
                continue;
            }

            let store = Arc::clone(&store);
            let timestamp = raw.received_at;
            writes.spawn(async move { store.write_packet(&packet, timestamp).await });

            while let Some(outcome) = writes.try_join_next() {
                record_write(&mut stats, outcome);
            }
        };

        if !writes.is_empty() {
            debug!("Waiting for {} in-flight writes", writes.len());
        }
        while let Some(outcome) = writes.join_next().await {
            record_write(&mut stats, outcome);
        }

        info!(
            "Pipeline stopped ({:?}): received={} decoded={} written={} malformed={} paused={}",
            reason,
            stats.received,
            stats.decoded,
            stats.written,
            stats.dropped_malformed,
            stats.dropped_paused
        );
        (stats, reason)
    }
}

/// Whether the packet reports the race as not running.
///
/// Only visible when the race-state tag survives the label filter; a filter
/// that excludes it disables pause detection.
pub fn is_paused(packet: &DecodedPacket) -> bool {
    packet.tag(RACE_ON_TAG) == Some("0")
}

fn record_write(
    stats: &mut PipelineStats,
    outcome: std::result::Result<crate::Result<()>, tokio::task::JoinError>,
) {
    match outcome {
        Ok(Ok(())) => stats.written += 1,
        Ok(Err(e)) => {
            stats.write_failures += 1;
            warn!("Failed to write packet: {}", e);
        }
        Err(e) => {
            stats.write_failures += 1;
            error!("Write task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::LabelFilter;
    use crate::stores::MemoryStore;
    use crate::test_utils::{fh4_packet_with_race_on, scenario_schema};
    use crate::types::{RawPacket, Value};
    use crate::{Result, TelemetryError};
    use std::collections::VecDeque;
    use std::time::SystemTime;

    /// Replays a scripted sequence of receive outcomes, then ends.
    struct ScriptedSource {
        script: VecDeque<Result<Vec<u8>>>,
        sequence: u64,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<u8>>>) -> Self {
            Self { script: script.into(), sequence: 0 }
        }
    }

    #[async_trait::async_trait]
    impl PacketSource for ScriptedSource {
        async fn next_packet(&mut self) -> Result<Option<RawPacket>> {
            match self.script.pop_front() {
                Some(Ok(bytes)) => {
                    self.sequence += 1;
                    Ok(Some(RawPacket::new(bytes, self.sequence, SystemTime::now())))
                }
                Some(Err(e)) => Err(e),
                None => Ok(None),
            }
        }
    }

    /// Never yields a packet.
    struct SilentSource;

    #[async_trait::async_trait]
    impl PacketSource for SilentSource {
        async fn next_packet(&mut self) -> Result<Option<RawPacket>> {
            std::future::pending().await
        }
    }

    fn decoder(filter: LabelFilter) -> Decoder {
        Decoder::new(scenario_schema(), filter)
    }

    fn packet(race_on: i32, speed: f32) -> Vec<u8> {
        let mut bytes = race_on.to_le_bytes().to_vec();
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&speed.to_le_bytes());
        bytes
    }

    #[tokio::test]
    async fn stores_running_packets_and_drops_paused_and_malformed() {
        let store = Arc::new(MemoryStore::new(10).unwrap());
        let source = ScriptedSource::new(vec![
            Ok(packet(1, 10.0)),
            Ok(packet(0, 0.0)),
            Ok(vec![1, 0, 0]),
            Ok(packet(1, 20.0)),
        ]);

        let pipeline = Pipeline::new(decoder(LabelFilter::allow_all()), source, store.clone());
        let (stats, reason) = pipeline.run(CancellationToken::new()).await;

        assert_eq!(reason, StopReason::SourceExhausted);
        assert_eq!(stats.received, 4);
        assert_eq!(stats.decoded, 3);
        assert_eq!(stats.dropped_malformed, 1);
        assert_eq!(stats.dropped_paused, 1);
        assert_eq!(stats.written, 2);

        let mut speeds: Vec<_> = store
            .snapshot()
            .await
            .iter()
            .filter_map(|s| s.packet.field("speed"))
            .collect();
        speeds.sort_by(|a, b| a.as_f64().total_cmp(&b.as_f64()));
        assert_eq!(speeds, vec![Value::Float32(10.0), Value::Float32(20.0)]);
    }

    #[tokio::test]
    async fn pause_filter_can_be_disabled() {
        let store = Arc::new(MemoryStore::new(10).unwrap());
        let source = ScriptedSource::new(vec![Ok(packet(0, 0.0))]);

        let options = PipelineOptions { filter_pause: false, ..PipelineOptions::default() };
        let pipeline = Pipeline::new(decoder(LabelFilter::allow_all()), source, store.clone())
            .with_options(options);
        let (stats, _) = pipeline.run(CancellationToken::new()).await;

        assert_eq!(stats.dropped_paused, 0);
        assert_eq!(stats.written, 1);
    }

    #[tokio::test]
    async fn pause_detection_needs_the_race_state_tag() {
        let store = Arc::new(MemoryStore::new(10).unwrap());
        let source = ScriptedSource::new(vec![Ok(packet(0, 0.0))]);

        let filter = LabelFilter::allow_list(["speed"]);
        let pipeline = Pipeline::new(decoder(filter), source, store.clone());
        let (stats, _) = pipeline.run(CancellationToken::new()).await;

        assert_eq!(stats.dropped_paused, 0);
        assert_eq!(stats.written, 1);
    }

    #[tokio::test]
    async fn pauses_are_filtered_on_the_captured_packet() {
        let store = Arc::new(MemoryStore::new(10).unwrap());
        let source = ScriptedSource::new(vec![
            Ok(fh4_packet_with_race_on(1).unwrap()),
            Ok(fh4_packet_with_race_on(0).unwrap()),
            Ok(fh4_packet_with_race_on(1).unwrap()),
        ]);
        let schema = crate::schema::forza_horizon_4().unwrap();

        let pipeline =
            Pipeline::new(Decoder::new(schema, LabelFilter::allow_all()), source, store.clone());
        let (stats, reason) = pipeline.run(CancellationToken::new()).await;

        assert_eq!(reason, StopReason::SourceExhausted);
        assert_eq!(stats.decoded, 3);
        assert_eq!(stats.dropped_paused, 1);
        assert_eq!(stats.written, 2);

        let stored = store.snapshot().await;
        assert!(stored.iter().all(|s| s.packet.tag(RACE_ON_TAG) == Some("1")));
        assert!(stored.iter().all(|s| s.packet.tag("car_id") == Some("1060")));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_from_transient_source_errors() {
        let store = Arc::new(MemoryStore::new(10).unwrap());
        let source = ScriptedSource::new(vec![
            Err(TelemetryError::connection_failed("boom")),
            Err(TelemetryError::connection_failed("boom")),
            Ok(packet(1, 5.0)),
        ]);

        let pipeline = Pipeline::new(decoder(LabelFilter::allow_all()), source, store.clone());
        let (stats, reason) = pipeline.run(CancellationToken::new()).await;

        assert_eq!(reason, StopReason::SourceExhausted);
        assert_eq!(stats.source_errors, 2);
        assert_eq!(stats.written, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_too_many_consecutive_errors() {
        let store = Arc::new(MemoryStore::new(10).unwrap());
        let script = (0..5).map(|_| Err(TelemetryError::connection_failed("down"))).collect();
        let source = ScriptedSource::new(script);

        let options = PipelineOptions { max_consecutive_errors: 3, ..PipelineOptions::default() };
        let pipeline = Pipeline::new(decoder(LabelFilter::allow_all()), source, store)
            .with_options(options);
        let (stats, reason) = pipeline.run(CancellationToken::new()).await;

        assert_eq!(reason, StopReason::TooManyErrors);
        assert_eq!(stats.source_errors, 3);
    }

    #[tokio::test]
    async fn cancellation_interrupts_a_blocked_read() {
        let store = Arc::new(MemoryStore::new(10).unwrap());
        let cancel = CancellationToken::new();
        let pipeline = Pipeline::new(decoder(LabelFilter::allow_all()), SilentSource, store);

        let handle = tokio::spawn(pipeline.run(cancel.clone()));
        cancel.cancel();

        let (stats, reason) = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reason, StopReason::Cancelled);
        assert_eq!(stats.received, 0);
    }

    #[test]
    fn paused_only_on_explicit_zero() {
        let tags = |value: &str| {
            DecodedPacket::from_parts(
                Default::default(),
                [(RACE_ON_TAG.to_string(), value.to_string())].into(),
            )
        };
        assert!(is_paused(&tags("0")));
        assert!(!is_paused(&tags("1")));
        assert!(!is_paused(&DecodedPacket::default()));
    }
}
