//! Schema-driven decoder and ingestion service for Forza Horizon 4 telemetry.
//!
//! Paddock turns the game's fixed-layout "Data Out" UDP packets into typed,
//! labeled values ready for a time-series database.
//!
//! # Features
//!
//! - **Declarative schemas**: ordered field descriptors, validated once at build time
//! - **Strict decoding**: wrong-sized buffers are rejected, never partially decoded
//! - **Label filtering**: allow-all, deny-all or allow-list per decode
//! - **Ingestion service**: UDP or simulated input, InfluxDB or in-memory output
//!
//! # Quick Start
//!
//! ```rust
//! use paddock::{Decoder, LabelFilter, Value};
//!
//! let schema = paddock::schema::forza_horizon_4()?;
//! let decoder = Decoder::new(schema, LabelFilter::allow_list(["speed", "gear", "is_race_on"]));
//!
//! let mut packet = vec![0u8; paddock::schema::fh4::PACKET_SIZE];
//! packet[0] = 1; // is_race_on
//! packet[256..260].copy_from_slice(&10.0f32.to_le_bytes()); // speed
//!
//! let decoded = decoder.decode(&packet)?;
//! assert_eq!(decoded.tag("is_race_on"), Some("1"));
//! assert_eq!(decoded.field("speed"), Some(Value::Float32(10.0)));
//! assert_eq!(decoded.field("gear"), Some(Value::UInt8(0)));
//! assert_eq!(decoded.fields().len(), 2);
//! # Ok::<(), paddock::TelemetryError>(())
//! ```
//!
//! ## Running the service
//!
//! ```rust,no_run
//! use paddock::{Config, Paddock};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> paddock::Result<()> {
//!     let config = Config::load("paddock.yaml")?;
//!     let pipeline = Paddock::from_config(&config).await?;
//!     let (stats, _reason) = pipeline.run(CancellationToken::new()).await;
//!     println!("wrote {} packets", stats.written);
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod filter;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding
pub mod decoder;
pub mod schema;

// Ingestion service
pub mod config;
pub mod pipeline;
pub mod source;
pub mod sources;
pub mod store;
pub mod stores;

use std::sync::Arc;
use tracing::info;

// Core exports
pub use error::*;
pub use filter::LabelFilter;
pub use types::*;

// Decoding exports
pub use decoder::{Decoder, decode};

// Service exports
pub use config::{Config, SourceConfig, StoreConfig};
pub use pipeline::{Pipeline, PipelineOptions, PipelineStats, StopReason};
pub use source::PacketSource;
pub use sources::{SimulatedSource, UdpSource};
pub use store::PacketStore;
pub use stores::{InfluxStore, MemoryStore};

/// Unified entry point for building an ingestion pipeline from configuration.
///
/// ```rust,no_run
/// use paddock::{Config, Paddock};
///
/// # #[tokio::main]
/// # async fn main() -> paddock::Result<()> {
/// let pipeline = Paddock::from_config(&Config::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct Paddock;

impl Paddock {
    /// Load the packet schema named by the configuration.
    ///
    /// Uses the layout file when one is configured, otherwise the built-in
    /// Forza Horizon 4 schema.
    pub fn schema(config: &Config) -> Result<types::PacketSchema> {
        match &config.schema_file {
            Some(path) => {
                info!("Loading packet layout from {}", path.display());
                types::PacketSchema::from_yaml_file(path)
            }
            None => schema::forza_horizon_4(),
        }
    }

    /// Open the configured packet source.
    pub async fn source(config: &Config) -> Result<Box<dyn PacketSource>> {
        Ok(match &config.source {
            SourceConfig::Udp(udp) => {
                Box::new(UdpSource::bind(udp.socket_addr(), udp.buffer_size).await?)
            }
            SourceConfig::Simulated(sim) => Box::new(SimulatedSource::fh4_sample(sim.interval())),
        })
    }

    /// Connect the configured packet store.
    pub fn store(config: &Config) -> Result<Arc<dyn PacketStore>> {
        Ok(match &config.store {
            StoreConfig::Influx(settings) => Arc::new(InfluxStore::new(settings.clone())?),
            StoreConfig::Memory(memory) => {
                info!("Keeping the last {} packets in memory", memory.capacity);
                Arc::new(MemoryStore::new(memory.capacity)?)
            }
        })
    }

    /// Validate the configuration and assemble a ready-to-run pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is inconsistent
    /// - The layout file is missing or invalid
    /// - The UDP receive buffer is not larger than one packet
    /// - The UDP socket cannot be bound
    /// - The HTTP client for the store cannot be created
    pub async fn from_config(config: &Config) -> Result<Pipeline<Box<dyn PacketSource>>> {
        config.validate()?;

        let schema = Self::schema(config)?;
        info!("Packet schema: {} descriptors, {} bytes", schema.len(), schema.width());

        if let SourceConfig::Udp(udp) = &config.source {
            if udp.buffer_size <= schema.width() {
                return Err(TelemetryError::config_error(format!(
                    "source.buffer_size {} must be larger than the {} byte packet",
                    udp.buffer_size,
                    schema.width()
                )));
            }
        }

        let decoder = Decoder::new(schema, config.filter.clone());
        let source = Self::source(config).await?;
        let store = Self::store(config)?;
        let options = PipelineOptions { filter_pause: config.filter_pause, ..Default::default() };

        Ok(Pipeline::new(decoder, source, store).with_options(options))
    }
}
