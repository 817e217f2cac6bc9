//! Paddock ingestion service
//!
//! Listens for Forza Horizon 4 "Data Out" packets and writes them to InfluxDB.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use paddock::config::{MemorySettings, SimulatedSettings, UdpSettings};
use paddock::{Config, LabelFilter, Paddock, SourceConfig, StopReason, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(version)]
#[command(
    about = "Ingest Forza Horizon 4 Data Out telemetry into InfluxDB.",
    long_about = None,
    after_help = "Examples:\n  paddock --config paddock.yaml\n  paddock --port 10001 --influx-token $TOKEN\n  paddock --simulate-source --simulate-store --labels speed,gear"
)]
struct Cli {
    /// YAML configuration file; flags override its values
    #[arg(short, long, env = "PADDOCK_CONFIG")]
    config: Option<PathBuf>,

    /// UDP port to listen for game packets on
    #[arg(long)]
    port: Option<u16>,

    /// Replay a bundled sample packet instead of listening on UDP
    #[arg(long)]
    simulate_source: bool,

    /// Keep packets in memory instead of writing to InfluxDB
    #[arg(long)]
    simulate_store: bool,

    /// InfluxDB address, e.g. http://influxdb:9999
    #[arg(long)]
    influx_addr: Option<String>,

    /// InfluxDB API token
    #[arg(long, env = "PADDOCK_INFLUX_TOKEN", hide_env_values = true)]
    influx_token: Option<String>,

    /// Only emit these labels (comma separated)
    #[arg(long, value_delimiter = ',')]
    labels: Option<Vec<String>>,

    /// Keep packets received while the game is paused or in menus
    #[arg(long)]
    no_filter_pause: bool,

    /// Packet layout file replacing the built-in Forza Horizon 4 schema
    #[arg(long)]
    schema: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Loading configuration from {}", path.display()))?,
            None => Config::default(),
        };

        if self.simulate_source {
            if !matches!(config.source, SourceConfig::Simulated(_)) {
                config.source = SourceConfig::Simulated(SimulatedSettings::default());
            }
        } else if let Some(port) = self.port {
            match &mut config.source {
                SourceConfig::Udp(udp) => udp.port = port,
                source => *source = SourceConfig::Udp(UdpSettings { port, ..Default::default() }),
            }
        }

        if self.simulate_store {
            if !matches!(config.store, StoreConfig::Memory(_)) {
                config.store = StoreConfig::Memory(MemorySettings::default());
            }
        } else if let StoreConfig::Influx(influx) = &mut config.store {
            if let Some(address) = self.influx_addr {
                influx.address = address;
            }
            if let Some(token) = self.influx_token {
                influx.token = token;
            }
        }

        if let Some(labels) = self.labels {
            config.filter = LabelFilter::allow_list(labels);
        }
        if self.no_filter_pause {
            config.filter_pause = false;
        }
        if let Some(schema) = self.schema {
            config.schema_file = Some(schema);
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config()?;
    info!("Running with configuration:\n{}", redacted(&config)?);

    let pipeline = Paddock::from_config(&config).await.context("Starting pipeline")?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
        shutdown.cancel();
    });

    let (stats, reason) = pipeline.run(cancel).await;
    info!("Final stats: {:?}", stats);

    if reason == StopReason::TooManyErrors {
        anyhow::bail!("packet source failed repeatedly");
    }
    Ok(())
}

/// Render the configuration for logging without the database token.
fn redacted(config: &Config) -> Result<String> {
    let mut shown = config.clone();
    if let StoreConfig::Influx(influx) = &mut shown.store {
        if !influx.token.is_empty() {
            influx.token = "<redacted>".to_string();
        }
    }
    Ok(shown.to_yaml_string()?)
}
