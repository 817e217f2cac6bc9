//! Service configuration.
//!
//! Settings are plain structs passed to constructors; nothing is read from
//! process-wide state. A YAML file supplies the base values and the command
//! line overrides individual keys.
//!
//! ```yaml
//! source:
//!   kind: udp
//!   bind: 0.0.0.0
//!   port: 10001
//! store:
//!   kind: influx
//!   address: http://influxdb:9999
//!   bucket: data
//!   org: fh4server
//! filter:
//!   mode: allow_list
//!   labels: [is_race_on, speed, gear]
//! filter_pause: true
//! ```
//!
//! Every key is optional; an empty document yields [`Config::default`].

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filter::LabelFilter;
use crate::sources::{simulated, udp};
use crate::stores::InfluxSettings;
use crate::stores::memory;
use crate::{Result, TelemetryError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub store: StoreConfig,
    /// Labels allowed into decoded packets
    pub filter: LabelFilter,
    /// Drop packets received while the game reports no race in progress
    pub filter_pause: bool,
    /// Optional YAML layout replacing the built-in Forza Horizon 4 schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            store: StoreConfig::default(),
            filter: LabelFilter::AllowAll,
            filter_pause: true,
            schema_file: None,
        }
    }
}

impl Config {
    /// Read a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        parse(&yaml).map_err(|e| TelemetryError::config_error(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        parse(yaml).map_err(|e| TelemetryError::config_error(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| TelemetryError::config_error(e.to_string()))
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        match &self.source {
            SourceConfig::Udp(udp) => {
                if udp.buffer_size == 0 {
                    return Err(TelemetryError::config_error("source.buffer_size must be non-zero"));
                }
            }
            SourceConfig::Simulated(sim) => {
                if sim.interval_ms == 0 {
                    return Err(TelemetryError::config_error("source.interval_ms must be non-zero"));
                }
            }
        }

        match &self.store {
            StoreConfig::Influx(influx) => influx.validate()?,
            StoreConfig::Memory(mem) => {
                if mem.capacity == 0 {
                    return Err(TelemetryError::config_error("store.capacity must be non-zero"));
                }
            }
        }

        Ok(())
    }
}

fn parse(yaml: &str) -> std::result::Result<Config, serde_yaml_ng::Error> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml_ng::from_str(yaml)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Udp(UdpSettings),
    Simulated(SimulatedSettings),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Udp(UdpSettings::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UdpSettings {
    pub bind: IpAddr,
    pub port: u16,
    pub buffer_size: usize,
}

impl Default for UdpSettings {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: udp::DEFAULT_PORT,
            buffer_size: udp::DEFAULT_BUFFER_SIZE,
        }
    }
}

impl UdpSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatedSettings {
    pub interval_ms: u64,
}

impl Default for SimulatedSettings {
    fn default() -> Self {
        Self { interval_ms: simulated::DEFAULT_INTERVAL.as_millis() as u64 }
    }
}

impl SimulatedSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    Influx(InfluxSettings),
    Memory(MemorySettings),
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Influx(InfluxSettings::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemorySettings {
    pub capacity: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self { capacity: memory::DEFAULT_CAPACITY }
    }
}
