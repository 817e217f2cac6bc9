//! InfluxDB 2.x store using the HTTP write API

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, trace};

use super::line_protocol;
use crate::store::PacketStore;
use crate::types::DecodedPacket;
use crate::{Result, TelemetryError};

/// Connection settings for an InfluxDB 2.x server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfluxSettings {
    /// Base URL, e.g. `http://influxdb:9999`
    pub address: String,
    /// API token; sent as `Authorization: Token <token>` when non-empty
    pub token: String,
    pub bucket: String,
    pub org: String,
    pub measurement: String,
    /// Per-write timeout in seconds
    pub timeout_secs: u64,
}

impl Default for InfluxSettings {
    fn default() -> Self {
        Self {
            address: "http://influxdb:9999".to_string(),
            token: String::new(),
            bucket: "data".to_string(),
            org: "fh4server".to_string(),
            measurement: "fh4".to_string(),
            timeout_secs: 2,
        }
    }
}

impl InfluxSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.address.starts_with("http://") || self.address.starts_with("https://")) {
            return Err(TelemetryError::config_error(format!(
                "influx address '{}' must start with http:// or https://",
                self.address
            )));
        }
        if self.bucket.is_empty() || self.org.is_empty() || self.measurement.is_empty() {
            return Err(TelemetryError::config_error(
                "influx bucket, org and measurement must be non-empty",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(TelemetryError::config_error("influx timeout must be at least 1 second"));
        }
        Ok(())
    }
}

/// Writes each packet as one line-protocol point.
///
/// The underlying client is pooled and safe to share; concurrent writes are
/// independent HTTP requests.
#[derive(Debug, Clone)]
pub struct InfluxStore {
    client: reqwest::Client,
    write_url: String,
    settings: InfluxSettings,
}

impl InfluxStore {
    pub fn new(settings: InfluxSettings) -> Result<Self> {
        settings.validate()?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("paddock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                TelemetryError::storage_failed_with_source("failed to create HTTP client", Box::new(e))
            })?;

        let write_url = format!("{}/api/v2/write", settings.address.trim_end_matches('/'));
        info!(
            "Writing to InfluxDB at {} (org={}, bucket={})",
            settings.address, settings.org, settings.bucket
        );

        Ok(Self { client, write_url, settings })
    }

    pub fn settings(&self) -> &InfluxSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl PacketStore for InfluxStore {
    async fn write_packet(&self, packet: &DecodedPacket, timestamp: SystemTime) -> Result<()> {
        let Some(line) = line_protocol::encode(&self.settings.measurement, packet, timestamp)? else {
            debug!("Packet has no writable fields, skipping");
            return Ok(());
        };
        trace!("Writing line: {}", line);

        let mut request = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.settings.org.as_str()),
                ("bucket", self.settings.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line);
        if !self.settings.token.is_empty() {
            request = request
                .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.settings.token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TelemetryError::Timeout { duration: self.settings.timeout() }
            } else {
                TelemetryError::storage_failed_with_source("InfluxDB write request failed", Box::new(e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelemetryError::storage_failed(format!(
                "InfluxDB rejected write with {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use std::collections::BTreeMap;
    use std::time::UNIX_EPOCH;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(address: String) -> InfluxSettings {
        InfluxSettings { address, token: "secret".to_string(), ..InfluxSettings::default() }
    }

    fn sample_packet() -> DecodedPacket {
        DecodedPacket::from_parts(
            BTreeMap::from([("speed".to_string(), Value::Float32(10.0))]),
            BTreeMap::from([("is_race_on".to_string(), "1".to_string())]),
        )
    }

    #[tokio::test]
    async fn posts_line_protocol_with_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/write"))
            .and(query_param("org", "fh4server"))
            .and(query_param("bucket", "data"))
            .and(query_param("precision", "ns"))
            .and(header("authorization", "Token secret"))
            .and(body_string("fh4,is_race_on=1 speed=10 2000000000"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = InfluxStore::new(settings(mock_server.uri())).unwrap();
        let timestamp = UNIX_EPOCH + Duration::from_secs(2);
        store.write_packet(&sample_packet(), timestamp).await.unwrap();
    }

    #[tokio::test]
    async fn server_rejection_is_a_storage_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/write"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized access"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = InfluxStore::new(settings(mock_server.uri())).unwrap();
        let err = store.write_packet(&sample_packet(), SystemTime::now()).await.unwrap_err();
        assert!(matches!(err, TelemetryError::Storage { .. }));
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("unauthorized access"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn packets_without_fields_are_not_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&mock_server)
            .await;

        let store = InfluxStore::new(settings(mock_server.uri())).unwrap();
        let tags_only = DecodedPacket::from_parts(
            BTreeMap::new(),
            BTreeMap::from([("is_race_on".to_string(), "1".to_string())]),
        );
        store.write_packet(&tags_only, SystemTime::now()).await.unwrap();
    }

    #[test]
    fn validates_settings() {
        assert!(InfluxSettings::default().validate().is_ok());

        let bad_scheme = InfluxSettings { address: "influxdb:9999".to_string(), ..Default::default() };
        assert!(matches!(bad_scheme.validate(), Err(TelemetryError::Config { .. })));

        let no_timeout = InfluxSettings { timeout_secs: 0, ..Default::default() };
        assert!(no_timeout.validate().is_err());

        let no_bucket = InfluxSettings { bucket: String::new(), ..Default::default() };
        assert!(InfluxStore::new(no_bucket).is_err());
    }
}
