//! Error types for telemetry ingestion.
//!
//! All errors implement `std::error::Error` and carry structured context.
//!
//! ## Error Categories
//!
//! - **Decode Errors**: buffers whose length does not match the packet schema
//! - **Schema Errors**: invalid packet layouts, detected once at build time
//! - **Connection Errors**: socket binding and receive failures
//! - **Storage Errors**: failed writes to the time-series backend
//! - **Configuration Errors**: unreadable or inconsistent settings
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use paddock::TelemetryError;
//!
//! let error = TelemetryError::connection_failed("port already in use");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```
//!
//! A truncated packet is never retryable: the bytes are gone, and the caller
//! is expected to drop the packet.
//!
//! ```rust
//! use paddock::TelemetryError;
//!
//! let error = TelemetryError::Truncated { needed: 324, actual: 232 };
//! assert!(!error.is_retryable());
//! assert!(error.is_malformed_packet());
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Packet truncated: schema needs {needed} bytes, buffer has {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("Packet oversized: schema expects {expected} bytes, buffer has {actual}")]
    Oversized { expected: usize, actual: usize },

    #[error("Schema validation failed: {reason}")]
    SchemaValidation { reason: String },

    #[error("Failed to receive telemetry: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Failed to store packet: {reason}")]
    Storage {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Connection { .. } => true,
            TelemetryError::Storage { .. } => true,
            TelemetryError::Timeout { .. } => true,
            TelemetryError::Truncated { .. } => false,
            TelemetryError::Oversized { .. } => false,
            TelemetryError::SchemaValidation { .. } => false,
            TelemetryError::File { .. } => false,
            TelemetryError::Config { .. } => false,
        }
    }

    /// Returns whether this error means a single packet must be dropped.
    pub fn is_malformed_packet(&self) -> bool {
        matches!(self, TelemetryError::Truncated { .. } | TelemetryError::Oversized { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::Truncated { .. } | TelemetryError::Oversized { .. } => vec![
                "Check the game's Data Out packet format setting",
                "Verify the schema matches the game version",
                "Drop the packet and keep receiving",
            ],
            TelemetryError::SchemaValidation { .. } => vec![
                "Check for duplicate labels in the schema",
                "Verify the total width matches the packet size",
                "Give every field, tag and timestamp entry a label",
            ],
            TelemetryError::Connection { .. } => vec![
                "Ensure no other process is bound to the UDP port",
                "Check the game's Data Out IP address and port",
                "Check firewall rules for inbound UDP",
            ],
            TelemetryError::File { .. } => vec![
                "Check the file exists and is readable",
                "Check file permissions",
            ],
            TelemetryError::Config { .. } => vec![
                "Review the configuration file for typos",
                "Compare against the documented defaults",
            ],
            TelemetryError::Storage { .. } => vec![
                "Verify the InfluxDB address is reachable",
                "Check the API token, org and bucket names",
                "Increase the write timeout",
            ],
            TelemetryError::Timeout { .. } => vec![
                "Increase timeout duration",
                "Check backend load and network latency",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for schema validation errors.
    pub fn schema_validation_error(reason: impl Into<String>) -> Self {
        TelemetryError::SchemaValidation { reason: reason.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(reason: impl Into<String>) -> Self {
        TelemetryError::Config { reason: reason.into() }
    }

    /// Helper constructor for storage errors.
    pub fn storage_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Storage { reason: reason.into(), source: None }
    }

    /// Helper constructor for storage errors with source.
    pub fn storage_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Storage { reason: reason.into(), source: Some(source) }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
