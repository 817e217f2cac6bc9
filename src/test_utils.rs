//! Test utilities for fixture access and packet construction
//!
//! Shared by unit tests and the benchmark suite.

#![cfg(any(test, feature = "benchmark"))]

use std::path::{Path, PathBuf};

use crate::types::{FieldDescriptor, PacketSchema};

/// Guidance shown when packet fixtures are missing from the checkout.
pub const FIXTURE_GUIDANCE: &str =
    "Packet fixtures live under test-data/ at the crate root; restore them from version control.";

/// Captured Forza Horizon 4 packet shipped with the crate.
pub const FH4_SAMPLE_FILE: &str = "fh4_sample.bin";

/// Error returned when a required fixture cannot be located.
#[derive(Debug, Clone)]
pub struct FixtureError {
    message: String,
}

impl FixtureError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FixtureError {}

/// The crate's `test-data/` directory, independent of the working directory.
pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

/// Require that a fixture exists on disk and return its path.
pub fn require_fixture<P: AsRef<Path>>(path: P) -> Result<PathBuf, FixtureError> {
    let path = path.as_ref();
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(FixtureError::new(format!(
            "Missing packet fixture: {}. {}",
            path.display(),
            FIXTURE_GUIDANCE
        )))
    }
}

/// Require a file inside `test-data/` by name.
pub fn require_test_data_file(file_name: &str) -> Result<PathBuf, FixtureError> {
    require_fixture(test_data_dir().join(file_name))
}

/// Bytes of the captured Forza Horizon 4 sample packet.
pub fn fh4_sample_bytes() -> Result<Vec<u8>, FixtureError> {
    let path = require_test_data_file(FH4_SAMPLE_FILE)?;
    std::fs::read(&path)
        .map_err(|e| FixtureError::new(format!("Failed to read {}: {}", path.display(), e)))
}

/// `[s32 is_race_on tag, u32 timestamp_ms timestamp, f32 speed field]`
pub fn scenario_schema() -> PacketSchema {
    PacketSchema::new(vec![
        FieldDescriptor::s32("is_race_on").tag(),
        FieldDescriptor::u32("timestamp_ms").timestamp(),
        FieldDescriptor::f32("speed").field(),
    ])
    .expect("scenario schema is valid")
}

/// Packet for [`scenario_schema`]: race on, timestamp 100, speed 10.0.
pub const SCENARIO_BUFFER: [u8; 12] = [0x01, 0, 0, 0, 0x64, 0, 0, 0, 0x00, 0x00, 0x20, 0x41];

/// Copy of the sample packet with the race-state word overwritten.
pub fn fh4_packet_with_race_on(race_on: i32) -> Result<Vec<u8>, FixtureError> {
    let mut bytes = fh4_sample_bytes()?;
    bytes[..4].copy_from_slice(&race_on.to_le_bytes());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_contains_sample() {
        let path = require_test_data_file(FH4_SAMPLE_FILE).unwrap();
        assert!(path.starts_with(test_data_dir()));
        assert_eq!(fh4_sample_bytes().unwrap().len(), crate::schema::fh4::PACKET_SIZE);
    }

    #[test]
    fn require_fixture_errors_when_missing() {
        let message = require_test_data_file("__missing_fixture").unwrap_err().to_string();
        assert!(message.contains("Missing packet fixture"));
        assert!(message.contains("test-data"));
    }

    #[test]
    fn race_state_override() {
        let paused = fh4_packet_with_race_on(0).unwrap();
        assert_eq!(&paused[..4], &[0, 0, 0, 0]);
        assert_eq!(&paused[4..], &fh4_sample_bytes().unwrap()[4..]);
    }
}
