//! InfluxDB line protocol encoding
//!
//! One decoded packet becomes one line:
//!
//! ```text
//! fh4,car_class=3,is_race_on=1 gear=1i,speed=9.988055 1700000000000000000
//! ```
//!
//! Tags and fields are written in label order. Integer fields carry the `i`
//! suffix; floats are written in their shortest round-trip form.

use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{DecodedPacket, Value};
use crate::{Result, TelemetryError};

/// Encode `packet` as a single line.
///
/// Returns `Ok(None)` when the packet has nothing to write: line protocol
/// requires at least one field, and non-finite floats cannot be represented,
/// so a packet whose fields are all filtered, suppressed or non-finite is
/// skipped. Empty tag values are dropped for the same reason.
pub fn encode(measurement: &str, packet: &DecodedPacket, timestamp: SystemTime) -> Result<Option<String>> {
    let nanos = timestamp
        .duration_since(UNIX_EPOCH)
        .map_err(|_| TelemetryError::storage_failed("packet timestamp precedes the Unix epoch"))?
        .as_nanos();

    let mut line = String::with_capacity(64 + 32 * packet.fields().len());
    escape_into(&mut line, measurement, &[',', ' ']);

    for (key, value) in packet.tags() {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, value, &[',', '=', ' ']);
    }

    let mut separator = ' ';
    for (key, value) in packet.fields() {
        if matches!(value, Value::Float32(v) if !v.is_finite()) {
            continue;
        }
        line.push(separator);
        separator = ',';
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        push_value(&mut line, *value);
    }

    if separator == ' ' {
        return Ok(None);
    }

    // Infallible for String.
    let _ = write!(line, " {nanos}");
    Ok(Some(line))
}

fn push_value(line: &mut String, value: Value) {
    let _ = match value {
        Value::Float32(v) => write!(line, "{v}"),
        other => match other.as_i64() {
            Some(v) => write!(line, "{v}i"),
            None => write!(line, "{other}"),
        },
    };
}

fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for ch in raw.chars() {
        if ch == '\\' || special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}
