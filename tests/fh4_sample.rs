//! Decoding a captured Forza Horizon 4 packet end to end.

use anyhow::{Context, Result};
use std::path::Path;

use paddock::schema::{fh4::PACKET_SIZE, forza_horizon_4};
use paddock::{DecodedPacket, LabelFilter, TelemetryError, Value, decode};

fn sample() -> Result<Vec<u8>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data/fh4_sample.bin");
    std::fs::read(&path).with_context(|| format!("Reading sample packet from {}", path.display()))
}

fn decode_all() -> Result<DecodedPacket> {
    let schema = forza_horizon_4()?;
    Ok(decode(&sample()?, &schema, &LabelFilter::allow_all())?)
}

#[test]
fn sample_has_packet_size() -> Result<()> {
    assert_eq!(sample()?.len(), PACKET_SIZE);
    Ok(())
}

#[test]
fn decodes_tags() -> Result<()> {
    let packet = decode_all()?;

    assert_eq!(packet.tag("is_race_on"), Some("1"));
    assert_eq!(packet.tag("car_id"), Some("1060"));
    assert_eq!(packet.tag("car_class"), Some("3"));
    assert_eq!(packet.tag("car_performance_index"), Some("800"));
    assert_eq!(packet.tag("drive_train_type"), Some("2"));
    assert_eq!(packet.tag("num_engine_cylinders"), Some("4"));
    assert_eq!(packet.tag("lap_number"), Some("0"));
    assert_eq!(packet.tags().len(), 7);
    Ok(())
}

#[test]
fn decodes_fields() -> Result<()> {
    let packet = decode_all()?;

    assert_eq!(packet.field("engine_max_rpm"), Some(Value::Float32(7999.995)));
    assert_eq!(packet.field("speed").map(|v| v.to_string()), Some("9.988055".to_string()));
    assert_eq!(packet.field("fuel"), Some(Value::Float32(1.0)));
    assert_eq!(packet.field("accel"), Some(Value::UInt8(255)));
    assert_eq!(packet.field("brake"), Some(Value::UInt8(0)));
    assert_eq!(packet.field("clutch"), Some(Value::UInt8(0)));
    assert_eq!(packet.field("hand_brake"), Some(Value::UInt8(0)));
    assert_eq!(packet.field("gear"), Some(Value::UInt8(1)));
    assert_eq!(packet.field("steer"), Some(Value::Int8(-127)));
    assert_eq!(packet.field("on_rumble_strip_front_left"), Some(Value::Int32(0)));
    assert_eq!(packet.fields().len(), 77);
    Ok(())
}

#[test]
fn timestamp_is_never_emitted() -> Result<()> {
    let packet = decode_all()?;
    assert!(packet.field("timestamp_ms").is_none());
    assert!(packet.tag("timestamp_ms").is_none());
    Ok(())
}

#[test]
fn allow_list_selects_driver_inputs() -> Result<()> {
    let schema = forza_horizon_4()?;
    let filter = LabelFilter::allow_list([
        "accel",
        "brake",
        "clutch",
        "gear",
        "hand_brake",
        "speed",
        "is_race_on",
        "car_class",
        "num_engine_cylinders",
    ]);

    let packet = decode(&sample()?, &schema, &filter)?;
    assert_eq!(
        packet.fields().keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["accel", "brake", "clutch", "gear", "hand_brake", "speed"]
    );
    assert_eq!(
        packet.tags().keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["car_class", "is_race_on", "num_engine_cylinders"]
    );
    Ok(())
}

#[test]
fn truncated_and_padded_samples_are_rejected() -> Result<()> {
    let schema = forza_horizon_4()?;
    let bytes = sample()?;

    let short = decode(&bytes[..PACKET_SIZE - 1], &schema, &LabelFilter::allow_all());
    assert!(matches!(short, Err(TelemetryError::Truncated { needed: 324, actual: 323 })));

    // The sled block alone, as sent by older titles.
    let sled = decode(&bytes[..232], &schema, &LabelFilter::allow_all());
    assert!(matches!(sled, Err(TelemetryError::Truncated { .. })));

    let mut long = bytes.clone();
    long.push(0);
    let long = decode(&long, &schema, &LabelFilter::allow_all());
    assert!(matches!(long, Err(TelemetryError::Oversized { expected: 324, actual: 325 })));
    Ok(())
}
