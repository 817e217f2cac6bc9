//! Forza Horizon 4 "data out" packet layout.
//!
//! The packet is the Forza Motorsport 7 "sled" block (bytes 0..232), twelve
//! bytes specific to Horizon 4, the FM7 "dash" block (bytes 244..323) and one
//! trailing byte specific to Horizon 4.

use crate::Result;
use crate::types::{FieldDescriptor, PacketSchema};

/// Size in bytes of every Forza Horizon 4 telemetry datagram.
pub const PACKET_SIZE: usize = 324;

/// Build the Forza Horizon 4 schema.
///
/// Construction validates the layout against [`PACKET_SIZE`], so the result
/// is only an error if the descriptor table below is edited inconsistently.
///
/// ```rust
/// let schema = paddock::schema::forza_horizon_4()?;
/// assert_eq!(schema.width(), paddock::schema::fh4::PACKET_SIZE);
/// assert_eq!(schema.offset_of("speed"), Some(256));
/// # Ok::<(), paddock::TelemetryError>(())
/// ```
pub fn forza_horizon_4() -> Result<PacketSchema> {
    PacketSchema::with_packet_size(descriptors(), PACKET_SIZE)
}

fn descriptors() -> Vec<FieldDescriptor> {
    let mut layout = sled();
    // Undocumented Horizon 4 data between the sled and dash blocks.
    layout.push(FieldDescriptor::skip(12));
    layout.extend(dash());
    layout.push(FieldDescriptor::skip(1));
    layout
}

/// One f32 field per wheel, `<prefix>_front_left` .. `<prefix>_rear_right`.
fn per_wheel(prefix: &str) -> impl Iterator<Item = FieldDescriptor> + '_ {
    ["front_left", "front_right", "rear_left", "rear_right"]
        .into_iter()
        .map(move |wheel| FieldDescriptor::f32(format!("{prefix}_{wheel}")).field())
}

fn sled() -> Vec<FieldDescriptor> {
    let mut sled = vec![
        // 1 while racing, 0 in menus or when the race is stopped
        FieldDescriptor::s32("is_race_on").tag(),
        // Game clock, wraps eventually
        FieldDescriptor::u32("timestamp_ms").timestamp(),
        FieldDescriptor::f32("engine_max_rpm").field(),
        FieldDescriptor::f32("engine_idle_rpm").field(),
        FieldDescriptor::f32("current_engine_rpm").field(),
        // Car local space: X right, Y up, Z forward
        FieldDescriptor::f32("acceleration_x").field(),
        FieldDescriptor::f32("acceleration_y").field(),
        FieldDescriptor::f32("acceleration_z").field(),
        FieldDescriptor::f32("velocity_x").field(),
        FieldDescriptor::f32("velocity_y").field(),
        FieldDescriptor::f32("velocity_z").field(),
        // X pitch, Y yaw, Z roll
        FieldDescriptor::f32("angular_velocity_x").field(),
        FieldDescriptor::f32("angular_velocity_y").field(),
        FieldDescriptor::f32("angular_velocity_z").field(),
        FieldDescriptor::f32("yaw").field(),
        FieldDescriptor::f32("pitch").field(),
        FieldDescriptor::f32("roll").field(),
    ];

    // 0.0 max stretch, 1.0 max compression
    sled.extend(per_wheel("normalized_suspension_travel"));

    // Slip ratio: 0 is full grip, |ratio| > 1.0 is loss of grip. The odd
    // capitalisation of the front-right label is what existing dashboards
    // query, so it stays.
    sled.extend([
        FieldDescriptor::f32("tire_slip_ratio_front_left").field(),
        FieldDescriptor::f32("tire_slip_ratio_front_Right").field(),
        FieldDescriptor::f32("tire_slip_ratio_rear_left").field(),
        FieldDescriptor::f32("tire_slip_ratio_rear_right").field(),
    ]);

    // rad/s
    sled.extend(per_wheel("wheel_rotation_speed"));

    // 1 on a rumble strip, 0 off
    sled.extend(
        ["front_left", "front_right", "rear_left", "rear_right"]
            .into_iter()
            .map(|wheel| FieldDescriptor::s32(format!("on_rumble_strip_{wheel}")).field()),
    );

    // 0..1, 1 is the deepest puddle
    sled.extend(per_wheel("puddle_depth"));
    // Force feedback rumble, non-dimensional
    sled.extend(per_wheel("surface_rumble"));
    sled.extend(per_wheel("tire_slip_angle"));
    sled.extend(per_wheel("tire_combined_slip"));
    sled.extend(per_wheel("suspension_travel_meters"));

    sled.extend([
        FieldDescriptor::s32("car_id").tag(),
        // 0 (worst) ..= 7 (best)
        FieldDescriptor::s32("car_class").tag(),
        // 100 (slowest) ..= 999 (fastest)
        FieldDescriptor::s32("car_performance_index").tag(),
        // 0 FWD, 1 RWD, 2 AWD
        FieldDescriptor::s32("drive_train_type").tag(),
        FieldDescriptor::s32("num_engine_cylinders").tag(),
    ]);

    sled
}

fn dash() -> Vec<FieldDescriptor> {
    vec![
        // meters
        FieldDescriptor::f32("position_x").field(),
        FieldDescriptor::f32("position_y").field(),
        FieldDescriptor::f32("position_z").field(),
        // m/s
        FieldDescriptor::f32("speed").field(),
        // watts
        FieldDescriptor::f32("power").field(),
        // newton meters
        FieldDescriptor::f32("torque").field(),
        // Front right comes first on the wire.
        FieldDescriptor::f32("tire_temp_front_right").field(),
        FieldDescriptor::f32("tire_temp_front_left").field(),
        FieldDescriptor::f32("tire_temp_rear_left").field(),
        FieldDescriptor::f32("tire_temp_rear_right").field(),
        FieldDescriptor::f32("boost").field(),
        FieldDescriptor::f32("fuel").field(),
        FieldDescriptor::f32("distance_traveled").field(),
        FieldDescriptor::f32("best_lap_time").field(),
        FieldDescriptor::f32("last_lap_time").field(),
        FieldDescriptor::f32("current_lap_time").field(),
        FieldDescriptor::f32("current_race_time").field(),
        FieldDescriptor::u16("lap_number").tag(),
        FieldDescriptor::u8("race_position").field(),
        FieldDescriptor::u8("accel").field(),
        FieldDescriptor::u8("brake").field(),
        FieldDescriptor::u8("clutch").field(),
        FieldDescriptor::u8("hand_brake").field(),
        FieldDescriptor::u8("gear").field(),
        FieldDescriptor::s8("steer").field(),
        FieldDescriptor::s8("normalized_driving_line").field(),
        FieldDescriptor::s8("normalized_ai_brake_difference").field(),
    ]
}
