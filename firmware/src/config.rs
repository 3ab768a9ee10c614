//! Compile-time configuration.

use joystick_core::{
    default_button_groups, BatteryStatus, ChannelMapping, OutputMode, FAKE_BATTERY,
};

/// Channels carried through the pipeline.
pub const CHANNELS: usize = 16;

/// Emulated input latency in ticks (0 disables the delay).
///
/// Each step adds [`TICK_MS`] of delay.
pub const LATENCY_STEPS: usize = 0;

/// Scheduling tick. The bridge clock runs in milliseconds.
pub const TICK_MS: u64 = 1;

/// Report interval in paced mode.
pub const OUTPUT_INTERVAL_MS: u64 = 4;

/// Battery frame interval while the CRSF link is up.
pub const TELEMETRY_INTERVAL_MS: u64 = 500;

/// Battery values reported to the transmitter.
pub const TELEMETRY_BATTERY: BatteryStatus = FAKE_BATTERY;

#[cfg(feature = "sync-output")]
pub const OUTPUT_MODE: OutputMode = OutputMode::Synchronous;

#[cfg(not(feature = "sync-output"))]
pub const OUTPUT_MODE: OutputMode = OutputMode::paced(OUTPUT_INTERVAL_MS);

/// Roll, pitch, throttle, yaw on X, Y, Z, Z rotate; switches from CH5.
pub const MAPPING: ChannelMapping = ChannelMapping {
    axes: [0, 1, 2, 3],
    slider: None,
    hat: None,
    first_switch: 4,
    switch_groups: default_button_groups(CHANNELS),
};

/// CRSF UART baud rate.
pub const CRSF_BAUDRATE: u32 = crsf_proto::CRSF_BAUDRATE_LOW;

/// USB identity (pid.codes test VID/PID).
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;
