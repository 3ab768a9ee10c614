//! Platform-agnostic RC-receiver-to-joystick pipeline.
//!
//! This crate holds everything between the receiver decoders and the USB
//! HID endpoint without any platform-specific dependencies. It can be used
//! both in embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`types`]: Core data structures ([`JoystickState`], [`Buttons`], [`Hat`])
//! - [`latency`]: Latency emulation ring ([`LatencyBuffer`])
//! - [`arbiter`]: CRSF/SBUS source selection ([`SourceArbiter`])
//! - [`mapping`]: Channel rescaling and switch decomposition ([`channels_to_joystick`])
//! - [`pacer`]: Output cadence ([`OutputPacer`])
//! - [`telemetry`]: Fake battery telemetry ([`TelemetrySynthesizer`])
//! - [`output`]: Output sink trait ([`OutputSink`])
//! - [`bridge`]: One scheduling tick from receivers to sink ([`JoystickBridge`])
//!
//! # Data flow
//!
//! ```text
//! CRSF ─┐
//!       ├─> SourceArbiter ─> LatencyBuffer ─> channels_to_joystick ─> OutputPacer ─> OutputSink
//! SBUS ─┘         │
//!                 └─ link up/down ─> status pin, TelemetrySynthesizer ─> TelemetrySink
//! ```
//!
//! # Example
//!
//! ```rust
//! use joystick_core::{channels_to_joystick, Axis, CRSF_CALIBRATION, DEFAULT_MAPPING};
//!
//! let mut channels = [1500u16; 16];
//! channels[0] = 988;
//! channels[4] = 988;
//!
//! let state = channels_to_joystick(&channels, &CRSF_CALIBRATION, &DEFAULT_MAPPING);
//! assert_eq!(state.axis(Axis::X), 0);
//! assert!(state.button(0));
//! assert!(!state.button(1));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod arbiter;
pub mod bridge;
pub mod latency;
pub mod mapping;
pub mod output;
pub mod pacer;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use arbiter::{
    CrsfProvider, LinkEvent, SbusFrame, SbusProvider, SourceArbiter, SourceUpdate, TickOutcome,
};
pub use bridge::{BridgeError, JoystickBridge};
pub use latency::{LatencyBuffer, MAX_LATENCY_STEPS};
pub use mapping::{
    calibration_for, channels_to_joystick, default_button_groups, hat_from_position, map,
    switch_position, tri_state, Calibration, ChannelMapping, AXIS_MAX, AXIS_MIN,
    CRSF_CALIBRATION, DEFAULT_MAPPING, HAT_TABLE, MAX_BUTTON_GROUPS, SBUS_CALIBRATION, SBUS_MAX,
    SBUS_MIN, US_MAX, US_MIN,
};
pub use output::{OutputError, OutputSink};
pub use pacer::{OutputMode, OutputPacer};
pub use telemetry::{
    BatteryStatus, TelemetryError, TelemetrySink, TelemetrySynthesizer, BATTERY_PAYLOAD_SIZE,
    FAKE_BATTERY,
};
pub use types::{Axis, Buttons, Channels, Hat, JoystickState, LinkState, Source, MAX_BUTTONS, MAX_CHANNELS};
