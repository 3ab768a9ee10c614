//! CRSF/SBUS receiver to USB joystick bridge for RP2040.
//!
//! This crate provides the embedded implementation of the joystick bridge:
//! it reads channel data from a CRSF and an SBUS receiver and presents it
//! to the host as a USB HID joystick.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Decodes CRSF frames on UART1 and SBUS frames on UART0
//! 2. Picks CRSF while its link is up, SBUS otherwise
//! 3. Maps the channels to axes, switch buttons, slider and hat
//! 4. Sends USB HID joystick reports at a fixed cadence
//! 5. Sends a fake battery frame back over CRSF while the link is up
//!
//! # Hardware Configuration
//!
//! | Function  | GPIO | Description |
//! |-----------|------|-------------|
//! | UART1 TX  | 8    | CRSF telemetry to receiver |
//! | UART1 RX  | 9    | CRSF from receiver |
//! | UART0 RX  | 1    | SBUS from receiver (inverted in the pad) |
//! | LED       | 25   | On-board LED, lit while the CRSF link is up |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with four tasks on one
//! thread executor:
//!
//! - **USB Task**: Manages the USB device stack
//! - **CRSF Task**: Reads UART1, decodes RC frames, signals the latest channels
//! - **SBUS Task**: Reads UART0, decodes frames, signals the latest frame
//! - **Bridge Task**: Ticks the [`JoystickBridge`] every millisecond
//!
//! Reader tasks hand data to the bridge through Embassy's
//! [`Signal`](embassy_sync::signal::Signal) with "latest value wins"
//! semantics. Only the bridge task touches the channel store, so there is
//! no shared buffer to guard.
//!
//! # Modules
//!
//! - [`config`]: Compile-time tunables
//! - [`input`]: Receiver readers and the providers the bridge polls
//! - [`uplink`]: CRSF telemetry uplink ([`CrsfUplink`])
//! - [`usb_output`]: USB HID output ([`UsbHidOutput`], [`JoystickReport`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`sync-output`**: Send a report after every mapping cycle instead of on a fixed interval
//!
//! # Re-exports
//!
//! This crate re-exports the commonly used items from [`joystick_core`] for
//! convenience, so consumers only need to depend on this crate.

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features");

// Re-export core types for convenience
pub use joystick_core::{
    Axis, BridgeError, Buttons, ChannelMapping, Hat, JoystickBridge, JoystickState, LinkEvent,
    LinkState, OutputError, OutputMode, OutputPacer, OutputSink, SbusFrame, SourceArbiter,
    TelemetryError, TelemetrySink, TelemetrySynthesizer, TickOutcome,
};

pub mod config;
pub mod input;
pub mod uplink;
pub mod usb_output;

pub use input::{
    CrsfReader, CrsfSignal, CrsfSignalProvider, SbusReader, SbusSignal, SbusSignalProvider,
};
pub use uplink::CrsfUplink;
pub use usb_output::{
    configure_usb_hid, JoystickReport, JoystickWriter, UsbHidOutput, UsbStateHandler,
};
