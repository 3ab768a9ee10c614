//! CRSF receiver decoding, link detection and telemetry framing.
//!
//! This crate provides the chip-agnostic pieces of the CRSF side of the
//! joystick bridge. It is designed to be used with any async UART
//! implementation.
//!
//! # Features
//!
//! - Parse CRSF RC channel packets via `uf-crsf`
//! - Convert raw 11-bit channel values to microseconds
//! - Link-up / link-down detection from frame arrival times
//! - Battery sensor frame encoding for the telemetry uplink
//! - No chip-specific dependencies - works on any platform
//! - Fully testable on host
//!
//! # Example
//!
//! ```ignore
//! use crsf_proto::{CrsfDecoder, LinkMonitor};
//!
//! let mut decoder = CrsfDecoder::new();
//! let mut link = LinkMonitor::new();
//!
//! // Feed bytes from UART
//! for byte in uart_bytes {
//!     if let Some(channels_us) = decoder.push_byte(byte) {
//!         link.on_channels(now_ms);
//!         // Hand channels_us to the arbiter...
//!     }
//! }
//! if let Some(event) = link.poll(now_ms) {
//!     // LinkEvent::Up / LinkEvent::Down
//! }
//! ```
//!
//! # UART Configuration
//!
//! CRSF uses 8N1:
//! - Baud rate: 420000 (ExpressLRS), 416666 (TBS Crossfire), or 115200
//!   on receivers configured for it
//! - Data bits: 8
//! - Parity: None
//! - Stop bits: 1

#![cfg_attr(not(feature = "std"), no_std)]

pub mod channels;
pub mod decoder;
pub mod link;
pub mod telemetry;

pub use channels::{
    channels_to_us, crsf_to_us, CRSF_CHANNEL_VALUE_1000, CRSF_CHANNEL_VALUE_2000,
    CRSF_CHANNEL_VALUE_MAX, CRSF_CHANNEL_VALUE_MIN, CRSF_CHANNELS,
};
pub use decoder::CrsfDecoder;
pub use link::{LinkMonitor, LINK_TIMEOUT_MS};
pub use telemetry::{
    encode_battery, BATTERY_FRAME_SIZE, CRSF_FRAMETYPE_BATTERY_SENSOR, CRSF_SYNC_BYTE,
    MAX_TELEMETRY_FRAME_SIZE,
};

// Re-export uf_crsf types that users will need
pub use uf_crsf::packets::Packet;
pub use uf_crsf::parser::CrsfParser;

/// CRSF baud rate for ExpressLRS receivers.
pub const CRSF_BAUDRATE_ELRS: u32 = 420_000;

/// CRSF baud rate for TBS Crossfire receivers.
pub const CRSF_BAUDRATE_TBS: u32 = 416_666;

/// Reduced CRSF baud rate some receivers are configured for.
pub const CRSF_BAUDRATE_LOW: u32 = 115_200;
