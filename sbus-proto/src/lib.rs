//! SBUS receiver decoding.
//!
//! This crate turns the SBUS byte stream into [`SbusFrame`]s for the
//! source arbiter. Frame parsing is done by `sbus-rs`; the failsafe and
//! frame-lost flags are passed through untouched so the caller decides
//! what to do with them.
//!
//! # Example
//!
//! ```ignore
//! use sbus_proto::SbusDecoder;
//!
//! let mut decoder = SbusDecoder::new();
//! for byte in uart_bytes {
//!     if let Some(frame) = decoder.push_byte(byte) {
//!         // frame.channels, frame.failsafe, frame.frame_lost
//!     }
//! }
//! ```
//!
//! # UART Configuration
//!
//! SBUS is an inverted serial signal:
//! - Baud rate: 100000
//! - Data bits: 8
//! - Parity: Even
//! - Stop bits: 2
//! - RX inverted (at the pad or with an external inverter)

#![cfg_attr(not(feature = "std"), no_std)]

pub use joystick_core::SbusFrame;
use sbus_rs::StreamingParser;

/// SBUS baud rate.
pub const SBUS_BAUDRATE: u32 = 100_000;

/// Channels per SBUS frame.
pub const SBUS_CHANNELS: usize = 16;

/// Bytes per SBUS frame.
pub const SBUS_FRAME_SIZE: usize = 25;

/// SBUS frame decoder fed one byte at a time.
pub struct SbusDecoder {
    parser: StreamingParser,
    frames: u32,
    errors: u32,
}

impl SbusDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: StreamingParser::new(),
            frames: 0,
            errors: 0,
        }
    }

    /// Feed one byte; returns a frame when one completes.
    pub fn push_byte(&mut self, byte: u8) -> Option<SbusFrame<SBUS_CHANNELS>> {
        match self.parser.push_byte(byte) {
            Ok(Some(packet)) => {
                self.frames = self.frames.wrapping_add(1);
                Some(SbusFrame {
                    channels: packet.channels,
                    failsafe: packet.flags.failsafe,
                    frame_lost: packet.flags.frame_lost,
                })
            }
            Ok(None) => None,
            Err(_) => {
                // The streaming parser resyncs on its own.
                self.errors = self.errors.wrapping_add(1);
                None
            }
        }
    }

    /// Frames decoded so far.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Parse errors seen so far.
    #[inline]
    #[must_use]
    pub fn errors(&self) -> u32 {
        self.errors
    }
}

impl Default for SbusDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    const FLAG_FRAME_LOST: u8 = 0x04;
    const FLAG_FAILSAFE: u8 = 0x08;

    // Header, 16 channels of 11 bits LSB first, flags, footer.
    fn sbus_bytes(channels: &[u16; SBUS_CHANNELS], flags: u8) -> [u8; SBUS_FRAME_SIZE] {
        let mut frame = [0u8; SBUS_FRAME_SIZE];
        frame[0] = 0x0F;
        let mut bit = 0;
        for &ch in channels {
            for i in 0..11 {
                if ch & (1 << i) != 0 {
                    frame[1 + bit / 8] |= 1 << (bit % 8);
                }
                bit += 1;
            }
        }
        frame[23] = flags;
        frame[24] = 0x00;
        frame
    }

    fn decode_all(
        decoder: &mut SbusDecoder,
        frames: &[[u8; SBUS_FRAME_SIZE]],
    ) -> Vec<SbusFrame<SBUS_CHANNELS>> {
        frames
            .iter()
            .flatten()
            .filter_map(|&byte| decoder.push_byte(byte))
            .collect()
    }

    fn ramp() -> [u16; SBUS_CHANNELS] {
        let mut channels = [0u16; SBUS_CHANNELS];
        for (i, ch) in channels.iter_mut().enumerate() {
            *ch = 172 + i as u16 * 100;
        }
        channels
    }

    #[test]
    fn test_decodes_channels_and_flags() {
        let channels = ramp();
        let mut decoder = SbusDecoder::new();
        // A trailing frame lets a parser that waits for the next header
        // release the first two.
        let decoded = decode_all(
            &mut decoder,
            &[
                sbus_bytes(&channels, FLAG_FAILSAFE | FLAG_FRAME_LOST),
                sbus_bytes(&channels, 0x00),
                sbus_bytes(&channels, 0x00),
            ],
        );

        assert!(decoded.len() >= 2);
        assert_eq!(decoded[0].channels, channels);
        assert!(decoded[0].failsafe);
        assert!(decoded[0].frame_lost);
        assert_eq!(decoded[1].channels, channels);
        assert!(!decoded[1].failsafe);
        assert!(!decoded[1].frame_lost);
        assert_eq!(decoder.frames(), decoded.len() as u32);
    }

    #[test]
    fn test_flags_reported_independently() {
        let channels = [992u16; SBUS_CHANNELS];
        let mut decoder = SbusDecoder::new();
        let decoded = decode_all(
            &mut decoder,
            &[
                sbus_bytes(&channels, FLAG_FRAME_LOST),
                sbus_bytes(&channels, FLAG_FAILSAFE),
                sbus_bytes(&channels, 0x00),
            ],
        );

        assert!(decoded.len() >= 2);
        assert!(decoded[0].frame_lost && !decoded[0].failsafe);
        assert!(decoded[1].failsafe && !decoded[1].frame_lost);
    }

    #[test]
    fn test_no_frame_without_header() {
        let mut decoder = SbusDecoder::new();
        for _ in 0..(SBUS_FRAME_SIZE * 4) {
            assert_eq!(decoder.push_byte(0xFF), None);
        }
        assert_eq!(decoder.frames(), 0);
    }

    #[test]
    fn test_partial_frame_yields_nothing() {
        let mut decoder = SbusDecoder::new();
        assert_eq!(decoder.push_byte(0x0F), None);
        for _ in 0..10 {
            assert_eq!(decoder.push_byte(0x00), None);
        }
        assert_eq!(decoder.frames(), 0);
    }
}
