//! Byte-stream CRSF decoder.
//!
//! Wraps the `uf-crsf` parser and keeps only RC channel packets, converted
//! to microseconds. Other packet types are dropped.

use crate::channels::{channels_to_us, CRSF_CHANNELS};
use uf_crsf::packets::Packet;
use uf_crsf::parser::CrsfParser;

/// CRSF frame decoder fed one byte at a time.
pub struct CrsfDecoder {
    parser: CrsfParser,
    frames: u32,
    errors: u32,
}

impl CrsfDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: CrsfParser::new(),
            frames: 0,
            errors: 0,
        }
    }

    /// Feed one byte; returns channels in microseconds when an RC frame completes.
    pub fn push_byte(&mut self, byte: u8) -> Option<[u16; CRSF_CHANNELS]> {
        match self.parser.push_byte(byte) {
            Ok(Some(Packet::RCChannels(rc))) => {
                self.frames = self.frames.wrapping_add(1);
                Some(channels_to_us(&rc.0))
            }
            // Link statistics, telemetry echoes, etc.
            Ok(Some(_)) | Ok(None) => None,
            Err(_) => {
                // Resync on the next sync byte.
                self.errors = self.errors.wrapping_add(1);
                self.parser.reset();
                None
            }
        }
    }

    /// RC frames decoded so far.
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

impl Default for CrsfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::CRSF_SYNC_BYTE;
    use crc::{Crc, CRC_8_DVB_S2};

    const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_DVB_S2);
    const FRAMETYPE_LINK_STATISTICS: u8 = 0x14;
    const FRAMETYPE_RC_CHANNELS_PACKED: u8 = 0x16;

    // 16 channels, 11 bits each, LSB first.
    fn pack_channels(channels: &[u16; CRSF_CHANNELS]) -> [u8; 22] {
        let mut out = [0u8; 22];
        let mut bit = 0;
        for &ch in channels {
            for i in 0..11 {
                if ch & (1 << i) != 0 {
                    out[bit / 8] |= 1 << (bit % 8);
                }
                bit += 1;
            }
        }
        out
    }

    // Writes sync, length, type, payload and CRC into `buf`; returns the length.
    fn frame(frame_type: u8, payload: &[u8], buf: &mut [u8; 64]) -> usize {
        let len = payload.len() + 4;
        buf[0] = CRSF_SYNC_BYTE;
        buf[1] = (payload.len() + 2) as u8;
        buf[2] = frame_type;
        buf[3..3 + payload.len()].copy_from_slice(payload);
        buf[len - 1] = CRC8.checksum(&buf[2..len - 1]);
        len
    }

    fn rc_frame(channels: &[u16; CRSF_CHANNELS], buf: &mut [u8; 64]) -> usize {
        frame(FRAMETYPE_RC_CHANNELS_PACKED, &pack_channels(channels), buf)
    }

    fn feed(decoder: &mut CrsfDecoder, bytes: &[u8]) -> Option<[u16; CRSF_CHANNELS]> {
        let mut last = None;
        for &byte in bytes {
            if let Some(channels) = decoder.push_byte(byte) {
                last = Some(channels);
            }
        }
        last
    }

    #[test]
    fn test_rc_frame_decodes_to_microseconds() {
        let mut raw = [992u16; CRSF_CHANNELS];
        raw[0] = 172;
        raw[1] = 1811;
        let mut buf = [0u8; 64];
        let len = rc_frame(&raw, &mut buf);

        let mut decoder = CrsfDecoder::new();
        let channels = feed(&mut decoder, &buf[..len]).unwrap();
        assert_eq!(channels[0], 989);
        assert_eq!(channels[1], 2011);
        assert_eq!(channels[2], 1500);
        assert_eq!(decoder.frames(), 1);
    }

    #[test]
    fn test_only_completes_on_last_byte() {
        let mut buf = [0u8; 64];
        let len = rc_frame(&[992; CRSF_CHANNELS], &mut buf);

        let mut decoder = CrsfDecoder::new();
        assert_eq!(feed(&mut decoder, &buf[..len - 1]), None);
        assert!(decoder.push_byte(buf[len - 1]).is_some());
    }

    #[test]
    fn test_link_statistics_dropped() {
        let mut buf = [0u8; 64];
        let stats = [0x50, 0, 100, 10, 0, 4, 2, 0x50, 100, 8];
        let len = frame(FRAMETYPE_LINK_STATISTICS, &stats, &mut buf);

        let mut decoder = CrsfDecoder::new();
        assert_eq!(feed(&mut decoder, &buf[..len]), None);
        assert_eq!(decoder.frames(), 0);

        // The stream stays in sync for the next RC frame.
        let len = rc_frame(&[1811; CRSF_CHANNELS], &mut buf);
        assert_eq!(feed(&mut decoder, &buf[..len]), Some([2011; CRSF_CHANNELS]));
    }

    #[test]
    fn test_bad_crc_rejected_then_resyncs() {
        let mut buf = [0u8; 64];
        let len = rc_frame(&[172; CRSF_CHANNELS], &mut buf);
        buf[len - 1] ^= 0xFF;

        let mut decoder = CrsfDecoder::new();
        assert_eq!(feed(&mut decoder, &buf[..len]), None);
        assert_eq!(decoder.frames(), 0);

        let len = rc_frame(&[992; CRSF_CHANNELS], &mut buf);
        assert_eq!(feed(&mut decoder, &buf[..len]), Some([1500; CRSF_CHANNELS]));
        assert_eq!(decoder.frames(), 1);
    }
}
