//! Raw CRSF channel values to microseconds.
//!
//! CRSF carries 16 channels with 11-bit resolution. Values 191 and 1792
//! correspond to 1000 µs and 2000 µs; the usable span reaches a little
//! further on either side (172-1811).

/// Channels per RC frame.
pub const CRSF_CHANNELS: usize = 16;

/// Raw value for 1000 µs.
pub const CRSF_CHANNEL_VALUE_1000: u16 = 191;

/// Raw value for 2000 µs.
pub const CRSF_CHANNEL_VALUE_2000: u16 = 1792;

/// Lowest raw value sent by ExpressLRS/Crossfire (about 988 µs).
pub const CRSF_CHANNEL_VALUE_MIN: u16 = 172;

/// Highest raw value sent by ExpressLRS/Crossfire (about 2012 µs).
pub const CRSF_CHANNEL_VALUE_MAX: u16 = 1811;

/// Convert a raw 11-bit channel value to microseconds.
#[inline]
#[must_use]
pub fn crsf_to_us(raw: u16) -> u16 {
    let span_raw = i32::from(CRSF_CHANNEL_VALUE_2000 - CRSF_CHANNEL_VALUE_1000);
    let us = (i32::from(raw) - i32::from(CRSF_CHANNEL_VALUE_1000)) * 1000 / span_raw + 1000;
    us.clamp(0, i32::from(u16::MAX)) as u16
}

/// Convert a full RC frame to microseconds.
#[must_use]
pub fn channels_to_us(raw: &[u16; CRSF_CHANNELS]) -> [u16; CRSF_CHANNELS] {
    raw.map(crsf_to_us)
}
