//! CRSF telemetry encoding.
//!
//! Frames a [`BatteryStatus`] as a CRSF battery sensor packet for the
//! uplink toward the transmitter.

use crc::{Crc, CRC_8_DVB_S2};
use joystick_core::{BatteryStatus, TelemetryError, BATTERY_PAYLOAD_SIZE};

/// Sync byte (flight controller address).
pub const CRSF_SYNC_BYTE: u8 = 0xC8;

/// Battery sensor frame type.
pub const CRSF_FRAMETYPE_BATTERY_SENSOR: u8 = 0x08;

/// Sync + length + type + payload + CRC.
pub const BATTERY_FRAME_SIZE: usize = BATTERY_PAYLOAD_SIZE + 4;

/// Maximum size for a CRSF telemetry frame.
pub const MAX_TELEMETRY_FRAME_SIZE: usize = 64;

/// CRC-8/DVB-S2 over frame type and payload.
const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_DVB_S2);

/// Encode a battery frame into `buf`.
///
/// The caller is responsible for transmitting the resulting bytes via UART.
///
/// # Returns
///
/// The number of bytes written to the buffer, or
/// [`TelemetryError::BufferFull`] when `buf` is too short.
pub fn encode_battery(status: &BatteryStatus, buf: &mut [u8]) -> Result<usize, TelemetryError> {
    let frame = buf
        .get_mut(..BATTERY_FRAME_SIZE)
        .ok_or(TelemetryError::BufferFull)?;

    frame[0] = CRSF_SYNC_BYTE;
    // Length counts type, payload and CRC.
    frame[1] = (BATTERY_PAYLOAD_SIZE + 2) as u8;
    frame[2] = CRSF_FRAMETYPE_BATTERY_SENSOR;
    frame[3..3 + BATTERY_PAYLOAD_SIZE].copy_from_slice(&status.to_payload());
    frame[BATTERY_FRAME_SIZE - 1] = CRC8.checksum(&frame[2..BATTERY_FRAME_SIZE - 1]);

    Ok(BATTERY_FRAME_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use joystick_core::FAKE_BATTERY;

    #[test]
    fn test_battery_frame_layout() {
        let mut buf = [0u8; MAX_TELEMETRY_FRAME_SIZE];
        let len = encode_battery(&FAKE_BATTERY, &mut buf).unwrap();
        assert_eq!(len, 12);
        assert_eq!(&buf[..11], &[0xC8, 10, 0x08, 0, 50, 0, 0, 0, 0, 0, 100]);
    }

    #[test]
    fn test_battery_frame_crc() {
        let mut buf = [0u8; BATTERY_FRAME_SIZE];
        encode_battery(&FAKE_BATTERY, &mut buf).unwrap();
        let expected = CRC8.checksum(&[0x08, 0, 50, 0, 0, 0, 0, 0, 100]);
        assert_eq!(buf[11], expected);
        // Re-running the CRC over type, payload and CRC yields zero.
        assert_eq!(CRC8.checksum(&buf[2..]), 0);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buf = [0u8; BATTERY_FRAME_SIZE - 1];
        assert_eq!(
            encode_battery(&FAKE_BATTERY, &mut buf),
            Err(TelemetryError::BufferFull)
        );
    }
}
