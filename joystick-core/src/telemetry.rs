//! Battery telemetry synthesis for the CRSF uplink.
//!
//! No battery is measured. While the CRSF link is up a fixed battery
//! status is handed to the uplink once per interval so the transmitter's
//! telemetry screen stays populated.

use core::future::Future;

/// Size of the CRSF battery sensor payload.
pub const BATTERY_PAYLOAD_SIZE: usize = 8;

/// Battery sensor reading in CRSF units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryStatus {
    /// Voltage in 0.1 V.
    pub voltage_dv: u16,
    /// Current in 0.1 A.
    pub current_da: u16,
    /// Used capacity in mAh (24-bit on the wire).
    pub capacity_mah: u32,
    /// Remaining capacity percentage (0-100).
    pub remaining_pct: u8,
}

/// 5.0 V, no current draw, nothing used, full.
pub const FAKE_BATTERY: BatteryStatus = BatteryStatus {
    voltage_dv: 50,
    current_da: 0,
    capacity_mah: 0,
    remaining_pct: 100,
};

impl BatteryStatus {
    /// Big-endian payload: voltage(2) current(2) capacity(3) remaining(1).
    #[must_use]
    pub fn to_payload(&self) -> [u8; BATTERY_PAYLOAD_SIZE] {
        let [v0, v1] = self.voltage_dv.to_be_bytes();
        let [c0, c1] = self.current_da.to_be_bytes();
        let [_, cap0, cap1, cap2] = self.capacity_mah.to_be_bytes();
        [v0, v1, c0, c1, cap0, cap1, cap2, self.remaining_pct]
    }
}

/// Error type for telemetry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// Telemetry not supported by this protocol/transport.
    NotSupported,
    /// I/O error during transmission.
    Io,
    /// Transmit buffer is full.
    BufferFull,
}

/// Outbound path toward the transmitter.
pub trait TelemetrySink {
    /// Send one battery frame.
    fn send_telemetry(
        &mut self,
        status: &BatteryStatus,
    ) -> impl Future<Output = Result<(), TelemetryError>>;
}

/// Periodic battery frame schedule, running only while the link is up.
#[derive(Debug, Clone)]
pub struct TelemetrySynthesizer {
    interval: u64,
    status: BatteryStatus,
    next_due: Option<u64>,
}

impl TelemetrySynthesizer {
    /// Intervals below one tick are raised to one.
    #[must_use]
    pub const fn new(interval: u64, status: BatteryStatus) -> Self {
        Self {
            interval: if interval == 0 { 1 } else { interval },
            status,
            next_due: None,
        }
    }

    /// Begin emitting; the first frame is due one interval after `now`.
    pub fn start(&mut self, now: u64) {
        self.next_due = Some(now + self.interval);
    }

    /// Cancel the schedule. Nothing is emitted until the next [`start`](Self::start).
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Return a frame if one is due at `now`.
    pub fn poll(&mut self, now: u64) -> Option<BatteryStatus> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(if now - due >= self.interval {
            now + self.interval
        } else {
            due + self.interval
        });
        Some(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_battery_payload() {
        assert_eq!(FAKE_BATTERY.to_payload(), [0, 50, 0, 0, 0, 0, 0, 100]);
    }

    #[test]
    fn test_payload_byte_order() {
        let status = BatteryStatus {
            voltage_dv: 0x0102,
            current_da: 0x0304,
            capacity_mah: 0x0005_0607,
            remaining_pct: 42,
        };
        assert_eq!(status.to_payload(), [1, 2, 3, 4, 5, 6, 7, 42]);
    }

    #[test]
    fn test_silent_until_started() {
        let mut synth = TelemetrySynthesizer::new(500, FAKE_BATTERY);
        assert!(!synth.is_running());
        for now in (0..5000).step_by(100) {
            assert_eq!(synth.poll(now), None);
        }
    }

    #[test]
    fn test_one_frame_per_interval() {
        let mut synth = TelemetrySynthesizer::new(500, FAKE_BATTERY);
        synth.start(1000);
        let frames = (1000..3001).filter(|&now| synth.poll(now).is_some()).count();
        // Due at 1500, 2000, 2500, 3000.
        assert_eq!(frames, 4);
    }

    #[test]
    fn test_stop_cancels_schedule() {
        let mut synth = TelemetrySynthesizer::new(500, FAKE_BATTERY);
        synth.start(0);
        assert_eq!(synth.poll(500), Some(FAKE_BATTERY));
        synth.stop();
        assert!(!synth.is_running());
        assert_eq!(synth.poll(1000), None);
        assert_eq!(synth.poll(10_000), None);
    }

    #[test]
    fn test_restart_after_stop() {
        let mut synth = TelemetrySynthesizer::new(500, FAKE_BATTERY);
        synth.start(0);
        synth.stop();
        synth.start(2000);
        assert_eq!(synth.poll(2499), None);
        assert_eq!(synth.poll(2500), Some(FAKE_BATTERY));
    }
}
