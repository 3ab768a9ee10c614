//! CRSF telemetry uplink.

use crsf_proto::{encode_battery, MAX_TELEMETRY_FRAME_SIZE};
use embassy_rp::uart::{Async, UartTx};
use joystick_core::{BatteryStatus, TelemetryError, TelemetrySink};

/// Sends telemetry frames on the TX half of the CRSF UART.
pub struct CrsfUplink<'d> {
    tx: UartTx<'d, Async>,
    buf: [u8; MAX_TELEMETRY_FRAME_SIZE],
}

impl<'d> CrsfUplink<'d> {
    #[must_use]
    pub fn new(tx: UartTx<'d, Async>) -> Self {
        Self {
            tx,
            buf: [0; MAX_TELEMETRY_FRAME_SIZE],
        }
    }
}

impl TelemetrySink for CrsfUplink<'_> {
    async fn send_telemetry(&mut self, status: &BatteryStatus) -> Result<(), TelemetryError> {
        let len = encode_battery(status, &mut self.buf)?;
        self.tx
            .write(&self.buf[..len])
            .await
            .map_err(|_| TelemetryError::Io)
    }
}
