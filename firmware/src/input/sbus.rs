//! SBUS receiver input.

use super::SbusSignal;
use defmt::{debug, warn};
use embassy_rp::uart::{Async, Config as UartConfig, Parity, StopBits, UartRx};
use joystick_core::{SbusFrame, SbusProvider};
use sbus_proto::{SbusDecoder, SBUS_BAUDRATE, SBUS_CHANNELS};

/// UART settings for SBUS: 100000 baud, 8E2, inverted line.
#[must_use]
pub fn sbus_uart_config() -> UartConfig {
    let mut config = UartConfig::default();
    config.baudrate = SBUS_BAUDRATE;
    config.parity = Parity::ParityEven;
    config.stop_bits = StopBits::STOP2;
    config.invert_rx = true;
    config
}

/// Reads the SBUS UART and publishes every frame, failsafe ones included.
pub struct SbusReader<'d> {
    rx: UartRx<'d, Async>,
    decoder: SbusDecoder,
}

impl<'d> SbusReader<'d> {
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            decoder: SbusDecoder::new(),
        }
    }

    /// Read forever, signalling each decoded frame.
    pub async fn run(&mut self, signal: &SbusSignal) -> ! {
        let mut byte_buf = [0u8; 1];

        loop {
            if let Err(e) = self.rx.read(&mut byte_buf).await {
                warn!("SBUS UART error: {:?}", e);
                continue;
            }

            let errors = self.decoder.errors();
            if let Some(frame) = self.decoder.push_byte(byte_buf[0]) {
                signal.signal(frame);
            }
            if self.decoder.errors() != errors {
                debug!(
                    "SBUS parse error ({} errors, {} frames)",
                    self.decoder.errors(),
                    self.decoder.frames()
                );
            }
        }
    }
}

/// Bridge-side view of the SBUS receiver.
pub struct SbusSignalProvider {
    signal: &'static SbusSignal,
}

impl SbusSignalProvider {
    #[must_use]
    pub const fn new(signal: &'static SbusSignal) -> Self {
        Self { signal }
    }
}

impl SbusProvider<SBUS_CHANNELS> for SbusSignalProvider {
    fn read(&mut self) -> Option<SbusFrame<SBUS_CHANNELS>> {
        self.signal.try_take()
    }

    fn discard(&mut self) {
        self.signal.reset();
    }
}
