//! CRSF receiver input.
//!
//! [`CrsfReader`] decodes RC channel frames from UART and signals them.
//! [`CrsfSignalProvider`] picks them up on the bridge side and tracks the
//! link with a [`LinkMonitor`].

use super::CrsfSignal;
use crsf_proto::{CrsfDecoder, LinkMonitor, CRSF_CHANNELS};
use defmt::{debug, warn};
use embassy_rp::uart::{Async, UartRx};
use embassy_time::Instant;
use joystick_core::{CrsfProvider, LinkEvent};

/// Reads the CRSF UART and publishes every RC frame.
pub struct CrsfReader<'d> {
    /// UART receiver configured for the receiver's CRSF baud rate.
    rx: UartRx<'d, Async>,
    decoder: CrsfDecoder,
}

impl<'d> CrsfReader<'d> {
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            decoder: CrsfDecoder::new(),
        }
    }

    /// Read forever, signalling each decoded frame.
    pub async fn run(&mut self, signal: &CrsfSignal) -> ! {
        let mut byte_buf = [0u8; 1];

        loop {
            if let Err(e) = self.rx.read(&mut byte_buf).await {
                // Overrun or framing error; the decoder resyncs on its own.
                warn!("CRSF UART error: {:?}", e);
                continue;
            }

            let errors = self.decoder.errors();
            if let Some(channels) = self.decoder.push_byte(byte_buf[0]) {
                signal.signal(channels);
            }
            if self.decoder.errors() != errors {
                debug!(
                    "CRSF parse error ({} errors, {} frames)",
                    self.decoder.errors(),
                    self.decoder.frames()
                );
            }
        }
    }
}

/// Bridge-side view of the CRSF receiver.
pub struct CrsfSignalProvider {
    signal: &'static CrsfSignal,
    link: LinkMonitor,
    pending: Option<[u16; CRSF_CHANNELS]>,
}

impl CrsfSignalProvider {
    #[must_use]
    pub const fn new(signal: &'static CrsfSignal) -> Self {
        Self::with_monitor(signal, LinkMonitor::new())
    }

    #[must_use]
    pub const fn with_monitor(signal: &'static CrsfSignal, link: LinkMonitor) -> Self {
        Self {
            signal,
            link,
            pending: None,
        }
    }
}

impl CrsfProvider<CRSF_CHANNELS> for CrsfSignalProvider {
    fn poll_link(&mut self) -> Option<LinkEvent> {
        let now = Instant::now().as_millis();
        if let Some(channels) = self.signal.try_take() {
            self.link.on_channels(now);
            self.pending = Some(channels);
        }
        self.link.poll(now)
    }

    fn take_channels(&mut self) -> Option<[u16; CRSF_CHANNELS]> {
        self.pending.take()
    }
}
