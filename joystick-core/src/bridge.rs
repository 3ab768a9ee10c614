//! JoystickBridge: one scheduling tick from receivers to the HID sink.

use crate::arbiter::{CrsfProvider, LinkEvent, SbusProvider, SourceArbiter, TickOutcome};
use crate::mapping::{calibration_for, channels_to_joystick, ChannelMapping};
use crate::output::{OutputError, OutputSink};
use crate::pacer::OutputPacer;
use crate::telemetry::{TelemetryError, TelemetrySink, TelemetrySynthesizer};
use embedded_hal::digital::OutputPin;

/// Drives the whole pipeline, one tick at a time.
///
/// Within a tick the order is strict: the arbiter writes the channel store,
/// the mapper reads it, the pacer decides whether a report goes out, and the
/// telemetry schedule is serviced. The caller supplies the tick clock, so
/// nothing here touches a timer.
///
/// # Error Handling
///
/// Send failures are reported but never stop the pipeline; the next tick
/// proceeds with the best data available.
pub struct JoystickBridge<C, S, P, O, T, const N: usize, const L: usize> {
    arbiter: SourceArbiter<C, S, P, N, L>,
    mapping: ChannelMapping,
    pacer: OutputPacer,
    telemetry: TelemetrySynthesizer,
    output: O,
    uplink: T,
    last: TickOutcome,
}

impl<C, S, P, O, T, const N: usize, const L: usize> JoystickBridge<C, S, P, O, T, N, L>
where
    C: CrsfProvider<N>,
    S: SbusProvider<N>,
    P: OutputPin,
    O: OutputSink,
    T: TelemetrySink,
{
    /// Create a new bridge.
    pub fn new(
        arbiter: SourceArbiter<C, S, P, N, L>,
        mapping: ChannelMapping,
        pacer: OutputPacer,
        telemetry: TelemetrySynthesizer,
        output: O,
        uplink: T,
    ) -> Self {
        Self {
            arbiter,
            mapping,
            pacer,
            telemetry,
            output,
            uplink,
            last: TickOutcome::default(),
        }
    }

    /// Run one scheduling tick at time `now`.
    ///
    /// A mapping cycle runs whenever fresh data was written, and on every
    /// tick when a latency delay is configured (the ready slot moves even
    /// without input).
    ///
    /// Reports that come due while the sink is not ready are dropped
    /// without an error. The arbiter outcome is kept in
    /// [`last_outcome`](Self::last_outcome) even when a send fails.
    pub async fn tick(&mut self, now: u64) -> Result<TickOutcome, BridgeError> {
        let outcome = self.arbiter.tick();
        self.last = outcome;

        match outcome.link_event {
            Some(LinkEvent::Up) => self.telemetry.start(now),
            Some(LinkEvent::Down) => self.telemetry.stop(),
            None => {}
        }

        if outcome.update.is_some() || L > 0 {
            let calibration = calibration_for(self.arbiter.ready_source());
            let state = channels_to_joystick(self.arbiter.ready(), &calibration, &self.mapping);
            self.pacer.offer(state);
        }

        let sent = match self.pacer.poll(now) {
            Some(state) if self.output.is_ready() => {
                self.output.send(&state).await.map_err(BridgeError::Output)
            }
            _ => Ok(()),
        };

        let telemetry = match self.telemetry.poll(now) {
            Some(status) => self
                .uplink
                .send_telemetry(&status)
                .await
                .map_err(BridgeError::Telemetry),
            None => Ok(()),
        };

        sent.and(telemetry).map(|()| outcome)
    }

    /// What the arbiter did on the most recent tick.
    #[inline]
    #[must_use]
    pub fn last_outcome(&self) -> &TickOutcome {
        &self.last
    }

    /// Get a reference to the arbiter.
    pub fn arbiter(&self) -> &SourceArbiter<C, S, P, N, L> {
        &self.arbiter
    }

    /// Get a mutable reference to the arbiter.
    pub fn arbiter_mut(&mut self) -> &mut SourceArbiter<C, S, P, N, L> {
        &mut self.arbiter
    }

    /// Get a reference to the pacer.
    pub fn pacer(&self) -> &OutputPacer {
        &self.pacer
    }

    /// Get a reference to the telemetry schedule.
    pub fn telemetry(&self) -> &TelemetrySynthesizer {
        &self.telemetry
    }

    /// Get a reference to the output sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Get a mutable reference to the output sink.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Get a reference to the telemetry uplink.
    pub fn uplink(&self) -> &T {
        &self.uplink
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the output sink.
    Output(OutputError),
    /// Error from the telemetry uplink.
    Telemetry(TelemetryError),
}
