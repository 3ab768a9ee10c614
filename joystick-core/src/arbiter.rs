//! Source arbitration between CRSF (primary) and SBUS (fallback).
//!
//! Once per scheduling tick the arbiter advances the latency buffer, applies
//! any CRSF link transition, and writes at most one fresh channel vector into
//! the newest slot: from CRSF while the link is up, otherwise from SBUS.
//! Sources are never blended. When neither source delivers, the previous
//! contents are held.

use crate::latency::LatencyBuffer;
use crate::types::{LinkState, Source};
use embedded_hal::digital::{OutputPin, PinState};

/// CRSF link transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    Up,
    Down,
}

/// CRSF receiver as seen by the arbiter.
///
/// Implementations queue decoder output between ticks; each call hands over
/// whatever arrived since the previous call.
pub trait CrsfProvider<const N: usize> {
    /// Next link transition, if one happened.
    fn poll_link(&mut self) -> Option<LinkEvent>;

    /// Latest fully decoded channel frame, if a new one arrived.
    fn take_channels(&mut self) -> Option<[u16; N]>;
}

/// One decoded SBUS frame with its status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SbusFrame<const N: usize> {
    pub channels: [u16; N],
    /// Receiver reports failsafe.
    pub failsafe: bool,
    /// Receiver reports a lost frame.
    pub frame_lost: bool,
}

/// SBUS receiver as seen by the arbiter.
pub trait SbusProvider<const N: usize> {
    /// Non-blocking poll for a decoded frame.
    fn read(&mut self) -> Option<SbusFrame<N>>;

    /// Drop any frame waiting to be read.
    ///
    /// Called on every tick CRSF is authoritative, so the first frame read
    /// after a failover arrived after the link went down.
    fn discard(&mut self) {}
}

/// Fresh data written during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SourceUpdate {
    pub source: Source,
    /// SBUS failsafe flag; always false for CRSF.
    pub failsafe: bool,
    /// SBUS frame-lost flag; always false for CRSF.
    pub frame_lost: bool,
}

/// What happened during one arbiter tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// Link transition applied this tick.
    pub link_event: Option<LinkEvent>,
    /// Set when a new vector was written this tick.
    pub update: Option<SourceUpdate>,
}

/// Decides which receiver feeds the channel store.
///
/// Owns the latency buffer (the channel store) and the status indicator pin,
/// which is driven high while the CRSF link is up.
pub struct SourceArbiter<C, S, P, const N: usize, const L: usize> {
    crsf: C,
    sbus: S,
    status: P,
    link: LinkState,
    source: Source,
    buffer: LatencyBuffer<N, L>,
}

impl<C, S, P, const N: usize, const L: usize> SourceArbiter<C, S, P, N, L>
where
    C: CrsfProvider<N>,
    S: SbusProvider<N>,
    P: OutputPin,
{
    /// Create an arbiter with the link down and a zeroed buffer.
    ///
    /// The status pin is driven low immediately.
    pub fn new(crsf: C, sbus: S, mut status: P) -> Self {
        status.set_low().ok();
        Self {
            crsf,
            sbus,
            status,
            link: LinkState::Down,
            source: Source::Crsf,
            buffer: LatencyBuffer::new(),
        }
    }

    /// Run one scheduling tick.
    pub fn tick(&mut self) -> TickOutcome {
        self.buffer.advance();

        let link_event = self.crsf.poll_link().and_then(|event| self.apply(event));

        let update = match self.link {
            LinkState::Up => {
                self.sbus.discard();
                self.crsf.take_channels().map(|channels| {
                    self.buffer.write(Source::Crsf, &channels);
                    self.source = Source::Crsf;
                    SourceUpdate {
                        source: Source::Crsf,
                        failsafe: false,
                        frame_lost: false,
                    }
                })
            }
            LinkState::Down => self.sbus.read().map(|frame| {
                // Failsafe frames are mapped like any other.
                self.buffer.write(Source::Sbus, &frame.channels);
                self.source = Source::Sbus;
                SourceUpdate {
                    source: Source::Sbus,
                    failsafe: frame.failsafe,
                    frame_lost: frame.frame_lost,
                }
            }),
        };

        TickOutcome { link_event, update }
    }

    /// Apply a reported transition; repeats of the current state are dropped.
    fn apply(&mut self, event: LinkEvent) -> Option<LinkEvent> {
        let next = match event {
            LinkEvent::Up => LinkState::Up,
            LinkEvent::Down => LinkState::Down,
        };
        if next == self.link {
            return None;
        }
        self.link = next;
        self.status.set_state(PinState::from(next.is_up())).ok();
        Some(event)
    }

    /// The vector due for mapping this tick.
    #[inline]
    #[must_use]
    pub fn ready(&self) -> &[u16; N] {
        self.buffer.ready()
    }

    /// Source that last wrote the channel store.
    #[inline]
    #[must_use]
    pub fn source(&self) -> Source {
        self.source
    }

    /// Source that wrote the vector due for mapping this tick.
    ///
    /// Differs from [`source`](Self::source) for up to `L` ticks after a
    /// failover.
    #[inline]
    #[must_use]
    pub fn ready_source(&self) -> Source {
        self.buffer.ready_source()
    }

    #[inline]
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.link
    }

    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &LatencyBuffer<N, L> {
        &self.buffer
    }

    pub fn crsf_mut(&mut self) -> &mut C {
        &mut self.crsf
    }

    pub fn sbus_mut(&mut self) -> &mut S {
        &mut self.sbus
    }

    /// Decompose the arbiter into its providers and status pin.
    pub fn into_parts(self) -> (C, S, P) {
        (self.crsf, self.sbus, self.status)
    }
}


#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    type Arbiter<const L: usize> = SourceArbiter<MockCrsf<4>, MockSbus<4>, MockPin, 4, L>;

    fn arbiter<const L: usize>(crsf: MockCrsf<4>, sbus: MockSbus<4>) -> (Arbiter<L>, MockPin) {
        let pin = MockPin::default();
        (SourceArbiter::new(crsf, sbus, pin.clone()), pin)
    }

    #[test]
    fn test_starts_down_with_status_low() {
        let (arbiter, pin) = arbiter::<0>(MockCrsf::default(), MockSbus::default());
        assert_eq!(arbiter.link_state(), LinkState::Down);
        assert_eq!(pin.last(), Some(false));
        assert_eq!(arbiter.ready(), &[0; 4]);
    }

    #[test]
    fn test_sbus_feeds_store_while_link_down() {
        let mut sbus = MockSbus::default();
        sbus.frames.push_back(Some(sbus_frame(1000)));
        let (mut arbiter, _) = arbiter::<0>(MockCrsf::default(), sbus);

        let outcome = arbiter.tick();
        assert_eq!(outcome.link_event, None);
        assert_eq!(outcome.update.map(|u| u.source), Some(Source::Sbus));
        assert_eq!(arbiter.ready(), &[1000; 4]);
        assert_eq!(arbiter.source(), Source::Sbus);
    }

    #[test]
    fn test_crsf_takes_priority_once_up() {
        let mut crsf = MockCrsf::default();
        crsf.events.push_back(Some(LinkEvent::Up));
        crsf.frames.push_back(Some([1500; 4]));
        let mut sbus = MockSbus::default();
        for _ in 0..4 {
            sbus.frames.push_back(Some(sbus_frame(200)));
        }
        let (mut arbiter, pin) = arbiter::<0>(crsf, sbus);

        let outcome = arbiter.tick();
        assert_eq!(outcome.link_event, Some(LinkEvent::Up));
        assert_eq!(pin.last(), Some(true));
        assert_eq!(arbiter.ready(), &[1500; 4]);

        // No CRSF data on the following ticks: SBUS must not take over.
        for _ in 0..3 {
            let outcome = arbiter.tick();
            assert_eq!(outcome.update, None);
            assert_eq!(arbiter.ready(), &[1500; 4]);
        }
        assert_eq!(arbiter.sbus_mut().reads, 0);
        assert_eq!(arbiter.source(), Source::Crsf);
    }

    #[test]
    fn test_sbus_backlog_discarded_while_crsf_up() {
        let mut crsf = MockCrsf::default();
        crsf.events.push_back(Some(LinkEvent::Up));
        crsf.events.extend([None, None]);
        crsf.events.push_back(Some(LinkEvent::Down));
        let mut sbus = MockSbus::default();
        sbus.frames.push_back(Some(sbus_frame(400)));
        let (mut arbiter, _) = arbiter::<0>(crsf, sbus);

        for _ in 0..3 {
            arbiter.tick();
        }
        assert_eq!(arbiter.sbus_mut().discards, 3);
        assert_eq!(arbiter.sbus_mut().reads, 0);

        // Link down: SBUS is read again, nothing discarded on that tick.
        let outcome = arbiter.tick();
        assert_eq!(outcome.update.map(|u| u.source), Some(Source::Sbus));
        assert_eq!(arbiter.sbus_mut().discards, 3);
        assert_eq!(arbiter.sbus_mut().reads, 1);
    }

    #[test]
    fn test_falls_back_to_sbus_after_link_down() {
        let mut crsf = MockCrsf::default();
        crsf.events.push_back(Some(LinkEvent::Up));
        crsf.events.push_back(Some(LinkEvent::Down));
        crsf.frames.push_back(Some([1500; 4]));
        let mut sbus = MockSbus::default();
        sbus.frames.push_back(Some(sbus_frame(300)));
        let (mut arbiter, pin) = arbiter::<0>(crsf, sbus);

        arbiter.tick();
        let outcome = arbiter.tick();
        assert_eq!(outcome.link_event, Some(LinkEvent::Down));
        assert_eq!(pin.last(), Some(false));
        assert_eq!(outcome.update.map(|u| u.source), Some(Source::Sbus));
        assert_eq!(arbiter.ready(), &[300; 4]);
    }

    #[test]
    fn test_repeated_events_fire_once() {
        let mut crsf = MockCrsf::default();
        crsf.events.push_back(Some(LinkEvent::Up));
        crsf.events.push_back(Some(LinkEvent::Up));
        crsf.events.push_back(Some(LinkEvent::Down));
        crsf.events.push_back(Some(LinkEvent::Down));
        let (mut arbiter, pin) = arbiter::<0>(crsf, MockSbus::default());

        let events: [Option<LinkEvent>; 4] = core::array::from_fn(|_| arbiter.tick().link_event);
        assert_eq!(
            events,
            [Some(LinkEvent::Up), None, Some(LinkEvent::Down), None]
        );
        // Initial low, one high, one low.
        assert_eq!(*pin.levels.lock().unwrap(), [false, true, false]);
    }

    #[test]
    fn test_stale_hold_without_data() {
        let mut sbus = MockSbus::default();
        sbus.frames.push_back(Some(sbus_frame(900)));
        let (mut arbiter, _) = arbiter::<0>(MockCrsf::default(), sbus);

        arbiter.tick();
        for _ in 0..10 {
            assert_eq!(arbiter.tick().update, None);
            assert_eq!(arbiter.ready(), &[900; 4]);
        }
    }

    #[test]
    fn test_failsafe_frames_are_written_and_flagged() {
        let mut sbus = MockSbus::default();
        sbus.frames.push_back(Some(SbusFrame {
            channels: [172; 4],
            failsafe: true,
            frame_lost: true,
        }));
        let (mut arbiter, _) = arbiter::<0>(MockCrsf::default(), sbus);

        let update = arbiter.tick().update.unwrap();
        assert!(update.failsafe);
        assert!(update.frame_lost);
        assert_eq!(arbiter.ready(), &[172; 4]);
    }

    #[test]
    fn test_latency_delays_ready_slot() {
        let mut crsf = MockCrsf::default();
        crsf.events.push_back(Some(LinkEvent::Up));
        crsf.frames.push_back(Some([1234; 4]));
        let (mut arbiter, _) = arbiter::<3>(crsf, MockSbus::default());

        for _ in 0..3 {
            arbiter.tick();
            assert_eq!(arbiter.ready(), &[0; 4]);
        }
        arbiter.tick();
        assert_eq!(arbiter.ready(), &[1234; 4]);
        assert_eq!(arbiter.buffer().newest(), &[1234; 4]);
    }
}
