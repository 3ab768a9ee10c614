//! Output pacing.
//!
//! Decouples report emission from input arrival. In synchronous mode every
//! mapping cycle is emitted on the next poll. In paced mode the latest
//! mapped state is held and re-emitted once per interval, whether or not
//! anything changed; intermediate states are overwritten, never queued.

use crate::types::JoystickState;

/// Emission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    /// Emit right after each mapping cycle.
    Synchronous,
    /// Emit the latest state every `interval` ticks.
    Paced { interval: u64 },
}

impl OutputMode {
    /// Paced mode; intervals below one tick are raised to one.
    #[must_use]
    pub const fn paced(interval: u64) -> Self {
        OutputMode::Paced {
            interval: if interval == 0 { 1 } else { interval },
        }
    }
}

/// Holds mapped output until it is due.
#[derive(Debug, Clone)]
pub struct OutputPacer {
    mode: OutputMode,
    latest: Option<JoystickState>,
    fresh: bool,
    next_due: u64,
}

impl OutputPacer {
    #[must_use]
    pub const fn new(mode: OutputMode) -> Self {
        let mode = match mode {
            OutputMode::Paced { interval } => OutputMode::paced(interval),
            OutputMode::Synchronous => OutputMode::Synchronous,
        };
        Self {
            mode,
            latest: None,
            fresh: false,
            next_due: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Hand over the result of a mapping cycle, replacing any held state.
    #[inline]
    pub fn offer(&mut self, state: JoystickState) {
        self.latest = Some(state);
        self.fresh = true;
    }

    /// The state currently held for emission.
    #[inline]
    #[must_use]
    pub fn latest(&self) -> Option<&JoystickState> {
        self.latest.as_ref()
    }

    /// Return the state to emit at `now`, if one is due.
    pub fn poll(&mut self, now: u64) -> Option<JoystickState> {
        match self.mode {
            OutputMode::Synchronous => {
                if !self.fresh {
                    return None;
                }
                self.fresh = false;
                self.latest
            }
            OutputMode::Paced { interval } => {
                let state = self.latest?;
                if now < self.next_due {
                    return None;
                }
                // Fell behind by more than one interval: restart the schedule
                // instead of bursting.
                self.next_due = if now - self.next_due >= interval {
                    now + interval
                } else {
                    self.next_due + interval
                };
                self.fresh = false;
                Some(state)
            }
        }
    }
}
