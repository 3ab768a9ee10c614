//! CRSF link detection.
//!
//! The link is up while RC channel frames keep arriving and goes down once
//! none has been seen for [`LINK_TIMEOUT_MS`]. Each transition is reported
//! exactly once.

use joystick_core::LinkEvent;

/// Silence after which the link is reported down.
pub const LINK_TIMEOUT_MS: u64 = 300;

/// Tracks RC frame arrival and turns it into link events.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkMonitor {
    timeout_ms: u64,
    last_frame_ms: Option<u64>,
    up: bool,
}

impl LinkMonitor {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_timeout(LINK_TIMEOUT_MS)
    }

    #[must_use]
    pub const fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            last_frame_ms: None,
            up: false,
        }
    }

    /// Record an RC channels frame received at `now_ms`.
    #[inline]
    pub fn on_channels(&mut self, now_ms: u64) {
        self.last_frame_ms = Some(now_ms);
    }

    #[inline]
    #[must_use]
    pub const fn is_up(&self) -> bool {
        self.up
    }

    /// Report a transition, if the link changed state by `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Option<LinkEvent> {
        let alive = self
            .last_frame_ms
            .is_some_and(|t| now_ms.saturating_sub(t) < self.timeout_ms);

        match (self.up, alive) {
            (false, true) => {
                self.up = true;
                Some(LinkEvent::Up)
            }
            (true, false) => {
                self.up = false;
                Some(LinkEvent::Down)
            }
            _ => None,
        }
    }
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}
