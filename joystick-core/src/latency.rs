//! Latency emulation buffer.
//!
//! Holds `L` delay stages behind the newest (writable) slot. Every call to
//! [`LatencyBuffer::advance`] moves each stage one step toward the ready
//! slot, so a vector written before tick `T` is readable at tick `T + L`.
//! With `L = 0` the ready slot is the newest slot itself.
//!
//! Every slot remembers which receiver wrote it, so a delayed vector is
//! still rescaled with its own source's endpoints after a failover.

use crate::types::Source;

/// Largest supported delay, in ticks.
pub const MAX_LATENCY_STEPS: usize = 255;

/// Ring of historical channel vectors.
///
/// All slots start zeroed and tagged [`Source::Crsf`]; the first `L` ticks
/// therefore read an all-zero vector.
#[derive(Debug, Clone)]
pub struct LatencyBuffer<const N: usize, const L: usize> {
    /// `stages[0]` is the ready slot, `stages[L - 1]` the youngest stage.
    stages: [(Source, [u16; N]); L],
    /// Write target. Keeps its contents across ticks until overwritten.
    newest: (Source, [u16; N]),
}

impl<const N: usize, const L: usize> LatencyBuffer<N, L> {
    const DEPTH_OK: () = assert!(L <= MAX_LATENCY_STEPS, "latency depth above 255 ticks");

    #[must_use]
    pub const fn new() -> Self {
        let () = Self::DEPTH_OK;
        Self {
            stages: [(Source::Crsf, [0; N]); L],
            newest: (Source::Crsf, [0; N]),
        }
    }

    /// Number of delay stages.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        L
    }

    /// Shift every stage one step toward the ready slot.
    ///
    /// The oldest vector is discarded and the newest slot is copied into the
    /// youngest stage. The newest slot itself is left as is.
    pub fn advance(&mut self) {
        if L == 0 {
            return;
        }
        self.stages.copy_within(1.., 0);
        if let Some(youngest) = self.stages.last_mut() {
            *youngest = self.newest;
        }
    }

    /// Overwrite the newest slot with a vector from `source`.
    #[inline]
    pub fn write(&mut self, source: Source, channels: &[u16; N]) {
        self.newest = (source, *channels);
    }

    /// The most recently written vector.
    #[inline]
    #[must_use]
    pub fn newest(&self) -> &[u16; N] {
        &self.newest.1
    }

    /// The vector due for mapping this tick.
    #[inline]
    #[must_use]
    pub fn ready(&self) -> &[u16; N] {
        &self.ready_slot().1
    }

    /// Source that wrote the vector due for mapping this tick.
    #[inline]
    #[must_use]
    pub fn ready_source(&self) -> Source {
        self.ready_slot().0
    }

    fn ready_slot(&self) -> &(Source, [u16; N]) {
        self.stages.first().unwrap_or(&self.newest)
    }
}

impl<const N: usize, const L: usize> Default for LatencyBuffer<N, L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_zeroed() {
        let buffer = LatencyBuffer::<4, 3>::new();
        assert_eq!(buffer.ready(), &[0; 4]);
        assert_eq!(buffer.newest(), &[0; 4]);
        assert_eq!(buffer.depth(), 3);
    }

    #[test]
    fn test_zero_depth_is_passthrough() {
        let mut buffer = LatencyBuffer::<4, 0>::new();
        buffer.advance();
        buffer.write(Source::Crsf, &[1, 2, 3, 4]);
        assert_eq!(buffer.ready(), &[1, 2, 3, 4]);
        buffer.advance();
        assert_eq!(buffer.ready(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_value_appears_after_depth_ticks() {
        let mut buffer = LatencyBuffer::<2, 3>::new();

        // Tick 0: advance, write, read.
        buffer.advance();
        buffer.write(Source::Crsf, &[7, 7]);
        assert_eq!(buffer.ready(), &[0, 0]);

        // Ticks 1 and 2 still see the startup zeros.
        for _ in 1..3 {
            buffer.advance();
            assert_eq!(buffer.ready(), &[0, 0]);
        }

        // Tick 3
        buffer.advance();
        assert_eq!(buffer.ready(), &[7, 7]);
    }

    #[test]
    fn test_each_write_keeps_its_slot() {
        let mut buffer = LatencyBuffer::<1, 2>::new();
        let mut seen = [0u16; 6];
        for (tick, slot) in seen.iter_mut().enumerate() {
            buffer.advance();
            buffer.write(Source::Crsf, &[tick as u16 + 1]);
            *slot = buffer.ready()[0];
        }
        assert_eq!(seen, [0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_stale_newest_keeps_flowing() {
        let mut buffer = LatencyBuffer::<1, 2>::new();
        buffer.advance();
        buffer.write(Source::Crsf, &[5]);
        for _ in 0..5 {
            buffer.advance();
        }
        assert_eq!(buffer.ready(), &[5]);
    }

    #[test]
    fn test_source_travels_with_its_vector() {
        let mut buffer = LatencyBuffer::<1, 2>::new();
        assert_eq!(buffer.ready_source(), Source::Crsf);

        buffer.advance();
        buffer.write(Source::Sbus, &[172]);
        buffer.advance();
        buffer.write(Source::Crsf, &[988]);
        // Ready slot still holds the SBUS vector.
        buffer.advance();
        assert_eq!(buffer.ready(), &[172]);
        assert_eq!(buffer.ready_source(), Source::Sbus);

        buffer.advance();
        assert_eq!(buffer.ready(), &[988]);
        assert_eq!(buffer.ready_source(), Source::Crsf);
    }

    #[test]
    fn test_zero_depth_source_is_newest() {
        let mut buffer = LatencyBuffer::<1, 0>::new();
        buffer.write(Source::Sbus, &[172]);
        assert_eq!(buffer.ready_source(), Source::Sbus);
    }
}
