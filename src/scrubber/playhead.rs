//! Fixed point grain read cursor.

use super::{bank::BufferHalf, params::GrainParameters};

// -------------------------------------------------------------------------------------------------

/// Reads through the active grain with a 16.16 fixed point phase accumulator.
///
/// Holds the *active* grain parameters. Pending parameters are passed in and only get
/// committed on [`Self::trigger`], [`Self::rewind`] or when the grain wraps around.
#[derive(Debug, Clone)]
pub(crate) struct Playhead {
    active: GrainParameters,
    accumulator: u32,
    position: usize,
    read_head_offset: usize,
    half: BufferHalf,
}

impl Playhead {
    pub fn new(active: GrainParameters) -> Self {
        Self {
            active,
            accumulator: 0,
            position: 0,
            read_head_offset: 0,
            half: BufferHalf::First,
        }
    }

    /// The committed parameters that currently govern playback.
    pub fn active(&self) -> &GrainParameters {
        &self.active
    }

    pub fn accumulator(&self) -> u32 {
        self.accumulator
    }

    /// Position within the active grain of the most recently read sample.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_head_offset(&self) -> usize {
        self.read_head_offset
    }

    /// The buffer half which gets played back.
    pub fn half(&self) -> BufferHalf {
        self.half
    }

    /// Swap the playback half, align the grain to the given write position and commit the
    /// pending parameters.
    pub fn trigger(&mut self, pending: &GrainParameters, write_pos: usize) {
        self.half = self.half.flipped();
        self.read_head_offset = write_pos;
        self.rewind(pending);
    }

    /// Commit the pending parameters and restart at the beginning of the grain.
    pub fn rewind(&mut self, pending: &GrainParameters) {
        self.accumulator = 0;
        self.commit(pending);
    }

    /// Advance by one output sample and return the new position within the active grain.
    /// When the grain got played back completely, the pending parameters are committed.
    #[inline]
    pub fn advance(&mut self, pending: &GrainParameters) -> usize {
        // an overflowing accumulator is past the end of any grain
        let Some(accumulator) = self.accumulator.checked_add(self.active.rate) else {
            self.rewind(pending);
            return self.position;
        };
        self.accumulator = accumulator;
        let steps = (self.accumulator >> 16) as usize;
        let length = self.active.length;
        let position = if self.active.reversed {
            length.checked_sub(steps + 1)
        } else {
            Some(steps).filter(|position| *position < length)
        };
        match position {
            Some(position) => self.position = position,
            None => self.rewind(pending),
        }
        self.position
    }

    /// Physical sample bank index of the current position.
    #[inline]
    pub fn read_index(&self, half_len: usize) -> usize {
        let index = (self.active.offset + self.position + self.read_head_offset) % half_len;
        index + self.half.base(half_len)
    }

    fn commit(&mut self, pending: &GrainParameters) {
        self.active = *pending;
        self.position = if self.active.reversed {
            self.active.length.saturating_sub(1)
        } else {
            0
        };
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrubber::params::{speed_to_rate, UNITY_RATE};

    fn grain(offset: usize, length: usize, rate: u32, reversed: bool) -> GrainParameters {
        GrainParameters {
            offset,
            length,
            rate,
            reversed,
        }
    }

    #[test]
    fn forward_wraps_and_commits() {
        let first = grain(0, 4, UNITY_RATE, false);
        let next = grain(10, 2, UNITY_RATE, false);
        let mut playhead = Playhead::new(first);
        playhead.rewind(&first);

        let positions = (0..4).map(|_| playhead.advance(&next)).collect::<Vec<_>>();
        assert_eq!(positions, vec![1, 2, 3, 0]);
        assert_eq!(*playhead.active(), next);
        assert_eq!(playhead.accumulator(), 0);

        let positions = (0..4).map(|_| playhead.advance(&next)).collect::<Vec<_>>();
        assert_eq!(positions, vec![1, 0, 1, 0]);
    }

    #[test]
    fn reverse_wraps_and_commits() {
        let params = grain(0, 4, UNITY_RATE, true);
        let mut playhead = Playhead::new(params);
        playhead.rewind(&params);
        assert_eq!(playhead.position(), 3);

        let positions = (0..8).map(|_| playhead.advance(&params)).collect::<Vec<_>>();
        assert_eq!(positions, vec![2, 1, 0, 3, 2, 1, 0, 3]);
    }

    #[test]
    fn direction_change_restarts_at_matching_boundary() {
        let forward = grain(0, 8, UNITY_RATE, false);
        let reversed = grain(0, 5, UNITY_RATE, true);
        let mut playhead = Playhead::new(forward);
        playhead.rewind(&forward);
        for _ in 0..7 {
            playhead.advance(&reversed);
        }
        assert!(!playhead.active().reversed);
        assert_eq!(playhead.advance(&reversed), 4);
        assert!(playhead.active().reversed);
    }

    #[test]
    fn fractional_rates() {
        let slow = grain(0, 4, speed_to_rate(0.5), false);
        let mut playhead = Playhead::new(slow);
        playhead.rewind(&slow);
        let positions = (0..8).map(|_| playhead.advance(&slow)).collect::<Vec<_>>();
        assert_eq!(positions, vec![0, 1, 1, 2, 2, 3, 3, 0]);

        let fast = grain(0, 8, speed_to_rate(2.0), false);
        playhead.rewind(&fast);
        let positions = (0..5).map(|_| playhead.advance(&fast)).collect::<Vec<_>>();
        assert_eq!(positions, vec![2, 4, 6, 0, 2]);
    }

    #[test]
    fn accumulator_overflow_wraps_grain() {
        // longest possible grain at max speed: the accumulator overflows at the grain end
        let longest = grain(0, u16::MAX as usize - 1, speed_to_rate(4.0), false);
        let next = grain(100, 10, UNITY_RATE, false);
        let mut playhead = Playhead::new(longest);
        playhead.rewind(&longest);
        for _ in 0..16383 {
            playhead.advance(&next);
        }
        assert_eq!(playhead.position(), 65532);
        assert_eq!(*playhead.active(), longest);

        assert_eq!(playhead.advance(&next), 0);
        assert_eq!(*playhead.active(), next);
        assert_eq!(playhead.accumulator(), 0);
    }

    // positions of one full traversal, starting at the wrap point
    fn traversal(params: GrainParameters) -> Vec<usize> {
        let mut playhead = Playhead::new(params);
        playhead.rewind(&params);
        let mut positions = vec![playhead.position()];
        loop {
            let position = playhead.advance(&params);
            if playhead.accumulator() == 0 {
                break;
            }
            positions.push(position);
        }
        positions
    }

    #[test]
    fn reverse_mirrors_forward() {
        let length = 48;
        for rate in [UNITY_RATE, speed_to_rate(0.5), speed_to_rate(3.0)] {
            let forward = traversal(grain(0, length, rate, false));
            let reversed = traversal(grain(0, length, rate, true));
            assert_eq!(
                reversed,
                forward.iter().map(|p| length - 1 - p).collect::<Vec<_>>()
            );
        }

        let forward = traversal(grain(0, length, UNITY_RATE, false));
        let mut reversed = traversal(grain(0, length, UNITY_RATE, true));
        reversed.reverse();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn read_index_wraps_within_half() {
        let params = grain(6, 4, UNITY_RATE, false);
        let mut playhead = Playhead::new(params);
        playhead.trigger(&params, 5);
        assert_eq!(playhead.half(), BufferHalf::Second);
        // (6 + 0 + 5) % 8 + 8
        assert_eq!(playhead.read_index(8), 11);
        playhead.advance(&params);
        assert_eq!(playhead.read_index(8), 12);

        playhead.trigger(&params, 0);
        assert_eq!(playhead.half(), BufferHalf::First);
        assert_eq!(playhead.read_index(8), 6);
    }
}
