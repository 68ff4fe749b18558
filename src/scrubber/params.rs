//! Grain parameter sets and the staging area written by control code.

use std::fmt;

// -------------------------------------------------------------------------------------------------

/// Fixed point step size for a playback speed ratio of 1.0 (16 fractional bits).
pub const UNITY_RATE: u32 = 1 << 16;

/// Min playback speed magnitude. Slower speeds get snapped to this value.
pub const MIN_SPEED: f32 = 0.125;
/// Max playback speed magnitude.
pub const MAX_SPEED: f32 = 4.0;

/// Min grain length in samples, as set via the length setters.
pub const MIN_GRAIN_LENGTH: usize = 50;

// -------------------------------------------------------------------------------------------------

/// Converts a playback speed ratio into a 16.16 fixed point step size.
///
/// The ratio's magnitude gets clamped into `MIN_SPEED..=MAX_SPEED`. Its sign is ignored:
/// the playback direction is controlled by [`GrainParameters::reversed`] only.
pub fn speed_to_rate(ratio: f32) -> u32 {
    let magnitude = if ratio.is_nan() {
        1.0
    } else {
        ratio.abs().clamp(MIN_SPEED, MAX_SPEED)
    };
    (magnitude * UNITY_RATE as f32).round() as u32
}

/// Converts a 16.16 fixed point step size back into a speed ratio.
pub fn rate_to_speed(rate: u32) -> f32 {
    rate as f32 / UNITY_RATE as f32
}

// -------------------------------------------------------------------------------------------------

/// A set of grain playback parameters.
///
/// `offset` and `length` are sample positions within a single buffer half, so
/// `offset + length` never exceeds the half's length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrainParameters {
    pub offset: usize,
    pub length: usize,
    pub rate: u32,
    pub reversed: bool,
}

impl GrainParameters {
    /// Parameters which play back a whole buffer half of the given length at unity speed.
    pub fn full(max_len: usize) -> Self {
        Self {
            offset: 0,
            length: fit_length(max_len, 0, max_len),
            rate: UNITY_RATE,
            reversed: false,
        }
    }

    /// The playback rate as speed ratio.
    pub fn speed(&self) -> f32 {
        rate_to_speed(self.rate)
    }
}

impl fmt::Display for GrainParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "offset {} length {} rate {} ({:.3}x) {}",
            self.offset,
            self.length,
            self.rate,
            self.speed(),
            if self.reversed { "reversed" } else { "forward" }
        )
    }
}

// Truncates a grain length, so that it fits into a half of `max_len` samples after `offset`.
// One sample of headroom is kept, but grains never get empty in non-empty halves.
fn fit_length(max_len: usize, offset: usize, length: usize) -> usize {
    let available = max_len.saturating_sub(offset);
    length.min(available.saturating_sub(1)).max(available.min(1))
}

// -------------------------------------------------------------------------------------------------

/// Pending grain parameters, as set by control code.
///
/// All setters clamp their input into valid ranges and only ever change the pending set.
/// Scrubbers copy the pending set into their active set at safe points only: when getting
/// triggered and when a grain got played back completely.
#[derive(Debug, Clone)]
pub struct ParameterStage {
    pending: GrainParameters,
    ideal_length: usize,
    max_len: usize,
    sample_rate: u32,
    length_ms: f32,
}

impl ParameterStage {
    /// Create a new stage for buffer halves of `max_len` samples at the given sample rate.
    pub fn new(max_len: usize, sample_rate: u32) -> Self {
        let pending = GrainParameters::full(max_len);
        let ideal_length = pending.length;
        let length_ms = if sample_rate > 0 {
            max_len as f32 / sample_rate as f32 * 1000.0
        } else {
            0.0
        };
        Self {
            pending,
            ideal_length,
            max_len,
            sample_rate,
            length_ms,
        }
    }

    /// The currently staged parameter set.
    pub fn pending(&self) -> &GrainParameters {
        &self.pending
    }

    /// The last grain length set via the length setters, before it got truncated to fit the
    /// current start offset.
    pub fn ideal_length(&self) -> usize {
        self.ideal_length
    }

    /// Length of a buffer half in samples.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Length of a buffer half in milliseconds.
    pub fn length_ms(&self) -> f32 {
        self.length_ms
    }

    /// Set the playback speed ratio, where 1.0 plays at the original pitch.
    pub fn set_speed(&mut self, ratio: f32) {
        self.pending.rate = speed_to_rate(ratio);
    }

    /// Play grains backwards.
    pub fn reverse(&mut self) {
        self.pending.reversed = true;
    }

    /// Play grains forwards.
    pub fn forward(&mut self) {
        self.pending.reversed = false;
    }

    /// Set the playback direction.
    pub fn set_reversed(&mut self, reversed: bool) {
        self.pending.reversed = reversed;
    }

    /// Set the grain start in milliseconds from the start of the frozen buffer.
    /// Useful when the position needs to be quantized to a beat.
    pub fn set_start_ms(&mut self, ms: f32) {
        let offset = self.ms_to_samples(ms.clamp(0.0, self.length_ms));
        self.set_offset(offset.min(self.max_len.saturating_sub(1)));
    }

    /// Set the grain start as fraction `0.0..=0.99` of the buffer length.
    pub fn set_start_pos(&mut self, pos: f32) {
        let offset = (pos.clamp(0.0, 0.99) * self.max_len as f32) as usize;
        self.set_offset(offset.min(self.max_len.saturating_sub(1)));
    }

    /// Set the grain length in milliseconds. Useful when the length needs to be quantized
    /// to a beat.
    pub fn set_length_ms(&mut self, ms: f32) {
        let length = self.ms_to_samples(ms.clamp(1.0, self.length_ms.max(1.0)));
        self.set_length(length);
    }

    /// Set the grain length as fraction `0.01..=1.0` of the buffer length.
    pub fn set_length_pos(&mut self, pos: f32) {
        let length = (pos.clamp(0.01, 1.0) * self.max_len as f32) as usize;
        self.set_length(length);
    }

    fn set_offset(&mut self, offset: usize) {
        self.pending.offset = offset;
        // re-expand towards the ideal length, when there's enough room after the new offset
        self.pending.length = fit_length(self.max_len, offset, self.ideal_length);
    }

    fn set_length(&mut self, length: usize) {
        let length = length.max(MIN_GRAIN_LENGTH);
        self.ideal_length = length;
        self.pending.length = fit_length(self.max_len, self.pending.offset, length);
    }

    fn ms_to_samples(&self, ms: f32) -> usize {
        (ms * self.sample_rate as f32 * 0.001) as usize
    }
}

// -------------------------------------------------------------------------------------------------
