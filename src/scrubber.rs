//! Double buffered, circular grain freeze and scrub engine.

use std::fmt;

use crate::{Error, AUDIO_BLOCK_SAMPLES, AUDIO_SAMPLE_RATE};

// -------------------------------------------------------------------------------------------------

pub mod bank;
pub mod fade;
pub mod params;
pub(crate) mod playhead;

use bank::{BufferHalf, SampleBank};
use params::{GrainParameters, ParameterStage};
use playhead::Playhead;

// -------------------------------------------------------------------------------------------------

/// Host pipeline properties for a scrubber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrubberConfig {
    /// Fixed sample rate of the host pipeline in Hz.
    pub sample_rate: u32,
    /// Max number of samples the host passes to each `update` call. Wrappers which convert
    /// samples size their scratch buffers with it.
    pub block_size: usize,
}

impl Default for ScrubberConfig {
    fn default() -> Self {
        Self {
            sample_rate: AUDIO_SAMPLE_RATE,
            block_size: AUDIO_BLOCK_SAMPLES,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Staged and active scrubber state, for logging and debugging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubSnapshot {
    pub running: bool,
    pub max_sample_len: usize,
    pub length_ms: f32,
    pub playing_half: BufferHalf,
    pub write_pos: usize,
    pub read_pos: usize,
    pub read_head_offset: usize,
    pub accumulator: u32,
    pub pending: GrainParameters,
    pub active: GrainParameters,
    pub ideal_length: usize,
}

impl fmt::Display for ScrubSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} samples / {:.2} ms per half, playing {} half)",
            if self.running { "Running" } else { "Stopped" },
            self.max_sample_len,
            self.length_ms,
            self.playing_half
        )?;
        writeln!(
            f,
            "Write head: {} Read head: {} (+{}) Accumulator: {}",
            self.write_pos,
            self.read_pos,
            self.read_head_offset,
            self.accumulator >> 16
        )?;
        writeln!(f, "Offset: {} -> {}", self.pending.offset, self.active.offset)?;
        writeln!(
            f,
            "Length: {} -> {} (ideal {})",
            self.pending.length, self.active.length, self.ideal_length
        )?;
        writeln!(f, "Playback rate: {} -> {}", self.pending.rate, self.active.rate)?;
        write!(
            f,
            "Reversed: {} -> {}",
            self.pending.reversed, self.active.reversed
        )
    }
}

// -------------------------------------------------------------------------------------------------

/// A real-time granular freeze/scrub effect for mono, 16-bit audio streams.
///
/// The scrubber continuously records its input into one half of a [`SampleBank`]. When
/// triggered via [`start`](Self::start), the most recently recorded half gets frozen and a
/// selectable grain of it is looped at an adjustable rate and direction, while the other half
/// keeps recording. The next trigger thus instantly plays back fresh material again.
///
/// Parameter setters only stage new values. Staged values are applied when the scrubber gets
/// triggered or when the current grain got played back completely, so parameter changes never
/// cause discontinuities in the middle of a grain. Grains are faded in and out at their
/// boundaries to avoid clicks at the loop points.
///
/// All methods take `&mut self`, so a playback step can never observe a half applied trigger.
/// To control a scrubber from another thread than the audio thread, [`split`](Self::split) it
/// into a [`ScrubController`](crate::ScrubController) and [`ScrubProcessor`](crate::ScrubProcessor).
pub struct GrainScrubber {
    config: ScrubberConfig,
    bank: Option<SampleBank>,
    stage: ParameterStage,
    playhead: Playhead,
    write_pos: usize,
    running: bool,
}

impl GrainScrubber {
    /// Create a new, unbound scrubber with the default config. Call [`Self::begin`] to bind a
    /// sample bank before processing: unbound scrubbers only output silence.
    pub fn new() -> Self {
        Self::with_config(ScrubberConfig::default())
    }

    /// Create a new, unbound scrubber with the given config.
    pub fn with_config(config: ScrubberConfig) -> Self {
        let stage = ParameterStage::new(0, config.sample_rate);
        let playhead = Playhead::new(*stage.pending());
        Self {
            config,
            bank: None,
            stage,
            playhead,
            write_pos: 0,
            running: false,
        }
    }

    /// Create a new scrubber with a newly allocated bank of `half_len` samples per half.
    pub fn with_capacity(config: ScrubberConfig, half_len: usize) -> Result<Self, Error> {
        let mut scrubber = Self::with_config(config);
        scrubber.begin(SampleBank::new(half_len)?);
        Ok(scrubber)
    }

    /// Bind the given sample bank. Resets the scrubber into its stopped state and all staged
    /// parameters to play back the whole bank half at unity speed.
    pub fn begin(&mut self, bank: SampleBank) {
        let half_len = bank.half_len();
        self.stage = ParameterStage::new(half_len, self.config.sample_rate);
        self.playhead = Playhead::new(*self.stage.pending());
        self.write_pos = 0;
        self.running = false;
        self.bank = Some(bank);
        log::info!(
            "Grain scrubber bound to {} samples per half ({:.2} ms at {} Hz)",
            half_len,
            self.stage.length_ms(),
            self.config.sample_rate
        );
    }

    /// Unbind and return the current sample bank, if any.
    pub fn end(&mut self) -> Option<SampleBank> {
        self.running = false;
        self.bank.take()
    }

    /// The scrubber's host pipeline config.
    pub fn config(&self) -> &ScrubberConfig {
        &self.config
    }

    /// Access to the bound sample bank.
    pub fn bank(&self) -> Option<&SampleBank> {
        self.bank.as_ref()
    }

    /// Access to the staged parameters.
    pub fn stage(&self) -> &ParameterStage {
        &self.stage
    }

    /// The committed parameters which currently govern playback.
    pub fn active(&self) -> &GrainParameters {
        self.playhead.active()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Freeze the most recently recorded buffer half and start scrubbing it with the staged
    /// parameters. Does nothing when already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.playhead.trigger(self.stage.pending(), self.write_pos);
        self.running = true;
    }

    /// Stop scrubbing and pass through the input again. Can be called at any time.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// See [`ParameterStage::set_speed`].
    pub fn set_speed(&mut self, ratio: f32) {
        self.stage.set_speed(ratio);
    }

    /// See [`ParameterStage::reverse`].
    pub fn reverse(&mut self) {
        self.stage.reverse();
    }

    /// See [`ParameterStage::forward`].
    pub fn forward(&mut self) {
        self.stage.forward();
    }

    /// See [`ParameterStage::set_reversed`].
    pub fn set_reversed(&mut self, reversed: bool) {
        self.stage.set_reversed(reversed);
    }

    /// See [`ParameterStage::set_start_ms`].
    pub fn set_start_ms(&mut self, ms: f32) {
        self.stage.set_start_ms(ms);
    }

    /// See [`ParameterStage::set_start_pos`].
    pub fn set_start_pos(&mut self, pos: f32) {
        self.stage.set_start_pos(pos);
    }

    /// See [`ParameterStage::set_length_ms`].
    pub fn set_length_ms(&mut self, ms: f32) {
        self.stage.set_length_ms(ms);
    }

    /// See [`ParameterStage::set_length_pos`].
    pub fn set_length_pos(&mut self, pos: f32) {
        self.stage.set_length_pos(pos);
    }

    /// Process one block of audio in place.
    ///
    /// Every input sample gets recorded. While stopped, the input passes through unchanged.
    /// While running, each sample gets replaced with the next sample of the scrubbed grain.
    /// Without a bound bank, the block gets discarded and replaced with silence.
    ///
    /// Must not allocate or block: called in real-time audio threads.
    pub fn update(&mut self, block: &mut [i16]) {
        let Self {
            bank,
            stage,
            playhead,
            write_pos,
            running,
            ..
        } = self;

        let Some(bank) = bank.as_mut() else {
            block.fill(0);
            return;
        };
        let half_len = bank.half_len();

        if !*running {
            for sample in block.iter() {
                bank.write_mirrored(*write_pos, *sample);
                *write_pos = (*write_pos + 1) % half_len;
            }
            return;
        }

        let record_half = playhead.half().flipped();
        for sample in block.iter_mut() {
            bank.write(record_half, *write_pos, *sample);
            *write_pos = (*write_pos + 1) % half_len;

            let position = playhead.advance(stage.pending());
            let length = playhead.active().length;
            *sample = fade::apply_fade(bank.read(playhead.read_index(half_len)), position, length);
        }
    }

    /// Current staged and active state of the scrubber.
    pub fn inspect(&self) -> ScrubSnapshot {
        ScrubSnapshot {
            running: self.running,
            max_sample_len: self.stage.max_len(),
            length_ms: self.stage.length_ms(),
            playing_half: self.playhead.half(),
            write_pos: self.write_pos,
            read_pos: self.playhead.position(),
            read_head_offset: self.playhead.read_head_offset(),
            accumulator: self.playhead.accumulator(),
            pending: *self.stage.pending(),
            active: *self.playhead.active(),
            ideal_length: self.stage.ideal_length(),
        }
    }
}

impl Default for GrainScrubber {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scrubber(half_len: usize) -> GrainScrubber {
        GrainScrubber::with_capacity(ScrubberConfig::default(), half_len).unwrap()
    }

    fn ramp(start: i16, len: usize) -> Vec<i16> {
        (0..len as i16).map(|i| start + i).collect()
    }

    #[test]
    fn unbound_scrubber_outputs_silence() {
        let mut scrubber = GrainScrubber::new();
        let mut block = ramp(1, 16);
        scrubber.update(&mut block);
        assert!(block.iter().all(|s| *s == 0));

        scrubber.start();
        let mut block = ramp(1, 16);
        scrubber.update(&mut block);
        assert!(block.iter().all(|s| *s == 0));
        assert!(scrubber.end().is_none());
    }

    #[test]
    fn stopped_scrubber_mirrors_and_passes_through() {
        let mut scrubber = scrubber(10);
        let input = ramp(1, 16);
        let mut block = input.clone();
        scrubber.update(&mut block);
        assert_eq!(block, input);

        let bank = scrubber.bank().unwrap();
        assert_eq!(bank.half(BufferHalf::First), bank.half(BufferHalf::Second));
        assert_eq!(bank.half(BufferHalf::First), &[11, 12, 13, 14, 15, 16, 7, 8, 9, 10]);
        assert_eq!(scrubber.inspect().write_pos, 6);
    }

    #[test]
    fn write_cursor_and_read_index_stay_in_range() {
        let mut scrubber = scrubber(37);
        scrubber.set_speed(3.3);
        scrubber.set_start_pos(0.6);
        for round in 0..50 {
            if round == 5 {
                scrubber.start();
            }
            if round % 7 == 0 {
                scrubber.set_length_pos(round as f32 / 50.0);
            }
            let mut block = ramp(round, 13);
            scrubber.update(&mut block);
            let snapshot = scrubber.inspect();
            assert!(snapshot.write_pos < 37);
            assert!(snapshot.read_pos < snapshot.active.length.max(1));
            assert!(scrubber.playhead.read_index(37) < 2 * 37);
        }
    }

    #[test]
    fn running_scrubber_records_into_other_half() {
        let mut scrubber = scrubber(8);
        let mut block = ramp(1, 8);
        scrubber.update(&mut block);

        scrubber.start();
        assert_eq!(scrubber.inspect().playing_half, BufferHalf::Second);

        let frozen = scrubber.bank().unwrap().half(BufferHalf::Second).to_vec();
        let mut block = ramp(100, 8);
        scrubber.update(&mut block);

        let bank = scrubber.bank().unwrap();
        assert_eq!(bank.half(BufferHalf::Second), frozen.as_slice());
        assert_eq!(bank.half(BufferHalf::First), ramp(100, 8).as_slice());

        // next trigger swaps halves and plays back the fresh material
        scrubber.stop();
        scrubber.start();
        assert_eq!(scrubber.inspect().playing_half, BufferHalf::First);
        let frozen = scrubber.bank().unwrap().half(BufferHalf::First).to_vec();
        let mut block = ramp(200, 8);
        scrubber.update(&mut block);
        let bank = scrubber.bank().unwrap();
        assert_eq!(bank.half(BufferHalf::First), frozen.as_slice());
        assert_eq!(bank.half(BufferHalf::Second), ramp(200, 8).as_slice());
    }

    #[test]
    fn scrubbed_output_follows_grain() {
        let half_len = 200;
        let mut scrubber = scrubber(half_len);
        let mut block = ramp(0, half_len);
        scrubber.update(&mut block);

        scrubber.set_start_ms(0.0);
        scrubber.set_length_pos(0.5);
        scrubber.start();

        let mut block = vec![0; 100];
        scrubber.update(&mut block);
        // write head wrapped to 0 before the trigger, so the grain starts at the oldest sample
        for (index, sample) in block.iter().enumerate().take(99) {
            let position = index + 1;
            let expected = fade::apply_fade(position as i16, position, 100);
            assert_eq!(*sample, expected);
        }
        // wrapped and faded to silence at the grain start
        assert_eq!(block[99], 0);
        assert_eq!(block[50], 51);
    }

    #[test]
    fn read_head_gets_aligned_to_write_head() {
        let half_len = 100;
        let mut scrubber = scrubber(half_len);
        let mut block = ramp(0, 130);
        scrubber.update(&mut block);
        // write head now at 30: oldest sample in the half is at index 30
        scrubber.start();
        assert_eq!(scrubber.inspect().read_head_offset, 30);

        let mut block = vec![0; 40];
        scrubber.update(&mut block);
        // position 25 -> (25 + 30) % 100 = 55 -> recorded input value 55
        assert_eq!(block[24], 55);
    }

    #[test]
    fn parameters_commit_on_grain_boundaries_only() {
        let mut scrubber = scrubber(1000);
        scrubber.set_length_pos(0.1);
        scrubber.start();
        assert_eq!(scrubber.active().length, 100);

        let mut block = vec![0; 60];
        scrubber.update(&mut block);

        scrubber.set_length_ms(5.0);
        scrubber.set_start_pos(0.5);
        scrubber.set_speed(2.0);
        scrubber.reverse();
        assert_eq!(scrubber.active().length, 100);
        assert_eq!(scrubber.active().offset, 0);

        let mut block = vec![0; 39];
        scrubber.update(&mut block);
        let active = *scrubber.active();
        assert_eq!(active.length, 100);
        assert!(!active.reversed);

        let mut block = vec![0; 1];
        scrubber.update(&mut block);
        assert_eq!(scrubber.active(), scrubber.stage().pending());
        assert_eq!(scrubber.active().offset, 500);
        assert_eq!(scrubber.active().length, 220);
        assert_eq!(scrubber.active().rate, 2 * params::UNITY_RATE);
        assert!(scrubber.active().reversed);
    }

    #[test]
    fn commits_at_max_capacity_and_speed() {
        let mut scrubber = scrubber(SampleBank::MAX_HALF_LEN);
        scrubber.set_speed(4.0);
        scrubber.start();
        scrubber.set_start_pos(0.5);
        scrubber.set_speed(1.0);

        let mut block = vec![0; 128];
        for _ in 0..200 {
            scrubber.update(&mut block);
        }
        assert_eq!(scrubber.active(), scrubber.stage().pending());
        assert_eq!(scrubber.active().offset, 32767);
        assert_eq!(scrubber.active().rate, params::UNITY_RATE);
    }

    #[test]
    fn start_is_noop_while_running() {
        let mut scrubber = scrubber(64);
        scrubber.update(&mut ramp(0, 20));
        scrubber.start();
        scrubber.update(&mut ramp(0, 10));
        scrubber.set_start_pos(0.5);
        let before = scrubber.inspect();

        scrubber.start();
        assert_eq!(scrubber.inspect(), before);
        assert_eq!(scrubber.active().offset, 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut scrubber = scrubber(64);
        scrubber.update(&mut ramp(0, 20));
        scrubber.start();
        scrubber.update(&mut ramp(0, 10));

        scrubber.stop();
        let once = scrubber.inspect();
        scrubber.stop();
        assert_eq!(scrubber.inspect(), once);
        assert!(!once.running);
    }

    #[test]
    fn snapshot_display() {
        let mut scrubber = scrubber(1000);
        scrubber.set_speed(0.05);
        let snapshot = scrubber.inspect();
        assert_eq!(snapshot.pending.rate, 8192);
        let text = snapshot.to_string();
        assert!(text.starts_with("Stopped"));
        assert!(text.contains("Playback rate: 8192 -> 65536"));
        assert!(text.contains("Length: 999 -> 999"));
    }
}
