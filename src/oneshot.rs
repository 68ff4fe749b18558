//! Single buffer grain scrubber which captures on the next zero crossing.

use crate::{
    scrubber::{
        bank::SampleBank,
        fade,
        params::{GrainParameters, ParameterStage},
        playhead::Playhead,
        ScrubberConfig,
    },
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Capture progress of a [`ZeroCrossingScrubber`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CaptureState {
    /// Not running: input passes through.
    #[default]
    Idle,
    /// Running: waiting for the input's next zero crossing.
    Armed,
    /// Writing the input into the buffer.
    Recording,
    /// The buffer got filled completely.
    Captured,
}

// -------------------------------------------------------------------------------------------------

/// A grain scrubber variant which records a fresh one-shot sample on each trigger.
///
/// Unlike [`GrainScrubber`](crate::GrainScrubber), it does not record while stopped. When
/// triggered, it waits for the next sign change of the input, then records from the start of
/// its buffer. Playback of the grain starts as soon as enough samples got recorded to cover it,
/// while recording continues until the buffer is full. Until then, the input passes through.
///
/// Uses the same parameter staging, commit and fade rules as the double buffered scrubber.
pub struct ZeroCrossingScrubber {
    config: ScrubberConfig,
    buffer: Option<Box<[i16]>>,
    stage: ParameterStage,
    playhead: Playhead,
    capture: CaptureState,
    write_pos: usize,
    prev_input: i16,
    loaded: bool,
}

impl ZeroCrossingScrubber {
    /// Create a new, unbound scrubber.
    pub fn new(config: ScrubberConfig) -> Self {
        let stage = ParameterStage::new(0, config.sample_rate);
        let playhead = Playhead::new(*stage.pending());
        Self {
            config,
            buffer: None,
            stage,
            playhead,
            capture: CaptureState::Idle,
            write_pos: 0,
            prev_input: 0,
            loaded: false,
        }
    }

    /// Create a new scrubber with a newly allocated, silent buffer of `len` samples.
    pub fn with_capacity(config: ScrubberConfig, len: usize) -> Result<Self, Error> {
        let mut scrubber = Self::new(config);
        scrubber.begin(vec![0; len])?;
        Ok(scrubber)
    }

    /// Bind the given sample buffer and reset all state.
    pub fn begin(&mut self, buffer: Vec<i16>) -> Result<(), Error> {
        let len = buffer.len();
        if len == 0 || len > SampleBank::MAX_HALF_LEN {
            return Err(Error::SampleBankError(format!(
                "one-shot buffer length must be in range 1..={}, got {len}",
                SampleBank::MAX_HALF_LEN
            )));
        }
        self.stage = ParameterStage::new(len, self.config.sample_rate);
        self.playhead = Playhead::new(*self.stage.pending());
        self.capture = CaptureState::Idle;
        self.write_pos = 0;
        self.prev_input = 0;
        self.loaded = false;
        self.buffer = Some(buffer.into_boxed_slice());
        log::info!(
            "One-shot grain scrubber bound to {} samples ({:.2} ms at {} Hz)",
            len,
            self.stage.length_ms(),
            self.config.sample_rate
        );
        Ok(())
    }

    /// Access to the bound buffer's samples.
    pub fn buffer(&self) -> Option<&[i16]> {
        self.buffer.as_deref()
    }

    pub fn stage(&self) -> &ParameterStage {
        &self.stage
    }

    /// The committed parameters which currently govern playback.
    pub fn active(&self) -> &GrainParameters {
        self.playhead.active()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    pub fn is_running(&self) -> bool {
        self.capture != CaptureState::Idle
    }

    /// True when enough samples got recorded to play back the active grain.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Arm the scrubber: recording starts at the next zero crossing of the input.
    /// Does nothing when already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.loaded = false;
        self.capture = CaptureState::Armed;
        self.playhead.rewind(self.stage.pending());
    }

    /// Stop playback and recording and discard the captured state.
    pub fn stop(&mut self) {
        self.capture = CaptureState::Idle;
        self.loaded = false;
    }

    pub fn set_speed(&mut self, ratio: f32) {
        self.stage.set_speed(ratio);
    }

    pub fn reverse(&mut self) {
        self.stage.reverse();
    }

    pub fn forward(&mut self) {
        self.stage.forward();
    }

    pub fn set_start_ms(&mut self, ms: f32) {
        self.stage.set_start_ms(ms);
    }

    pub fn set_start_pos(&mut self, pos: f32) {
        self.stage.set_start_pos(pos);
    }

    pub fn set_length_ms(&mut self, ms: f32) {
        self.stage.set_length_ms(ms);
    }

    pub fn set_length_pos(&mut self, pos: f32) {
        self.stage.set_length_pos(pos);
    }

    /// Process one block of audio in place.
    pub fn update(&mut self, block: &mut [i16]) {
        let Self {
            buffer,
            stage,
            playhead,
            capture,
            write_pos,
            prev_input,
            loaded,
            ..
        } = self;

        let Some(buffer) = buffer.as_mut() else {
            block.fill(0);
            return;
        };

        if *capture == CaptureState::Idle {
            if let Some(last) = block.last() {
                *prev_input = *last;
            }
            return;
        }

        for sample in block.iter_mut() {
            let input = *sample;
            if *capture == CaptureState::Armed {
                if (input < 0) != (*prev_input < 0) {
                    *capture = CaptureState::Recording;
                    *write_pos = 0;
                } else {
                    *prev_input = input;
                }
            }

            if *capture == CaptureState::Recording {
                buffer[*write_pos] = input;
                *write_pos += 1;
                let active = playhead.active();
                if *write_pos >= active.offset + active.length {
                    *loaded = true;
                }
                if *write_pos >= buffer.len() {
                    *capture = CaptureState::Captured;
                }
            }

            if *loaded {
                let position = playhead.advance(stage.pending());
                let active = playhead.active();
                *sample = fade::apply_fade(buffer[active.offset + position], position, active.length);
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scrubber(len: usize) -> ZeroCrossingScrubber {
        ZeroCrossingScrubber::with_capacity(ScrubberConfig::default(), len).unwrap()
    }

    #[test]
    fn invalid_buffers() {
        let mut scrubber = ZeroCrossingScrubber::new(ScrubberConfig::default());
        assert!(scrubber.begin(Vec::new()).is_err());
        assert!(scrubber.begin(vec![0; SampleBank::MAX_HALF_LEN + 1]).is_err());

        let mut block = [5; 4];
        scrubber.update(&mut block);
        assert_eq!(block, [0; 4]);
    }

    #[test]
    fn stopped_passes_through() {
        let mut scrubber = scrubber(100);
        let mut block = [1, -2, 3, -4];
        scrubber.update(&mut block);
        assert_eq!(block, [1, -2, 3, -4]);
        assert_eq!(scrubber.buffer().unwrap(), &[0; 100][..]);
        assert!(!scrubber.is_running());
    }

    #[test]
    fn recording_starts_at_zero_crossing() {
        let mut scrubber = scrubber(100);
        // remembers the last stopped input sample
        scrubber.update(&mut [10, 20, 30]);
        scrubber.start();
        assert_eq!(scrubber.capture_state(), CaptureState::Armed);

        let mut block = [40, 50, -1, -2, -3];
        scrubber.update(&mut block);
        assert_eq!(scrubber.capture_state(), CaptureState::Recording);
        assert_eq!(&scrubber.buffer().unwrap()[..3], &[-1, -2, -3]);
        // not loaded yet: passes through
        assert_eq!(block, [40, 50, -1, -2, -3]);
    }

    #[test]
    fn plays_back_once_grain_is_covered() {
        let mut scrubber = scrubber(200);
        scrubber.set_length_pos(0.5);
        scrubber.update(&mut [-1]);
        scrubber.start();
        assert_eq!(scrubber.active().length, 100);

        let input = (0..150).map(|i| i as i16).collect::<Vec<_>>();
        let mut block = input.clone();
        scrubber.update(&mut block);
        assert!(scrubber.is_loaded());
        assert_eq!(&block[..99], &input[..99]);
        // position 1 of the grain, faded in
        assert_eq!(block[99], 0);
        // position 41
        assert_eq!(block[139], 41);

        let mut block = vec![1000; 50];
        scrubber.update(&mut block);
        assert_eq!(scrubber.capture_state(), CaptureState::Captured);
        assert_eq!(&scrubber.buffer().unwrap()[150..], &[1000; 50][..]);
    }

    #[test]
    fn stop_discards_capture() {
        let mut scrubber = scrubber(100);
        scrubber.set_length_pos(0.5);
        scrubber.update(&mut [1]);
        scrubber.start();
        scrubber.update(&mut [-1; 60]);
        assert!(scrubber.is_loaded());

        scrubber.stop();
        scrubber.stop();
        assert!(!scrubber.is_loaded());
        assert_eq!(scrubber.capture_state(), CaptureState::Idle);
        let mut block = [7; 8];
        scrubber.update(&mut block);
        assert_eq!(block, [7; 8]);
    }
}
