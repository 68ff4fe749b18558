use std::{any::Any, time::Duration};

use four_cc::FourCC;

use crate::{
    effect::{Effect, EffectMessage, EffectMessagePayload},
    parameter::{
        BooleanParameter, BooleanParameterValue, FloatParameter, FloatParameterValue,
        ParameterValueUpdate,
    },
    scrubber::{
        bank::SampleBank,
        params::{MAX_SPEED, MIN_SPEED},
        GrainScrubber, ScrubberConfig,
    },
    utils::{f32_to_i16, i16_to_f32},
    Error, Parameter,
};

// -------------------------------------------------------------------------------------------------

/// Message type for `GrainScrubEffect` to trigger and release the freeze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum GrainScrubEffectMessage {
    /// Freeze the most recent input and start scrubbing it.
    Start,
    /// Release the freeze and pass through the input again.
    Stop,
}

impl EffectMessage for GrainScrubEffectMessage {
    fn effect_name(&self) -> &'static str {
        GrainScrubEffect::EFFECT_NAME
    }
    fn payload(&self) -> &dyn Any {
        self
    }
}

// -------------------------------------------------------------------------------------------------

/// Mono granular freeze and scrub effect, wrapping a [`GrainScrubber`].
///
/// Converts the f32 signal to 16-bit samples and back, so it shares the scrubber's 16-bit
/// resolution. The speed parameter's sign is ignored: use the reverse parameter to change the
/// playback direction.
pub struct GrainScrubEffect {
    buffer_duration: Duration,
    scrubber: GrainScrubber,
    speed: FloatParameterValue,
    reverse: BooleanParameterValue,
    start: FloatParameterValue,
    length: FloatParameterValue,
    scratch: Vec<i16>,
}

impl GrainScrubEffect {
    pub const EFFECT_NAME: &str = "GrainScrub";

    pub const SPEED: FloatParameter =
        FloatParameter::new(FourCC(*b"spd_"), "Speed", MIN_SPEED..=MAX_SPEED, 1.0).with_unit("x");
    pub const REVERSE: BooleanParameter = BooleanParameter::new(FourCC(*b"rvrs"), "Reverse", false);
    pub const START: FloatParameter =
        FloatParameter::new(FourCC(*b"strt"), "Start", 0.0..=0.99, 0.0);
    pub const LENGTH: FloatParameter =
        FloatParameter::new(FourCC(*b"lnth"), "Length", 0.01..=1.0, 1.0);

    /// Default duration of each of the two buffer halves.
    pub const DEFAULT_BUFFER_DURATION: Duration = Duration::from_millis(1000);

    /// Create a new effect with buffer halves of the given duration. The buffer gets allocated
    /// when initializing the effect. Durations get limited to the max size of a [`SampleBank`].
    pub fn new(buffer_duration: Duration) -> Self {
        Self {
            buffer_duration,
            scrubber: GrainScrubber::new(),
            speed: FloatParameterValue::from_description(Self::SPEED),
            reverse: BooleanParameterValue::from_description(Self::REVERSE),
            start: FloatParameterValue::from_description(Self::START),
            length: FloatParameterValue::from_description(Self::LENGTH),
            scratch: Vec::new(),
        }
    }

    /// Access to the wrapped scrubber.
    pub fn scrubber(&self) -> &GrainScrubber {
        &self.scrubber
    }

    fn apply_parameters(&mut self) {
        self.scrubber.set_speed(self.speed.value());
        self.scrubber.set_reversed(self.reverse.value());
        self.scrubber.set_start_pos(self.start.value());
        self.scrubber.set_length_pos(self.length.value());
    }
}

impl Default for GrainScrubEffect {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_DURATION)
    }
}

impl Effect for GrainScrubEffect {
    fn name(&self) -> &'static str {
        Self::EFFECT_NAME
    }

    fn parameters(&self) -> Vec<&dyn Parameter> {
        vec![
            self.speed.description() as &dyn Parameter,
            self.reverse.description(),
            self.start.description(),
            self.length.description(),
        ]
    }

    fn initialize(
        &mut self,
        sample_rate: u32,
        channel_count: usize,
        max_frames: usize,
    ) -> Result<(), Error> {
        if channel_count != 1 {
            return Err(Error::ParameterError(format!(
                "{}: only mono signals are supported, got {channel_count} channels",
                self.name()
            )));
        }
        let requested_len = (self.buffer_duration.as_secs_f64() * sample_rate as f64) as usize;
        let half_len = requested_len.clamp(1, SampleBank::MAX_HALF_LEN);
        if half_len != requested_len {
            log::warn!(
                "{}: buffer length of {requested_len} samples got limited to {half_len} samples",
                self.name()
            );
        }
        let config = ScrubberConfig {
            sample_rate,
            block_size: max_frames.max(1),
        };
        self.scrubber = GrainScrubber::with_capacity(config, half_len)?;
        self.scratch = vec![0; self.scrubber.config().block_size];
        self.apply_parameters();
        Ok(())
    }

    fn process(&mut self, output: &mut [f32]) {
        if self.scratch.is_empty() {
            // not initialized
            output.fill(0.0);
            return;
        }
        let block_size = self.scratch.len();
        for chunk in output.chunks_mut(block_size) {
            let scratch = &mut self.scratch[..chunk.len()];
            f32_to_i16(chunk, scratch);
            self.scrubber.update(scratch);
            i16_to_f32(scratch, chunk);
        }
    }

    fn process_tail(&self) -> Option<usize> {
        if self.scrubber.is_running() {
            Some(usize::MAX)
        } else {
            Some(0)
        }
    }

    fn process_parameter_update(
        &mut self,
        id: FourCC,
        value: &ParameterValueUpdate,
    ) -> Result<(), Error> {
        match id {
            _ if id == Self::SPEED.id() => {
                self.speed.apply_update(value);
                self.scrubber.set_speed(self.speed.value());
            }
            _ if id == Self::REVERSE.id() => {
                self.reverse.apply_update(value);
                self.scrubber.set_reversed(self.reverse.value());
            }
            _ if id == Self::START.id() => {
                self.start.apply_update(value);
                self.scrubber.set_start_pos(self.start.value());
            }
            _ if id == Self::LENGTH.id() => {
                self.length.apply_update(value);
                self.scrubber.set_length_pos(self.length.value());
            }
            _ => {
                log::warn!("Unknown parameter: '{id}' for effect '{}'", self.name());
                return Err(Error::ParameterError(format!(
                    "Unknown parameter: '{id}' for effect '{}'",
                    self.name()
                )));
            }
        }
        Ok(())
    }

    fn process_message(&mut self, message: &EffectMessagePayload) -> Result<(), Error> {
        if let Some(message) = message.payload().downcast_ref::<GrainScrubEffectMessage>() {
            match message {
                GrainScrubEffectMessage::Start => self.scrubber.start(),
                GrainScrubEffectMessage::Stop => self.scrubber.stop(),
            }
            Ok(())
        } else {
            Err(Error::ParameterError(
                "GrainScrubEffect: Invalid/unknown message payload".to_owned(),
            ))
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct OtherMessage;

    impl EffectMessage for OtherMessage {
        fn effect_name(&self) -> &'static str {
            "Other"
        }
        fn payload(&self) -> &dyn Any {
            self
        }
    }

    fn effect() -> GrainScrubEffect {
        let mut effect = GrainScrubEffect::new(Duration::from_millis(10));
        effect.initialize(10_000, 1, 32).unwrap();
        effect
    }

    #[test]
    fn initialization() {
        let mut effect = GrainScrubEffect::default();
        assert!(effect.initialize(44100, 2, 128).is_err());
        assert!(effect.scrubber().bank().is_none());

        // uninitialized effects output silence
        let mut buffer = [0.5; 16];
        effect.process(&mut buffer);
        assert_eq!(buffer, [0.0; 16]);

        effect.initialize(44100, 1, 128).unwrap();
        assert_eq!(effect.scrubber().bank().unwrap().half_len(), 44100);
        assert_eq!(effect.scrubber().config().block_size, 128);

        // scratch buffers never get empty
        let mut effect = GrainScrubEffect::new(Duration::from_millis(10));
        effect.initialize(44100, 1, 0).unwrap();
        assert_eq!(effect.scrubber().config().block_size, 1);

        let mut effect = GrainScrubEffect::new(Duration::from_secs(10));
        effect.initialize(44100, 1, 128).unwrap();
        assert_eq!(
            effect.scrubber().bank().unwrap().half_len(),
            SampleBank::MAX_HALF_LEN
        );
        assert_eq!(effect.parameters().len(), 4);
    }

    #[test]
    fn passes_through_while_stopped() {
        let mut effect = effect();
        let input = (0..100).map(|i| (i as f32 / 100.0) - 0.5).collect::<Vec<_>>();
        let mut buffer = input.clone();
        effect.process(&mut buffer);
        for (a, b) in input.iter().zip(&buffer) {
            assert!((a - b).abs() < 1.0 / 16384.0);
        }
        assert_eq!(effect.process_tail(), Some(0));
    }

    #[test]
    fn parameters_and_messages() {
        let mut effect = effect();
        assert_eq!(effect.scrubber().stage().pending().length, 99);

        let (id, value) = GrainScrubEffect::LENGTH.value_update(0.5);
        effect.process_parameter_update(id, &value).unwrap();
        assert_eq!(effect.scrubber().stage().pending().length, 50);

        let (id, value) = GrainScrubEffect::SPEED.value_update(2.0);
        effect.process_parameter_update(id, &value).unwrap();
        assert_eq!(effect.scrubber().stage().pending().speed(), 2.0);

        // speeds are magnitudes only
        assert_eq!(*GrainScrubEffect::SPEED.range(), MIN_SPEED..=MAX_SPEED);
        let (id, value) = GrainScrubEffect::SPEED.value_update(-2.0);
        effect.process_parameter_update(id, &value).unwrap();
        assert_eq!(effect.scrubber().stage().pending().speed(), MIN_SPEED);

        let (id, value) = GrainScrubEffect::REVERSE.value_update(true);
        effect.process_parameter_update(id, &value).unwrap();
        assert!(effect.scrubber().stage().pending().reversed);

        effect
            .process_parameter_update(
                GrainScrubEffect::START.id(),
                &ParameterValueUpdate::Normalized(1.0),
            )
            .unwrap();
        assert_eq!(effect.scrubber().stage().pending().offset, 99);

        assert!(effect
            .process_parameter_update(FourCC(*b"????"), &ParameterValueUpdate::Normalized(0.0))
            .is_err());

        effect
            .process_message(&GrainScrubEffectMessage::Start)
            .unwrap();
        assert!(effect.scrubber().is_running());
        assert_eq!(effect.process_tail(), Some(usize::MAX));
        assert!(effect.process_message(&OtherMessage).is_err());

        effect.process_message(&GrainScrubEffectMessage::Stop).unwrap();
        assert!(!effect.scrubber().is_running());
    }

    #[test]
    fn scrubs_frozen_input() {
        let mut effect = effect();
        let mut buffer = vec![0.25; 100];
        effect.process(&mut buffer);

        effect
            .process_message(&GrainScrubEffectMessage::Start)
            .unwrap();
        let mut buffer = vec![-0.75; 100];
        effect.process(&mut buffer);
        // frozen constant input, faded at the grain boundaries only
        assert!((buffer[50] - 0.25).abs() < 1.0 / 16384.0);
        assert!(buffer.iter().all(|s| (0.0..=0.25 + 1.0 / 16384.0).contains(s)));
    }
}
