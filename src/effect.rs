//! Host integration for f32 audio pipelines.

use std::any::Any;

use four_cc::FourCC;

use crate::{parameter::ParameterValueUpdate, Error, Parameter};

// -------------------------------------------------------------------------------------------------

pub mod scrub;

// -------------------------------------------------------------------------------------------------

/// Carries [`Effect`] specific payloads, which can't or should not be expressed as
/// [`Parameter`](crate::Parameter) changes, such as triggers.
///
/// Messages are always applied in the effect's DSP real-time thread.
pub trait EffectMessage: Any + Send + Sync {
    /// The static name of the target effect for this message.
    ///
    /// This should match the `name()` of the target `Effect` implementation.
    fn effect_name(&self) -> &'static str;

    /// Returns the message payload as a `dyn Any` reference, which the effect downcasts to
    /// its specific message enum type.
    fn payload(&self) -> &dyn Any;
}

/// Type used in [`Effect::process_message`] to receive messages.
pub type EffectMessagePayload = dyn EffectMessage;

// -------------------------------------------------------------------------------------------------

/// Effects manipulate audio samples in `f32` format in-place in the audio real-time thread.
///
/// Parameters are changed via [`Effect::process_parameter_update`] and custom messages via
/// [`Effect::process_message`], both also called in the real-time thread, so the processing
/// state can not be mutated outside of the audio thread.
///
/// NB: all `process_XXX` functions are called in realtime audio threads, so they must not
/// block! All other functions are called in the main thread to initialize the effect.
pub trait Effect: Send + Sync + 'static {
    /// A unique, static name for the effect.
    ///
    /// This name is used to associate `EffectMessage`s with their target effect type.
    fn name(&self) -> &'static str;

    /// Returns a list of parameter descriptors for this effect.
    fn parameters(&self) -> Vec<&dyn Parameter>;

    /// Initializes the effect with the audio output's properties.
    ///
    /// Called once before the effect is used, on a non-real-time thread, so it's safe to
    /// allocate buffers here. If an error is returned, the effect must not be used.
    fn initialize(
        &mut self,
        sample_rate: u32,
        channel_count: usize,
        max_frames: usize,
    ) -> Result<(), Error>;

    /// Processes an audio buffer in-place, applying the effect.
    fn process(&mut self, output: &mut [f32]);

    /// Returns the number of audible sample frames this effect will produce, after it received
    /// silence. `Some(usize::MAX)` signals an infinite tail, `None` an unknown one.
    fn process_tail(&self) -> Option<usize> {
        None
    }

    /// Handles a parameter update in the real-time thread.
    fn process_parameter_update(
        &mut self,
        id: FourCC,
        value: &ParameterValueUpdate,
    ) -> Result<(), Error>;

    /// Handles optional effect specific messages in the real-time thread.
    fn process_message(&mut self, _message: &EffectMessagePayload) -> Result<(), Error> {
        Err(Error::ParameterError(format!(
            "{}: Received unexpected message payload.",
            self.name()
        )))
    }
}
