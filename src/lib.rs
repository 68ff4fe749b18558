#![doc = include_str!("../README.md")]

// private mods (will be partly re-exported)
mod effect;
mod error;
mod handle;
mod oneshot;
mod parameter;
mod scrubber;

// public, flat re-exports
pub use error::Error;

pub use scrubber::{
    bank::{BufferHalf, SampleBank},
    fade::{apply_fade, fade_gain, FADE_LENGTH},
    params::{
        rate_to_speed, speed_to_rate, GrainParameters, ParameterStage, MAX_SPEED,
        MIN_GRAIN_LENGTH, MIN_SPEED, UNITY_RATE,
    },
    GrainScrubber, ScrubSnapshot, ScrubberConfig,
};

pub use handle::{ScrubCommand, ScrubController, ScrubProcessor};
pub use oneshot::{CaptureState, ZeroCrossingScrubber};

pub use effect::{Effect, EffectMessage, EffectMessagePayload};
pub use parameter::{
    BooleanParameter, BooleanParameterValue, FloatParameter, FloatParameterValue, Parameter,
    ParameterType, ParameterValueUpdate,
};

// public mods
pub mod control;
pub mod modulation;
pub mod utils;

pub mod effects {
    //! Effect implementations for f32 audio pipelines.

    pub use super::effect::scrub::{GrainScrubEffect, GrainScrubEffectMessage};
}

// -------------------------------------------------------------------------------------------------

/// Default sample rate of the host audio pipeline in Hz.
pub const AUDIO_SAMPLE_RATE: u32 = 44100;

/// Default number of samples per processed audio block.
pub const AUDIO_BLOCK_SAMPLES: usize = 128;
