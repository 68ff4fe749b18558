//! Millisecond clocked wavetable LFOs for modulating scrubber parameters from control code.

// -------------------------------------------------------------------------------------------------

mod lfo;
mod tables;

pub use lfo::{WavetableLfo, WavetableMatrixLfo};
pub use tables::{interpolate, LfoTable};
