//! Sample format conversion helpers.

// -------------------------------------------------------------------------------------------------

const I16_SCALE: f32 = 32768.0;

// -------------------------------------------------------------------------------------------------

/// Convert a single f32 sample in range `-1.0..=1.0` to a 16-bit sample. Out of range values
/// get clipped.
#[inline]
pub fn sample_f32_to_i16(sample: f32) -> i16 {
    (sample * I16_SCALE)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Convert a single 16-bit sample to a f32 sample in range `-1.0..1.0`.
#[inline]
pub fn sample_i16_to_f32(sample: i16) -> f32 {
    sample as f32 / I16_SCALE
}

/// Convert a f32 buffer to 16-bit samples. Both buffers must have the same length.
pub fn f32_to_i16(input: &[f32], output: &mut [i16]) {
    debug_assert_eq!(input.len(), output.len());
    for (o, i) in output.iter_mut().zip(input) {
        *o = sample_f32_to_i16(*i);
    }
}

/// Convert a 16-bit buffer to f32 samples. Both buffers must have the same length.
pub fn i16_to_f32(input: &[i16], output: &mut [f32]) {
    debug_assert_eq!(input.len(), output.len());
    for (o, i) in output.iter_mut().zip(input) {
        *o = sample_i16_to_f32(*i);
    }
}

// -------------------------------------------------------------------------------------------------
