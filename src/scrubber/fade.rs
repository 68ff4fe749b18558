//! Linear de-click ramps at grain boundaries.

// -------------------------------------------------------------------------------------------------

/// Length of the fade-in and fade-out ramps at both ends of a grain, in samples.
pub const FADE_LENGTH: usize = 20;

// -------------------------------------------------------------------------------------------------

/// Amplitude scale for the sample at `position` within a grain of `length` samples.
///
/// Ramps linearly from 0 at the grain boundaries up to 1 at `FADE_LENGTH` samples distance
/// from the nearest boundary. Grains are faded the same way in both playback directions.
pub fn fade_gain(position: usize, length: usize) -> f32 {
    let distance = boundary_distance(position, length);
    if distance < FADE_LENGTH {
        distance as f32 / FADE_LENGTH as f32
    } else {
        1.0
    }
}

/// Apply the boundary fade to a single sample.
#[inline]
pub fn apply_fade(sample: i16, position: usize, length: usize) -> i16 {
    let distance = boundary_distance(position, length);
    if distance < FADE_LENGTH {
        (sample as i32 * distance as i32 / FADE_LENGTH as i32) as i16
    } else {
        sample
    }
}

#[inline]
fn boundary_distance(position: usize, length: usize) -> usize {
    debug_assert!(position < length.max(1));
    position.min(length.saturating_sub(position))
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_windows() {
        let length = 200;
        assert_eq!(fade_gain(0, length), 0.0);
        assert_eq!(fade_gain(10, length), 0.5);
        assert_eq!(fade_gain(FADE_LENGTH, length), 1.0);
        assert_eq!(fade_gain(100, length), 1.0);
        assert_eq!(fade_gain(length - 1, length), 1.0 / FADE_LENGTH as f32);

        assert_eq!(apply_fade(1000, 0, length), 0);
        assert_eq!(apply_fade(1000, 5, length), 250);
        assert_eq!(apply_fade(-1000, 5, length), -250);
        assert_eq!(apply_fade(1000, 50, length), 1000);
        assert_eq!(apply_fade(i16::MIN, 100, length), i16::MIN);
    }

    #[test]
    fn fade_is_monotonic() {
        let length = 100;
        for position in 1..FADE_LENGTH {
            assert!(fade_gain(position, length) >= fade_gain(position - 1, length));
            assert!(apply_fade(i16::MAX, position, length) >= apply_fade(i16::MAX, position - 1, length));
        }
        for position in (length - FADE_LENGTH + 1)..length {
            assert!(fade_gain(position, length) <= fade_gain(position - 1, length));
            assert!(apply_fade(i16::MAX, position, length) <= apply_fade(i16::MAX, position - 1, length));
        }
    }
}
