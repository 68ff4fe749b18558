use super::AnalogInput;

// -------------------------------------------------------------------------------------------------

const SMOOTH_SAMPLES: usize = 32;
// trimmed mean window: skips the lowest and highest ~20% of the sorted samples
const OUTLIERS_LOW: usize = max(SMOOTH_SAMPLES * 20 / 100, 1);
const OUTLIERS_HIGH: usize = min(SMOOTH_SAMPLES * 80 / 100 + 1, SMOOTH_SAMPLES - 1);

// usable raw range of the analog input
const RAW_MIN: i32 = 50;
const RAW_MAX: i32 = 4000;

/// Max potentiometer value.
pub const MAX_VALUE: u16 = 4095;

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

const fn min(a: usize, b: usize) -> usize {
    if a < b {
        a
    } else {
        b
    }
}

// -------------------------------------------------------------------------------------------------

/// A potentiometer on a 12-bit analog input, smoothed with a trimmed mean of its most recent
/// readings and rescaled, so the pot's end positions reliably reach `0` and [`MAX_VALUE`].
pub struct Potentiometer {
    input: Box<dyn AnalogInput>,
    samples: [u16; SMOOTH_SAMPLES],
    cursor: usize,
    value: u16,
}

impl Potentiometer {
    pub fn new(input: impl AnalogInput + 'static) -> Self {
        Self {
            input: Box::new(input),
            samples: [0; SMOOTH_SAMPLES],
            cursor: 0,
            value: 0,
        }
    }

    /// Smoothed value in range `0..=MAX_VALUE`.
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Smoothed value in range `0.0..=1.0`.
    pub fn normalized(&self) -> f32 {
        self.value as f32 / MAX_VALUE as f32
    }

    pub fn tick(&mut self, _now_ms: u64) {
        self.cursor = (self.cursor + 1) % SMOOTH_SAMPLES;
        self.samples[self.cursor] = self.input.read();

        let mut sorted = self.samples;
        sorted.sort_unstable();
        let window = &sorted[OUTLIERS_LOW..OUTLIERS_HIGH];
        let mean = window.iter().map(|v| *v as i32).sum::<i32>() / window.len() as i32;

        let scaled = (mean - RAW_MIN) * MAX_VALUE as i32 / (RAW_MAX - RAW_MIN);
        self.value = scaled.clamp(0, MAX_VALUE as i32) as u16;
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU16, Ordering},
        Arc,
    };

    use super::*;

    #[test]
    fn window() {
        assert_eq!(OUTLIERS_LOW, 6);
        assert_eq!(OUTLIERS_HIGH, 26);
    }

    #[test]
    fn smoothing_and_scaling() {
        let pin = Arc::new(AtomicU16::new(2025));
        let mut pot = Potentiometer::new(pin.clone());
        for _ in 0..SMOOTH_SAMPLES {
            pot.tick(0);
        }
        assert_eq!(pot.value(), 2047);

        // single spikes get rejected
        pin.store(4095, Ordering::Relaxed);
        pot.tick(0);
        pin.store(0, Ordering::Relaxed);
        pot.tick(0);
        assert_eq!(pot.value(), 2047);

        pin.store(10, Ordering::Relaxed);
        for _ in 0..SMOOTH_SAMPLES {
            pot.tick(0);
        }
        assert_eq!(pot.value(), 0);
        assert_eq!(pot.normalized(), 0.0);

        pin.store(4095, Ordering::Relaxed);
        for _ in 0..SMOOTH_SAMPLES {
            pot.tick(0);
        }
        assert_eq!(pot.value(), MAX_VALUE);
        assert_eq!(pot.normalized(), 1.0);
    }
}
