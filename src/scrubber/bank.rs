//! Double buffered sample storage.

use crate::Error;

// -------------------------------------------------------------------------------------------------

/// Identifies one of the two logical halves of a [`SampleBank`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[repr(u8)]
pub enum BufferHalf {
    #[default]
    First = 0,
    Second = 1,
}

impl BufferHalf {
    /// The other half.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Physical start index of this half in a bank with the given half length.
    #[inline]
    pub fn base(self, half_len: usize) -> usize {
        match self {
            Self::First => 0,
            Self::Second => half_len,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// A flat array of signed 16-bit samples, logically split into two equally sized halves.
///
/// While a scrubber is running, one half is frozen and scrubbed while the other one keeps
/// capturing the live input. The bank is allocated once and never resized afterwards.
#[derive(Debug, Clone)]
pub struct SampleBank {
    samples: Box<[i16]>,
    half_len: usize,
}

impl SampleBank {
    /// Max number of samples per half.
    ///
    /// Grain positions are the integer part of a 16.16 fixed point accumulator, so they can not
    /// address more than `u16::MAX` samples.
    pub const MAX_HALF_LEN: usize = u16::MAX as usize;

    /// Allocate a new, silent bank with `half_len` samples per half.
    pub fn new(half_len: usize) -> Result<Self, Error> {
        Self::validate_half_len(half_len)?;
        Ok(Self {
            samples: vec![0; 2 * half_len].into_boxed_slice(),
            half_len,
        })
    }

    /// Wrap an existing sample buffer. Its length must be even: each half gets `len / 2` samples.
    pub fn from_samples(samples: Vec<i16>) -> Result<Self, Error> {
        if samples.len() % 2 != 0 {
            return Err(Error::SampleBankError(format!(
                "sample buffer length must be even, got {}",
                samples.len()
            )));
        }
        let half_len = samples.len() / 2;
        Self::validate_half_len(half_len)?;
        Ok(Self {
            samples: samples.into_boxed_slice(),
            half_len,
        })
    }

    fn validate_half_len(half_len: usize) -> Result<(), Error> {
        if half_len == 0 {
            Err(Error::SampleBankError("sample bank must not be empty".to_owned()))
        } else if half_len > Self::MAX_HALF_LEN {
            Err(Error::SampleBankError(format!(
                "half length {half_len} exceeds the max supported length of {}",
                Self::MAX_HALF_LEN
            )))
        } else {
            Ok(())
        }
    }

    /// Number of samples in each of the two halves.
    #[inline]
    pub fn half_len(&self) -> usize {
        self.half_len
    }

    /// Access the contents of the given half.
    pub fn half(&self, half: BufferHalf) -> &[i16] {
        let base = half.base(self.half_len);
        &self.samples[base..base + self.half_len]
    }

    /// Access the whole physical array.
    pub fn as_slice(&self) -> &[i16] {
        &self.samples
    }

    #[inline]
    pub(crate) fn read(&self, index: usize) -> i16 {
        self.samples[index]
    }

    #[inline]
    pub(crate) fn write(&mut self, half: BufferHalf, pos: usize, sample: i16) {
        debug_assert!(pos < self.half_len);
        self.samples[half.base(self.half_len) + pos] = sample;
    }

    #[inline]
    pub(crate) fn write_mirrored(&mut self, pos: usize, sample: i16) {
        debug_assert!(pos < self.half_len);
        self.samples[pos] = sample;
        self.samples[pos + self.half_len] = sample;
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_shape() {
        assert!(SampleBank::new(0).is_err());
        assert!(SampleBank::new(SampleBank::MAX_HALF_LEN + 1).is_err());
        assert!(SampleBank::from_samples(vec![0; 3]).is_err());

        let bank = SampleBank::from_samples((0..8).collect()).unwrap();
        assert_eq!(bank.half_len(), 4);
        assert_eq!(bank.half(BufferHalf::First), &[0, 1, 2, 3]);
        assert_eq!(bank.half(BufferHalf::Second), &[4, 5, 6, 7]);
    }

    #[test]
    fn half_writes() {
        let mut bank = SampleBank::new(4).unwrap();
        bank.write(BufferHalf::Second, 1, 7);
        assert_eq!(bank.half(BufferHalf::First), &[0, 0, 0, 0]);
        assert_eq!(bank.half(BufferHalf::Second), &[0, 7, 0, 0]);

        bank.write_mirrored(3, -2);
        assert_eq!(bank.as_slice(), &[0, 0, 0, -2, 0, 7, 0, -2]);
        assert_eq!(BufferHalf::First.flipped(), BufferHalf::Second);
        assert_eq!(BufferHalf::Second.base(4), 4);
    }
}
