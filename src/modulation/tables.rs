//! Static LFO wavetables.

// -------------------------------------------------------------------------------------------------

static SQUARE: [u8; 60] = [
    255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, //
    255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

static RAMP: [u8; 6] = [0, 51, 102, 153, 204, 255];

static WOBBLE: [u8; 60] = [
    0, 5, 10, 35, 75, 130, 185, 225, 240, 250, 255, 255, 200, 160, 130, //
    105, 85, 70, 60, 50, 40, 32, 31, 30, 31, 32, 37, 50, 80, 110, //
    130, 140, 145, 145, 100, 70, 45, 32, 25, 21, 19, 17, 16, 15, 14, //
    13, 13, 12, 11, 10, 25, 50, 37, 16, 8, 4, 3, 2, 1, 0,
];

static TRIANGLE: [u8; 11] = [0, 51, 102, 153, 204, 255, 204, 153, 102, 51, 0];

static REVERSE_WOBBLE: [u8; 60] = [
    0, 1, 2, 3, 4, 8, 16, 37, 50, 25, 10, 11, 12, 13, 13, //
    14, 15, 16, 17, 19, 21, 25, 32, 45, 70, 100, 145, 145, 140, 130, //
    110, 80, 50, 37, 32, 31, 30, 31, 32, 40, 50, 60, 70, 85, 105, //
    130, 160, 200, 255, 255, 250, 240, 225, 185, 130, 75, 35, 10, 5, 0,
];

static SAW: [u8; 6] = [255, 204, 153, 102, 51, 0];

// -------------------------------------------------------------------------------------------------

/// Available LFO wavetable shapes.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
    strum::VariantArray,
)]
pub enum LfoTable {
    Square,
    #[default]
    Ramp,
    Wobble,
    Triangle,
    ReverseWobble,
    Saw,
}

impl LfoTable {
    /// The table's byte values in range `0..=255`.
    pub fn values(&self) -> &'static [u8] {
        match self {
            Self::Square => &SQUARE,
            Self::Ramp => &RAMP,
            Self::Wobble => &WOBBLE,
            Self::Triangle => &TRIANGLE,
            Self::ReverseWobble => &REVERSE_WOBBLE,
            Self::Saw => &SAW,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Linearly interpolate a table at the given 16.16 fixed point index.
///
/// Indices at or past the last table entry return the last entry. Empty tables yield 0.
pub fn interpolate(table: &[u8], index: u32) -> u8 {
    let Some(last) = table.last() else {
        return 0;
    };
    let i = (index >> 16) as usize;
    if i + 1 >= table.len() {
        return *last;
    }
    let weight = index & 0xFFFF;
    let a = table[i] as u32;
    let b = table[i + 1] as u32;
    ((a * (0x10000 - weight) + b * weight) >> 16) as u8
}

// -------------------------------------------------------------------------------------------------
