//! Wavetable LFOs, clocked by a millisecond timer.

use super::tables::{interpolate, LfoTable};

// -------------------------------------------------------------------------------------------------

/// An LFO which reads through a [`LfoTable`] once per cycle.
///
/// The LFO is driven by an external millisecond clock via [`tick`](Self::tick), usually from a
/// control loop, and not by the audio stream.
#[derive(Debug, Clone)]
pub struct WavetableLfo {
    table: LfoTable,
    duration_ms: u64,
    current_ms: u64,
    last_ms: Option<u64>,
    byte_value: u8,
}

impl WavetableLfo {
    /// Create a new LFO with the given cycle duration in milliseconds.
    pub fn new(duration_ms: u64, table: LfoTable) -> Self {
        Self {
            table,
            duration_ms: duration_ms.max(1),
            current_ms: 0,
            last_ms: None,
            byte_value: table.values()[0],
        }
    }

    pub fn table(&self) -> LfoTable {
        self.table
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Set the cycle duration in milliseconds. The current time position is kept.
    pub fn set_time(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms.max(1);
    }

    /// Restart the cycle.
    pub fn reset(&mut self) {
        self.current_ms = 0;
    }

    /// Advance the LFO to the given clock time and update its value.
    ///
    /// The first tick only syncs the LFO to the clock. A clock which runs backwards is
    /// treated as a paused clock.
    pub fn tick(&mut self, now_ms: u64) {
        let elapsed = self
            .last_ms
            .map(|last_ms| now_ms.saturating_sub(last_ms))
            .unwrap_or(0);
        self.last_ms = Some(now_ms);
        self.current_ms += elapsed;

        let values = self.table.values();
        let index = self.current_ms * (values.len() as u64 - 1) * 0x10000 / self.duration_ms;
        self.byte_value = interpolate(values, index.min(u32::MAX as u64) as u32);

        if self.current_ms >= self.duration_ms {
            self.current_ms = 0;
        }
    }

    /// Current value in range `0..=255`.
    pub fn byte_value(&self) -> u8 {
        self.byte_value
    }

    /// Current value in range `0.0..=1.0`.
    pub fn value(&self) -> f32 {
        self.byte_value as f32 / 255.0
    }
}

// -------------------------------------------------------------------------------------------------

/// Morphs between a row of [`WavetableLfo`]s.
///
/// The shape position selects two neighboring LFOs and crossfades their values. All LFOs keep
/// running in parallel, so morphing never resets their phases.
#[derive(Debug, Clone)]
pub struct WavetableMatrixLfo {
    lfos: Vec<WavetableLfo>,
    index: usize,
    ratio: f32,
    value: f32,
}

impl WavetableMatrixLfo {
    /// Create a new matrix from the given tables, using the same cycle duration for all LFOs.
    pub fn new(duration_ms: u64, tables: &[LfoTable]) -> Self {
        let lfos = tables
            .iter()
            .map(|table| WavetableLfo::new(duration_ms, *table))
            .collect();
        Self::from_lfos(lfos)
    }

    /// Create a new matrix from existing LFOs.
    pub fn from_lfos(lfos: Vec<WavetableLfo>) -> Self {
        let value = lfos.first().map(|lfo| lfo.value()).unwrap_or(0.0);
        Self {
            lfos,
            index: 0,
            ratio: 0.0,
            value,
        }
    }

    pub fn lfos(&self) -> &[WavetableLfo] {
        &self.lfos
    }

    /// Set the cycle duration of all LFOs in milliseconds.
    pub fn set_time(&mut self, duration_ms: u64) {
        for lfo in &mut self.lfos {
            lfo.set_time(duration_ms);
        }
    }

    /// Select the morph position in range `0.0..=1.0`.
    pub fn set_shape(&mut self, position: f32) {
        let position = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, 1.0)
        };
        // keeps the last LFO reachable without ever indexing past it
        let pos = (position * (self.lfos.len() as f32 - 0.8)).max(0.0);
        self.index = pos as usize;
        self.ratio = pos - self.index as f32;
    }

    /// Restart all LFOs.
    pub fn reset(&mut self) {
        for lfo in &mut self.lfos {
            lfo.reset();
        }
    }

    /// Advance all LFOs to the given clock time and update the morphed value.
    pub fn tick(&mut self, now_ms: u64) {
        for lfo in &mut self.lfos {
            lfo.tick(now_ms);
        }
        self.value = match (self.lfos.get(self.index), self.lfos.get(self.index + 1)) {
            (Some(current), Some(next)) => {
                (1.0 - self.ratio) * current.value() + self.ratio * next.value()
            }
            (Some(current), None) => current.value(),
            _ => 0.0,
        };
    }

    /// Current morphed value in range `0.0..=1.0`.
    pub fn value(&self) -> f32 {
        self.value
    }
}

// -------------------------------------------------------------------------------------------------
