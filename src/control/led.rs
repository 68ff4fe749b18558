use super::DigitalOutput;

// -------------------------------------------------------------------------------------------------

/// A digital LED with optional blinking.
///
/// State changes are buffered and only written to the output pin on [`tick`](Self::tick).
pub struct DigitalLed {
    output: Box<dyn DigitalOutput>,
    state: bool,
    written_state: bool,
    period_ms: u64,
    toggled_ms: u64,
}

impl DigitalLed {
    pub fn new(output: impl DigitalOutput + 'static) -> Self {
        Self {
            output: Box::new(output),
            state: false,
            written_state: false,
            period_ms: 0,
            toggled_ms: 0,
        }
    }

    pub fn is_on(&self) -> bool {
        self.state
    }

    pub fn is_blinking(&self) -> bool {
        self.period_ms > 0
    }

    pub fn on(&mut self) {
        self.period_ms = 0;
        self.state = true;
    }

    pub fn off(&mut self) {
        self.period_ms = 0;
        self.state = false;
    }

    pub fn toggle(&mut self) {
        self.period_ms = 0;
        self.state = !self.state;
    }

    /// Start blinking with a full on-off cycle of `period_ms` milliseconds.
    pub fn blink(&mut self, period_ms: u64) {
        self.period_ms = period_ms >> 1;
    }

    pub fn tick(&mut self, now_ms: u64) {
        if self.state != self.written_state {
            self.written_state = self.state;
            self.output.set_high(self.state);
        }
        if self.period_ms > 0 && self.toggled_ms + self.period_ms < now_ms {
            self.toggled_ms = now_ms;
            self.state = !self.state;
        }
    }
}

// -------------------------------------------------------------------------------------------------
