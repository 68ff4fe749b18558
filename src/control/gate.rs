use super::{DebouncedInput, DigitalInput, DigitalLed, DigitalOutput, InputEdge};

// -------------------------------------------------------------------------------------------------

/// A gate or trigger input combined with an indicator LED.
///
/// Unless `led_override` is set, the LED mirrors the gate. With `led_override` set, the LED
/// is left to the application, which can access it via [`led_mut`](Self::led_mut).
pub struct GateTrigger {
    input: Box<dyn DigitalInput>,
    state: DebouncedInput,
    led: DigitalLed,
    high: bool,
    low: bool,
    pub led_override: bool,
}

impl GateTrigger {
    pub fn new(input: impl DigitalInput + 'static, led: impl DigitalOutput + 'static) -> Self {
        Self {
            input: Box::new(input),
            state: DebouncedInput::new(),
            led: DigitalLed::new(led),
            high: false,
            low: false,
            led_override: true,
        }
    }

    /// True while the gate is open.
    pub fn gate(&self) -> bool {
        self.state.is_down()
    }

    /// True when the gate opened in the last poll.
    pub fn high(&self) -> bool {
        self.high
    }

    /// True when the gate closed in the last poll.
    pub fn low(&self) -> bool {
        self.low
    }

    pub fn led(&self) -> &DigitalLed {
        &self.led
    }

    pub fn led_mut(&mut self) -> &mut DigitalLed {
        &mut self.led
    }

    pub fn tick(&mut self, now_ms: u64) {
        let edge = self.state.poll(self.input.is_high(), now_ms);
        self.high = edge == InputEdge::Pressed;
        self.low = matches!(edge, InputEdge::Released { .. });
        if !self.led_override {
            if self.high {
                self.led.on();
            } else if self.low {
                self.led.off();
            }
        }
        self.led.tick(now_ms);
    }
}

// -------------------------------------------------------------------------------------------------
