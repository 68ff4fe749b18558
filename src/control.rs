//! Polled hardware controls (buttons, gates, pots and LEDs) for driving scrubbers.
//!
//! Components read and write their pins through the [`DigitalInput`], [`AnalogInput`] and
//! [`DigitalOutput`] traits, so they can be wired up to GPIO drivers, MIDI or GUI state.
//! All components are polled from a control loop via [`ControlState::tick`] and never from
//! the audio thread.

use std::sync::{
    atomic::{AtomicBool, AtomicU16, Ordering},
    Arc,
};

use crate::Error;

// -------------------------------------------------------------------------------------------------

mod button;
mod gate;
mod led;
mod potentiometer;

pub use button::{Button, ClickKind};
pub use gate::GateTrigger;
pub use led::DigitalLed;
pub use potentiometer::{Potentiometer, MAX_VALUE as MAX_POTENTIOMETER_VALUE};

// -------------------------------------------------------------------------------------------------

/// Control loop polling interval in milliseconds.
pub const CONTROL_RATE_MS: u64 = 10;

/// Min time in milliseconds a button or gate must be held before a release gets accepted.
pub const DEBOUNCE_MS: u64 = 50;
/// Button clicks held longer than this are medium clicks.
pub const MEDIUM_CLICK_MS: u64 = 500;
/// Button clicks held longer than this are long clicks.
pub const LONG_CLICK_MS: u64 = 2000;

/// Number of slots per component type in a [`ControlState`].
pub const MAX_BUTTONS: usize = 6;
pub const MAX_POTENTIOMETERS: usize = 6;
pub const MAX_LEDS: usize = 6;
pub const MAX_GATE_TRIGGERS: usize = 6;

// -------------------------------------------------------------------------------------------------

/// A digital input pin. Buttons and gates are wired active low (pull-up): `true` when released.
pub trait DigitalInput: Send {
    fn is_high(&mut self) -> bool;
}

/// A 12-bit analog input pin.
pub trait AnalogInput: Send {
    fn read(&mut self) -> u16;
}

/// A digital output pin.
pub trait DigitalOutput: Send {
    fn set_high(&mut self, high: bool);
}

impl DigitalInput for Box<dyn DigitalInput> {
    fn is_high(&mut self) -> bool {
        (**self).is_high()
    }
}

impl AnalogInput for Box<dyn AnalogInput> {
    fn read(&mut self) -> u16 {
        (**self).read()
    }
}

impl DigitalOutput for Box<dyn DigitalOutput> {
    fn set_high(&mut self, high: bool) {
        (**self).set_high(high)
    }
}

/// Shared atomic pins, e.g. to drive controls from a GUI or another thread.
impl DigitalInput for Arc<AtomicBool> {
    fn is_high(&mut self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl AnalogInput for Arc<AtomicU16> {
    fn read(&mut self) -> u16 {
        self.load(Ordering::Relaxed)
    }
}

impl DigitalOutput for Arc<AtomicBool> {
    fn set_high(&mut self, high: bool) {
        self.store(high, Ordering::Relaxed)
    }
}

// -------------------------------------------------------------------------------------------------

/// Result of polling a debounced, active low input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputEdge {
    /// A release which came too early after the last press got ignored.
    Bounce,
    /// No change.
    Steady,
    /// The input got pulled low.
    Pressed,
    /// The input got released after being held for `held_ms`.
    Released { held_ms: u64 },
}

/// Edge detection and release debouncing for active low inputs.
#[derive(Debug, Clone)]
pub(crate) struct DebouncedInput {
    high: bool,
    pressed_ms: u64,
}

impl DebouncedInput {
    pub fn new() -> Self {
        Self {
            high: true,
            pressed_ms: 0,
        }
    }

    /// True while the input is held low.
    pub fn is_down(&self) -> bool {
        !self.high
    }

    pub fn poll(&mut self, high: bool, now_ms: u64) -> InputEdge {
        let held_ms = now_ms.saturating_sub(self.pressed_ms);
        if !self.high && high && held_ms < DEBOUNCE_MS {
            return InputEdge::Bounce;
        }
        let was_high = std::mem::replace(&mut self.high, high);
        match (was_high, high) {
            (true, false) => {
                self.pressed_ms = now_ms;
                InputEdge::Pressed
            }
            (false, true) => InputEdge::Released { held_ms },
            _ => InputEdge::Steady,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Owns all registered control components and polls them at [`CONTROL_RATE_MS`].
pub struct ControlState {
    last_ms: u64,
    buttons: [Option<Button>; MAX_BUTTONS],
    potentiometers: [Option<Potentiometer>; MAX_POTENTIOMETERS],
    leds: [Option<DigitalLed>; MAX_LEDS],
    gate_triggers: [Option<GateTrigger>; MAX_GATE_TRIGGERS],
}

impl ControlState {
    /// Create a new, empty control state. `now_ms` is the control clock's current time.
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_ms: now_ms,
            buttons: std::array::from_fn(|_| None),
            potentiometers: std::array::from_fn(|_| None),
            leds: std::array::from_fn(|_| None),
            gate_triggers: std::array::from_fn(|_| None),
        }
    }

    /// Poll all registered components when at least [`CONTROL_RATE_MS`] passed since the
    /// last poll. Returns true when the components got polled.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) < CONTROL_RATE_MS {
            return false;
        }
        self.last_ms = now_ms;
        for button in self.buttons.iter_mut().flatten() {
            button.tick(now_ms);
        }
        for potentiometer in self.potentiometers.iter_mut().flatten() {
            potentiometer.tick(now_ms);
        }
        for led in self.leds.iter_mut().flatten() {
            led.tick(now_ms);
        }
        for gate_trigger in self.gate_triggers.iter_mut().flatten() {
            gate_trigger.tick(now_ms);
        }
        true
    }

    pub fn register_button(
        &mut self,
        index: usize,
        input: impl DigitalInput + 'static,
    ) -> Result<(), Error> {
        *Self::slot(&mut self.buttons, index, "button")? = Some(Button::new(input));
        Ok(())
    }

    pub fn register_potentiometer(
        &mut self,
        index: usize,
        input: impl AnalogInput + 'static,
    ) -> Result<(), Error> {
        *Self::slot(&mut self.potentiometers, index, "potentiometer")? =
            Some(Potentiometer::new(input));
        Ok(())
    }

    pub fn register_led(
        &mut self,
        index: usize,
        output: impl DigitalOutput + 'static,
    ) -> Result<(), Error> {
        *Self::slot(&mut self.leds, index, "LED")? = Some(DigitalLed::new(output));
        Ok(())
    }

    pub fn register_gate_trigger(
        &mut self,
        index: usize,
        input: impl DigitalInput + 'static,
        led: impl DigitalOutput + 'static,
    ) -> Result<(), Error> {
        *Self::slot(&mut self.gate_triggers, index, "gate trigger")? =
            Some(GateTrigger::new(input, led));
        Ok(())
    }

    pub fn button(&self, index: usize) -> Option<&Button> {
        self.buttons.get(index)?.as_ref()
    }

    pub fn potentiometer(&self, index: usize) -> Option<&Potentiometer> {
        self.potentiometers.get(index)?.as_ref()
    }

    pub fn led(&self, index: usize) -> Option<&DigitalLed> {
        self.leds.get(index)?.as_ref()
    }

    pub fn led_mut(&mut self, index: usize) -> Option<&mut DigitalLed> {
        self.leds.get_mut(index)?.as_mut()
    }

    pub fn gate_trigger(&self, index: usize) -> Option<&GateTrigger> {
        self.gate_triggers.get(index)?.as_ref()
    }

    pub fn gate_trigger_mut(&mut self, index: usize) -> Option<&mut GateTrigger> {
        self.gate_triggers.get_mut(index)?.as_mut()
    }

    fn slot<'a, T>(
        slots: &'a mut [Option<T>],
        index: usize,
        name: &str,
    ) -> Result<&'a mut Option<T>, Error> {
        let count = slots.len();
        slots.get_mut(index).ok_or_else(|| {
            Error::ControlError(format!(
                "{name} index {index} is out of range (max {count} slots)"
            ))
        })
    }
}

// -------------------------------------------------------------------------------------------------
