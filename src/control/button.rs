use super::{DebouncedInput, DigitalInput, InputEdge, LONG_CLICK_MS, MEDIUM_CLICK_MS};

// -------------------------------------------------------------------------------------------------

/// Classifies button clicks by how long the button was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum ClickKind {
    Short,
    /// Held longer than [`MEDIUM_CLICK_MS`].
    Medium,
    /// Held longer than [`LONG_CLICK_MS`].
    Long,
}

impl ClickKind {
    pub fn from_held_ms(held_ms: u64) -> Self {
        if held_ms > LONG_CLICK_MS {
            Self::Long
        } else if held_ms > MEDIUM_CLICK_MS {
            Self::Medium
        } else {
            Self::Short
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// A debounced push button on an active low input.
///
/// Edge flags (`pressed`, `released`, `click`) are only set for the poll in which the edge
/// got detected.
pub struct Button {
    input: Box<dyn DigitalInput>,
    state: DebouncedInput,
    pressed: bool,
    released: bool,
    click: Option<ClickKind>,
}

impl Button {
    pub fn new(input: impl DigitalInput + 'static) -> Self {
        Self {
            input: Box::new(input),
            state: DebouncedInput::new(),
            pressed: false,
            released: false,
            click: None,
        }
    }

    /// True while the button is held down.
    pub fn down(&self) -> bool {
        self.state.is_down()
    }

    /// True when the button got pushed down in the last poll.
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// True when the button got released in the last poll.
    pub fn released(&self) -> bool {
        self.released
    }

    /// The kind of click that got completed in the last poll, if any.
    pub fn click(&self) -> Option<ClickKind> {
        self.click
    }

    pub fn short_click(&self) -> bool {
        self.click == Some(ClickKind::Short)
    }

    pub fn medium_click(&self) -> bool {
        self.click == Some(ClickKind::Medium)
    }

    pub fn long_click(&self) -> bool {
        self.click == Some(ClickKind::Long)
    }

    /// Read the input pin and update all flags.
    pub fn tick(&mut self, now_ms: u64) {
        let edge = self.state.poll(self.input.is_high(), now_ms);
        self.pressed = edge == InputEdge::Pressed;
        (self.released, self.click) = match edge {
            InputEdge::Released { held_ms } => (true, Some(ClickKind::from_held_ms(held_ms))),
            _ => (false, None),
        };
    }
}

// -------------------------------------------------------------------------------------------------
