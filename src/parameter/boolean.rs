use std::fmt::{Debug, Display};

use four_cc::FourCC;

use super::{Parameter, ParameterType, ParameterValueUpdate};

// -------------------------------------------------------------------------------------------------

/// A boolean parameter descriptor.
#[derive(Debug, Clone)]
pub struct BooleanParameter {
    id: FourCC,
    name: &'static str,
    default: bool,
}

impl BooleanParameter {
    /// Create a new boolean parameter descriptor.
    pub const fn new(id: FourCC, name: &'static str, default: bool) -> Self {
        Self { id, name, default }
    }

    /// Create a raw [`ParameterValueUpdate`] for this parameter.
    #[must_use]
    pub fn value_update(&self, value: bool) -> (FourCC, ParameterValueUpdate) {
        (self.id, ParameterValueUpdate::Raw(Box::new(value)))
    }

    /// The parameter's identifier.
    pub const fn id(&self) -> FourCC {
        self.id
    }

    /// The parameter's default value.
    pub const fn default_value(&self) -> bool {
        self.default
    }

    /// Normalize the given plain value to a 0.0-1.0 range.
    pub const fn normalize_value(&self, value: bool) -> f32 {
        if value {
            1.0
        } else {
            0.0
        }
    }

    /// Denormalize a 0.0-1.0 ranged value to the corresponding plain value.
    pub fn denormalize_value(&self, normalized: f32) -> bool {
        normalized >= 0.5
    }

    pub fn value_to_string(&self, value: bool) -> String {
        let string = if value { "ON" } else { "OFF" };
        string.to_string()
    }

    pub fn string_to_value(&self, string: &str) -> Option<bool> {
        let string = string.trim();
        if string.eq_ignore_ascii_case("ON") {
            Some(true)
        } else if string.eq_ignore_ascii_case("OFF") {
            Some(false)
        } else {
            string.parse::<bool>().ok()
        }
    }
}

impl Parameter for BooleanParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Boolean
    }

    fn default_value(&self) -> f32 {
        self.normalize_value(self.default)
    }

    fn value_to_string(&self, normalized: f32, _include_unit: bool) -> String {
        self.value_to_string(self.denormalize_value(normalized))
    }

    fn string_to_value(&self, string: &str) -> Option<f32> {
        let value = self.string_to_value(string)?;
        Some(self.normalize_value(value))
    }
}

// -------------------------------------------------------------------------------------------------

/// Holds a boolean parameter value and its description.
#[derive(Debug, Clone)]
pub struct BooleanParameterValue {
    description: BooleanParameter,
    value: bool,
}

impl BooleanParameterValue {
    /// Create a new parameter value, initialized to the parameter's default value.
    pub fn from_description(description: BooleanParameter) -> Self {
        let value = description.default_value();
        Self { description, value }
    }

    pub fn description(&self) -> &BooleanParameter {
        &self.description
    }

    #[inline(always)]
    pub fn value(&self) -> bool {
        self.value
    }

    /// Applies a parameter update.
    pub fn apply_update(&mut self, update: &ParameterValueUpdate) {
        match update {
            ParameterValueUpdate::Raw(raw) => {
                if let Some(value) = raw.downcast_ref::<bool>() {
                    self.value = *value;
                } else {
                    log::warn!(
                        "Invalid value type for boolean parameter '{}'",
                        self.description.id()
                    );
                }
            }
            ParameterValueUpdate::Normalized(normalized) => {
                self.value = self.description.denormalize_value(*normalized);
            }
        }
    }
}

impl Display for BooleanParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description.value_to_string(self.value))
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const REVERSE: BooleanParameter = BooleanParameter::new(FourCC(*b"rvrs"), "Reverse", false);

    #[test]
    fn updates() {
        let mut value = BooleanParameterValue::from_description(REVERSE);
        assert!(!value.value());
        assert_eq!(value.to_string(), "OFF");

        value.apply_update(&REVERSE.value_update(true).1);
        assert!(value.value());
        value.apply_update(&ParameterValueUpdate::Raw(Box::new(1.0_f32)));
        assert!(value.value());
        value.apply_update(&ParameterValueUpdate::Normalized(0.2));
        assert!(!value.value());

        assert_eq!(Parameter::string_to_value(&REVERSE, " on "), Some(1.0));
        assert_eq!(Parameter::string_to_value(&REVERSE, "false"), Some(0.0));
        assert_eq!(Parameter::string_to_value(&REVERSE, "maybe"), None);
    }
}
