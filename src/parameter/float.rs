use std::{
    fmt::{Debug, Display},
    ops::RangeInclusive,
};

use four_cc::FourCC;

use super::{Parameter, ParameterType, ParameterValueUpdate};

// -------------------------------------------------------------------------------------------------

/// A continuous (float) parameter descriptor.
#[derive(Debug, Clone)]
pub struct FloatParameter {
    id: FourCC,
    name: &'static str,
    range: RangeInclusive<f32>,
    default: f32,
    unit: &'static str,
}

impl FloatParameter {
    /// Create a new float parameter descriptor.
    pub const fn new(
        id: FourCC,
        name: &'static str,
        range: RangeInclusive<f32>,
        default: f32,
    ) -> Self {
        assert!(
            default >= *range.start() && default <= *range.end(),
            "Invalid parameter default value"
        );
        Self {
            id,
            name,
            range,
            default,
            unit: "",
        }
    }

    /// Optional unit for string displays.
    pub const fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Create a raw [`ParameterValueUpdate`] for this parameter.
    #[must_use]
    pub fn value_update(&self, value: f32) -> (FourCC, ParameterValueUpdate) {
        (self.id, ParameterValueUpdate::Raw(Box::new(value)))
    }

    /// The parameter's identifier.
    pub const fn id(&self) -> FourCC {
        self.id
    }

    /// The parameter's value range.
    pub fn range(&self) -> &RangeInclusive<f32> {
        &self.range
    }

    /// The parameter's default value.
    pub const fn default_value(&self) -> f32 {
        self.default
    }

    /// Clamp the given plain value to the parameter's range.
    pub fn clamp_value(&self, value: f32) -> f32 {
        value.clamp(*self.range.start(), *self.range.end())
    }

    /// Normalize the given plain value to a 0.0-1.0 range.
    pub fn normalize_value(&self, value: f32) -> f32 {
        (value - *self.range.start()) / (*self.range.end() - *self.range.start())
    }

    /// Denormalize a 0.0-1.0 ranged value to the corresponding plain value.
    pub fn denormalize_value(&self, normalized: f32) -> f32 {
        debug_assert!((0.0..=1.0).contains(&normalized));
        *self.range.start() + normalized * (*self.range.end() - *self.range.start())
    }

    /// Convert the given plain value to a string.
    pub fn value_to_string(&self, value: f32, include_unit: bool) -> String {
        if include_unit && !self.unit.is_empty() {
            format!("{:.2} {}", value, self.unit)
        } else {
            format!("{:.2}", value)
        }
    }

    /// Convert the given string to a clamped plain value.
    pub fn string_to_value(&self, string: &str) -> Option<f32> {
        let value = string
            .trim()
            .trim_end_matches(self.unit)
            .trim()
            .parse::<f32>()
            .ok()?;
        Some(self.clamp_value(value))
    }
}

impl Parameter for FloatParameter {
    fn id(&self) -> FourCC {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn parameter_type(&self) -> ParameterType {
        ParameterType::Float
    }

    fn default_value(&self) -> f32 {
        self.normalize_value(self.default)
    }

    fn value_to_string(&self, normalized: f32, include_unit: bool) -> String {
        let value = self.denormalize_value(normalized.clamp(0.0, 1.0));
        self.value_to_string(value, include_unit)
    }

    fn string_to_value(&self, string: &str) -> Option<f32> {
        let value = self.string_to_value(string)?;
        Some(self.normalize_value(value))
    }
}

// -------------------------------------------------------------------------------------------------

/// Holds a float parameter value and its description.
#[derive(Debug, Clone)]
pub struct FloatParameterValue {
    description: FloatParameter,
    value: f32,
}

impl FloatParameterValue {
    /// Create a new parameter value, initialized to the parameter's default value.
    pub fn from_description(description: FloatParameter) -> Self {
        let value = description.default_value();
        Self { description, value }
    }

    /// Access the parameter value's description.
    pub fn description(&self) -> &FloatParameter {
        &self.description
    }

    /// Access to the current value.
    #[inline(always)]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Set a new value, clamping the given value into the parameter's value bounds if necessary.
    pub fn set_value_clamped(&mut self, value: f32) {
        self.value = self.description.clamp_value(value);
    }

    /// Applies a parameter update.
    pub fn apply_update(&mut self, update: &ParameterValueUpdate) {
        match update {
            ParameterValueUpdate::Raw(raw) => {
                if let Some(value) = raw.downcast_ref::<f32>() {
                    self.set_value_clamped(*value);
                } else if let Some(value) = raw.downcast_ref::<f64>() {
                    self.set_value_clamped(*value as f32);
                } else {
                    log::warn!(
                        "Invalid value type for float parameter '{}'",
                        self.description.id()
                    );
                }
            }
            ParameterValueUpdate::Normalized(normalized) => {
                self.value = self
                    .description
                    .denormalize_value(normalized.clamp(0.0, 1.0));
            }
        }
    }
}

impl Display for FloatParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description.value_to_string(self.value, true))
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SPEED: FloatParameter =
        FloatParameter::new(FourCC(*b"spd_"), "Speed", -4.0..=4.0, 1.0).with_unit("x");

    #[test]
    fn conversions() {
        assert_eq!(SPEED.normalize_value(0.0), 0.5);
        assert_eq!(SPEED.denormalize_value(1.0), 4.0);
        assert_eq!(Parameter::default_value(&SPEED), 0.625);
        assert_eq!(SPEED.string_to_value(" 2.5 x "), Some(2.5));
        assert_eq!(SPEED.string_to_value("10"), Some(4.0));
        assert_eq!(SPEED.string_to_value("fast"), None);
        assert_eq!(Parameter::value_to_string(&SPEED, 0.25, true), "-2.00 x");
    }

    #[test]
    fn updates() {
        let mut value = FloatParameterValue::from_description(SPEED);
        assert_eq!(value.value(), 1.0);

        value.apply_update(&SPEED.value_update(-8.0).1);
        assert_eq!(value.value(), -4.0);

        value.apply_update(&ParameterValueUpdate::Raw(Box::new(2.0_f64)));
        assert_eq!(value.value(), 2.0);

        value.apply_update(&ParameterValueUpdate::Raw(Box::new("3.0")));
        assert_eq!(value.value(), 2.0);

        value.apply_update(&ParameterValueUpdate::Normalized(0.75));
        assert_eq!(value.value(), 2.0);
        value.apply_update(&ParameterValueUpdate::Normalized(1.5));
        assert_eq!(value.value(), 4.0);
        assert_eq!(value.to_string(), "4.00 x");
    }
}
