//! Effect parameter descriptors and value wrappers for hosts and automation.

use std::{any::Any, fmt::Debug};

use four_cc::FourCC;

// -------------------------------------------------------------------------------------------------

/// Describes the type of a [`Parameter`] to e.g. select a proper visual representation in a UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterType {
    /// A continuous floating-point value.
    Float,
    /// A boolean toggle.
    Boolean,
}

// -------------------------------------------------------------------------------------------------

/// Describes a single parameter of an [`Effect`](crate::Effect) for use in UIs or for automation.
pub trait Parameter: Debug {
    /// The unique id of the parameter.
    fn id(&self) -> FourCC;

    /// The name of the parameter.
    fn name(&self) -> &'static str;

    /// The parameter type.
    fn parameter_type(&self) -> ParameterType;

    /// Default value of parameter, expressed as normalized floating point value in range \[0,1\].
    fn default_value(&self) -> f32;

    /// Convert the given normalized floating point value to a string value.
    fn value_to_string(&self, value: f32, include_unit: bool) -> String;

    /// Convert the given string value to a normalized floating point value.
    /// Returns `None` when conversion failed, else a valid normalized value.
    fn string_to_value(&self, string: &str) -> Option<f32>;
}

// -------------------------------------------------------------------------------------------------

/// An update for a [`Parameter`]'s value, consumed by [`Effect`](crate::Effect)s in audio time.
#[derive(Debug)]
pub enum ParameterValueUpdate {
    /// Raw, type-erased internal value (f32 or boolean).
    Raw(Box<dyn Any + Send + Sync>),
    /// A float value in range `0.0..=1.0`.
    Normalized(f32),
}

// -------------------------------------------------------------------------------------------------

mod boolean;
pub use boolean::{BooleanParameter, BooleanParameterValue};

mod float;
pub use float::{FloatParameter, FloatParameterValue};
