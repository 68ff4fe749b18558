use std::{error, fmt, io};

// -------------------------------------------------------------------------------------------------

/// Provides an enumeration of all possible errors reported by grainfreeze.
///
/// Note that the real-time DSP paths never fail: out of range values get clamped there.
/// Errors only are reported when setting up or wiring up scrubbers and effects.
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    SampleBankError(String),
    ParameterError(String),
    ControlError(String),
    SendError(String),
    IoError(io::Error),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SampleBankError(str) => write!(f, "Invalid sample bank: {str}"),
            Self::ParameterError(str) => write!(f, "Invalid parameter: {str}"),
            Self::ControlError(str) => write!(f, "Invalid control setup: {str}"),
            Self::SendError(str) => write!(f, "Failed to send command: {str}"),
            Self::IoError(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}
