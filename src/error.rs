//! Error types for the parcel-ascent crate.
use crate::config::ConfigKey;
use std::{error::Error, fmt::Display};

/// Error type for the crate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AscentError {
    /// A configuration value that is required was not supplied.
    MissingConfigValue(ConfigKey),
    /// A configuration value could not be parsed as a finite decimal number.
    MalformedConfigValue(ConfigKey),
    /// A configuration value parsed, but it is outside the allowed range.
    ConfigValueOutOfRange(ConfigKey),
    /// Bad or invalid input, e.g. a non-physical temperature or pressure.
    InvalidInput,
    /// The environment could not provide a value at the requested location.
    EnvironmentLookupFailure,
    /// Unable to reserve memory for the time series buffers.
    AllocationFailure,
}

impl AscentError {
    /// Is this one of the errors caused by a bad configuration?
    pub fn is_configuration_error(&self) -> bool {
        use AscentError::*;

        matches!(
            self,
            MissingConfigValue(_) | MalformedConfigValue(_) | ConfigValueOutOfRange(_)
        )
    }
}

impl Display for AscentError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use AscentError::*;

        match self {
            MissingConfigValue(key) => write!(f, "missing configuration value: {}", key),
            MalformedConfigValue(key) => {
                write!(f, "configuration value is not a decimal number: {}", key)
            }
            ConfigValueOutOfRange(key) => write!(f, "configuration value out of range: {}", key),
            InvalidInput => write!(f, "invalid input"),
            EnvironmentLookupFailure => {
                write!(f, "environment has no data at the requested location")
            }
            AllocationFailure => write!(f, "unable to allocate time series buffers"),
        }
    }
}

impl Error for AscentError {}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AscentError>;
