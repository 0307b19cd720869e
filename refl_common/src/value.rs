//! Parameter set point values.
//!
//! Operators write either a number (angles, heights) or a flag (enable
//! switches). Protocol layers that only carry numbers may send `0`/`1` for
//! flags, so both views are always available.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A set point written to a beamline parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// On/off value, e.g. a component enable switch.
    Flag(bool),
    /// Numeric value, e.g. an angle or a height.
    Number(f64),
}

impl ParameterValue {
    /// Numeric view. Flags map to `1.0` / `0.0`.
    #[inline]
    pub const fn as_f64(&self) -> f64 {
        match *self {
            Self::Number(v) => v,
            Self::Flag(true) => 1.0,
            Self::Flag(false) => 0.0,
        }
    }

    /// Flag view. Any non-zero number is `true`.
    #[inline]
    pub fn as_bool(&self) -> bool {
        match *self {
            Self::Flag(b) => b,
            Self::Number(v) => v != 0.0,
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(v) => write!(f, "{v}"),
        }
    }
}

/// Error returned when text is neither a boolean nor a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid parameter value '{0}': expected a number, 'true' or 'false'")]
pub struct ParseValueError(pub String);

impl FromStr for ParameterValue {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => Ok(Self::Flag(true)),
            "false" => Ok(Self::Flag(false)),
            _ => trimmed
                .parse::<f64>()
                .map(Self::Number)
                .map_err(|_| ParseValueError(s.to_string())),
        }
    }
}
