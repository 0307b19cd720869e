//! Beamline error type.
//!
//! Every fallible operation on the model returns [`BeamlineError`]. The
//! model never panics on bad input from the control surface: unknown names,
//! unreachable geometry and degenerate motion are all reported here.

use refl_common::config::ConfigError;
use thiserror::Error;

use crate::component::ComponentId;
use crate::movement::NoInterceptionError;

/// Errors raised by the beamline model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeamlineError {
    /// Movement axis parallel to the incoming beam.
    #[error(transparent)]
    NoInterception(#[from] NoInterceptionError),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("unknown component: {0}")]
    UnknownComponent(ComponentId),

    /// Axis named in the configuration but not provided by the caller.
    #[error("unknown axis: {0}")]
    UnknownAxis(String),

    #[error("duplicate parameter name: {0}")]
    DuplicateParameterName(String),

    #[error("duplicate mode name: {0}")]
    DuplicateModeName(String),

    /// Component kind does not support the requested operation.
    #[error("component {component} does not support {operation}")]
    IncompatibleComponent {
        component: String,
        operation: &'static str,
    },

    /// Parameter moved before any set point was written.
    #[error("parameter {0} has no set point")]
    NoSetPoint(String),

    /// Axis cannot produce a finite move duration.
    #[error("axis {axis}: {reason}")]
    InvalidAxisConfiguration { axis: String, reason: String },

    #[error("invalid move duration: {0}")]
    InvalidMoveDuration(f64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
