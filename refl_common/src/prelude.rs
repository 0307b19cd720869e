//! Prelude module for common re-exports.
//!
//! # Usage
//!
//! ```rust
//! use refl_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::beamline::BeamlineConfig;
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{ANGULAR_TOLERANCE, TILT_ANGULAR_OFFSET};

// ─── Values & Axes ──────────────────────────────────────────────────
pub use crate::axis::MotorAxis;
pub use crate::value::ParameterValue;
