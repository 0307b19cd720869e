//! Motor axis contract.
//!
//! The motion driver layer needs exactly four things from a physical axis:
//! its current value, its maximum velocity, and the ability to command a
//! velocity and a target value. How those reach hardware is up to the
//! implementor.
//!
//! Axes are owned outside the beamline model and shared with it as
//! `Arc<dyn MotorAxis>`, so every method takes `&self` and implementations
//! use interior mutability.

use std::fmt;

/// Interface for a single motor axis.
///
/// # Ordering
///
/// Callers command the velocity before the value, so the axis honours the
/// intended speed for the move that the value write starts.
pub trait MotorAxis: Send + Sync {
    /// Axis identifier (e.g. "SM:HEIGHT").
    fn name(&self) -> &str;

    /// Current position of the axis.
    fn value(&self) -> f64;

    /// Maximum speed the axis can move at [units/s].
    fn max_velocity(&self) -> f64;

    /// Command the speed for the next move [units/s].
    fn set_velocity(&self, velocity: f64);

    /// Command a new target position.
    fn set_value(&self, value: f64);
}

impl fmt::Debug for dyn MotorAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotorAxis")
            .field("name", &self.name())
            .field("value", &self.value())
            .field("max_velocity", &self.max_velocity())
            .finish()
    }
}
