//! Geometry primitives in room coordinates.
//!
//! `y` is the height above the floor, `z` the distance along the beamline
//! away from the source. Angles are in degrees, clockwise from the
//! horizon, 0 pointing away from the source.

use std::fmt;

use serde::Serialize;

/// A point in the y/z plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub y: f64,
    pub z: f64,
}

impl Position {
    #[inline]
    pub const fn new(y: f64, z: f64) -> Self {
        Self { y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(y={:.6}, z={:.6})", self.y, self.z)
    }
}

/// A ray: a point plus a propagation angle.
///
/// Every component consumes one ray and produces one ray.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PositionAndAngle {
    pub y: f64,
    pub z: f64,
    /// Degrees, clockwise from the horizon.
    pub angle: f64,
}

impl PositionAndAngle {
    #[inline]
    pub const fn new(y: f64, z: f64, angle: f64) -> Self {
        Self { y, z, angle }
    }

    /// Ray starting at `position` with the given angle.
    #[inline]
    pub const fn from_position(position: Position, angle: f64) -> Self {
        Self::new(position.y, position.z, angle)
    }

    #[inline]
    pub const fn position(&self) -> Position {
        Position::new(self.y, self.z)
    }

    /// Unit vector along the ray as `(dy, dz)`.
    #[inline]
    pub fn direction(&self) -> (f64, f64) {
        let radians = self.angle.to_radians();
        (radians.sin(), radians.cos())
    }

    /// Point `distance` along the ray from its origin.
    pub fn point_along(&self, distance: f64) -> Position {
        let (dy, dz) = self.direction();
        Position::new(self.y + distance * dy, self.z + distance * dz)
    }
}

impl fmt::Display for PositionAndAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(y={:.6}, z={:.6}, angle={:.6})",
            self.y, self.z, self.angle
        )
    }
}
