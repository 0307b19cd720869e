//! Movement strategies: how a component may move and where its movement
//! axis meets the beam.
//!
//! ## Interception
//!
//! The movement axis is the line through the strategy's reference position
//! at the strategy's angle. The interception with a ray is solved in closed
//! form. Horizontal and vertical lines get dedicated right-triangle formulas
//! so that no near-zero (or near-infinite) tangent ends up in a division.
//!
//! ```text
//! parallel (mod 180°)  → NoInterceptionError
//! ray horizontal       → y = ray.y, solve z on the axis
//! axis horizontal      → y = axis.y, solve z on the ray
//! axis vertical        → z = axis.z, solve y on the ray
//! ray vertical         → z = ray.z, solve y on the axis
//! otherwise            → two-line system in tan(angle)
//! ```

use refl_common::consts::ANGULAR_TOLERANCE;
use thiserror::Error;

use crate::geometry::{Position, PositionAndAngle};

/// The movement axis and the beam are parallel, so there is no point
/// where the component could meet the beam.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("no interception between beam at {beam_angle}° and movement axis at {axis_angle}°")]
pub struct NoInterceptionError {
    pub beam_angle: f64,
    pub axis_angle: f64,
}

/// True if two angles describe the same line direction, i.e. they are
/// equal modulo 180° within `ANGULAR_TOLERANCE`.
#[inline]
pub fn angles_coincide(a: f64, b: f64) -> bool {
    let diff = (a - b).abs() % 180.0;
    diff <= ANGULAR_TOLERANCE || 180.0 - diff <= ANGULAR_TOLERANCE
}

// ─── Linear ─────────────────────────────────────────────────────────

/// Component moves along a straight line in the y/z plane, e.g. a slit
/// moving perpendicular to the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMovement {
    /// Set point position and axis angle (stored modulo 360).
    axis: PositionAndAngle,
}

impl LinearMovement {
    pub fn new(y: f64, z: f64, angle: f64) -> Self {
        Self {
            axis: PositionAndAngle::new(y, z, angle.rem_euclid(360.0)),
        }
    }

    /// Axis angle in `[0, 360)` degrees.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.axis.angle
    }

    /// Interception of the movement axis with `beam`.
    pub fn calculate_interception(
        &self,
        beam: &PositionAndAngle,
    ) -> Result<Position, NoInterceptionError> {
        let axis = &self.axis;

        if angles_coincide(beam.angle, axis.angle) {
            return Err(NoInterceptionError {
                beam_angle: beam.angle,
                axis_angle: axis.angle,
            });
        }

        let position = if angles_coincide(beam.angle, 0.0) {
            zero_angle(beam.y, axis)
        } else if angles_coincide(axis.angle, 0.0) {
            zero_angle(axis.y, beam)
        } else if angles_coincide(axis.angle, 90.0) {
            right_angle(axis.z, beam)
        } else if angles_coincide(beam.angle, 90.0) {
            right_angle(beam.z, axis)
        } else {
            let tan_b = beam.angle.to_radians().tan();
            let tan_m = axis.angle.to_radians().tan();
            let z = 1.0 / (tan_m - tan_b) * (beam.y - axis.y + axis.z * tan_m - beam.z * tan_b);
            let y = tan_b * tan_m / (tan_b - tan_m)
                * (axis.y / tan_m - beam.y / tan_b + beam.z - axis.z);
            Position::new(y, z)
        };

        Ok(position)
    }

    /// Move the set point to `offset` along the movement axis from the
    /// beam interception, e.g. a height above the beam.
    pub fn set_position_relative_to_beam(&mut self, beam_intercept: Position, offset: f64) {
        let angle = self.axis.angle;
        let radians = angle.to_radians();
        self.axis = PositionAndAngle::new(
            beam_intercept.y + offset * radians.sin(),
            beam_intercept.z + offset * radians.cos(),
            angle,
        );
    }

    /// Signed distance of the set point from `beam_intercept` along the
    /// movement axis.
    pub fn offset_from(&self, beam_intercept: Position) -> f64 {
        let (dy, dz) = self.axis.direction();
        (self.axis.y - beam_intercept.y) * dy + (self.axis.z - beam_intercept.z) * dz
    }

    /// Set point position of the component.
    #[inline]
    pub fn sp_position(&self) -> Position {
        self.axis.position()
    }
}

/// One line is horizontal at height `y_zero`; solve z on the other.
fn zero_angle(y_zero: f64, other: &PositionAndAngle) -> Position {
    let z = other.z + (y_zero - other.y) / other.angle.to_radians().tan();
    Position::new(y_zero, z)
}

/// One line is vertical at `z_zero`; solve y on the other.
fn right_angle(z_zero: f64, other: &PositionAndAngle) -> Position {
    let y = other.y + (z_zero - other.z) * other.angle.to_radians().tan();
    Position::new(y, z_zero)
}

// ─── Arc ────────────────────────────────────────────────────────────

/// Component rotates about a fixed centre (e.g. a bench).
///
/// The beam is intercepted on the horizontal line through the centre of
/// rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcMovement {
    line: LinearMovement,
}

impl ArcMovement {
    pub fn new(y_centre: f64, z_centre: f64) -> Self {
        Self {
            line: LinearMovement::new(y_centre, z_centre, 0.0),
        }
    }

    /// Centre of rotation (the set point position).
    #[inline]
    pub fn centre_of_rotation(&self) -> Position {
        self.line.sp_position()
    }
}

// ─── Strategy ───────────────────────────────────────────────────────

/// Movement strategy of a component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementStrategy {
    Linear(LinearMovement),
    Arc(ArcMovement),
}

impl MovementStrategy {
    #[inline]
    fn line(&self) -> &LinearMovement {
        match self {
            Self::Linear(linear) => linear,
            Self::Arc(arc) => &arc.line,
        }
    }

    #[inline]
    fn line_mut(&mut self) -> &mut LinearMovement {
        match self {
            Self::Linear(linear) => linear,
            Self::Arc(arc) => &mut arc.line,
        }
    }

    /// Axis angle in `[0, 360)` degrees.
    pub fn angle(&self) -> f64 {
        self.line().angle()
    }

    pub fn calculate_interception(
        &self,
        beam: &PositionAndAngle,
    ) -> Result<Position, NoInterceptionError> {
        self.line().calculate_interception(beam)
    }

    pub fn set_position_relative_to_beam(&mut self, beam_intercept: Position, offset: f64) {
        self.line_mut()
            .set_position_relative_to_beam(beam_intercept, offset);
    }

    pub fn offset_from(&self, beam_intercept: Position) -> f64 {
        self.line().offset_from(beam_intercept)
    }

    pub fn sp_position(&self) -> Position {
        self.line().sp_position()
    }
}

impl From<LinearMovement> for MovementStrategy {
    fn from(value: LinearMovement) -> Self {
        Self::Linear(value)
    }
}

impl From<ArcMovement> for MovementStrategy {
    fn from(value: ArcMovement) -> Self {
        Self::Arc(value)
    }
}
