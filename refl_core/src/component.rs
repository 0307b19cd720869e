//! Beamline components.
//!
//! A component sits on the beam path, takes one incoming ray and emits one
//! outgoing ray. Its kind decides how the outgoing ray is formed:
//!
//! | Kind          | Outgoing ray                                          |
//! |---------------|-------------------------------------------------------|
//! | Passive       | incoming ray unchanged                                |
//! | Reflecting    | from the interception at `2θ − α` when enabled        |
//! | TiltingJaws   | incoming ray unchanged; exposes a perpendicular tilt  |
//! | Bench         | incoming ray unchanged; exposes a front position      |
//!
//! ## Beam path notification
//!
//! Components live in an arena owned by the beamline. Mutations that change
//! what a component does to the beam (`set_enabled`, `set_angle`) raise a
//! pending beam-path flag. The owning beamline drains the flags after each
//! mutation it performs and re-propagates the beam when any was raised.

use std::fmt;

use refl_common::consts::TILT_ANGULAR_OFFSET;
use serde::Serialize;
use tracing::trace;

use crate::error::BeamlineError;
use crate::geometry::{Position, PositionAndAngle};
use crate::movement::{ArcMovement, MovementStrategy, NoInterceptionError};

/// Index of a component in its beamline (beam order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a component does to the beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentKind {
    Passive,
    /// Mirror or polarising supermirror; `angle` is the surface angle.
    Reflecting { angle: f64 },
    TiltingJaws,
    /// Rotates about its centre; the front sits `front_distance` along the
    /// incoming beam from the centre of rotation.
    Bench { front_distance: f64 },
}

impl ComponentKind {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Reflecting { .. } => "reflecting",
            Self::TiltingJaws => "tilting_jaws",
            Self::Bench { .. } => "bench",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    kind: ComponentKind,
    movement: MovementStrategy,
    enabled: bool,
    incoming_beam: PositionAndAngle,
    beam_path_changed: bool,
}

impl Component {
    fn with_kind(
        name: impl Into<String>,
        kind: ComponentKind,
        movement: impl Into<MovementStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            movement: movement.into(),
            enabled: true,
            incoming_beam: PositionAndAngle::default(),
            beam_path_changed: false,
        }
    }

    pub fn passive(name: impl Into<String>, movement: impl Into<MovementStrategy>) -> Self {
        Self::with_kind(name, ComponentKind::Passive, movement)
    }

    /// Reflecting component with its surface at angle 0.
    pub fn reflecting(name: impl Into<String>, movement: impl Into<MovementStrategy>) -> Self {
        Self::with_kind(name, ComponentKind::Reflecting { angle: 0.0 }, movement)
    }

    pub fn tilting_jaws(name: impl Into<String>, movement: impl Into<MovementStrategy>) -> Self {
        Self::with_kind(name, ComponentKind::TiltingJaws, movement)
    }

    pub fn bench(name: impl Into<String>, movement: ArcMovement, front_distance: f64) -> Self {
        Self::with_kind(name, ComponentKind::Bench { front_distance }, movement)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[inline]
    pub fn movement(&self) -> &MovementStrategy {
        &self.movement
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        trace!(component = %self.name, enabled, "component enabled changed");
        self.enabled = enabled;
        self.beam_path_changed = true;
    }

    /// Surface angle, for reflecting components only.
    pub fn angle(&self) -> Option<f64> {
        match self.kind {
            ComponentKind::Reflecting { angle } => Some(angle),
            _ => None,
        }
    }

    pub fn set_angle(&mut self, new_angle: f64) -> Result<(), BeamlineError> {
        let ComponentKind::Reflecting { angle } = &mut self.kind else {
            return Err(self.incompatible("set_angle"));
        };
        trace!(component = %self.name, angle = new_angle, "component angle changed");
        *angle = new_angle;
        self.beam_path_changed = true;
        Ok(())
    }

    #[inline]
    pub fn incoming_beam(&self) -> PositionAndAngle {
        self.incoming_beam
    }

    /// Set the incoming ray. Does not raise the beam-path flag: the
    /// beamline calls this while it propagates.
    pub fn set_incoming_beam(&mut self, beam: PositionAndAngle) {
        self.incoming_beam = beam;
    }

    /// Where the incoming beam crosses the movement axis.
    pub fn calculate_beam_interception(&self) -> Result<Position, NoInterceptionError> {
        self.movement.calculate_interception(&self.incoming_beam)
    }

    /// Place the set point `offset` along the movement axis from the beam
    /// interception.
    pub fn set_position_relative_to_beam(&mut self, offset: f64) -> Result<(), NoInterceptionError> {
        let intercept = self.calculate_beam_interception()?;
        self.movement.set_position_relative_to_beam(intercept, offset);
        Ok(())
    }

    /// Set point offset from the beam interception along the movement axis.
    pub fn position_relative_to_beam(&self) -> Result<f64, NoInterceptionError> {
        let intercept = self.calculate_beam_interception()?;
        Ok(self.movement.offset_from(intercept))
    }

    #[inline]
    pub fn sp_position(&self) -> Position {
        self.movement.sp_position()
    }

    /// Ray handed to the next component.
    pub fn get_outgoing_beam(&self) -> Result<PositionAndAngle, NoInterceptionError> {
        match self.kind {
            ComponentKind::Reflecting { angle } if self.enabled => {
                let intercept = self.calculate_beam_interception()?;
                let incoming = self.incoming_beam.angle;
                Ok(PositionAndAngle::from_position(
                    intercept,
                    incoming + 2.0 * (angle - incoming),
                ))
            }
            _ => Ok(self.incoming_beam),
        }
    }

    /// Angle perpendicular to the outgoing beam, for tilting jaws only.
    pub fn calculate_tilt_angle(&self) -> Option<f64> {
        match self.kind {
            ComponentKind::TiltingJaws => {
                // Tilting jaws never deflect the beam.
                Some(self.incoming_beam.angle + TILT_ANGULAR_OFFSET)
            }
            _ => None,
        }
    }

    /// Front of a bench: `front_distance` along the incoming beam direction
    /// from the centre of rotation.
    pub fn front_position(&self) -> Option<Position> {
        match self.kind {
            ComponentKind::Bench { front_distance } => {
                let centre = PositionAndAngle::from_position(
                    self.movement.sp_position(),
                    self.incoming_beam.angle,
                );
                Some(centre.point_along(front_distance))
            }
            _ => None,
        }
    }

    /// Drain the pending beam-path flag.
    pub(crate) fn take_beam_path_change(&mut self) -> bool {
        std::mem::take(&mut self.beam_path_changed)
    }

    pub(crate) fn incompatible(&self, operation: &'static str) -> BeamlineError {
        BeamlineError::IncompatibleComponent {
            component: self.name.clone(),
            operation,
        }
    }
}
