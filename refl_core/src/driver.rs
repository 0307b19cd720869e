//! Motion driver layer.
//!
//! A driver maps one component's set point onto one or two motor axes and
//! moves them so that every axis on the beamline arrives at the same time:
//!
//! 1. each driver reports the time its slowest axis needs at full speed;
//! 2. the beamline takes the maximum over all drivers;
//! 3. every driver commands `velocity = distance / duration`, then the
//!    target value.
//!
//! | Driver           | Component     | Axes                                  |
//! |------------------|---------------|---------------------------------------|
//! | `Height`         | any           | height ← set point y                  |
//! | `HeightAndTilt`  | tilting jaws  | height, tilt ← perpendicular to beam  |
//! | `HeightAndAngle` | reflecting    | height, angle ← component angle       |

use std::sync::Arc;

use refl_common::axis::MotorAxis;
use refl_common::consts::TILT_ANGULAR_OFFSET;
use tracing::debug;

use crate::component::{Component, ComponentId, ComponentKind};
use crate::error::BeamlineError;

/// One axis command: how far the axis travels and where it ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisMove {
    distance: f64,
    target: f64,
}

#[derive(Debug, Clone)]
pub enum IocDriver {
    Height {
        component: ComponentId,
        height_axis: Arc<dyn MotorAxis>,
    },
    HeightAndTilt {
        component: ComponentId,
        height_axis: Arc<dyn MotorAxis>,
        tilt_axis: Arc<dyn MotorAxis>,
    },
    HeightAndAngle {
        component: ComponentId,
        height_axis: Arc<dyn MotorAxis>,
        angle_axis: Arc<dyn MotorAxis>,
    },
}

impl IocDriver {
    pub fn height(component: ComponentId, height_axis: Arc<dyn MotorAxis>) -> Self {
        Self::Height {
            component,
            height_axis,
        }
    }

    pub fn height_and_tilt(
        component: ComponentId,
        height_axis: Arc<dyn MotorAxis>,
        tilt_axis: Arc<dyn MotorAxis>,
    ) -> Self {
        Self::HeightAndTilt {
            component,
            height_axis,
            tilt_axis,
        }
    }

    pub fn height_and_angle(
        component: ComponentId,
        height_axis: Arc<dyn MotorAxis>,
        angle_axis: Arc<dyn MotorAxis>,
    ) -> Self {
        Self::HeightAndAngle {
            component,
            height_axis,
            angle_axis,
        }
    }

    pub fn component(&self) -> ComponentId {
        match self {
            Self::Height { component, .. }
            | Self::HeightAndTilt { component, .. }
            | Self::HeightAndAngle { component, .. } => *component,
        }
    }

    /// Axes driven, height first.
    pub fn axes(&self) -> Vec<&Arc<dyn MotorAxis>> {
        match self {
            Self::Height { height_axis, .. } => vec![height_axis],
            Self::HeightAndTilt {
                height_axis,
                tilt_axis,
                ..
            } => vec![height_axis, tilt_axis],
            Self::HeightAndAngle {
                height_axis,
                angle_axis,
                ..
            } => vec![height_axis, angle_axis],
        }
    }

    /// Check that the driven component exists and has the right kind.
    pub fn validate(&self, components: &[Component]) -> Result<(), BeamlineError> {
        let id = self.component();
        let component = components
            .get(id.0)
            .ok_or(BeamlineError::UnknownComponent(id))?;
        match (self, component.kind()) {
            (Self::Height { .. }, _)
            | (Self::HeightAndTilt { .. }, ComponentKind::TiltingJaws)
            | (Self::HeightAndAngle { .. }, ComponentKind::Reflecting { .. }) => Ok(()),
            (Self::HeightAndTilt { .. }, _) => Err(component.incompatible("tilt driver")),
            (Self::HeightAndAngle { .. }, _) => Err(component.incompatible("angle driver")),
        }
    }

    fn component_ref<'a>(&self, components: &'a [Component]) -> Result<&'a Component, BeamlineError> {
        let id = self.component();
        components
            .get(id.0)
            .ok_or(BeamlineError::UnknownComponent(id))
    }

    /// Distance and target for each driven axis, in `axes()` order.
    fn axis_moves(&self, components: &[Component]) -> Result<Vec<AxisMove>, BeamlineError> {
        let component = self.component_ref(components)?;
        let height_target = component.sp_position().y;
        let height = |axis: &Arc<dyn MotorAxis>| AxisMove {
            distance: (axis.value() - height_target).abs(),
            target: height_target,
        };

        match self {
            Self::Height { height_axis, .. } => Ok(vec![height(height_axis)]),
            Self::HeightAndTilt {
                height_axis,
                tilt_axis,
                ..
            } => {
                let tilt = component
                    .calculate_tilt_angle()
                    .ok_or_else(|| component.incompatible("tilt driver"))?;
                // Travel is measured to the perpendicular, the command is the tilt angle.
                let perpendicular = tilt - TILT_ANGULAR_OFFSET;
                Ok(vec![
                    height(height_axis),
                    AxisMove {
                        distance: (tilt_axis.value() - perpendicular).abs(),
                        target: tilt,
                    },
                ])
            }
            Self::HeightAndAngle {
                height_axis,
                angle_axis,
                ..
            } => {
                let angle = component
                    .angle()
                    .ok_or_else(|| component.incompatible("angle driver"))?;
                Ok(vec![
                    height(height_axis),
                    AxisMove {
                        distance: (angle_axis.value() - angle).abs(),
                        target: angle,
                    },
                ])
            }
        }
    }

    /// Time the slowest axis needs to reach its target at max velocity.
    pub fn get_max_move_duration(&self, components: &[Component]) -> Result<f64, BeamlineError> {
        let moves = self.axis_moves(components)?;
        let mut duration: f64 = 0.0;
        for (axis, axis_move) in self.axes().into_iter().zip(moves) {
            let max_velocity = axis.max_velocity();
            if !max_velocity.is_finite() || max_velocity <= 0.0 {
                return Err(BeamlineError::InvalidAxisConfiguration {
                    axis: axis.name().to_owned(),
                    reason: format!("max velocity {max_velocity} must be finite and positive"),
                });
            }
            if !axis_move.distance.is_finite() {
                return Err(BeamlineError::InvalidAxisConfiguration {
                    axis: axis.name().to_owned(),
                    reason: format!("move distance {} is not finite", axis_move.distance),
                });
            }
            duration = duration.max(axis_move.distance / max_velocity);
        }
        Ok(duration)
    }

    /// Command every axis to arrive at its target after `move_duration`.
    ///
    /// A zero duration means nothing needs to travel: the targets are
    /// written without touching the velocities.
    pub fn perform_move(
        &self,
        components: &[Component],
        move_duration: f64,
    ) -> Result<(), BeamlineError> {
        if !move_duration.is_finite() || move_duration < 0.0 {
            return Err(BeamlineError::InvalidMoveDuration(move_duration));
        }
        let moves = self.axis_moves(components)?;
        let axes = self.axes();

        if move_duration > 0.0 {
            for (axis, axis_move) in axes.iter().zip(&moves) {
                axis.set_velocity(axis_move.distance / move_duration);
            }
        }
        for (axis, axis_move) in axes.iter().zip(&moves) {
            debug!(
                axis = axis.name(),
                target = axis_move.target,
                duration = move_duration,
                "axis commanded"
            );
            axis.set_value(axis_move.target);
        }
        Ok(())
    }
}
