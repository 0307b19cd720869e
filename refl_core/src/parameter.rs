//! Operator-facing beamline parameters.
//!
//! A parameter holds a set point and a "changed since last move" flag. What
//! a move does to the model is decided by its [`ComponentMover`]:
//!
//! | Mover              | Effect of a move                                    |
//! |--------------------|-----------------------------------------------------|
//! | `ReflectionAngle`  | component angle = incoming beam angle + set point  |
//! | `Theta`            | same rule, at the ideal sample point               |
//! | `TrackingPosition` | set point position = interception + set point along the axis |
//! | `ComponentEnabled` | component enabled = set point                       |
//!
//! Parameters only hold a [`ComponentId`]; the components themselves are
//! owned by the beamline and lent to the mover for the duration of a move.

use std::fmt;

use refl_common::value::ParameterValue;
use tracing::debug;

use crate::component::{Component, ComponentId, ComponentKind};
use crate::error::BeamlineError;

// ─── Mover Contract ─────────────────────────────────────────────────

/// Applies a parameter set point to the component model.
pub trait ComponentMover: Send + Sync + fmt::Debug {
    /// Component driven by this mover, if any.
    fn component(&self) -> Option<ComponentId> {
        None
    }

    /// Check the mover against the beamline's components at construction.
    fn validate(&self, _components: &[Component]) -> Result<(), BeamlineError> {
        Ok(())
    }

    /// Apply `set_point` to the components. `parameter` names the owning
    /// parameter for error reporting.
    fn move_component(
        &mut self,
        parameter: &str,
        set_point: Option<ParameterValue>,
        components: &mut [Component],
    ) -> Result<(), BeamlineError>;

    /// Value derived from the live component state.
    fn component_readback(&self, _components: &[Component]) -> Option<ParameterValue> {
        None
    }
}

fn component_ref(components: &[Component], id: ComponentId) -> Result<&Component, BeamlineError> {
    components
        .get(id.0)
        .ok_or(BeamlineError::UnknownComponent(id))
}

fn component_mut(
    components: &mut [Component],
    id: ComponentId,
) -> Result<&mut Component, BeamlineError> {
    components
        .get_mut(id.0)
        .ok_or(BeamlineError::UnknownComponent(id))
}

fn require_set_point(
    parameter: &str,
    set_point: Option<ParameterValue>,
) -> Result<ParameterValue, BeamlineError> {
    set_point.ok_or_else(|| BeamlineError::NoSetPoint(parameter.to_owned()))
}

// ─── Built-in Movers ────────────────────────────────────────────────

/// Angle of a reflecting component relative to its incoming beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionAngle {
    component: ComponentId,
}

impl ReflectionAngle {
    pub const fn new(component: ComponentId) -> Self {
        Self { component }
    }
}

impl ComponentMover for ReflectionAngle {
    fn component(&self) -> Option<ComponentId> {
        Some(self.component)
    }

    fn validate(&self, components: &[Component]) -> Result<(), BeamlineError> {
        let component = component_ref(components, self.component)?;
        match component.kind() {
            ComponentKind::Reflecting { .. } => Ok(()),
            _ => Err(component.incompatible("reflection angle")),
        }
    }

    fn move_component(
        &mut self,
        parameter: &str,
        set_point: Option<ParameterValue>,
        components: &mut [Component],
    ) -> Result<(), BeamlineError> {
        let set_point = require_set_point(parameter, set_point)?.as_f64();
        let component = component_mut(components, self.component)?;
        let angle = component.incoming_beam().angle + set_point;
        component.set_angle(angle)
    }

    fn component_readback(&self, components: &[Component]) -> Option<ParameterValue> {
        let component = components.get(self.component.0)?;
        let angle = component.angle()?;
        Some(ParameterValue::Number(angle - component.incoming_beam().angle))
    }
}

/// Reflection angle at the ideal sample point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theta {
    reflection: ReflectionAngle,
}

impl Theta {
    pub const fn new(sample_point: ComponentId) -> Self {
        Self {
            reflection: ReflectionAngle::new(sample_point),
        }
    }
}

impl ComponentMover for Theta {
    fn component(&self) -> Option<ComponentId> {
        self.reflection.component()
    }

    fn validate(&self, components: &[Component]) -> Result<(), BeamlineError> {
        self.reflection.validate(components)
    }

    fn move_component(
        &mut self,
        parameter: &str,
        set_point: Option<ParameterValue>,
        components: &mut [Component],
    ) -> Result<(), BeamlineError> {
        self.reflection
            .move_component(parameter, set_point, components)
    }

    fn component_readback(&self, components: &[Component]) -> Option<ParameterValue> {
        self.reflection.component_readback(components)
    }
}

/// Offset of a component from the beam along its movement axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingPosition {
    component: ComponentId,
}

impl TrackingPosition {
    pub const fn new(component: ComponentId) -> Self {
        Self { component }
    }
}

impl ComponentMover for TrackingPosition {
    fn component(&self) -> Option<ComponentId> {
        Some(self.component)
    }

    fn validate(&self, components: &[Component]) -> Result<(), BeamlineError> {
        component_ref(components, self.component).map(|_| ())
    }

    fn move_component(
        &mut self,
        parameter: &str,
        set_point: Option<ParameterValue>,
        components: &mut [Component],
    ) -> Result<(), BeamlineError> {
        let offset = require_set_point(parameter, set_point)?.as_f64();
        component_mut(components, self.component)?.set_position_relative_to_beam(offset)?;
        Ok(())
    }

    fn component_readback(&self, components: &[Component]) -> Option<ParameterValue> {
        let component = components.get(self.component.0)?;
        component
            .position_relative_to_beam()
            .ok()
            .map(ParameterValue::Number)
    }
}

/// Enable switch of a component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentEnabled {
    component: ComponentId,
}

impl ComponentEnabled {
    pub const fn new(component: ComponentId) -> Self {
        Self { component }
    }
}

impl ComponentMover for ComponentEnabled {
    fn component(&self) -> Option<ComponentId> {
        Some(self.component)
    }

    fn validate(&self, components: &[Component]) -> Result<(), BeamlineError> {
        component_ref(components, self.component).map(|_| ())
    }

    fn move_component(
        &mut self,
        parameter: &str,
        set_point: Option<ParameterValue>,
        components: &mut [Component],
    ) -> Result<(), BeamlineError> {
        let enabled = require_set_point(parameter, set_point)?.as_bool();
        component_mut(components, self.component)?.set_enabled(enabled);
        Ok(())
    }

    fn component_readback(&self, components: &[Component]) -> Option<ParameterValue> {
        components
            .get(self.component.0)
            .map(|c| ParameterValue::Flag(c.enabled()))
    }
}

// ─── Parameter ──────────────────────────────────────────────────────

/// A named operator parameter.
#[derive(Debug)]
pub struct BeamlineParameter {
    name: String,
    set_point: Option<ParameterValue>,
    sp_is_changed: bool,
    mover: Box<dyn ComponentMover>,
}

impl BeamlineParameter {
    pub fn new(name: impl Into<String>, mover: impl ComponentMover + 'static) -> Self {
        Self {
            name: name.into(),
            set_point: None,
            sp_is_changed: false,
            mover: Box::new(mover),
        }
    }

    pub fn reflection_angle(name: impl Into<String>, component: ComponentId) -> Self {
        Self::new(name, ReflectionAngle::new(component))
    }

    pub fn theta(name: impl Into<String>, sample_point: ComponentId) -> Self {
        Self::new(name, Theta::new(sample_point))
    }

    pub fn tracking_position(name: impl Into<String>, component: ComponentId) -> Self {
        Self::new(name, TrackingPosition::new(component))
    }

    pub fn component_enabled(name: impl Into<String>, component: ComponentId) -> Self {
        Self::new(name, ComponentEnabled::new(component))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last written set point.
    #[inline]
    pub fn sp_rbv(&self) -> Option<ParameterValue> {
        self.set_point
    }

    /// True if the set point was written since the last move.
    #[inline]
    pub fn sp_changed(&self) -> bool {
        self.sp_is_changed
    }

    #[inline]
    pub fn component(&self) -> Option<ComponentId> {
        self.mover.component()
    }

    /// Record a set point without moving anything.
    pub fn set_point_only(&mut self, value: impl Into<ParameterValue>) {
        let value = value.into();
        debug!(parameter = %self.name, %value, "set point written");
        self.set_point = Some(value);
        self.sp_is_changed = true;
    }

    /// Apply the set point to the components and clear the changed flag.
    ///
    /// Does not re-propagate the beam or cascade; the beamline does both
    /// around this call.
    pub fn move_no_callback(&mut self, components: &mut [Component]) -> Result<(), BeamlineError> {
        self.mover
            .move_component(&self.name, self.set_point, components)?;
        self.sp_is_changed = false;
        Ok(())
    }

    pub fn component_readback(&self, components: &[Component]) -> Option<ParameterValue> {
        self.mover.component_readback(components)
    }

    pub(crate) fn validate(&self, components: &[Component]) -> Result<(), BeamlineError> {
        self.mover.validate(components)
    }
}
