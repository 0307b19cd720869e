//! The beamline aggregate.
//!
//! Owns the component arena (beam order), the parameters (cascade order),
//! the registered modes and the motion drivers.
//!
//! ## Beam propagation
//!
//! `update_beam_path` feeds the incoming beam through every component in
//! turn, each component's outgoing ray becoming the next one's incoming
//! ray. It runs in full after `set_incoming_beam` and after any mutation
//! that raised a component's beam-path flag.
//!
//! ## Cascade
//!
//! Moving a parameter applies its set point, re-propagates the beam, then
//! re-applies every later parameter of the active mode in order:
//!
//! ```text
//! move(p) ─→ p.move_no_callback ─→ update_beam_path
//!        └─→ for q after p in active mode: q.move_no_callback ─→ update_beam_path
//! ```

use std::collections::HashMap;

use refl_common::value::ParameterValue;
use tracing::{debug, info};

use crate::component::{Component, ComponentId};
use crate::driver::IocDriver;
use crate::error::BeamlineError;
use crate::geometry::{Position, PositionAndAngle};
use crate::mode::BeamlineMode;
use crate::parameter::BeamlineParameter;

#[derive(Debug)]
pub struct Beamline {
    components: Vec<Component>,
    parameters: Vec<BeamlineParameter>,
    parameter_index: HashMap<String, usize>,
    modes: Vec<BeamlineMode>,
    active_mode: Option<usize>,
    drivers: Vec<IocDriver>,
    incoming_beam: PositionAndAngle,
}

impl Beamline {
    /// Build a beamline.
    ///
    /// # Errors
    ///
    /// - `DuplicateParameterName` / `DuplicateModeName` on name clashes
    /// - `UnknownComponent` / `IncompatibleComponent` if a parameter or
    ///   driver does not fit the component it references
    pub fn new(
        components: Vec<Component>,
        parameters: Vec<BeamlineParameter>,
        drivers: Vec<IocDriver>,
        modes: Vec<BeamlineMode>,
    ) -> Result<Self, BeamlineError> {
        let mut parameter_index = HashMap::with_capacity(parameters.len());
        for (index, parameter) in parameters.iter().enumerate() {
            if parameter_index
                .insert(parameter.name().to_owned(), index)
                .is_some()
            {
                return Err(BeamlineError::DuplicateParameterName(
                    parameter.name().to_owned(),
                ));
            }
        }

        for parameter in &parameters {
            parameter.validate(&components)?;
        }
        for driver in &drivers {
            driver.validate(&components)?;
        }

        let mut beamline = Self {
            components,
            parameters,
            parameter_index,
            modes: Vec::with_capacity(modes.len()),
            active_mode: None,
            drivers,
            incoming_beam: PositionAndAngle::default(),
        };
        for mode in modes {
            beamline.add_mode(mode)?;
        }

        // Flags raised while the caller assembled the components.
        for component in &mut beamline.components {
            component.take_beam_path_change();
        }

        debug!(
            components = beamline.components.len(),
            parameters = beamline.parameters.len(),
            drivers = beamline.drivers.len(),
            modes = beamline.modes.len(),
            "beamline constructed"
        );
        Ok(beamline)
    }

    // ─── Components & Beam ──────────────────────────────────────────

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Components in beam order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component_index(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.name() == name)
            .map(ComponentId)
    }

    pub fn incoming_beam(&self) -> PositionAndAngle {
        self.incoming_beam
    }

    pub fn set_incoming_beam(&mut self, beam: PositionAndAngle) -> Result<(), BeamlineError> {
        self.incoming_beam = beam;
        self.update_beam_path()
    }

    /// Re-propagate the incoming beam through every component.
    pub fn update_beam_path(&mut self) -> Result<(), BeamlineError> {
        let mut beam = self.incoming_beam;
        for component in &mut self.components {
            component.set_incoming_beam(beam);
            beam = component.get_outgoing_beam()?;
        }
        debug!(outgoing = %beam, "beam path updated");
        Ok(())
    }

    /// Re-propagate if any component raised its beam-path flag.
    fn notify_beam_path_listeners(&mut self) -> Result<(), BeamlineError> {
        let mut changed = false;
        for component in &mut self.components {
            changed |= component.take_beam_path_change();
        }
        if changed {
            self.update_beam_path()?;
        }
        Ok(())
    }

    fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component, BeamlineError> {
        self.components
            .get_mut(id.0)
            .ok_or(BeamlineError::UnknownComponent(id))
    }

    pub fn set_component_enabled(
        &mut self,
        id: ComponentId,
        enabled: bool,
    ) -> Result<(), BeamlineError> {
        self.component_mut(id)?.set_enabled(enabled);
        self.notify_beam_path_listeners()
    }

    pub fn set_component_angle(&mut self, id: ComponentId, angle: f64) -> Result<(), BeamlineError> {
        self.component_mut(id)?.set_angle(angle)?;
        self.notify_beam_path_listeners()
    }

    /// Where the beam crosses each component's movement axis, in beam order.
    /// `None` for a component whose axis is parallel to its incoming beam.
    pub fn beam_interceptions(&self) -> Vec<(&str, Option<Position>)> {
        self.components
            .iter()
            .map(|c| (c.name(), c.calculate_beam_interception().ok()))
            .collect()
    }

    // ─── Parameters ─────────────────────────────────────────────────

    fn parameter_position(&self, name: &str) -> Result<usize, BeamlineError> {
        self.parameter_index
            .get(name)
            .copied()
            .ok_or_else(|| BeamlineError::UnknownParameter(name.to_owned()))
    }

    pub fn parameter(&self, name: &str) -> Result<&BeamlineParameter, BeamlineError> {
        Ok(&self.parameters[self.parameter_position(name)?])
    }

    /// Parameters in cascade order.
    pub fn parameters(&self) -> &[BeamlineParameter] {
        &self.parameters
    }

    /// Live component readback of a parameter.
    pub fn parameter_readback(&self, name: &str) -> Result<Option<ParameterValue>, BeamlineError> {
        Ok(self.parameter(name)?.component_readback(&self.components))
    }

    /// Write a set point without moving.
    pub fn set_parameter_setpoint(
        &mut self,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<(), BeamlineError> {
        let index = self.parameter_position(name)?;
        self.parameters[index].set_point_only(value);
        Ok(())
    }

    /// Move one parameter to its set point and cascade to the later
    /// parameters of the active mode.
    pub fn move_parameter(&mut self, name: &str) -> Result<(), BeamlineError> {
        let index = self.parameter_position(name)?;
        self.apply_parameter(index)?;
        self.cascade(Some(index))
    }

    /// Move one parameter without cascading.
    pub fn move_parameter_no_callback(&mut self, name: &str) -> Result<(), BeamlineError> {
        let index = self.parameter_position(name)?;
        self.apply_parameter(index)
    }

    pub fn set_parameter_setpoint_and_move(
        &mut self,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<(), BeamlineError> {
        self.set_parameter_setpoint(name, value)?;
        self.move_parameter(name)
    }

    /// Re-apply the active mode's parameters.
    ///
    /// With `source = Some(name)` only parameters after `name` are moved,
    /// and nothing happens if `name` is not in the active mode. With
    /// `None` every parameter of the mode is moved.
    pub fn update_beamline_parameters(&mut self, source: Option<&str>) -> Result<(), BeamlineError> {
        let source = source.map(|name| self.parameter_position(name)).transpose()?;
        self.cascade(source)
    }

    fn apply_parameter(&mut self, index: usize) -> Result<(), BeamlineError> {
        self.parameters[index].move_no_callback(&mut self.components)?;
        self.notify_beam_path_listeners()
    }

    fn cascade(&mut self, source: Option<usize>) -> Result<(), BeamlineError> {
        let Some(mode) = self.active_mode.map(|m| &self.modes[m]) else {
            debug!("no active mode, nothing to cascade");
            return Ok(());
        };
        if source.is_some_and(|index| !mode.has_parameter(self.parameters[index].name())) {
            return Ok(());
        }

        let to_move = mode.parameters_in_mode(self.parameters.iter().map(|p| p.name()), source);
        for index in to_move {
            debug!(parameter = self.parameters[index].name(), "cascade move");
            self.apply_parameter(index)?;
        }
        Ok(())
    }

    // ─── Modes ──────────────────────────────────────────────────────

    /// Register a mode. Names are unique.
    pub fn add_mode(&mut self, mode: BeamlineMode) -> Result<(), BeamlineError> {
        if self.modes.iter().any(|m| m.name() == mode.name()) {
            return Err(BeamlineError::DuplicateModeName(mode.name().to_owned()));
        }
        self.modes.push(mode);
        Ok(())
    }

    /// Mode names in registration order.
    pub fn mode_names(&self) -> Vec<&str> {
        self.modes.iter().map(BeamlineMode::name).collect()
    }

    pub fn mode(&self, name: &str) -> Option<&BeamlineMode> {
        self.modes.iter().find(|m| m.name() == name)
    }

    pub fn active_mode(&self) -> Option<&BeamlineMode> {
        self.active_mode.map(|m| &self.modes[m])
    }

    /// Activate a registered mode and write its initial set points
    /// without moving.
    ///
    /// Every initial set point name is checked before anything changes.
    pub fn set_active_mode(&mut self, name: &str) -> Result<(), BeamlineError> {
        let mode_index = self
            .modes
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| BeamlineError::UnknownMode(name.to_owned()))?;

        let setpoints = self.modes[mode_index]
            .initial_setpoints()
            .iter()
            .map(|(parameter, value)| Ok((self.parameter_position(parameter)?, *value)))
            .collect::<Result<Vec<_>, BeamlineError>>()?;

        self.active_mode = Some(mode_index);
        for (index, value) in setpoints {
            self.parameters[index].set_point_only(value);
        }
        info!(mode = name, "beamline mode activated");
        Ok(())
    }

    pub fn set_active_mode_by_index(&mut self, index: usize) -> Result<(), BeamlineError> {
        let name = self
            .modes
            .get(index)
            .map(|m| m.name().to_owned())
            .ok_or_else(|| BeamlineError::UnknownMode(format!("index {index}")))?;
        self.set_active_mode(&name)
    }

    // ─── Motion ─────────────────────────────────────────────────────

    pub fn drivers(&self) -> &[IocDriver] {
        &self.drivers
    }

    /// Re-apply every parameter of the active mode, then move all axes so
    /// that they arrive together.
    pub fn move_beamline(&mut self) -> Result<(), BeamlineError> {
        self.cascade(None)?;
        let duration = self.max_move_duration()?;
        info!(duration, "beamline move");
        self.move_drivers(duration)
    }

    /// Slowest driver's move duration; 0 with no drivers.
    pub fn max_move_duration(&self) -> Result<f64, BeamlineError> {
        self.drivers.iter().try_fold(0.0_f64, |longest, driver| {
            Ok(longest.max(driver.get_max_move_duration(&self.components)?))
        })
    }

    pub fn move_drivers(&self, duration: f64) -> Result<(), BeamlineError> {
        for driver in &self.drivers {
            driver.perform_move(&self.components, duration)?;
        }
        Ok(())
    }
}
