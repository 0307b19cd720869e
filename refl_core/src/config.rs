//! Build a live [`Beamline`] from a validated [`BeamlineConfig`].
//!
//! Axes are created by the caller (simulated or real) and handed in by
//! name; the builder only wires them to drivers.

use std::collections::HashMap;
use std::sync::Arc;

use refl_common::axis::MotorAxis;
use refl_common::beamline::{
    BeamlineConfig, ComponentConfig, ComponentType, DriverConfig, DriverType, MovementConfig,
    ParameterConfig, ParameterType,
};
use refl_common::config::ConfigError;
use tracing::info;

use crate::beamline::Beamline;
use crate::component::{Component, ComponentId};
use crate::driver::IocDriver;
use crate::error::BeamlineError;
use crate::geometry::PositionAndAngle;
use crate::mode::BeamlineMode;
use crate::movement::{ArcMovement, LinearMovement, MovementStrategy};
use crate::parameter::BeamlineParameter;

/// Motor axes by name.
pub type AxisMap = HashMap<String, Arc<dyn MotorAxis>>;

/// Validate `config`, assemble the beamline, propagate the configured beam
/// and activate `initial_mode` if one is set.
pub fn build_beamline(config: &BeamlineConfig, axes: &AxisMap) -> Result<Beamline, BeamlineError> {
    config.validate()?;

    let components = config
        .components
        .iter()
        .map(build_component)
        .collect::<Result<Vec<_>, _>>()?;

    let component_ids: HashMap<&str, ComponentId> = config
        .components
        .iter()
        .enumerate()
        .map(|(index, c)| (c.name.as_str(), ComponentId(index)))
        .collect();
    let lookup = |name: &str| {
        component_ids.get(name).copied().ok_or_else(|| {
            BeamlineError::Config(ConfigError::ValidationError(format!(
                "unknown component '{name}'"
            )))
        })
    };

    let parameters = config
        .parameters
        .iter()
        .map(|p| Ok(build_parameter(p, lookup(&p.component)?)))
        .collect::<Result<Vec<_>, BeamlineError>>()?;

    let drivers = config
        .drivers
        .iter()
        .map(|d| build_driver(d, lookup(&d.component)?, axes))
        .collect::<Result<Vec<_>, BeamlineError>>()?;

    let modes = config
        .modes
        .iter()
        .map(|m| {
            BeamlineMode::new(m.name.clone(), m.parameters.iter().cloned())
                .with_initial_setpoints(m.initial_setpoints.clone())
        })
        .collect();

    let mut beamline = Beamline::new(components, parameters, drivers, modes)?;
    let beam = config.beam;
    beamline.set_incoming_beam(PositionAndAngle::new(beam.y, beam.z, beam.angle))?;

    if let Some(mode) = &config.initial_mode {
        beamline.set_active_mode(mode)?;
    }

    info!(
        service = %config.shared.service_name,
        components = beamline.components().len(),
        parameters = beamline.parameters().len(),
        "beamline built"
    );
    Ok(beamline)
}

fn build_component(config: &ComponentConfig) -> Result<Component, BeamlineError> {
    let movement: MovementStrategy = match config.movement {
        MovementConfig::Linear { y, z, angle } => LinearMovement::new(y, z, angle).into(),
        MovementConfig::Arc { y, z } => ArcMovement::new(y, z).into(),
    };

    let mut component = match (config.component_type, movement) {
        (ComponentType::Passive, m) => Component::passive(&config.name, m),
        (ComponentType::Reflecting, m) => {
            let mut c = Component::reflecting(&config.name, m);
            c.set_angle(config.angle)?;
            c
        }
        (ComponentType::TiltingJaws, m) => Component::tilting_jaws(&config.name, m),
        (ComponentType::Bench, MovementStrategy::Arc(arc)) => {
            Component::bench(&config.name, arc, config.front_distance)
        }
        (ComponentType::Bench, MovementStrategy::Linear(_)) => {
            return Err(ConfigError::ValidationError(format!(
                "bench '{}' requires arc movement",
                config.name
            ))
            .into());
        }
    };
    if !config.enabled {
        component.set_enabled(false);
    }
    Ok(component)
}

fn build_parameter(config: &ParameterConfig, component: ComponentId) -> BeamlineParameter {
    match config.parameter_type {
        ParameterType::ReflectionAngle => {
            BeamlineParameter::reflection_angle(&config.name, component)
        }
        ParameterType::Theta => BeamlineParameter::theta(&config.name, component),
        ParameterType::TrackingPosition => {
            BeamlineParameter::tracking_position(&config.name, component)
        }
        ParameterType::ComponentEnabled => {
            BeamlineParameter::component_enabled(&config.name, component)
        }
    }
}

fn build_driver(
    config: &DriverConfig,
    component: ComponentId,
    axes: &AxisMap,
) -> Result<IocDriver, BeamlineError> {
    let axis = |name: &str| {
        axes.get(name)
            .cloned()
            .ok_or_else(|| BeamlineError::UnknownAxis(name.to_owned()))
    };
    let secondary = |name: &Option<String>, role: &str| {
        name.as_deref().map(axis).unwrap_or_else(|| {
            Err(BeamlineError::Config(ConfigError::ValidationError(format!(
                "driver for '{}' needs a {role} axis",
                config.component
            ))))
        })
    };

    let height_axis = axis(&config.height_axis)?;
    Ok(match config.driver_type {
        DriverType::Height => IocDriver::height(component, height_axis),
        DriverType::HeightAndTilt => {
            IocDriver::height_and_tilt(component, height_axis, secondary(&config.tilt_axis, "tilt")?)
        }
        DriverType::HeightAndAngle => IocDriver::height_and_angle(
            component,
            height_axis,
            secondary(&config.angle_axis, "angle")?,
        ),
    })
}
