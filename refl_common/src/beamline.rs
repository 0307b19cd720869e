//! Declarative beamline description.
//!
//! A beamline is described in one TOML file: the incoming beam, the
//! ordered component chain, the operator parameters, the modes, the motion
//! drivers and the motor axes they command. All types use
//! `serde::Deserialize`; optional fields use `#[serde(default)]`.
//!
//! # TOML Example
//!
//! ```toml
//! initial_mode = "nr"
//!
//! [shared]
//! service_name = "refl-sim"
//!
//! [beam]
//! angle = -45.0
//!
//! [[components]]
//! name = "sm"
//! type = "reflecting"
//! movement = { type = "linear", z = 5.0, angle = 90.0 }
//!
//! [[parameters]]
//! name = "smangle"
//! type = "reflection_angle"
//! component = "sm"
//!
//! [[modes]]
//! name = "nr"
//! parameters = ["smangle"]
//! initial_setpoints = { smangle = 0.0 }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::value::ParameterValue;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete description of one beamline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamlineConfig {
    /// Service name and log level.
    pub shared: SharedConfig,

    /// Mode activated right after construction.
    #[serde(default)]
    pub initial_mode: Option<String>,

    /// Beam entering the first component.
    #[serde(default)]
    pub beam: BeamConfig,

    /// Components in beam order.
    #[serde(default)]
    pub components: Vec<ComponentConfig>,

    /// Operator parameters in cascade order.
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,

    #[serde(default)]
    pub modes: Vec<ModeConfig>,

    #[serde(default)]
    pub drivers: Vec<DriverConfig>,

    /// Motor axes referenced by the drivers.
    #[serde(default)]
    pub axes: Vec<AxisConfig>,
}

/// Incoming beam: position in room coordinates plus angle [degrees].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamConfig {
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Clockwise from the horizon, 0 points away from the source.
    #[serde(default)]
    pub angle: f64,
}

// ─── Components ─────────────────────────────────────────────────────

/// Behaviour of a component towards the beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Leaves the beam untouched (slits, detectors).
    Passive,
    /// Can deflect the beam (mirrors, sample point).
    Reflecting,
    /// Passive, tilts to stay perpendicular to the beam.
    TiltingJaws,
    /// Passive, rotates about a centre; requires arc movement.
    Bench,
}

/// Allowed motion of a component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementConfig {
    /// Straight line through (y, z) at `angle` degrees.
    Linear {
        #[serde(default)]
        y: f64,
        #[serde(default)]
        z: f64,
        angle: f64,
    },
    /// Rotation about the centre (y, z).
    Arc {
        #[serde(default)]
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub component_type: ComponentType,

    pub movement: MovementConfig,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Initial angle of a reflecting component [degrees].
    #[serde(default)]
    pub angle: f64,

    /// Distance from rotation centre to the front of a bench.
    #[serde(default)]
    pub front_distance: f64,
}

fn default_enabled() -> bool {
    true
}

// ─── Parameters ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// Angle of a reflecting component relative to the incoming beam.
    ReflectionAngle,
    /// Reflection angle at the ideal sample point.
    Theta,
    /// Offset of a component from the beam along its movement axis.
    TrackingPosition,
    /// Component enable switch.
    ComponentEnabled,
}

impl ParameterType {
    /// True if the parameter can only drive a reflecting component.
    pub const fn requires_reflecting(&self) -> bool {
        matches!(self, Self::ReflectionAngle | Self::Theta)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    /// Name of the component the parameter drives.
    pub component: String,
}

// ─── Modes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub name: String,
    /// Parameters that auto-cascade while this mode is active.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Set points written (without moving) when the mode is activated.
    #[serde(default)]
    pub initial_setpoints: BTreeMap<String, ParameterValue>,
}

// ─── Drivers & Axes ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverType {
    /// One height axis.
    Height,
    /// Height axis plus tilt axis; component must be tilting jaws.
    HeightAndTilt,
    /// Height axis plus angle axis; component must be reflecting.
    HeightAndAngle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(rename = "type")]
    pub driver_type: DriverType,
    pub component: String,
    pub height_axis: String,
    #[serde(default)]
    pub tilt_axis: Option<String>,
    #[serde(default)]
    pub angle_axis: Option<String>,
}

/// Motor axis definition used to create simulated axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub name: String,
    /// Position at startup.
    #[serde(default)]
    pub initial_value: f64,
    /// Maximum speed [units/s]; must be finite and > 0.
    pub max_velocity: f64,
}

// ─── Validation ─────────────────────────────────────────────────────

impl BeamlineConfig {
    /// Validate names and cross references.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` on the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        unique_names("component", self.components.iter().map(|c| &c.name))?;
        let parameter_names = unique_names("parameter", self.parameters.iter().map(|p| &p.name))?;
        unique_names("mode", self.modes.iter().map(|m| &m.name))?;
        let axes = unique_names("axis", self.axes.iter().map(|a| &a.name))?;

        let components: HashMap<&str, &ComponentConfig> = self
            .components
            .iter()
            .map(|c| (c.name.as_str(), c))
            .collect();

        for component in &self.components {
            validate_component(component)?;
        }

        for parameter in &self.parameters {
            let Some(target) = components.get(parameter.component.as_str()) else {
                return Err(invalid(format!(
                    "parameter '{}' references unknown component '{}'",
                    parameter.name, parameter.component
                )));
            };
            if parameter.parameter_type.requires_reflecting()
                && target.component_type != ComponentType::Reflecting
            {
                return Err(invalid(format!(
                    "parameter '{}' ({:?}) requires a reflecting component, '{}' is {:?}",
                    parameter.name,
                    parameter.parameter_type,
                    target.name,
                    target.component_type
                )));
            }
        }

        for mode in &self.modes {
            let referenced = mode
                .parameters
                .iter()
                .chain(mode.initial_setpoints.keys());
            for name in referenced {
                if !parameter_names.contains(name.as_str()) {
                    return Err(invalid(format!(
                        "mode '{}' references unknown parameter '{}'",
                        mode.name, name
                    )));
                }
            }
        }

        if let Some(initial) = &self.initial_mode {
            if !self.modes.iter().any(|m| &m.name == initial) {
                return Err(invalid(format!("initial_mode '{initial}' is not a mode")));
            }
        }

        for driver in &self.drivers {
            validate_driver(driver, &components, &axes)?;
        }

        for axis in &self.axes {
            if !axis.max_velocity.is_finite() || axis.max_velocity <= 0.0 {
                return Err(invalid(format!(
                    "axis '{}' max_velocity {} must be finite and > 0",
                    axis.name, axis.max_velocity
                )));
            }
            if !axis.initial_value.is_finite() {
                return Err(invalid(format!(
                    "axis '{}' initial_value must be finite",
                    axis.name
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError(message)
}

fn unique_names<'a>(
    what: &str,
    names: impl Iterator<Item = &'a String>,
) -> Result<HashSet<&'a str>, ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(invalid(format!("{what} name cannot be empty")));
        }
        if !seen.insert(name.as_str()) {
            return Err(invalid(format!("duplicate {what} name '{name}'")));
        }
    }
    Ok(seen)
}

fn validate_component(component: &ComponentConfig) -> Result<(), ConfigError> {
    let is_arc = matches!(component.movement, MovementConfig::Arc { .. });
    match component.component_type {
        ComponentType::Bench if !is_arc => Err(invalid(format!(
            "bench '{}' requires arc movement",
            component.name
        ))),
        ComponentType::Bench if !component.front_distance.is_finite() => Err(invalid(format!(
            "bench '{}' front_distance must be finite",
            component.name
        ))),
        _ => Ok(()),
    }
}

fn validate_driver(
    driver: &DriverConfig,
    components: &HashMap<&str, &ComponentConfig>,
    axes: &HashSet<&str>,
) -> Result<(), ConfigError> {
    if !components.contains_key(driver.component.as_str()) {
        return Err(invalid(format!(
            "driver references unknown component '{}'",
            driver.component
        )));
    }

    let secondary = match driver.driver_type {
        DriverType::Height => None,
        DriverType::HeightAndTilt => Some(("tilt_axis", &driver.tilt_axis)),
        DriverType::HeightAndAngle => Some(("angle_axis", &driver.angle_axis)),
    };

    let mut required = vec![driver.height_axis.as_str()];
    if let Some((field, axis)) = secondary {
        match axis {
            Some(name) => required.push(name.as_str()),
            None => {
                return Err(invalid(format!(
                    "{:?} driver for '{}' requires {field}",
                    driver.driver_type, driver.component
                )));
            }
        }
    }

    for axis in required {
        if !axes.contains(axis) {
            return Err(invalid(format!(
                "driver for '{}' references unknown axis '{axis}'",
                driver.component
            )));
        }
    }
    Ok(())
}
