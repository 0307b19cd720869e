//! Simulation runner: config file to beamline, operator writes to settled axes.

use std::path::Path;

use refl_common::beamline::BeamlineConfig;
use refl_common::config::{ConfigError, ConfigLoader};
use refl_common::consts::{DEFAULT_MAX_SIM_STEPS, DEFAULT_SIM_STEP_S};
use refl_common::value::{ParameterValue, ParseValueError};
use refl_core::config::build_beamline;
use refl_core::geometry::Position;
use refl_core::{BeamlineError, BeamlineServer, ParameterSnapshot};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::axis::{AxisBank, AxisSnapshot};

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Beamline(#[from] BeamlineError),

    #[error("invalid set point '{0}': expected NAME=VALUE")]
    InvalidAssignment(String),

    #[error(transparent)]
    InvalidValue(#[from] ParseValueError),

    #[error("simulation step {0} must be finite and > 0")]
    InvalidStep(f64),

    #[error("axes not settled after {steps} steps")]
    NotSettled { steps: u32 },
}

/// Parse a `NAME=VALUE` command-line set point.
pub fn parse_set_point(text: &str) -> Result<(String, ParameterValue), SimError> {
    let Some((name, value)) = text.split_once('=') else {
        return Err(SimError::InvalidAssignment(text.to_owned()));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(SimError::InvalidAssignment(text.to_owned()));
    }
    Ok((name.to_owned(), value.parse()?))
}

/// Operator actions for one run, applied in field order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    /// Mode to activate, overriding the configured initial mode.
    pub mode: Option<String>,
    /// Set points written without moving.
    pub set_points: Vec<(String, ParameterValue)>,
    /// Parameters moved one by one, each with its cascade.
    pub move_parameters: Vec<String>,
    /// Trigger a beamline move after the single-parameter moves.
    pub move_beamline: bool,
    /// Simulation step [s].
    pub dt: f64,
    /// Bound on steps per settle.
    pub max_steps: u32,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            mode: None,
            set_points: Vec::new(),
            move_parameters: Vec::new(),
            move_beamline: false,
            dt: DEFAULT_SIM_STEP_S,
            max_steps: DEFAULT_MAX_SIM_STEPS,
        }
    }
}

/// Beam interception of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterceptionSnapshot {
    pub component: String,
    /// `None` when the beam runs parallel to the component's movement.
    pub position: Option<Position>,
}

/// Everything `--dump` prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    pub service_name: String,
    pub active_mode: Option<String>,
    pub parameters: Vec<ParameterSnapshot>,
    pub interceptions: Vec<InterceptionSnapshot>,
    pub axes: Vec<AxisSnapshot>,
    /// Simulation steps taken so far.
    pub steps: u64,
}

pub struct SimulationRunner {
    service_name: String,
    axes: AxisBank,
    server: BeamlineServer,
    steps: u64,
}

impl SimulationRunner {
    pub fn load(path: &Path) -> Result<Self, SimError> {
        info!("Loading beamline from {}", path.display());
        Self::from_config(&BeamlineConfig::load(path)?)
    }

    /// Create the simulated axes and build the beamline on top of them.
    pub fn from_config(config: &BeamlineConfig) -> Result<Self, SimError> {
        let axes = AxisBank::from_config(&config.axes);
        let beamline = build_beamline(config, &axes.axis_map())?;
        info!(axes = axes.len(), "simulated axes ready");
        Ok(Self {
            service_name: config.shared.service_name.clone(),
            axes,
            server: BeamlineServer::new(beamline),
            steps: 0,
        })
    }

    pub fn server(&self) -> &BeamlineServer {
        &self.server
    }

    pub fn axes(&self) -> &AxisBank {
        &self.axes
    }

    /// Apply `plan`.
    ///
    /// Parameter moves only reposition the model; the axes are commanded
    /// by the beamline move, after which the runner steps them until they
    /// settle.
    pub fn run(&mut self, plan: &RunPlan) -> Result<(), SimError> {
        if let Some(mode) = &plan.mode {
            self.server.set_active_mode(mode)?;
        }
        for (name, value) in &plan.set_points {
            self.server.set_parameter_setpoint(name, *value)?;
        }
        for name in &plan.move_parameters {
            self.server.trigger_move(name)?;
            debug!(parameter = %name, "parameter moved");
        }
        if !plan.move_parameters.is_empty() {
            self.log_interceptions();
        }
        if plan.move_beamline {
            self.server.trigger_beamline_move()?;
            self.settle(plan.dt, plan.max_steps)?;
            self.log_interceptions();
        }
        Ok(())
    }

    /// Step the axes until all are settled; returns the steps taken.
    pub fn settle(&mut self, dt: f64, max_steps: u32) -> Result<u32, SimError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidStep(dt));
        }
        if self.axes.is_settled() {
            return Ok(0);
        }
        for step in 1..=max_steps {
            self.steps += 1;
            if self.axes.step(dt) {
                debug!(steps = step, "axes settled");
                return Ok(step);
            }
        }
        Err(SimError::NotSettled { steps: max_steps })
    }

    pub fn interceptions(&self) -> Vec<InterceptionSnapshot> {
        self.server.read(|beamline| {
            beamline
                .beam_interceptions()
                .into_iter()
                .map(|(name, position)| InterceptionSnapshot {
                    component: name.to_owned(),
                    position,
                })
                .collect()
        })
    }

    pub fn log_interceptions(&self) {
        for interception in self.interceptions() {
            match interception.position {
                Some(p) => info!(component = %interception.component, y = p.y, z = p.z, "beam interception"),
                None => info!(component = %interception.component, "beam parallel to movement"),
            }
        }
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            service_name: self.service_name.clone(),
            active_mode: self.server.get_active_mode(),
            parameters: self.server.parameters(),
            interceptions: self.interceptions(),
            axes: self.axes.snapshots(),
            steps: self.steps,
        }
    }
}
