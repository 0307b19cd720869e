//! Thread-safe control surface over a [`Beamline`].
//!
//! Protocol front-ends (channel access, gRPC, CLI) share one
//! `BeamlineServer`. Every write holds the beamline's write lock for the
//! whole operation, so a cascade or a beamline move is never observed half
//! done. Reads take the read lock and return owned snapshots.

use std::sync::Arc;

use parking_lot::RwLock;
use refl_common::value::ParameterValue;
use serde::Serialize;
use tracing::warn;

use crate::beamline::Beamline;
use crate::error::BeamlineError;
use crate::geometry::PositionAndAngle;

/// Point-in-time view of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSnapshot {
    pub name: String,
    /// Last written set point.
    pub set_point: Option<ParameterValue>,
    /// Set point readback.
    pub readback: Option<ParameterValue>,
    /// Set point written since the last move.
    pub changed: bool,
    /// Value derived from the component's live state.
    pub component_readback: Option<ParameterValue>,
}

#[derive(Debug, Clone)]
pub struct BeamlineServer {
    beamline: Arc<RwLock<Beamline>>,
}

/// Log a rejected write before handing the error back.
fn rejected<T>(operation: &str, result: Result<T, BeamlineError>) -> Result<T, BeamlineError> {
    if let Err(e) = &result {
        warn!(operation, error = %e, "write rejected");
    }
    result
}

impl BeamlineServer {
    pub fn new(beamline: Beamline) -> Self {
        Self {
            beamline: Arc::new(RwLock::new(beamline)),
        }
    }

    /// Run `f` with shared access to the beamline.
    pub fn read<R>(&self, f: impl FnOnce(&Beamline) -> R) -> R {
        f(&self.beamline.read())
    }

    pub fn get_parameter(&self, name: &str) -> Result<ParameterSnapshot, BeamlineError> {
        let beamline = self.beamline.read();
        let parameter = beamline.parameter(name)?;
        Ok(ParameterSnapshot {
            name: parameter.name().to_owned(),
            set_point: parameter.sp_rbv(),
            readback: parameter.sp_rbv(),
            changed: parameter.sp_changed(),
            component_readback: parameter.component_readback(beamline.components()),
        })
    }

    /// Snapshots of every parameter in cascade order.
    pub fn parameters(&self) -> Vec<ParameterSnapshot> {
        let beamline = self.beamline.read();
        beamline
            .parameters()
            .iter()
            .map(|p| ParameterSnapshot {
                name: p.name().to_owned(),
                set_point: p.sp_rbv(),
                readback: p.sp_rbv(),
                changed: p.sp_changed(),
                component_readback: p.component_readback(beamline.components()),
            })
            .collect()
    }

    pub fn set_parameter_setpoint(
        &self,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<(), BeamlineError> {
        rejected(
            "set_parameter_setpoint",
            self.beamline.write().set_parameter_setpoint(name, value),
        )
    }

    pub fn set_parameter_setpoint_and_move(
        &self,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> Result<(), BeamlineError> {
        rejected(
            "set_parameter_setpoint_and_move",
            self.beamline
                .write()
                .set_parameter_setpoint_and_move(name, value),
        )
    }

    /// Move one parameter (with cascade).
    pub fn trigger_move(&self, name: &str) -> Result<(), BeamlineError> {
        rejected("trigger_move", self.beamline.write().move_parameter(name))
    }

    pub fn list_modes(&self) -> Vec<String> {
        self.beamline
            .read()
            .mode_names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    pub fn get_active_mode(&self) -> Option<String> {
        self.beamline
            .read()
            .active_mode()
            .map(|m| m.name().to_owned())
    }

    pub fn set_active_mode(&self, name: &str) -> Result<(), BeamlineError> {
        rejected("set_active_mode", self.beamline.write().set_active_mode(name))
    }

    pub fn set_active_mode_by_index(&self, index: usize) -> Result<(), BeamlineError> {
        rejected(
            "set_active_mode_by_index",
            self.beamline.write().set_active_mode_by_index(index),
        )
    }

    pub fn trigger_beamline_move(&self) -> Result<(), BeamlineError> {
        rejected("trigger_beamline_move", self.beamline.write().move_beamline())
    }

    pub fn set_incoming_beam(&self, beam: PositionAndAngle) -> Result<(), BeamlineError> {
        rejected("set_incoming_beam", self.beamline.write().set_incoming_beam(beam))
    }
}
