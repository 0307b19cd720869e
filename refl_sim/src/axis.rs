//! Simulated motor axes.
//!
//! A [`SimulatedAxis`] stands in for a motor controller. The beamline's
//! drivers write velocity and target through [`MotorAxis`]; the simulation
//! loop advances the position with [`SimulatedAxis::step`]. Motion is
//! constant-velocity: no acceleration ramp, no soft limits.

use std::sync::Arc;

use parking_lot::Mutex;
use refl_common::axis::MotorAxis;
use refl_common::beamline::AxisConfig;
use refl_common::consts::IN_POSITION_WINDOW;
use refl_core::config::AxisMap;
use serde::Serialize;
use tracing::trace;

/// Mutable part of an axis, guarded by one lock.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisState {
    position: f64,
    target: f64,
    /// Last commanded speed [units/s].
    velocity: f64,
}

/// Point-in-time view of one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSnapshot {
    pub name: String,
    pub position: f64,
    pub target: f64,
    pub velocity: f64,
    pub settled: bool,
}

#[derive(Debug)]
pub struct SimulatedAxis {
    name: String,
    max_velocity: f64,
    state: Mutex<AxisState>,
}

impl SimulatedAxis {
    /// Axis at rest at `initial_value`, commanded speed set to `max_velocity`.
    pub fn new(name: impl Into<String>, initial_value: f64, max_velocity: f64) -> Self {
        Self {
            name: name.into(),
            max_velocity,
            state: Mutex::new(AxisState {
                position: initial_value,
                target: initial_value,
                velocity: max_velocity,
            }),
        }
    }

    pub fn from_config(config: &AxisConfig) -> Self {
        Self::new(&config.name, config.initial_value, config.max_velocity)
    }

    pub fn target(&self) -> f64 {
        self.state.lock().target
    }

    /// Last commanded speed.
    pub fn velocity(&self) -> f64 {
        self.state.lock().velocity
    }

    /// Advance the axis by `dt` seconds toward its target.
    ///
    /// The commanded speed is clamped to the maximum velocity; a zero or
    /// negative command falls back to the maximum. The axis never
    /// overshoots. Returns whether the axis is settled afterwards.
    pub fn step(&self, dt: f64) -> bool {
        let mut state = self.state.lock();
        let remaining = state.target - state.position;
        if remaining.abs() <= IN_POSITION_WINDOW {
            state.position = state.target;
            return true;
        }

        let speed = if state.velocity > 0.0 {
            state.velocity.min(self.max_velocity)
        } else {
            self.max_velocity
        };
        let travel = speed * dt;
        if travel >= remaining.abs() {
            state.position = state.target;
        } else {
            state.position += travel.copysign(remaining);
        }
        trace!(
            axis = %self.name,
            position = state.position,
            target = state.target,
            speed,
            "axis step"
        );
        (state.target - state.position).abs() <= IN_POSITION_WINDOW
    }

    pub fn is_settled(&self) -> bool {
        let state = self.state.lock();
        (state.target - state.position).abs() <= IN_POSITION_WINDOW
    }

    pub fn snapshot(&self) -> AxisSnapshot {
        let state = *self.state.lock();
        AxisSnapshot {
            name: self.name.clone(),
            position: state.position,
            target: state.target,
            velocity: state.velocity,
            settled: (state.target - state.position).abs() <= IN_POSITION_WINDOW,
        }
    }
}

impl MotorAxis for SimulatedAxis {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.state.lock().position
    }

    fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    fn set_velocity(&self, velocity: f64) {
        self.state.lock().velocity = velocity;
    }

    fn set_value(&self, value: f64) {
        self.state.lock().target = value;
    }
}

/// All simulated axes of a beamline, in declaration order.
#[derive(Debug, Default, Clone)]
pub struct AxisBank {
    axes: Vec<Arc<SimulatedAxis>>,
}

impl AxisBank {
    pub fn from_config(configs: &[AxisConfig]) -> Self {
        Self {
            axes: configs
                .iter()
                .map(|c| Arc::new(SimulatedAxis::from_config(c)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<SimulatedAxis>> {
        self.axes.iter().find(|a| a.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SimulatedAxis>> {
        self.axes.iter()
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// The same axes viewed through the motor contract, for the beamline builder.
    pub fn axis_map(&self) -> AxisMap {
        self.axes
            .iter()
            .map(|a| (a.name().to_owned(), Arc::clone(a) as Arc<dyn MotorAxis>))
            .collect()
    }

    /// Step every axis; true once all of them are settled.
    pub fn step(&self, dt: f64) -> bool {
        self.axes
            .iter()
            .map(|a| a.step(dt))
            .fold(true, |settled, axis| settled && axis)
    }

    pub fn is_settled(&self) -> bool {
        self.axes.iter().all(|a| a.is_settled())
    }

    pub fn snapshots(&self) -> Vec<AxisSnapshot> {
        self.axes.iter().map(|a| a.snapshot()).collect()
    }
}
