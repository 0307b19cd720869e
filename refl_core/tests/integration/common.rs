//! Shared fixtures: a recording motor axis and a counting parameter mover.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use refl_common::axis::MotorAxis;
use refl_common::value::ParameterValue;
use refl_core::beamline::Beamline;
use refl_core::component::Component;
use refl_core::error::BeamlineError;
use refl_core::mode::BeamlineMode;
use refl_core::parameter::{BeamlineParameter, ComponentMover};

pub const TOLERANCE: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

// ─── Axis ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct AxisState {
    value: f64,
    velocity: Option<f64>,
}

/// Motor axis that jumps straight to the commanded value.
#[derive(Debug)]
pub struct RecordingAxis {
    name: String,
    max_velocity: f64,
    state: Mutex<AxisState>,
}

impl RecordingAxis {
    pub fn new(name: &str, value: f64, max_velocity: f64) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            max_velocity,
            state: Mutex::new(AxisState {
                value,
                velocity: None,
            }),
        })
    }

    pub fn velocity(&self) -> Option<f64> {
        self.state.lock().velocity
    }
}

impl MotorAxis for RecordingAxis {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.state.lock().value
    }

    fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    fn set_velocity(&self, velocity: f64) {
        self.state.lock().velocity = Some(velocity);
    }

    fn set_value(&self, value: f64) {
        self.state.lock().value = value;
    }
}

// ─── Counting mover ─────────────────────────────────────────────────

/// Counts how often its parameter was applied; touches no component.
#[derive(Debug, Clone, Default)]
pub struct CountingMover {
    count: Arc<AtomicUsize>,
}

impl CountingMover {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ComponentMover for CountingMover {
    fn move_component(
        &mut self,
        _parameter: &str,
        _set_point: Option<ParameterValue>,
        _components: &mut [Component],
    ) -> Result<(), BeamlineError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Beamline with three counting parameters "one", "two", "three", all in
/// the active mode "all".
pub fn beamline_with_3_counting_parameters() -> (Vec<CountingMover>, Beamline) {
    let movers: Vec<CountingMover> = (0..3).map(|_| CountingMover::default()).collect();
    let names = ["one", "two", "three"];
    let parameters = names
        .iter()
        .zip(&movers)
        .map(|(name, mover)| BeamlineParameter::new(*name, mover.clone()))
        .collect();
    let mode = BeamlineMode::new("all", names);

    let mut beamline = Beamline::new(vec![], parameters, vec![], vec![mode]).unwrap();
    beamline.set_active_mode("all").unwrap();
    (movers, beamline)
}

pub fn counts(movers: &[CountingMover]) -> Vec<usize> {
    movers.iter().map(CountingMover::count).collect()
}
