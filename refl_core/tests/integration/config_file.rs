//! Building a beamline from a TOML file on disk.

use std::collections::HashMap;
use std::sync::Arc;

use refl_common::axis::MotorAxis;
use refl_common::beamline::BeamlineConfig;
use refl_common::config::{ConfigError, ConfigLoader};
use refl_core::config::{AxisMap, build_beamline};
use refl_core::error::BeamlineError;

use super::common::{RecordingAxis, assert_close};

const NR_BEAMLINE: &str = r#"
initial_mode = "nr"

[shared]
service_name = "refl-test"
log_level = "debug"

[beam]
angle = 0.0

[[components]]
name = "s1"
type = "passive"
movement = { type = "linear", z = 1.0, angle = 90.0 }

[[components]]
name = "sm"
type = "reflecting"
enabled = false
movement = { type = "linear", z = 5.0, angle = 90.0 }

[[components]]
name = "sample"
type = "reflecting"
movement = { type = "linear", z = 10.0, angle = 90.0 }

[[components]]
name = "det"
type = "tilting_jaws"
movement = { type = "linear", z = 20.0, angle = 90.0 }

[[parameters]]
name = "smangle"
type = "reflection_angle"
component = "sm"

[[parameters]]
name = "theta"
type = "theta"
component = "sample"

[[parameters]]
name = "detpos"
type = "tracking_position"
component = "det"

[[modes]]
name = "nr"
parameters = ["theta", "detpos"]
initial_setpoints = { detpos = 0.0 }

[[modes]]
name = "pnr"
parameters = ["smangle", "theta", "detpos"]

[[drivers]]
type = "height_and_tilt"
component = "det"
height_axis = "DET:HEIGHT"
tilt_axis = "DET:TILT"

[[axes]]
name = "DET:HEIGHT"
max_velocity = 5.0

[[axes]]
name = "DET:TILT"
max_velocity = 5.0
"#;

fn axes(config: &BeamlineConfig) -> (AxisMap, HashMap<String, Arc<RecordingAxis>>) {
    let recording: HashMap<String, Arc<RecordingAxis>> = config
        .axes
        .iter()
        .map(|a| {
            (
                a.name.clone(),
                RecordingAxis::new(&a.name, a.initial_value, a.max_velocity),
            )
        })
        .collect();
    let map = recording
        .iter()
        .map(|(name, axis)| (name.clone(), axis.clone() as Arc<dyn MotorAxis>))
        .collect();
    (map, recording)
}

#[test]
fn beamline_built_from_file_moves_detector() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beamline.toml");
    std::fs::write(&path, NR_BEAMLINE).unwrap();

    let config = BeamlineConfig::load(&path).unwrap();
    let (axis_map, recording) = axes(&config);
    let mut beamline = build_beamline(&config, &axis_map).unwrap();

    assert_eq!(beamline.mode_names(), vec!["nr", "pnr"]);
    assert!(!beamline.components()[1].enabled());

    beamline.set_parameter_setpoint("theta", 2.0).unwrap();
    beamline.move_beamline().unwrap();

    // Beam leaves the sample at 4° and crosses the detector 10 further on.
    let expected_height = 10.0 * 4f64.to_radians().tan();
    assert_close(recording["DET:HEIGHT"].value(), expected_height);
    assert_close(recording["DET:TILT"].value(), 94.0);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        BeamlineConfig::load(&dir.path().join("absent.toml")),
        Err(ConfigError::FileNotFound)
    );
}

#[test]
fn invalid_reference_fails_validation() {
    let broken = NR_BEAMLINE.replace("component = \"sample\"", "component = \"nowhere\"");
    let config = BeamlineConfig::from_toml(&broken).unwrap();
    let (axis_map, _) = axes(&config);
    assert!(matches!(
        build_beamline(&config, &axis_map),
        Err(BeamlineError::Config(ConfigError::ValidationError(_)))
    ));
}
