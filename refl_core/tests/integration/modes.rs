//! Mode behaviour on a neutron reflection beamline.

use refl_common::value::ParameterValue;
use refl_core::beamline::Beamline;
use refl_core::component::{Component, ComponentId};
use refl_core::error::BeamlineError;
use refl_core::geometry::{Position, PositionAndAngle};
use refl_core::mode::BeamlineMode;
use refl_core::movement::LinearMovement;
use refl_core::parameter::BeamlineParameter;

use super::common::assert_close;

fn assert_position(actual: Position, expected: Position) {
    assert_close(actual.y, expected.y);
    assert_close(actual.z, expected.z);
}

fn vertical(z: f64) -> LinearMovement {
    LinearMovement::new(0.0, z, 90.0)
}

#[test]
fn neutron_reflection_mode_puts_components_on_beam() {
    let components = vec![
        Component::passive("s2", vertical(10.0)),
        Component::reflecting("ideal_sample_point", vertical(20.0)),
        Component::passive("detector", vertical(30.0)),
    ];
    let parameters = vec![
        BeamlineParameter::tracking_position("slit2height", ComponentId(0)),
        BeamlineParameter::tracking_position("height", ComponentId(1)),
        BeamlineParameter::theta("theta", ComponentId(1)),
        BeamlineParameter::tracking_position("detectorheight", ComponentId(2)),
    ];
    let mode = BeamlineMode::new(
        "neutron reflection",
        ["slit2height", "height", "theta", "detectorheight"],
    );
    let mut beamline = Beamline::new(components, parameters, vec![], vec![mode]).unwrap();
    beamline.set_active_mode("neutron reflection").unwrap();
    beamline.set_parameter_setpoint("theta", 45.0).unwrap();
    beamline.set_parameter_setpoint("height", 0.0).unwrap();
    beamline.set_parameter_setpoint("slit2height", 0.0).unwrap();
    beamline.set_parameter_setpoint("detectorheight", 0.0).unwrap();
    beamline
        .set_incoming_beam(PositionAndAngle::new(0.0, 0.0, -45.0))
        .unwrap();

    beamline.move_beamline().unwrap();

    let position = |i: usize| beamline.component(ComponentId(i)).unwrap().sp_position();
    assert_position(position(0), Position::new(-10.0, 10.0));
    assert_position(position(1), Position::new(-20.0, 20.0));
    assert_position(position(2), Position::new(-10.0, 30.0));
}

fn sample_only(mode_parameters: &[&str]) -> Beamline {
    let components = vec![Component::reflecting("ideal_sample_point", vertical(20.0))];
    let parameters = vec![BeamlineParameter::theta("theta", ComponentId(0))];
    let mode = BeamlineMode::new("mode name", mode_parameters.iter().copied());
    let mut beamline = Beamline::new(components, parameters, vec![], vec![mode]).unwrap();
    beamline.set_parameter_setpoint("theta", 45.0).unwrap();
    beamline
        .set_incoming_beam(PositionAndAngle::new(0.0, 0.0, 0.0))
        .unwrap();
    beamline.set_active_mode("mode name").unwrap();
    beamline
}

#[test]
fn parameter_in_mode_is_applied_on_move() {
    let mut beamline = sample_only(&["theta"]);
    beamline.move_beamline().unwrap();
    assert_eq!(beamline.components()[0].angle(), Some(45.0));
}

#[test]
fn parameter_outside_mode_is_not_applied_on_move() {
    let mut beamline = sample_only(&[]);
    beamline.move_beamline().unwrap();
    assert_eq!(beamline.components()[0].angle(), Some(0.0));
    assert!(beamline.parameter("theta").unwrap().sp_changed());
}

#[test]
fn supermirror_move_cascades_to_theta() {
    let components = vec![
        Component::reflecting("super mirror", vertical(10.0)),
        Component::reflecting("ideal_sample_point", vertical(20.0)),
    ];
    let parameters = vec![
        BeamlineParameter::reflection_angle("smangle", ComponentId(0)),
        BeamlineParameter::theta("theta", ComponentId(1)),
    ];
    let mode = BeamlineMode::new("mode name", ["theta", "smangle"]);
    let mut beamline = Beamline::new(components, parameters, vec![], vec![mode]).unwrap();
    beamline.set_parameter_setpoint("theta", 45.0).unwrap();
    beamline.set_parameter_setpoint("smangle", 0.0).unwrap();
    beamline
        .set_incoming_beam(PositionAndAngle::new(0.0, 0.0, 0.0))
        .unwrap();
    beamline.set_active_mode("mode name").unwrap();
    beamline.move_beamline().unwrap();

    beamline
        .set_parameter_setpoint_and_move("smangle", -10.0)
        .unwrap();

    let sample_angle = beamline.components()[1].angle().unwrap();
    assert_close(sample_angle, -10.0 * 2.0 + 45.0);
}

fn supermirror_beamline(mode: BeamlineMode) -> Beamline {
    let components = vec![Component::reflecting("super mirror", vertical(10.0))];
    let parameters = vec![BeamlineParameter::reflection_angle("smangle", ComponentId(0))];
    let mut beamline = Beamline::new(components, parameters, vec![], vec![mode]).unwrap();
    beamline.set_parameter_setpoint("smangle", 0.0).unwrap();
    beamline
}

#[test]
fn initial_setpoints_written_without_moving() {
    let mode = BeamlineMode::new("mode name", ["smangle"]).with_initial_setpoints([("smangle", 45.0)]);
    let mut beamline = supermirror_beamline(mode);

    beamline.set_active_mode("mode name").unwrap();

    let smangle = beamline.parameter("smangle").unwrap();
    assert_eq!(smangle.sp_rbv(), Some(ParameterValue::Number(45.0)));
    assert!(smangle.sp_changed());
    assert_eq!(beamline.components()[0].angle(), Some(0.0));
}

#[test]
fn initial_setpoint_for_unknown_parameter_is_rejected() {
    let mode =
        BeamlineMode::new("mode name", ["smangle"]).with_initial_setpoints([("nonsense name", 0.0)]);
    let mut beamline = supermirror_beamline(mode);

    assert_eq!(
        beamline.set_active_mode("mode name"),
        Err(BeamlineError::UnknownParameter("nonsense name".into()))
    );
    assert!(beamline.active_mode().is_none());
}

#[test]
fn component_enabled_parameter_switches_mirror() {
    let mut mirror = Component::reflecting("super mirror", vertical(10.0));
    mirror.set_enabled(false);
    let parameters = vec![BeamlineParameter::component_enabled("smenabled", ComponentId(0))];
    let mut beamline = Beamline::new(vec![mirror], parameters, vec![], vec![]).unwrap();

    beamline.set_parameter_setpoint_and_move("smenabled", true).unwrap();
    assert!(beamline.components()[0].enabled());
    assert_eq!(
        beamline.parameter("smenabled").unwrap().sp_rbv(),
        Some(ParameterValue::Flag(true))
    );

    beamline.set_parameter_setpoint_and_move("smenabled", false).unwrap();
    assert!(!beamline.components()[0].enabled());
}

#[test]
fn mode_switch_by_index_follows_declaration_order() {
    let components = vec![Component::reflecting("sm", vertical(10.0))];
    let parameters = vec![BeamlineParameter::reflection_angle("smangle", ComponentId(0))];
    let modes = vec![
        BeamlineMode::new("nr", Vec::<String>::new()),
        BeamlineMode::new("pnr", ["smangle"]),
        BeamlineMode::new("disabled", Vec::<String>::new()),
    ];
    let mut beamline = Beamline::new(components, parameters, vec![], modes).unwrap();

    assert_eq!(beamline.mode_names(), vec!["nr", "pnr", "disabled"]);
    beamline.set_active_mode_by_index(1).unwrap();
    assert_eq!(beamline.active_mode().map(BeamlineMode::name), Some("pnr"));
    assert!(matches!(
        beamline.set_active_mode_by_index(3),
        Err(BeamlineError::UnknownMode(_))
    ));
}
