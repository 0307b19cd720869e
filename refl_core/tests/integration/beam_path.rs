//! Beam propagation through a full reflectometer and the resulting
//! reflection angles at the sample.

use refl_core::beamline::Beamline;
use refl_core::component::{Component, ComponentId};
use refl_core::geometry::PositionAndAngle;
use refl_core::mode::BeamlineMode;
use refl_core::movement::LinearMovement;
use refl_core::parameter::BeamlineParameter;

use super::common::assert_close;

const POLARISER: ComponentId = ComponentId(3);
const SAMPLE: ComponentId = ComponentId(5);

/// Slits, a frame overlap mirror, a polariser, the sample point, an
/// analyser and a detector, all on vertical axes one unit apart.
fn polarised_reflectometer() -> Beamline {
    let vertical = |z: f64| LinearMovement::new(0.0, z, 90.0);
    let mut frame_overlap_mirror = Component::reflecting("FOM", vertical(2.0));
    frame_overlap_mirror.set_enabled(false);
    let mut polariser = Component::reflecting("Polariser", vertical(3.0));
    polariser.set_enabled(false);
    let mut analyser = Component::reflecting("analyser", vertical(7.0));
    analyser.set_enabled(false);

    let components = vec![
        Component::passive("s0", vertical(0.0)),
        Component::passive("s1", vertical(1.0)),
        frame_overlap_mirror,
        polariser,
        Component::passive("s2", vertical(4.0)),
        Component::reflecting("ideal sample point", vertical(5.0)),
        Component::passive("s3", vertical(6.0)),
        analyser,
        Component::passive("s4", vertical(8.0)),
        Component::passive("detector", vertical(10.0)),
    ];
    let parameters = vec![
        BeamlineParameter::reflection_angle("smangle", POLARISER),
        BeamlineParameter::theta("theta", SAMPLE),
    ];
    let modes = vec![
        BeamlineMode::new("nr", ["theta"]),
        BeamlineMode::new("polarised", ["smangle", "theta"]),
    ];

    let mut beamline = Beamline::new(components, parameters, vec![], modes).unwrap();
    beamline.set_parameter_setpoint("theta", 0.0).unwrap();
    beamline.set_parameter_setpoint("smangle", 0.0).unwrap();
    beamline
        .set_incoming_beam(PositionAndAngle::new(0.0, 0.0, 2.5))
        .unwrap();
    beamline
}

fn sample_reflection(beamline: &Beamline) -> f64 {
    let sample = beamline.component(SAMPLE).unwrap();
    sample.get_outgoing_beam().unwrap().angle - sample.incoming_beam().angle
}

#[test]
fn theta_sets_reflection_at_sample() {
    let mut beamline = polarised_reflectometer();
    beamline.set_active_mode("nr").unwrap();

    beamline.set_parameter_setpoint_and_move("theta", 10.0).unwrap();

    assert_close(sample_reflection(&beamline), 20.0);
}

#[test]
fn supermirror_change_keeps_theta() {
    let mut beamline = polarised_reflectometer();
    beamline.set_active_mode("polarised").unwrap();
    beamline.set_component_enabled(POLARISER, true).unwrap();
    beamline.set_parameter_setpoint_and_move("smangle", 10.0).unwrap();

    beamline.set_parameter_setpoint_and_move("theta", 10.0).unwrap();

    assert_close(sample_reflection(&beamline), 20.0);
}

#[test]
fn supermirror_moved_after_theta_cascades_to_theta() {
    let mut beamline = polarised_reflectometer();
    beamline.set_active_mode("polarised").unwrap();
    beamline.set_parameter_setpoint_and_move("theta", 10.0).unwrap();
    beamline.set_component_enabled(POLARISER, true).unwrap();

    beamline.set_parameter_setpoint_and_move("smangle", 10.0).unwrap();

    let sample = beamline.component(SAMPLE).unwrap();
    assert_close(sample.incoming_beam().angle, 22.5);
    assert_close(sample_reflection(&beamline), 20.0);
}

#[test]
fn disabled_mirrors_leave_beam_straight() {
    let beamline = polarised_reflectometer();
    for component in &beamline.components()[..SAMPLE.0] {
        assert_eq!(component.get_outgoing_beam().unwrap().angle, 2.5);
    }
}

#[test]
fn interceptions_follow_the_beam() {
    let mut beamline = polarised_reflectometer();
    beamline.set_active_mode("nr").unwrap();
    beamline.set_parameter_setpoint_and_move("theta", 0.0).unwrap();

    let interceptions = beamline.beam_interceptions();
    assert_eq!(interceptions.len(), 10);
    let (name, detector) = interceptions[9];
    assert_eq!(name, "detector");
    let detector = detector.unwrap();
    assert_close(detector.z, 10.0);
    // Zero theta leaves the beam undeflected.
    let expected = 10.0 * 2.5f64.to_radians().tan();
    assert_close(detector.y, expected);
}
