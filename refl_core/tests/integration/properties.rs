//! Geometric properties checked over generated inputs.

use proptest::prelude::*;
use refl_core::beamline::Beamline;
use refl_core::component::Component;
use refl_core::geometry::PositionAndAngle;
use refl_core::movement::LinearMovement;

proptest! {
    #[test]
    fn reflection_law_holds(beam_angle in -80.0f64..80.0, mirror_angle in -80.0f64..80.0) {
        let mut mirror = Component::reflecting("mirror", LinearMovement::new(0.0, 10.0, 90.0));
        mirror.set_angle(mirror_angle).unwrap();
        mirror.set_incoming_beam(PositionAndAngle::new(0.0, 0.0, beam_angle));

        let outgoing = mirror.get_outgoing_beam().unwrap();

        let expected = beam_angle + 2.0 * (mirror_angle - beam_angle);
        prop_assert!((outgoing.angle - expected).abs() < 1e-9);
    }

    #[test]
    fn disabled_mirror_is_transparent(beam_angle in -80.0f64..80.0, mirror_angle in -80.0f64..80.0) {
        let mut mirror = Component::reflecting("mirror", LinearMovement::new(0.0, 10.0, 90.0));
        mirror.set_angle(mirror_angle).unwrap();
        mirror.set_enabled(false);
        let beam = PositionAndAngle::new(1.0, 2.0, beam_angle);
        mirror.set_incoming_beam(beam);

        prop_assert_eq!(mirror.get_outgoing_beam().unwrap(), beam);
    }

    #[test]
    fn parallel_axis_never_intercepts(
        angle in -360.0f64..360.0,
        half_turns in 0i32..3,
        y in -100.0f64..100.0,
        z in -100.0f64..100.0,
    ) {
        let movement = LinearMovement::new(y, z, angle + 180.0 * f64::from(half_turns));
        let beam = PositionAndAngle::new(0.0, 0.0, angle);
        prop_assert!(movement.calculate_interception(&beam).is_err());
    }

    #[test]
    fn interception_lies_on_both_lines(
        beam_angle in -30.0f64..30.0,
        axis_angle in 60.0f64..120.0,
        axis_y in -10.0f64..10.0,
        axis_z in 1.0f64..50.0,
    ) {
        let movement = LinearMovement::new(axis_y, axis_z, axis_angle);
        let beam = PositionAndAngle::new(0.0, 0.0, beam_angle);

        let p = movement.calculate_interception(&beam).unwrap();

        let off_line = |origin_y: f64, origin_z: f64, angle: f64| {
            let (dy, dz) = PositionAndAngle::new(0.0, 0.0, angle).direction();
            ((p.y - origin_y) * dz - (p.z - origin_z) * dy).abs()
        };
        prop_assert!(off_line(0.0, 0.0, beam_angle) < 1e-6);
        prop_assert!(off_line(axis_y, axis_z, axis_angle) < 1e-6);
    }

    #[test]
    fn passive_chain_preserves_beam(
        count in 1usize..12,
        y in -10.0f64..10.0,
        angle in -10.0f64..10.0,
    ) {
        let components = (0..count)
            .map(|i| Component::passive(format!("s{i}"), LinearMovement::new(0.0, i as f64, 90.0)))
            .collect();
        let mut beamline = Beamline::new(components, vec![], vec![], vec![]).unwrap();
        let beam = PositionAndAngle::new(y, 0.0, angle);

        beamline.set_incoming_beam(beam).unwrap();

        for component in beamline.components() {
            prop_assert_eq!(component.get_outgoing_beam().unwrap(), beam);
        }
    }
}
