use motion_clips::challenge::{Challenge, ChallengeLevel};
use motion_clips::config::PendulumParams;
use motion_clips::logic::{frame_count, integrate, Method};
use motion_clips::math::{DoublePendulum, Lorenz};
use proptest::prelude::*;

#[test]
fn lorenz_stays_bounded_for_a_thousand_steps() {
    for method in [Method::Euler, Method::Rk4] {
        let t = integrate(&Lorenz::default(), method, [0.1, 0.0, 0.0], 0.01, 1000, 1).unwrap();
        for s in t.samples() {
            assert!(s.iter().all(|v| v.is_finite()), "{method:?} diverged: {s:?}");
            assert!(s[0].abs() < 50.0 && s[1].abs() < 50.0 && s[2] > -1.0 && s[2] < 80.0);
        }
    }
}

#[test]
fn pendulum_runs_are_bit_identical() {
    let params = PendulumParams {
        theta1_deg: 45.0,
        theta2_deg: 45.0,
        ..PendulumParams::default()
    };
    let run = || {
        integrate(&params.system, params.method, params.initial_state(), 0.001, 200, 5).unwrap()
    };
    let (a, b) = (run(), run());
    for (x, y) in a.samples().iter().zip(b.samples()) {
        for i in 0..4 {
            assert_eq!(x[i].to_bits(), y[i].to_bits());
        }
    }
}

#[test]
fn euler_is_reversible_in_small_steps() {
    let system = DoublePendulum::default();
    let start = [0.4, 0.0, -0.3, 0.0];
    let dt = 1e-4;
    let mut s = start;
    for _ in 0..100 {
        s = Method::Euler.step(&system, &s, dt);
    }
    for _ in 0..100 {
        s = Method::Euler.step(&system, &s, -dt);
    }
    for i in 0..4 {
        assert!((s[i] - start[i]).abs() < 1e-5, "component {i}: {} vs {}", s[i], start[i]);
    }
}

#[test]
fn thirty_seconds_at_thirty_fps_is_nine_hundred_frames() {
    assert_eq!(frame_count(30.0, 30).unwrap(), 900);
    let t = integrate(&Lorenz::default(), Method::Rk4, [0.1, 0.0, 0.0], 0.01, 900, 9).unwrap();
    assert_eq!(t.len(), 900);
    assert_eq!(t.frames().count(), 900);
}

#[test]
fn basic_challenge_matches_closed_form() {
    let c = Challenge::problems(ChallengeLevel::Basic)[0];
    let expected = 10.0 + 62.0 * 32f64.to_radians().tan();
    assert!((c.solution() - expected).abs() < 1e-9);
    assert_eq!(c.answer(), "x ≈ 48.74 m");
}

#[test]
fn advanced_challenge_is_consistent_from_both_points() {
    let Challenge::TwoAngle(p) = Challenge::advanced() else {
        panic!("advanced challenge should use two angles");
    };
    let h = p.solution();
    let near = p.near_distance();
    assert!((h - near * p.near_deg.to_radians().tan()).abs() < 1e-9);
    assert!((h - (near + p.baseline) * p.far_deg.to_radians().tan()).abs() < 1e-9);
}

#[test]
fn rk4_keeps_pendulum_energy_close() {
    let system = DoublePendulum::default();
    let params = PendulumParams::default();
    let t = integrate(&system, Method::Rk4, params.initial_state(), 1.0 / 300.0, 300, 10).unwrap();
    let e0 = system.energy(&t.samples()[0]);
    let e1 = system.energy(t.samples().last().unwrap());
    assert!((e1 - e0).abs() < 1e-2 * e0.abs().max(1.0), "drift {}", e1 - e0);
}

proptest! {
    #[test]
    fn equal_angles_from_rest_are_deterministic(angle in -3.0f64..3.0) {
        let system = DoublePendulum::default();
        let start = [angle, 0.0, angle, 0.0];
        let a = integrate(&system, Method::Rk4, start, 0.002, 20, 5).unwrap();
        let b = integrate(&system, Method::Rk4, start, 0.002, 20, 5).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn frame_count_is_rounded_product(duration in 1.0f64..120.0, fps in 1u32..120) {
        let frames = frame_count(duration, fps).unwrap();
        prop_assert!((frames as f64 - duration * f64::from(fps)).abs() <= 0.5);
    }
}
