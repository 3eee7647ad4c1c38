use proptest::prelude::*;
use steer_core::{AgentSettings, RigidBody, SteeringAgent, SteeringMode, TargetState, Vec3};

fn settings(mode: SteeringMode) -> AgentSettings {
    AgentSettings {
        mode,
        max_force: 3.0,
        max_speed: 6.0,
        prediction_factor: 0.5,
        arrival_adjustments: false,
        slowing_distance: 8.0,
    }
}

fn approx_eq(a: Vec3, b: Vec3) -> bool {
    (a - b).length() <= 1e-4
}

#[test]
fn seek_without_arrival_is_unit_direction_at_max_speed() {
    let agent = SteeringAgent::new(settings(SteeringMode::Seek)).unwrap();
    let current = Vec3::new(1.0, 2.0, 3.0);
    let target = Vec3::new(-4.0, 2.0, 15.0);

    let desired = agent.desired_velocity(current, target, target);

    let expected = (target - current).normalize_or_zero() * 6.0;
    assert!(approx_eq(desired, expected));
    assert!((desired.length() - 6.0).abs() < 1e-4);
}

#[test]
fn arrival_ramp_saturates_at_slowing_distance() {
    let mut s = settings(SteeringMode::Seek);
    s.arrival_adjustments = true;
    let agent = SteeringAgent::new(s).unwrap();

    let target = Vec3::new(8.0, 0.0, 0.0);
    let at_edge = agent.desired_velocity(Vec3::ZERO, target, target);
    assert!((at_edge.length() - 6.0).abs() < 1e-5);

    let halfway = Vec3::new(4.0, 0.0, 0.0);
    let inside = agent.desired_velocity(Vec3::ZERO, halfway, halfway);
    assert!((inside.length() - 3.0).abs() < 1e-5);

    let beyond = Vec3::new(0.0, 0.0, 100.0);
    let outside = agent.desired_velocity(Vec3::ZERO, beyond, beyond);
    assert!((outside.length() - 6.0).abs() < 1e-5);
}

#[test]
fn pursuit_with_zero_prediction_matches_seek() {
    for arrival in [false, true] {
        let mut seek = settings(SteeringMode::Seek);
        seek.arrival_adjustments = arrival;
        let mut pursuit = seek;
        pursuit.mode = SteeringMode::Pursuit;
        pursuit.prediction_factor = 0.0;

        let seek = SteeringAgent::new(seek).unwrap();
        let pursuit = SteeringAgent::new(pursuit).unwrap();

        let target = TargetState::new(Vec3::new(3.0, 0.0, -2.0), Vec3::new(10.0, 0.0, 0.0));
        let start = RigidBody::new(Vec3::new(-1.0, 0.0, 1.0), 2.0)
            .unwrap()
            .with_velocity(Vec3::new(0.0, 0.0, 1.0));
        let mut a = start;
        let mut b = start;

        let step_a = seek.advance(&mut a, target).unwrap();
        let step_b = pursuit.advance(&mut b, target).unwrap();

        assert_eq!(step_b.predicted_target, target.position);
        assert_eq!(step_a.steering, step_b.steering);
        assert_eq!(a, b);
    }
}

#[test]
fn evasion_is_opposite_of_unramped_pursuit() {
    let pursuit = SteeringAgent::new(settings(SteeringMode::Pursuit)).unwrap();
    let evasion = SteeringAgent::new(settings(SteeringMode::Evasion)).unwrap();

    let current = Vec3::new(2.0, 0.0, 2.0);
    let target = Vec3::new(5.0, 0.0, -1.0);
    let predicted = Vec3::new(9.0, 1.0, -7.0);

    let p = pursuit.desired_velocity(current, target, predicted);
    let e = evasion.desired_velocity(current, target, predicted);

    assert!(approx_eq(e, -p));
}

#[test]
fn flee_uses_current_target_and_evasion_uses_prediction() {
    let flee = SteeringAgent::new(settings(SteeringMode::Flee)).unwrap();
    let evasion = SteeringAgent::new(settings(SteeringMode::Evasion)).unwrap();

    let current = Vec3::ZERO;
    let target = Vec3::new(1.0, 0.0, 0.0);
    let predicted = Vec3::new(0.0, 0.0, 1.0);

    assert!(approx_eq(
        flee.desired_velocity(current, target, predicted),
        Vec3::new(-6.0, 0.0, 0.0)
    ));
    assert!(approx_eq(
        evasion.desired_velocity(current, target, predicted),
        Vec3::new(0.0, 0.0, -6.0)
    ));
}

fn vec3() -> impl Strategy<Value = Vec3> {
    (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn mode() -> impl Strategy<Value = SteeringMode> {
    prop::sample::select(SteeringMode::ALL.to_vec())
}

proptest! {
    #[test]
    fn velocity_never_exceeds_max_speed(
        mode in mode(),
        arrival in any::<bool>(),
        max_force in 0.01f32..50.0,
        max_speed in 0.01f32..50.0,
        slowing in 0.01f32..20.0,
        mass in 0.01f32..20.0,
        position in vec3(),
        velocity in vec3(),
        target in vec3(),
        predicted in vec3(),
    ) {
        let agent = SteeringAgent::new(AgentSettings {
            mode,
            max_force,
            max_speed,
            prediction_factor: 1.0,
            arrival_adjustments: arrival,
            slowing_distance: slowing,
        }).unwrap();

        let direction = agent.compute_steering_direction(position, velocity, target, predicted);
        prop_assert!(direction.is_finite());

        let force = agent.steering_force(direction);
        prop_assert!(force.length() <= max_force * (1.0 + 1e-5));

        let next = agent.compute_velocity(direction, velocity, mass).unwrap();
        prop_assert!(next.is_finite());
        prop_assert!(next.length() <= max_speed * (1.0 + 1e-5));
    }
}
