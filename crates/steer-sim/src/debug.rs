//! Forward-sampled debug geometry.
//!
//! Paths are produced by replaying the same target advance and the same
//! `compute_steering_direction` / `compute_velocity` pair the tick loop uses, so what is drawn
//! is what the simulation will do if no command arrives in the meantime.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use steer_core::{Body, Result, SteeringAgent, Vec3};

use crate::{AgentHandle, MovingTarget};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DebugConfig {
    pub enabled: bool,
    /// Number of future ticks sampled per path.
    pub max_points: usize,
    /// Radius of the marker drawn at each sample.
    pub marker_size: f32,
    pub agent_color: [f32; 4],
    pub target_color: [f32; 4],
    pub prediction_color: [f32; 4],
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_points: 30,
            marker_size: 0.1,
            agent_color: [0.0, 1.0, 0.0, 1.0],      // Green
            target_color: [0.0, 0.0, 1.0, 1.0],     // Blue
            prediction_color: [1.0, 0.0, 0.0, 1.0], // Red
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentDebug {
    pub handle: AgentHandle,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Where the agent currently thinks the target will be.
    pub predicted_target: Vec3,
    /// Future positions, one per sampled tick. Empty for agents at rest.
    pub path: Vec<Vec3>,
}

/// Everything a renderer needs to draw one debug overlay.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebugFrame {
    pub status: String,
    pub target_position: Vec3,
    pub target_path: Vec<Vec3>,
    pub agents: Vec<AgentDebug>,
    pub marker_size: f32,
    pub agent_color: [f32; 4],
    pub target_color: [f32; 4],
    pub prediction_color: [f32; 4],
}

/// Successive target positions over `points` ticks of `dt_seconds`.
pub fn predict_target_path(target: &MovingTarget, dt_seconds: f32, points: usize) -> Vec<Vec3> {
    let mut target = *target;
    (0..points)
        .map(|_| {
            target.advance(dt_seconds);
            target.position()
        })
        .collect()
}

/// Future agent positions over `points` ticks, empty if the body is at rest.
pub fn predict_agent_path<B: Body + ?Sized>(
    agent: &SteeringAgent,
    body: &B,
    target: &MovingTarget,
    dt_seconds: f32,
    points: usize,
) -> Result<Vec<Vec3>> {
    let mut velocity = body.velocity();
    if velocity.length() <= f32::EPSILON {
        return Ok(Vec::new());
    }
    let mut position = body.position();
    let mass = body.mass();
    let mut target = *target;

    let mut path = Vec::with_capacity(points);
    for _ in 0..points {
        target.advance(dt_seconds);
        let state = target.state();
        let steering = agent.compute_steering_direction(
            position,
            velocity,
            state.position,
            state.predicted(agent.prediction_factor()),
        );
        velocity = agent.compute_velocity(steering, velocity, mass)?;
        position += velocity * dt_seconds;
        path.push(position);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_core::{AgentSettings, RigidBody, SteeringMode};

    #[test]
    fn target_path_stops_at_destination() {
        let mut target = MovingTarget::new(Vec3::ZERO, 10.0).unwrap();
        target.set_destination(Vec3::new(1.0, 0.0, 0.0));

        let path = predict_target_path(&target, 0.04, 4);

        assert_eq!(path.len(), 4);
        assert!((path[0].x - 0.4).abs() < 1e-6);
        assert!((path[1].x - 0.8).abs() < 1e-6);
        assert_eq!(path[2], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(path[3], Vec3::new(1.0, 0.0, 0.0));
        // sampling works on a copy
        assert_eq!(target.position(), Vec3::ZERO);
    }

    #[test]
    fn resting_agent_has_no_path() {
        let agent = SteeringAgent::new(AgentSettings::default()).unwrap();
        let body = RigidBody::new(Vec3::ZERO, 1.0).unwrap();
        let target = MovingTarget::new(Vec3::new(5.0, 0.0, 0.0), 1.0).unwrap();

        let path = predict_agent_path(&agent, &body, &target, 0.02, 10).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn moving_agent_path_heads_for_target() {
        let agent = SteeringAgent::new(AgentSettings {
            mode: SteeringMode::Seek,
            max_speed: 5.0,
            max_force: 5.0,
            ..AgentSettings::default()
        })
        .unwrap();
        let body = RigidBody::new(Vec3::ZERO, 1.0)
            .unwrap()
            .with_velocity(Vec3::new(1.0, 0.0, 0.0));
        let target = MovingTarget::new(Vec3::new(10.0, 0.0, 0.0), 1.0).unwrap();

        let path = predict_agent_path(&agent, &body, &target, 0.1, 5).unwrap();

        assert_eq!(path.len(), 5);
        assert!(path.windows(2).all(|w| w[1].x > w[0].x));
    }
}
