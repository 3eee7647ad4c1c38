//! Per-agent steering computation.
//!
//! Each behaviour picks a desired velocity and returns `desired - current`. The result is then
//! clamped to the agent's force limit, divided by mass and added to the current velocity, which
//! is finally clamped to the speed limit:
//! - Seek: toward the target, optionally ramping speed down inside the slowing distance
//! - Flee: away from the target
//! - Pursuit: Seek aimed at the predicted target position
//! - Evasion: Flee from the predicted target position

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Body, Result, SteeringError, SteeringMode, Vec3};

/// Offsets shorter than this are treated as "already at the target".
pub const ARRIVAL_EPSILON: f32 = 1e-4;

/// Tunables for a steering agent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentSettings {
    pub mode: SteeringMode,
    /// Upper bound on the steering force magnitude.
    pub max_force: f32,
    /// Upper bound on the resulting speed.
    pub max_speed: f32,
    /// How far ahead (in target-velocity units) the target position is extrapolated.
    pub prediction_factor: f32,
    /// Ramp speed down inside `slowing_distance` for Seek and Pursuit.
    pub arrival_adjustments: bool,
    pub slowing_distance: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            mode: SteeringMode::Seek,
            max_force: 1.0,
            max_speed: 1.0,
            prediction_factor: 1.0,
            arrival_adjustments: false,
            slowing_distance: 4.0,
        }
    }
}

impl AgentSettings {
    pub fn validate(&self) -> Result<()> {
        check_positive("max_force", self.max_force)?;
        check_positive("max_speed", self.max_speed)?;
        check_non_negative("prediction_factor", self.prediction_factor)?;
        check_positive("slowing_distance", self.slowing_distance)?;
        Ok(())
    }
}

/// Snapshot of the shared target as seen by an agent during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl TargetState {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    /// Target position extrapolated by `factor` times its velocity.
    pub fn predicted(&self, factor: f32) -> Vec3 {
        self.position + self.velocity * factor
    }
}

/// What one agent did during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentStep {
    pub predicted_target: Vec3,
    /// Unclamped `desired - current`.
    pub steering: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SteeringAgent {
    settings: AgentSettings,
}

impl SteeringAgent {
    pub fn new(settings: AgentSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn mode(&self) -> SteeringMode {
        self.settings.mode
    }

    pub fn max_force(&self) -> f32 {
        self.settings.max_force
    }

    pub fn max_speed(&self) -> f32 {
        self.settings.max_speed
    }

    pub fn prediction_factor(&self) -> f32 {
        self.settings.prediction_factor
    }

    pub fn arrival_adjustments(&self) -> bool {
        self.settings.arrival_adjustments
    }

    pub fn slowing_distance(&self) -> f32 {
        self.settings.slowing_distance
    }

    pub fn set_mode(&mut self, mode: SteeringMode) {
        self.settings.mode = mode;
    }

    pub fn set_max_force(&mut self, max_force: f32) -> Result<()> {
        self.settings.max_force = check_positive("max_force", max_force)?;
        Ok(())
    }

    pub fn set_max_speed(&mut self, max_speed: f32) -> Result<()> {
        self.settings.max_speed = check_positive("max_speed", max_speed)?;
        Ok(())
    }

    pub fn set_prediction_factor(&mut self, prediction_factor: f32) -> Result<()> {
        self.settings.prediction_factor = check_non_negative("prediction_factor", prediction_factor)?;
        Ok(())
    }

    pub fn set_arrival_adjustments(&mut self, enabled: bool) {
        self.settings.arrival_adjustments = enabled;
    }

    pub fn set_slowing_distance(&mut self, slowing_distance: f32) -> Result<()> {
        self.settings.slowing_distance = check_positive("slowing_distance", slowing_distance)?;
        Ok(())
    }

    /// Desired velocity for the current mode.
    pub fn desired_velocity(
        &self,
        current_position: Vec3,
        target_position: Vec3,
        target_predicted_position: Vec3,
    ) -> Vec3 {
        let max_speed = self.settings.max_speed;
        match self.settings.mode {
            SteeringMode::Seek => self.approach(target_position - current_position),
            SteeringMode::Flee => at_speed(current_position - target_position, max_speed),
            SteeringMode::Pursuit => self.approach(target_predicted_position - current_position),
            SteeringMode::Evasion => {
                at_speed(current_position - target_predicted_position, max_speed)
            }
        }
    }

    /// Correction from the current velocity toward the desired one (not yet force-limited).
    pub fn compute_steering_direction(
        &self,
        current_position: Vec3,
        current_velocity: Vec3,
        target_position: Vec3,
        target_predicted_position: Vec3,
    ) -> Vec3 {
        self.desired_velocity(current_position, target_position, target_predicted_position)
            - current_velocity
    }

    /// Force actually applied for a steering direction.
    pub fn steering_force(&self, steering_direction: Vec3) -> Vec3 {
        steering_direction.clamp_length(self.settings.max_force)
    }

    /// Next velocity after applying the clamped steering force to a body of `mass`.
    pub fn compute_velocity(
        &self,
        steering_direction: Vec3,
        current_velocity: Vec3,
        mass: f32,
    ) -> Result<Vec3> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SteeringError::NonPositiveMass(mass));
        }
        let acceleration = self.steering_force(steering_direction) / mass;
        Ok((current_velocity + acceleration).clamp_length(self.settings.max_speed))
    }

    /// Per-tick update: steer `body` relative to `target` and commit the new velocity.
    pub fn advance<B: Body + ?Sized>(&self, body: &mut B, target: TargetState) -> Result<AgentStep> {
        let position = body.position();
        let current_velocity = body.velocity();
        let predicted_target = target.predicted(self.settings.prediction_factor);

        let steering = self.compute_steering_direction(
            position,
            current_velocity,
            target.position,
            predicted_target,
        );
        let velocity = self.compute_velocity(steering, current_velocity, body.mass())?;

        if velocity.length() > f32::EPSILON {
            body.set_facing(velocity);
        }
        body.set_velocity(velocity);

        Ok(AgentStep {
            predicted_target,
            steering,
            velocity,
        })
    }

    fn approach(&self, offset: Vec3) -> Vec3 {
        let max_speed = self.settings.max_speed;
        if !self.settings.arrival_adjustments {
            return at_speed(offset, max_speed);
        }
        let distance = offset.length();
        if distance < ARRIVAL_EPSILON {
            return Vec3::ZERO;
        }
        let ramped = max_speed * (distance / self.settings.slowing_distance);
        let clipped = ramped.min(max_speed);
        offset * (clipped / distance)
    }
}

fn at_speed(offset: Vec3, speed: f32) -> Vec3 {
    let distance = offset.length();
    if distance < ARRIVAL_EPSILON {
        Vec3::ZERO
    } else {
        offset * (speed / distance)
    }
}

/// Accepts finite values greater than zero.
pub fn check_positive(name: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        tracing::debug!(name, value, "Rejected tunable");
        Err(SteeringError::InvalidTunable { name, value })
    }
}

/// Accepts finite values greater than or equal to zero.
pub fn check_non_negative(name: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        tracing::debug!(name, value, "Rejected tunable");
        Err(SteeringError::InvalidTunable { name, value })
    }
}
