#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Result, SteeringError, Vec3};

/// Physical body driven by a steering agent.
///
/// Engines implement this over their own rigid body type. The steering code only reads
/// position, velocity and mass, and writes velocity and facing.
pub trait Body {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn mass(&self) -> f32;

    /// Overwrites the velocity directly, bypassing force integration.
    fn set_velocity(&mut self, velocity: Vec3);

    /// Orients the body to look along `direction` (non-zero).
    fn set_facing(&mut self, direction: Vec3);

    /// Advance the position by the current velocity.
    ///
    /// Engine-backed bodies whose physics step already moves them can leave this empty.
    fn integrate(&mut self, dt_seconds: f32);
}

/// Minimal kinematic body used by the headless simulation and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    mass: f32,
    /// Unit look direction.
    pub facing: Vec3,
}

impl RigidBody {
    pub fn new(position: Vec3, mass: f32) -> Result<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SteeringError::NonPositiveMass(mass));
        }
        Ok(Self {
            position,
            velocity: Vec3::ZERO,
            mass,
            facing: Vec3::FORWARD,
        })
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }
}

impl Body for RigidBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn set_facing(&mut self, direction: Vec3) {
        let dir = direction.normalize_or_zero();
        if dir != Vec3::ZERO {
            self.facing = dir;
        }
    }

    fn integrate(&mut self, dt_seconds: f32) {
        self.position += self.velocity * dt_seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_mass() {
        assert_eq!(
            RigidBody::new(Vec3::ZERO, 0.0),
            Err(SteeringError::NonPositiveMass(0.0))
        );
        assert!(RigidBody::new(Vec3::ZERO, -2.0).is_err());
        assert!(RigidBody::new(Vec3::ZERO, f32::NAN).is_err());
    }

    #[test]
    fn integrate_moves_by_velocity() {
        let mut body = RigidBody::new(Vec3::ZERO, 1.0)
            .unwrap()
            .with_velocity(Vec3::new(2.0, 0.0, -1.0));
        body.integrate(0.5);
        assert_eq!(body.position, Vec3::new(1.0, 0.0, -0.5));
    }

    #[test]
    fn facing_ignores_zero_direction() {
        let mut body = RigidBody::new(Vec3::ZERO, 1.0).unwrap();
        body.set_facing(Vec3::ZERO);
        assert_eq!(body.facing, Vec3::FORWARD);
        body.set_facing(Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(body.facing, Vec3::new(1.0, 0.0, 0.0));
    }
}
