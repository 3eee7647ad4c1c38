#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use steer_core::agent::check_positive;
use steer_core::{Result, TargetState, Vec3};

/// The single moving point every agent steers relative to.
///
/// It travels along the ground plane toward a commanded destination at a fixed cruise speed and
/// stops on the destination instead of overshooting it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovingTarget {
    position: Vec3,
    velocity: Vec3,
    destination: Vec3,
    cruise_speed: f32,
}

impl MovingTarget {
    /// A target resting at `position`.
    pub fn new(position: Vec3, cruise_speed: f32) -> Result<Self> {
        Ok(Self {
            position,
            velocity: Vec3::ZERO,
            destination: position,
            cruise_speed: check_positive("cruise_speed", cruise_speed)?,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn cruise_speed(&self) -> f32 {
        self.cruise_speed
    }

    pub fn state(&self) -> TargetState {
        TargetState::new(self.position, self.velocity)
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec3::ZERO
    }

    pub fn set_cruise_speed(&mut self, cruise_speed: f32) -> Result<()> {
        self.cruise_speed = check_positive("cruise_speed", cruise_speed)?;
        Ok(())
    }

    /// Record where the target should go. It starts moving on the next [`advance`](Self::advance).
    pub fn set_destination(&mut self, destination: Vec3) {
        self.destination = destination;
    }

    /// Move one step toward the destination. Returns `true` when the target is at rest on it.
    ///
    /// Height differences are ignored; within one step of travel the target lands on the
    /// destination and its velocity drops to zero. The snap matches the destination's x and z
    /// only: the target keeps its own y.
    pub fn advance(&mut self, dt_seconds: f32) -> bool {
        let offset = (self.destination - self.position).flatten();
        let distance = offset.length();
        let reach = self.cruise_speed * dt_seconds;

        if distance < reach || distance <= f32::EPSILON {
            self.position = self.destination.with_y(self.position.y);
            self.velocity = Vec3::ZERO;
            return true;
        }

        self.velocity = offset * (self.cruise_speed / distance);
        self.position += self.velocity * dt_seconds;
        false
    }
}
