use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use steer_core::{AgentSettings, DeterministicRng, Result, RigidBody, SteeringAgent, Vec3};

use crate::simulation::{DEFAULT_FIXED_DT, DEFAULT_SCROLLBAR_MULTIPLIER};
use crate::{DebugConfig, MovingTarget, Simulation};

/// RNG stream reserved for scatter spawning.
const SCATTER_STREAM: u64 = 0x5CA7_7E12;

/// Everything needed to build a [`Simulation`] of [`RigidBody`] agents.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Physics step in seconds.
    pub fixed_dt: f32,
    pub seed: u64,
    /// Factor applied to raw force/speed slider values.
    pub scrollbar_multiplier: f32,
    /// Factor applied to raw prediction slider values.
    pub prediction_multiplier: f32,
    pub target: TargetConfig,
    /// Settings for agents that do not override them.
    pub agent_defaults: AgentSettings,
    pub agents: Vec<AgentSpawn>,
    pub scatter: Option<ScatterConfig>,
    pub debug: DebugConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_dt: DEFAULT_FIXED_DT,
            seed: 0,
            scrollbar_multiplier: DEFAULT_SCROLLBAR_MULTIPLIER,
            prediction_multiplier: 1.0,
            target: TargetConfig::default(),
            agent_defaults: AgentSettings::default(),
            agents: Vec::new(),
            scatter: None,
            debug: DebugConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetConfig {
    pub position: Vec3,
    /// Initial commanded destination; the target rests when absent.
    pub destination: Option<Vec3>,
    pub cruise_speed: f32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            destination: None,
            cruise_speed: 10.0,
        }
    }
}

/// One explicitly placed agent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentSpawn {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    /// Overrides `agent_defaults` when present.
    pub settings: Option<AgentSettings>,
}

impl Default for AgentSpawn {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            mass: 1.0,
            settings: None,
        }
    }
}

/// Agents placed at seeded random points on a disc around the target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScatterConfig {
    pub count: usize,
    pub radius: f32,
    pub mass: f32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            count: 8,
            radius: 20.0,
            mass: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn build(&self) -> Result<Simulation<RigidBody>> {
        let mut target = MovingTarget::new(self.target.position, self.target.cruise_speed)?;
        if let Some(destination) = self.target.destination {
            target.set_destination(destination);
        }

        let mut sim = Simulation::new(target)
            .with_fixed_dt(self.fixed_dt)?
            .with_seed(self.seed)
            .with_scrollbar_multiplier(self.scrollbar_multiplier)?
            .with_prediction_multiplier(self.prediction_multiplier)?
            .with_mode(self.agent_defaults.mode)
            .with_prediction_factor(self.agent_defaults.prediction_factor)?
            .with_debug(self.debug);

        for spawn in &self.agents {
            let agent = SteeringAgent::new(spawn.settings.unwrap_or(self.agent_defaults))?;
            let body = RigidBody::new(spawn.position, spawn.mass)?.with_velocity(spawn.velocity);
            sim.register(agent, body);
        }

        if let Some(scatter) = &self.scatter {
            let mut rng = sim.clock().rng_for_stream(SCATTER_STREAM);
            let center = self.target.position;
            for _ in 0..scatter.count {
                let angle = rng.next_f32_unit() * TAU;
                let r = scatter.radius * rng.next_f32_unit().sqrt();
                let position = center + Vec3::new(angle.cos() * r, 0.0, angle.sin() * r);
                let agent = SteeringAgent::new(self.agent_defaults)?;
                sim.register(agent, RigidBody::new(position, scatter.mass)?);
            }
        }

        tracing::info!(
            agents = sim.len(),
            fixed_dt = self.fixed_dt,
            seed = self.seed,
            "Simulation built"
        );
        Ok(sim)
    }
}

impl Simulation<RigidBody> {
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.build()
    }
}
