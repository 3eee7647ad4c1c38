//! Deterministic, engine-agnostic steering behaviour primitives.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod body;
pub mod error;
pub mod math;
pub mod mode;
pub mod rng;
pub mod tick;

pub use agent::{AgentSettings, AgentStep, SteeringAgent, TargetState, ARRIVAL_EPSILON};
pub use body::{Body, RigidBody};
pub use error::{Result, SteeringError};
pub use math::Vec3;
pub use mode::SteeringMode;
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
