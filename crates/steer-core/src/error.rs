use thiserror::Error;

/// Errors raised by steering computations and simulation commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SteeringError {
    #[error("body mass must be positive and finite, got {0}")]
    NonPositiveMass(f32),

    #[error("invalid value for {name}: {value}")]
    InvalidTunable { name: &'static str, value: f32 },

    #[error("unknown steering mode {0:?} (expected Seek, Flee, Pursuit or Evasion)")]
    UnknownMode(String),

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f32),

    #[error("no agent registered with handle {0}")]
    UnknownAgent(u64),
}

pub type Result<T> = std::result::Result<T, SteeringError>;
