//! Shared-target steering simulation: one moving target, many agents, fixed-step ticks.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod debug;
pub mod simulation;
pub mod target;
pub mod trace;

pub use command::ControlCommand;
pub use config::{AgentSpawn, ScatterConfig, SimulationConfig, TargetConfig};
pub use debug::{AgentDebug, DebugConfig, DebugFrame};
pub use simulation::{
    AgentHandle, AgentReport, Simulation, TickReport, DEFAULT_FIXED_DT,
    DEFAULT_SCROLLBAR_MULTIPLIER,
};
pub use target::MovingTarget;
pub use trace::{NullTraceSink, TraceEvent, TraceSink, VecTraceSink};
