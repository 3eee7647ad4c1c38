#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A small trace event recorded while the simulation runs.
///
/// Plain data so tooling can render or persist it later.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    /// Agent handle the event concerns, if any.
    pub agent: Option<u64>,
    pub value: f32,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            agent: None,
            value: 0.0,
            detail: None,
        }
    }

    pub fn with_agent(mut self, agent: u64) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

pub mod tags {
    pub const MODE_CHANGED: &str = "mode_changed";
    pub const MAX_FORCE_CHANGED: &str = "max_force_changed";
    pub const MAX_SPEED_CHANGED: &str = "max_speed_changed";
    pub const PREDICTION_CHANGED: &str = "prediction_changed";
    pub const DESTINATION_SET: &str = "destination_set";
    pub const TARGET_ARRIVED: &str = "target_arrived";
    pub const COMMAND_REJECTED: &str = "command_rejected";
    pub const TICK_REJECTED: &str = "tick_rejected";
}
