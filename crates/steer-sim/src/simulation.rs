use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use steer_core::agent::{check_non_negative, check_positive};
use steer_core::{
    AgentStep, Body, Result, RigidBody, SteeringAgent, SteeringError, SteeringMode, TargetState,
    TickContext, Vec3,
};

use crate::debug::{self, AgentDebug, DebugConfig, DebugFrame};
use crate::trace::{tags, TraceEvent, TraceSink};
use crate::{ControlCommand, MovingTarget};

/// Default fixed physics step in seconds.
pub const DEFAULT_FIXED_DT: f32 = 0.02;
/// Default factor applied to raw force/speed slider values.
pub const DEFAULT_SCROLLBAR_MULTIPLIER: f32 = 10.0;

/// Stable identifier of a registered agent, assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentHandle(pub u64);

impl fmt::Display for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentReport {
    pub handle: AgentHandle,
    pub position: Vec3,
    pub step: AgentStep,
}

/// Outcome of one [`Simulation::tick`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickReport {
    pub tick: u64,
    pub target: TargetState,
    /// The target reached its destination during this tick.
    pub target_arrived: bool,
    pub agents: Vec<AgentReport>,
}

struct AgentSlot<B> {
    handle: AgentHandle,
    agent: SteeringAgent,
    body: B,
}

/// Owns the shared target and every registered agent, and steps them together.
///
/// Agents only ever see a [`TargetState`] snapshot; the target itself is written by the
/// simulation alone. Broadcast setters apply to all agents at once and take effect on the next
/// tick.
pub struct Simulation<B: Body = RigidBody> {
    target: MovingTarget,
    agents: Vec<AgentSlot<B>>,
    next_handle: u64,
    clock: TickContext,
    fixed_dt: f32,
    scrollbar_multiplier: f32,
    prediction_multiplier: f32,
    mode: SteeringMode,
    prediction_factor: f32,
    debug: DebugConfig,
    trace: Option<Box<dyn TraceSink>>,
}

impl<B: Body> Simulation<B> {
    pub fn new(target: MovingTarget) -> Self {
        Self {
            target,
            agents: Vec::new(),
            next_handle: 0,
            clock: TickContext::new(DEFAULT_FIXED_DT, 0),
            fixed_dt: DEFAULT_FIXED_DT,
            scrollbar_multiplier: DEFAULT_SCROLLBAR_MULTIPLIER,
            prediction_multiplier: 1.0,
            mode: SteeringMode::default(),
            prediction_factor: 1.0,
            debug: DebugConfig::default(),
            trace: None,
        }
    }

    pub fn with_fixed_dt(mut self, fixed_dt: f32) -> Result<Self> {
        self.fixed_dt = check_time_step(fixed_dt)?;
        self.clock.dt_seconds = self.fixed_dt;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.clock.seed = seed;
        self
    }

    pub fn with_scrollbar_multiplier(mut self, multiplier: f32) -> Result<Self> {
        self.scrollbar_multiplier = check_positive("scrollbar_multiplier", multiplier)?;
        Ok(self)
    }

    pub fn with_prediction_multiplier(mut self, multiplier: f32) -> Result<Self> {
        self.prediction_multiplier = check_non_negative("prediction_multiplier", multiplier)?;
        Ok(self)
    }

    /// Mode reported before the first broadcast. Agents are not touched.
    pub fn with_mode(mut self, mode: SteeringMode) -> Self {
        self.mode = mode;
        self
    }

    /// Prediction factor reported before the first broadcast, already scaled.
    pub fn with_prediction_factor(mut self, factor: f32) -> Result<Self> {
        self.prediction_factor = check_non_negative("prediction_factor", factor)?;
        Ok(self)
    }

    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) -> Option<Box<dyn TraceSink>> {
        std::mem::replace(&mut self.trace, sink)
    }

    pub fn register(&mut self, agent: SteeringAgent, body: B) -> AgentHandle {
        let handle = AgentHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!(%handle, mode = %agent.mode(), "Registered agent");
        self.agents.push(AgentSlot {
            handle,
            agent,
            body,
        });
        handle
    }

    pub fn target(&self) -> &MovingTarget {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut MovingTarget {
        &mut self.target
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = AgentHandle> + '_ {
        self.agents.iter().map(|slot| slot.handle)
    }

    /// Registered agents in registration order.
    pub fn agents(&self) -> impl Iterator<Item = (AgentHandle, &SteeringAgent, &B)> + '_ {
        self.agents
            .iter()
            .map(|slot| (slot.handle, &slot.agent, &slot.body))
    }

    pub fn agent(&self, handle: AgentHandle) -> Result<&SteeringAgent> {
        self.slot(handle).map(|slot| &slot.agent)
    }

    pub fn agent_mut(&mut self, handle: AgentHandle) -> Result<&mut SteeringAgent> {
        self.slot_mut(handle).map(|slot| &mut slot.agent)
    }

    pub fn body(&self, handle: AgentHandle) -> Result<&B> {
        self.slot(handle).map(|slot| &slot.body)
    }

    pub fn body_mut(&mut self, handle: AgentHandle) -> Result<&mut B> {
        self.slot_mut(handle).map(|slot| &mut slot.body)
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.tick
    }

    pub fn clock(&self) -> TickContext {
        self.clock
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Last mode broadcast to all agents.
    pub fn mode(&self) -> SteeringMode {
        self.mode
    }

    /// Last prediction factor broadcast to all agents.
    pub fn prediction_factor(&self) -> f32 {
        self.prediction_factor
    }

    pub fn scrollbar_multiplier(&self) -> f32 {
        self.scrollbar_multiplier
    }

    pub fn prediction_multiplier(&self) -> f32 {
        self.prediction_multiplier
    }

    pub fn debug_config(&self) -> &DebugConfig {
        &self.debug
    }

    pub fn set_debug_config(&mut self, debug: DebugConfig) {
        self.debug = debug;
    }

    /// Status line shown next to the debug overlay.
    pub fn status_line(&self) -> String {
        format!("Mode: {}", self.mode)
    }

    /// Record the commanded destination. The target starts moving on the next tick.
    pub fn set_destination(&mut self, point: Vec3) {
        tracing::debug!(%point, "Destination set");
        self.target.set_destination(point);
        self.emit(TraceEvent::new(self.clock.tick, tags::DESTINATION_SET));
    }

    /// Advance the target alone by `dt_seconds`. Returns `true` when it rests on its destination.
    pub fn advance_target(&mut self, dt_seconds: f32) -> Result<bool> {
        check_time_step(dt_seconds)?;
        Ok(self.target.advance(dt_seconds))
    }

    pub fn set_mode(&mut self, mode: SteeringMode) {
        for slot in &mut self.agents {
            slot.agent.set_mode(mode);
        }
        self.mode = mode;
        tracing::info!(%mode, agents = self.agents.len(), "Steering mode broadcast");
        self.emit(TraceEvent::new(self.clock.tick, tags::MODE_CHANGED).with_detail(mode.name()));
    }

    /// Parse `name` and broadcast it. Unknown names change nothing and are reported.
    pub fn set_mode_by_name(&mut self, name: &str) -> Result<SteeringMode> {
        match name.parse::<SteeringMode>() {
            Ok(mode) => {
                self.set_mode(mode);
                Ok(mode)
            }
            Err(err) => {
                tracing::warn!(name, "Ignoring unknown steering mode");
                self.emit(
                    TraceEvent::new(self.clock.tick, tags::COMMAND_REJECTED)
                        .with_detail(err.to_string()),
                );
                Err(err)
            }
        }
    }

    /// Broadcast `raw * scrollbar_multiplier` as every agent's force limit.
    pub fn set_max_force(&mut self, raw: f32) -> Result<()> {
        let multiplier = self.scrollbar_multiplier;
        let value = self.scaled(raw, multiplier, "max_force", check_positive)?;
        for slot in &mut self.agents {
            slot.agent.set_max_force(value)?;
        }
        tracing::info!(raw, value, "Max force broadcast");
        self.emit(TraceEvent::new(self.clock.tick, tags::MAX_FORCE_CHANGED).with_value(value));
        Ok(())
    }

    /// Broadcast `raw * scrollbar_multiplier` as every agent's speed limit.
    pub fn set_max_speed(&mut self, raw: f32) -> Result<()> {
        let multiplier = self.scrollbar_multiplier;
        let value = self.scaled(raw, multiplier, "max_speed", check_positive)?;
        for slot in &mut self.agents {
            slot.agent.set_max_speed(value)?;
        }
        tracing::info!(raw, value, "Max speed broadcast");
        self.emit(TraceEvent::new(self.clock.tick, tags::MAX_SPEED_CHANGED).with_value(value));
        Ok(())
    }

    /// Broadcast `raw * prediction_multiplier` as every agent's prediction factor.
    pub fn set_prediction_factor(&mut self, raw: f32) -> Result<()> {
        let multiplier = self.prediction_multiplier;
        let value = self.scaled(raw, multiplier, "prediction_factor", check_non_negative)?;
        for slot in &mut self.agents {
            slot.agent.set_prediction_factor(value)?;
        }
        self.prediction_factor = value;
        tracing::info!(raw, value, "Prediction factor broadcast");
        self.emit(TraceEvent::new(self.clock.tick, tags::PREDICTION_CHANGED).with_value(value));
        Ok(())
    }

    pub fn apply(&mut self, command: &ControlCommand) -> Result<()> {
        match command {
            ControlCommand::SetDestination { point } => self.set_destination(*point),
            ControlCommand::SetMode { mode } => self.set_mode(*mode),
            ControlCommand::SetModeByName { name } => {
                self.set_mode_by_name(name)?;
            }
            ControlCommand::Hotkey { key } => match SteeringMode::from_hotkey(*key) {
                Some(mode) => self.set_mode(mode),
                None => tracing::debug!(%key, "Unbound hotkey"),
            },
            ControlCommand::SetMaxForce { value } => self.set_max_force(*value)?,
            ControlCommand::SetMaxSpeed { value } => self.set_max_speed(*value)?,
            ControlCommand::SetPredictionFactor { value } => self.set_prediction_factor(*value)?,
        }
        Ok(())
    }

    /// Step with the configured fixed time step.
    pub fn step(&mut self) -> Result<TickReport> {
        self.tick(self.fixed_dt)
    }

    /// Advance the target, steer every agent in registration order, then move all bodies.
    ///
    /// Fails before touching any state when a body reports an unusable mass.
    pub fn tick(&mut self, dt_seconds: f32) -> Result<TickReport> {
        check_time_step(dt_seconds)?;
        self.check_masses()?;
        let clock = self.clock.next(dt_seconds);

        let was_moving = self.target.is_moving();
        let start = self.target.position();
        let arrived = self.target.advance(dt_seconds);
        let target = self.target.state();

        let mut agents = Vec::with_capacity(self.agents.len());
        for slot in &mut self.agents {
            let step = slot.agent.advance(&mut slot.body, target)?;
            slot.body.integrate(dt_seconds);
            agents.push(AgentReport {
                handle: slot.handle,
                position: slot.body.position(),
                step,
            });
        }

        self.clock = clock;
        let target_arrived = arrived && (was_moving || target.position != start);
        if target_arrived {
            tracing::debug!(tick = clock.tick, position = %target.position, "Target arrived");
            self.emit(TraceEvent::new(clock.tick, tags::TARGET_ARRIVED));
        }

        tracing::trace!(tick = clock.tick, agents = agents.len(), "Tick");
        Ok(TickReport {
            tick: clock.tick,
            target,
            target_arrived,
            agents,
        })
    }

    /// Sample the debug overlay, or `None` when debug drawing is disabled.
    pub fn render_debug(&self) -> Result<Option<DebugFrame>> {
        if !self.debug.enabled {
            return Ok(None);
        }
        let dt = self.fixed_dt;
        let points = self.debug.max_points;
        let target = self.target.state();

        let mut agents = Vec::with_capacity(self.agents.len());
        for slot in &self.agents {
            agents.push(AgentDebug {
                handle: slot.handle,
                position: slot.body.position(),
                velocity: slot.body.velocity(),
                predicted_target: target.predicted(slot.agent.prediction_factor()),
                path: debug::predict_agent_path(&slot.agent, &slot.body, &self.target, dt, points)?,
            });
        }

        Ok(Some(DebugFrame {
            status: self.status_line(),
            target_position: target.position,
            target_path: debug::predict_target_path(&self.target, dt, points),
            agents,
            marker_size: self.debug.marker_size,
            agent_color: self.debug.agent_color,
            target_color: self.debug.target_color,
            prediction_color: self.debug.prediction_color,
        }))
    }

    fn scaled(
        &mut self,
        raw: f32,
        multiplier: f32,
        name: &'static str,
        check: fn(&'static str, f32) -> Result<f32>,
    ) -> Result<f32> {
        match check(name, raw * multiplier) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(raw, multiplier, %err, "Rejected broadcast");
                self.emit(
                    TraceEvent::new(self.clock.tick, tags::COMMAND_REJECTED)
                        .with_value(raw)
                        .with_detail(err.to_string()),
                );
                Err(err)
            }
        }
    }

    fn check_masses(&mut self) -> Result<()> {
        let invalid = self
            .agents
            .iter()
            .map(|slot| (slot.handle, slot.body.mass()))
            .find(|(_, mass)| !(mass.is_finite() && *mass > 0.0));
        let Some((handle, mass)) = invalid else {
            return Ok(());
        };
        tracing::warn!(%handle, mass, "Tick rejected: body mass must be positive");
        self.emit(
            TraceEvent::new(self.clock.tick, tags::TICK_REJECTED)
                .with_agent(handle.0)
                .with_value(mass),
        );
        Err(SteeringError::NonPositiveMass(mass))
    }

    fn slot(&self, handle: AgentHandle) -> Result<&AgentSlot<B>> {
        self.agents
            .iter()
            .find(|slot| slot.handle == handle)
            .ok_or(SteeringError::UnknownAgent(handle.0))
    }

    fn slot_mut(&mut self, handle: AgentHandle) -> Result<&mut AgentSlot<B>> {
        self.agents
            .iter_mut()
            .find(|slot| slot.handle == handle)
            .ok_or(SteeringError::UnknownAgent(handle.0))
    }

    fn emit(&mut self, event: TraceEvent) {
        if let Some(sink) = self.trace.as_mut() {
            sink.emit(event);
        }
    }
}

impl<B: Body> fmt::Debug for Simulation<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("target", &self.target)
            .field("agents", &self.agents.len())
            .field("tick", &self.clock.tick)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn check_time_step(dt_seconds: f32) -> Result<f32> {
    if dt_seconds.is_finite() && dt_seconds > 0.0 {
        Ok(dt_seconds)
    } else {
        Err(SteeringError::InvalidTimeStep(dt_seconds))
    }
}
