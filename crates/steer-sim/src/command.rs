#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use steer_core::{SteeringMode, Vec3};

/// A discrete input from the control surface (pointer, keyboard, sliders).
///
/// Slider values are raw; the simulation scales them before broadcasting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", rename_all = "snake_case"))]
pub enum ControlCommand {
    SetDestination { point: Vec3 },
    SetMode { mode: SteeringMode },
    SetModeByName { name: String },
    Hotkey { key: char },
    SetMaxForce { value: f32 },
    SetMaxSpeed { value: f32 },
    SetPredictionFactor { value: f32 },
}
