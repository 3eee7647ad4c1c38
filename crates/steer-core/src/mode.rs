use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SteeringError;

/// Which steering behaviour an agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SteeringMode {
    /// Move toward the target, optionally slowing down on arrival.
    #[default]
    Seek,
    /// Move directly away from the target.
    Flee,
    /// Seek the target's predicted position.
    Pursuit,
    /// Flee the target's predicted position.
    Evasion,
}

impl SteeringMode {
    pub const ALL: [SteeringMode; 4] = [
        SteeringMode::Seek,
        SteeringMode::Flee,
        SteeringMode::Pursuit,
        SteeringMode::Evasion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SteeringMode::Seek => "Seek",
            SteeringMode::Flee => "Flee",
            SteeringMode::Pursuit => "Pursuit",
            SteeringMode::Evasion => "Evasion",
        }
    }

    /// Digit keys `1`..`4` select the modes in declaration order.
    pub fn from_hotkey(key: char) -> Option<Self> {
        match key {
            '1' => Some(SteeringMode::Seek),
            '2' => Some(SteeringMode::Flee),
            '3' => Some(SteeringMode::Pursuit),
            '4' => Some(SteeringMode::Evasion),
            _ => None,
        }
    }
}

impl fmt::Display for SteeringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SteeringMode {
    type Err = SteeringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SteeringError::UnknownMode(s.to_string()))
    }
}
