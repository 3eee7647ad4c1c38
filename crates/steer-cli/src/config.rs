//! Run configuration: a simulation setup plus a scripted command timeline.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use steer_core::Vec3;
use steer_sim::{ControlCommand, ScatterConfig, SimulationConfig};

/// Top-level file loaded by `steer run` and `steer path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub simulation: SimulationConfig,

    /// Ticks to run when `--ticks` is not given.
    pub ticks: u64,

    /// Commands applied just before the tick they are scheduled for.
    pub commands: Vec<ScheduledCommand>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            ticks: 500,
            commands: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    #[serde(default)]
    pub at_tick: u64,
    #[serde(flatten)]
    pub command: ControlCommand,
}

impl RunConfig {
    /// Load from YAML (`.yaml`/`.yml`) or JSON (`.json`).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let format = ConfigFormat::from_path(path)?;
        let config: Self = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?,
            ConfigFormat::Json => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?,
        };
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No config given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Starter config written by `steer init`: a scattered group chasing a target that crosses
    /// the field, with a mode switch halfway.
    pub fn starter() -> Self {
        let mut config = Self::default();
        config.simulation.scatter = Some(ScatterConfig::default());
        config.commands = vec![
            ScheduledCommand {
                at_tick: 0,
                command: ControlCommand::SetDestination {
                    point: Vec3::new(40.0, 0.0, 25.0),
                },
            },
            ScheduledCommand {
                at_tick: 250,
                command: ControlCommand::Hotkey { key: '3' },
            },
        ];
        config
    }

    /// Scheduled commands for `tick`, in file order.
    pub fn commands_at(&self, tick: u64) -> impl Iterator<Item = &ControlCommand> + '_ {
        self.commands
            .iter()
            .filter(move |scheduled| scheduled.at_tick == tick)
            .map(|scheduled| &scheduled.command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => bail!(
                "Unsupported config format for {} (expected .yaml, .yml or .json)",
                path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_core::SteeringMode;
    use tempfile::TempDir;

    #[test]
    fn loads_yaml_with_defaults_for_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(
            &path,
            r#"
ticks: 10
simulation:
  seed: 42
  target:
    cruise_speed: 5.0
commands:
  - at_tick: 3
    command: set_mode_by_name
    name: pursuit
  - command: set_destination
    point: { x: 1.0, y: 0.0, z: 2.0 }
"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();

        assert_eq!(config.ticks, 10);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.target.cruise_speed, 5.0);
        assert_eq!(config.simulation.fixed_dt, SimulationConfig::default().fixed_dt);
        assert_eq!(config.commands.len(), 2);
        assert_eq!(config.commands[1].at_tick, 0);
        assert_eq!(
            config.commands_at(3).collect::<Vec<_>>(),
            vec![&ControlCommand::SetModeByName {
                name: "pursuit".to_string()
            }]
        );
    }

    #[test]
    fn loads_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{ "ticks": 4, "commands": [ { "at_tick": 1, "command": "set_mode", "mode": "Flee" } ] }"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();

        assert_eq!(config.ticks, 4);
        assert_eq!(
            config.commands[0].command,
            ControlCommand::SetMode {
                mode: SteeringMode::Flee
            }
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "ticks = 1").unwrap();

        let err = RunConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported config format"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunConfig::load(Path::new("/nonexistent/steer.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/steer.yaml"));
    }

    #[test]
    fn starter_config_survives_save_and_load() {
        let dir = TempDir::new().unwrap();
        for name in ["starter.yaml", "starter.json"] {
            let path = dir.path().join(name);
            RunConfig::starter().save(&path).unwrap();
            assert_eq!(RunConfig::load(&path).unwrap(), RunConfig::starter());
        }
    }
}
