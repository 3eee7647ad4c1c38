//! Steer CLI - headless driver for the steering simulation.
//!
//! - `steer run` - step a configured scene and print a summary
//! - `steer path` - dump the debug overlay (predicted paths) as JSON
//! - `steer init` - write a starter config

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use steer_core::{Body, SteeringMode, Vec3};
use steer_sim::{AgentHandle, ControlCommand, DebugConfig, Simulation};

use crate::config::{RunConfig, ScheduledCommand};

#[derive(Parser)]
#[command(name = "steer")]
#[command(about = "Headless steering behaviour simulation", version)]
struct Cli {
    /// Run configuration (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Step the simulation and print a summary
    Run {
        /// Number of ticks (overrides the config)
        #[arg(long)]
        ticks: Option<u64>,

        /// Steering mode broadcast before the first tick
        #[arg(long)]
        mode: Option<SteeringMode>,

        /// Target destination as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        destination: Option<Vec3>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the debug overlay after some ticks as JSON
    Path {
        /// Ticks to run before sampling
        #[arg(long, default_value_t = 0)]
        ticks: u64,
    },

    /// Write a starter config
    Init {
        #[arg(short, long, default_value = "steer.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run {
            ticks,
            mode,
            destination,
            json,
        }) => {
            let mut config = RunConfig::load_or_default(cli.config.as_deref())?;
            push_overrides(&mut config, mode, destination);
            let ticks = ticks.unwrap_or(config.ticks);
            let (_, summary) = drive(&config, ticks)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            Ok(())
        }
        Some(Commands::Path { ticks }) => {
            let config = RunConfig::load_or_default(cli.config.as_deref())?;
            let (mut sim, _) = drive(&config, ticks)?;
            sim.set_debug_config(DebugConfig {
                enabled: true,
                ..*sim.debug_config()
            });
            let frame = sim
                .render_debug()?
                .context("Debug overlay unavailable")?;
            println!("{}", serde_json::to_string_pretty(&frame)?);
            Ok(())
        }
        Some(Commands::Init { output, force }) => init_config(&output, force),
        None => {
            println!("Steer - steering behaviour simulation");
            println!();
            println!("Usage: steer <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run   Step the simulation and print a summary");
            println!("  path  Print predicted debug paths as JSON");
            println!("  init  Write a starter config");
            println!();
            println!("Run 'steer --help' for more information.");
            Ok(())
        }
    }
}

/// Command-line overrides run before anything scheduled at tick 0.
fn push_overrides(config: &mut RunConfig, mode: Option<SteeringMode>, destination: Option<Vec3>) {
    let mut overrides = Vec::new();
    if let Some(mode) = mode {
        overrides.push(ControlCommand::SetMode { mode });
    }
    if let Some(point) = destination {
        overrides.push(ControlCommand::SetDestination { point });
    }
    let mut commands: Vec<ScheduledCommand> = overrides
        .into_iter()
        .map(|command| ScheduledCommand {
            at_tick: 0,
            command,
        })
        .collect();
    commands.append(&mut config.commands);
    config.commands = commands;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct AgentSummary {
    handle: AgentHandle,
    mode: SteeringMode,
    position: Vec3,
    velocity: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct RunSummary {
    ticks: u64,
    elapsed_seconds: f32,
    mode: SteeringMode,
    target_position: Vec3,
    target_arrivals: usize,
    rejected_commands: usize,
    agents: Vec<AgentSummary>,
}

/// Build the simulation from `config` and step it `ticks` times, applying scheduled commands.
fn drive(config: &RunConfig, ticks: u64) -> Result<(Simulation, RunSummary)> {
    let mut sim = Simulation::from_config(&config.simulation)
        .context("Failed to build simulation from config")?;
    tracing::info!(agents = sim.len(), ticks, "Starting run");

    let mut target_arrivals = 0;
    let mut rejected_commands = 0;
    for tick in 0..ticks {
        for command in config.commands_at(tick) {
            if let Err(err) = sim.apply(command) {
                tracing::warn!(tick, ?command, %err, "Command rejected");
                rejected_commands += 1;
            }
        }
        let report = sim.step()?;
        if report.target_arrived {
            tracing::info!(tick = report.tick, position = %report.target.position, "Target arrived");
            target_arrivals += 1;
        }
    }

    let unreached = config.commands.iter().filter(|c| c.at_tick >= ticks).count();
    if unreached > 0 {
        tracing::warn!(unreached, ticks, "Some scheduled commands were never applied");
    }

    let agents = sim
        .agents()
        .map(|(handle, agent, body)| AgentSummary {
            handle,
            mode: agent.mode(),
            position: body.position(),
            velocity: body.velocity(),
        })
        .collect();
    let summary = RunSummary {
        ticks: sim.tick_count(),
        elapsed_seconds: sim.clock().elapsed_seconds(),
        mode: sim.mode(),
        target_position: sim.target().position(),
        target_arrivals,
        rejected_commands,
        agents,
    };
    Ok((sim, summary))
}

fn print_summary(summary: &RunSummary) {
    println!("Steering Run");
    println!("============");
    println!();
    println!(
        "Ticks: {} ({:.2}s simulated)",
        summary.ticks, summary.elapsed_seconds
    );
    println!("Mode: {}", summary.mode);
    println!(
        "Target: {} (arrived {} times)",
        summary.target_position, summary.target_arrivals
    );
    if summary.rejected_commands > 0 {
        println!("Rejected commands: {}", summary.rejected_commands);
    }
    println!();
    println!("Agents: {}", summary.agents.len());
    for agent in summary.agents.iter().take(10) {
        println!(
            "  {} [{}] at {} moving {:.3}",
            agent.handle,
            agent.mode,
            agent.position,
            agent.velocity.length()
        );
    }
    if summary.agents.len() > 10 {
        println!("  ... and {} more", summary.agents.len() - 10);
    }
}

fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }
    RunConfig::starter().save(output)?;

    println!("Wrote starter config to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit agents, scatter and commands in {}", output.display());
    println!("  2. Run: steer run --config {}", output.display());

    Ok(())
}

fn parse_vec3(value: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{value}'"));
    };
    let parse = |s: &str| {
        s.parse::<f32>()
            .map_err(|err| format!("invalid coordinate '{s}': {err}"))
    };
    let point = Vec3::new(parse(x)?, parse(y)?, parse(z)?);
    if !point.is_finite() {
        return Err(format!("coordinates must be finite: '{value}'"));
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_sim::{AgentSpawn, SimulationConfig};

    fn one_agent_config() -> RunConfig {
        RunConfig {
            simulation: SimulationConfig {
                agents: vec![AgentSpawn {
                    position: Vec3::new(10.0, 0.0, 0.0),
                    ..AgentSpawn::default()
                }],
                ..SimulationConfig::default()
            },
            ticks: 50,
            commands: Vec::new(),
        }
    }

    #[test]
    fn parse_vec3_accepts_triples() {
        assert_eq!(parse_vec3("1, -2.5,3").unwrap(), Vec3::new(1.0, -2.5, 3.0));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,2,x").is_err());
        assert!(parse_vec3("1,inf,2").is_err());
    }

    #[test]
    fn cli_parses_run_options() {
        let cli = Cli::try_parse_from([
            "steer",
            "-v",
            "run",
            "--ticks",
            "5",
            "--mode",
            "evasion",
            "--destination",
            "-1,0,2",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Run {
                ticks,
                mode,
                destination,
                json,
            }) => {
                assert_eq!(ticks, Some(5));
                assert_eq!(mode, Some(SteeringMode::Evasion));
                assert_eq!(destination, Some(Vec3::new(-1.0, 0.0, 2.0)));
                assert!(!json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn overrides_run_before_scheduled_commands() {
        let mut config = one_agent_config();
        config.commands.push(ScheduledCommand {
            at_tick: 0,
            command: ControlCommand::SetMode {
                mode: SteeringMode::Flee,
            },
        });

        push_overrides(&mut config, Some(SteeringMode::Pursuit), None);

        assert_eq!(
            config.commands_at(0).cloned().collect::<Vec<_>>(),
            vec![
                ControlCommand::SetMode {
                    mode: SteeringMode::Pursuit
                },
                ControlCommand::SetMode {
                    mode: SteeringMode::Flee
                },
            ]
        );
    }

    #[test]
    fn drive_applies_schedule_and_counts_rejections() {
        let mut config = one_agent_config();
        config.commands = vec![
            ScheduledCommand {
                at_tick: 0,
                command: ControlCommand::SetDestination {
                    point: Vec3::new(0.1, 0.0, 0.0),
                },
            },
            ScheduledCommand {
                at_tick: 2,
                command: ControlCommand::SetModeByName {
                    name: "InvalidName".to_string(),
                },
            },
            ScheduledCommand {
                at_tick: 3,
                command: ControlCommand::Hotkey { key: '2' },
            },
        ];

        let (sim, summary) = drive(&config, 10).unwrap();

        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.target_arrivals, 1);
        assert_eq!(summary.rejected_commands, 1);
        assert_eq!(summary.mode, SteeringMode::Flee);
        assert_eq!(summary.target_position, Vec3::new(0.1, 0.0, 0.0));
        assert_eq!(summary.agents.len(), sim.len());
    }

    #[test]
    fn invalid_simulation_config_is_an_error() {
        let mut config = one_agent_config();
        config.simulation.fixed_dt = -1.0;
        assert!(drive(&config, 1).is_err());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("steer.yaml");

        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
        assert_eq!(RunConfig::load(&path).unwrap(), RunConfig::starter());
    }
}
