//! Spot gait and kinematics CLI.
//!
//! Provides three modes of operation:
//! - `run`: drive N control ticks of a gait against a manual clock and print
//!   the joint angles
//! - `solve`: one IK solve of the neutral stance, optionally tilted
//! - `info`: print the geometry and configuration in effect

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use spot_core::prelude::*;
use spot_gait::{GaitMode, MotionController, OperatorCommand};
use spot_ik::BodyKinematics;

type AppResult = Result<(), Box<dyn Error>>;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Quadruped gait and kinematics engine.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file (defaults are used when omitted).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the controller for a number of ticks and print joint angles.
    Run {
        /// Gait to run (idle, stand, walk, trot).
        #[arg(short, long, default_value = "trot")]
        mode: GaitMode,

        /// Number of control ticks.
        #[arg(short = 'n', long, default_value_t = 50)]
        ticks: u32,

        /// Forward velocity command.
        #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
        vx: f64,

        /// Lateral velocity command.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        vy: f64,

        /// Yaw rate command.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        yaw_rate: f64,
    },

    /// Solve the neutral stance once.
    Solve {
        /// Body roll in degrees.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        roll: f64,

        /// Body pitch in degrees.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pitch: f64,

        /// Body yaw in degrees.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        yaw: f64,
    },

    /// Print geometry and configuration.
    Info,
}

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TickRecord {
    tick: u32,
    time: f64,
    mode: GaitMode,
    angles_deg: [f64; 12],
    feet: [[f64; 3]; 4],
}

#[derive(Serialize)]
struct SolveRecord<'a> {
    body: &'a BodyState,
    angles: JointAngles,
}

fn print_angles(angles: &JointAngles) {
    for leg in LegId::ALL {
        let a = angles[leg];
        println!(
            "  {leg}: theta1={:8.3} theta2={:8.3} theta3={:8.3}",
            a.theta1.to_degrees(),
            a.theta2.to_degrees(),
            a.theta3.to_degrees()
        );
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_gait(config: &RobotConfig, json: bool, mode: GaitMode, ticks: u32, velocity: [f64; 3]) -> AppResult {
    let mut controller = MotionController::from_config(config)?;
    let [vx, vy, yaw_rate] = velocity;
    controller.handle(&OperatorCommand::new().with_mode(mode).with_velocity(vx, vy, yaw_rate));
    info!("running {mode} for {ticks} ticks at {:.0} Hz", config.control_hz());

    let mut clock = ManualClock::new();
    for tick in 0..ticks {
        let angles = controller.tick_with(&clock)?;
        let body = controller.machine().body();
        if json {
            let record = TickRecord {
                tick,
                time: clock.now_secs(),
                mode: controller.mode(),
                angles_deg: angles.to_degrees(),
                feet: LegId::ALL.map(|leg| body.foot_position(leg).into()),
            };
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("tick {tick} t={:.3}s", clock.now_secs());
            print_angles(&angles);
        }
        clock.advance_secs(config.control_dt);
    }

    if controller.holds() > 0 {
        info!("{} ticks held the previous solution", controller.holds());
    }
    Ok(())
}

fn run_solve(config: &RobotConfig, json: bool, rotation: [f64; 3]) -> AppResult {
    let kinematics = BodyKinematics::new(config.geometry);
    let mut body = BodyState::new(config.stance.neutral_feet());
    body.ym = config.stance.stand_height;
    let [roll, pitch, yaw] = rotation;
    body.set_rotation(roll, pitch, yaw);

    let angles = kinematics.calc_ik(&body)?;
    if json {
        let record = SolveRecord {
            body: &body,
            angles,
        };
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("neutral stance (roll={roll}, pitch={pitch}, yaw={yaw}):");
        print_angles(&angles);
    }
    Ok(())
}

fn run_info(config: &RobotConfig, json: bool) -> AppResult {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }
    let g = &config.geometry;
    println!("spot v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("geometry (100 mm units):");
    println!("  l1={} l2={} l3={} l4={}", g.l1, g.l2, g.l3, g.l4);
    println!("  length={} width={} max_reach={:.3}", g.length, g.width, g.max_reach());
    println!();
    println!("gait:");
    println!(
        "  ticks={} phases={} phase_length={}",
        config.gait.total_phase_ticks,
        config.gait.num_phases,
        config.gait.phase_length()
    );
    println!("  walk offsets={:?}", config.gait.walk_offsets);
    println!("  trot offsets={:?}", config.gait.trot_offsets);
    println!("  generator={}", config.gait.walk_generator);
    println!();
    println!("control: dt={}s ({:.0} Hz)", config.control_dt, config.control_hz());
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<RobotConfig, ConfigError> {
    match path {
        Some(path) => {
            info!("loading config from {}", path.display());
            RobotConfig::from_file(path)
        }
        None => Ok(RobotConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref())
        .map_err(Box::<dyn Error>::from)
        .and_then(|config| match cli.command {
            Some(Commands::Run {
                mode,
                ticks,
                vx,
                vy,
                yaw_rate,
            }) => run_gait(&config, cli.json, mode, ticks, [vx, vy, yaw_rate]),
            Some(Commands::Solve { roll, pitch, yaw }) => {
                run_solve(&config, cli.json, [roll, pitch, yaw])
            }
            Some(Commands::Info) => run_info(&config, cli.json),
            None => run_gait(&config, cli.json, GaitMode::Trot, 50, [0.5, 0.0, 0.0]),
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
