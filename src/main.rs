//! Prints camera-frame poses of the robot's mesh-bearing links for one set of joint angles.
//!
//! ```text
//! rs-robot-state --urdf robot.urdf --config frames.yaml pan=0.3 tilt=-0.2
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rs_robot_state::config::StateConfig;
use rs_robot_state::forward_kinematics::ForwardKinematicsEngine;
use rs_robot_state::urdf::description_from_urdf_file;
use rs_robot_state::utils::{as_radians, format_pose};

/// Camera-frame poses of robot links.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// URDF file of the robot. Overrides robot_description of the configuration.
    #[arg(short, long)]
    urdf: Option<PathBuf>,

    /// YAML configuration (camera_frame, kinematic_frame, robot_description).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kinematic base frame.
    #[arg(long)]
    base: Option<String>,

    /// Camera frame.
    #[arg(long)]
    camera: Option<String>,

    /// Joint values are given in degrees (prismatic joints included).
    #[arg(long)]
    degrees: bool,

    /// Joint values as name=value.
    #[arg(value_parser = parse_joint_value)]
    joints: Vec<(String, f64)>,
}

fn parse_joint_value(arg: &str) -> Result<(String, f64), String> {
    let (name, value) = arg.split_once('=')
        .ok_or_else(|| format!("expected name=value, found '{}'", arg))?;
    let value: f64 = value.trim().parse()
        .map_err(|e| format!("bad value of joint {}: {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StateConfig::from_yaml_file(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => StateConfig::default(),
    };
    if let Some(base) = cli.base {
        config.frames.base_frame = base;
    }
    if let Some(camera) = cli.camera {
        config.frames.camera_frame = camera;
    }

    let urdf = match cli.urdf.or(config.robot_description) {
        Some(urdf) => urdf,
        None => bail!("no robot description, use --urdf or robot_description in the configuration"),
    };
    let description = description_from_urdf_file(&urdf)
        .with_context(|| format!("reading robot description {}", urdf.display()))?;

    let engine = ForwardKinematicsEngine::new(&description, &config.frames)
        .with_context(|| format!("building kinematic model of {}", description.name))?;

    let joints = if cli.degrees { as_radians(cli.joints) } else { cli.joints };
    let report = engine.compute(joints)?;

    println!("Poses in {} frame ({} DOF):", config.frames.camera_frame, engine.dof());
    for (link, mesh) in engine.binding().mesh_paths() {
        match report.poses.get(link) {
            Some(pose) => println!("{:<24} {}\n    {}", link, mesh, format_pose(pose)),
            None => println!("{:<24} {}\n    (not solved)", link, mesh),
        }
    }
    Ok(())
}
