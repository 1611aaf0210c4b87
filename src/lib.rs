//! Robot state for perception: poses of the robot's visible parts as seen from its camera.
//!
//! Given a robot described as a tree of links connected by joints, and a set of named joint
//! angles, this crate computes the pose of every mesh-bearing link in the camera frame. The
//! result is what a renderer needs to draw the robot's own body into the camera image.
//!
//! # Features
//!
//! - Kinematic tree built from links and joints (revolute, prismatic, continuous and fixed),
//!   with deterministic ordering of the degrees of freedom.
//! - Joint angles are supplied by name, in any order and any subset. Joints not mentioned are
//!   at zero, unknown names are reported as warnings and otherwise ignored.
//! - Camera-relative transform between a configurable kinematic base frame and the camera
//!   frame. The camera can sit anywhere in the tree, mounted on the robot or above its base.
//! - Links that cannot be solved are left out of the result and reported, the rest is still
//!   returned.
//! - The engine is immutable after construction and can be shared between threads.
//! - URDF reader, YAML configuration and a command line pose printer (feature
//!   `allow_filesystem`, on by default).
//!
//! ## Example
//!
//! ```
//! use rs_robot_state::config::FrameConfig;
//! use rs_robot_state::description::{JointData, JointLimits, LinkData, Origin, RobotDescription};
//! use rs_robot_state::forward_kinematics::ForwardKinematicsEngine;
//!
//! let robot = RobotDescription::new("head")
//!     .with_link(LinkData::new("BASE"))
//!     .with_link(LinkData::with_mesh("head", "package://head/meshes/head.dae"))
//!     .with_link(LinkData::new("XTION"))
//!     .with_joint(JointData::revolute("pan", "BASE", "head", Origin::translation(0.0, 0.0, 1.0),
//!                                     [0.0, 0.0, 1.0], JointLimits::new(-2.0, 2.0)))
//!     .with_joint(JointData::fixed("mount", "head", "XTION", Origin::translation(0.1, 0.0, 0.0)));
//!
//! let engine = ForwardKinematicsEngine::new(&robot, &FrameConfig::new("BASE", "XTION")).unwrap();
//! let report = engine.compute([("pan", 0.5)]).unwrap();
//! let head = report.poses["head"];
//! assert!((head.translation.vector.x + 0.1).abs() < 1e-12);
//! ```

pub mod kinematic_traits;
pub mod kinematics_error;

pub mod description;
pub mod tree;
pub mod joint_index;
pub mod mesh_binding;
pub mod chain;
pub mod forward_kinematics;
pub mod pose_tracker;

pub mod config;
pub mod utils;

#[cfg(feature = "allow_filesystem")]
pub mod urdf;
#[cfg(feature = "allow_filesystem")]
pub mod parameter_error;
