//! In-memory link/joint hierarchy, as handed to the kinematic core by a description
//! supplier (for instance the URDF reader). The structures carry no validation of
//! their own; `KinematicTree::new` checks them.

use std::path::Path;
use nalgebra::{Translation3, UnitQuaternion};
use crate::kinematic_traits::Pose;

/// Mesh file extensions that a renderer is able to load.
pub const MESH_EXTENSIONS: [&str; 2] = ["stl", "dae"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    /// Rotation about the axis, with position limits.
    Revolute,
    /// Translation along the axis, with position limits.
    Prismatic,
    /// Unlimited rotation about the axis.
    Continuous,
    /// No relative motion between parent and child.
    Fixed,
}

impl JointType {
    /// Whether this joint takes a degree of freedom in the angle vector.
    pub const fn is_actuated(self) -> bool {
        !matches!(self, JointType::Fixed)
    }
}

/// Position and roll-pitch-yaw rotation of a frame relative to its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Origin {
    /// Translation [x, y, z] in meters.
    pub xyz: [f64; 3],
    /// Rotation [roll, pitch, yaw] in radians, applied as yaw * pitch * roll.
    pub rpy: [f64; 3],
}

impl Origin {
    pub fn new(xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        Origin { xyz, rpy }
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Origin { xyz: [x, y, z], rpy: [0.0; 3] }
    }

    pub fn to_pose(&self) -> Pose {
        Pose::from_parts(
            Translation3::new(self.xyz[0], self.xyz[1], self.xyz[2]),
            UnitQuaternion::from_euler_angles(self.rpy[0], self.rpy[1], self.rpy[2]),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Mesh { filename: String, scale: [f64; 3] },
    Box { size: [f64; 3] },
    Cylinder { radius: f64, length: f64 },
    Sphere { radius: f64 },
}

impl Geometry {
    pub fn mesh(filename: impl Into<String>) -> Self {
        Geometry::Mesh { filename: filename.into(), scale: [1.0; 3] }
    }

    /// Mesh filename if this geometry references a mesh file the renderer can load
    /// (`.stl` or `.dae`, any letter case).
    pub fn renderable_mesh(&self) -> Option<&str> {
        match self {
            Geometry::Mesh { filename, .. } => {
                let extension = Path::new(filename).extension()?.to_str()?;
                MESH_EXTENSIONS.iter()
                    .any(|known| known.eq_ignore_ascii_case(extension))
                    .then_some(filename.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub origin: Origin,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkData {
    pub name: String,
    pub visual: Option<Visual>,
}

impl LinkData {
    /// Link with only a name (no geometry).
    pub fn new(name: impl Into<String>) -> Self {
        LinkData { name: name.into(), visual: None }
    }

    /// Link carrying the given mesh file as its visual geometry.
    pub fn with_mesh(name: impl Into<String>, filename: impl Into<String>) -> Self {
        LinkData {
            name: name.into(),
            visual: Some(Visual { origin: Origin::default(), geometry: Geometry::mesh(filename) }),
        }
    }

    pub fn renderable_mesh(&self) -> Option<&str> {
        self.visual.as_ref().and_then(|visual| visual.geometry.renderable_mesh())
    }
}

/// Lower and upper position limit of a joint (radians or meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub lower: f64,
    pub upper: f64,
}

impl JointLimits {
    pub fn new(lower: f64, upper: f64) -> Self {
        JointLimits { lower, upper }
    }

    /// Limits of a continuous joint declared without a limit element.
    pub fn unbounded() -> Self {
        JointLimits { lower: f64::NEG_INFINITY, upper: f64::INFINITY }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointData {
    pub name: String,
    pub joint_type: JointType,
    pub parent: String,
    pub child: String,
    /// Transform from the parent link frame to the joint (and child link) frame.
    pub origin: Origin,
    /// Motion axis in the joint frame. Need not be normalized.
    pub axis: [f64; 3],
    pub limits: Option<JointLimits>,
}

impl JointData {
    pub fn fixed(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>,
                 origin: Origin) -> Self {
        JointData {
            name: name.into(),
            joint_type: JointType::Fixed,
            parent: parent.into(),
            child: child.into(),
            origin,
            axis: [1.0, 0.0, 0.0],
            limits: None,
        }
    }

    pub fn revolute(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>,
                    origin: Origin, axis: [f64; 3], limits: JointLimits) -> Self {
        JointData {
            name: name.into(),
            joint_type: JointType::Revolute,
            parent: parent.into(),
            child: child.into(),
            origin,
            axis,
            limits: Some(limits),
        }
    }

    pub fn prismatic(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>,
                     origin: Origin, axis: [f64; 3], limits: JointLimits) -> Self {
        JointData {
            joint_type: JointType::Prismatic,
            ..JointData::revolute(name, parent, child, origin, axis, limits)
        }
    }

    pub fn continuous(name: impl Into<String>, parent: impl Into<String>, child: impl Into<String>,
                      origin: Origin, axis: [f64; 3]) -> Self {
        JointData {
            joint_type: JointType::Continuous,
            limits: None,
            ..JointData::revolute(name, parent, child, origin, axis, JointLimits::unbounded())
        }
    }
}

/// The complete link/joint hierarchy of a robot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotDescription {
    pub name: String,
    pub links: Vec<LinkData>,
    pub joints: Vec<JointData>,
}

impl RobotDescription {
    pub fn new(name: impl Into<String>) -> Self {
        RobotDescription { name: name.into(), ..Default::default() }
    }

    pub fn with_link(mut self, link: LinkData) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_joint(mut self, joint: JointData) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn link(&self, name: &str) -> Option<&LinkData> {
        self.links.iter().find(|link| link.name == name)
    }
}
