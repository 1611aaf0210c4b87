extern crate nalgebra as na;

use std::collections::HashMap;
use na::Isometry3;

/// Pose is a rigid transform (rotation + translation) of one frame relative to another.
/// Composition follows the usual convention `parent_to_world * child_to_parent`.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Dense joint angle vector. Position `i` holds the angle (radians, or meters for prismatic
/// joints) of the joint that has DOF index `i` in the `JointIndex`.
pub type JointAngles = Vec<f64>;

/// Poses of the mesh-bearing links, keyed by link name and expressed in the camera frame.
pub type LinkPoseMap = HashMap<String, Pose>;

/// Joint measurements as produced by sensor or simulator feeds: two parallel vectors,
/// names and positions. Not required to cover all joints or to follow DOF order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointState {
    pub name: Vec<String>,
    pub position: Vec<f64>,
}

impl JointState {
    pub fn new<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        let mut state = JointState::default();
        for (name, position) in pairs {
            state.name.push(name.into());
            state.position.push(position);
        }
        state
    }

    /// Name and position pairs. If the vectors differ in length, the excess is ignored.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.name.iter().map(String::as_str).zip(self.position.iter().copied())
    }
}
