//! The camera chain: the unbranched run of segments between the kinematic base frame and the
//! camera frame. Evaluated for a joint configuration, it gives the pose of the base frame as
//! seen from the camera, which turns base-relative poses into camera-relative ones.

use tracing::info;
use crate::config::FrameConfig;
use crate::joint_index::JointIndex;
use crate::kinematic_traits::Pose;
use crate::kinematics_error::KinematicsError;
use crate::tree::{KinematicTree, Segment};

#[derive(Debug, Clone)]
struct ChainLink {
    segment: Segment,
    /// Position of the joint angle in the angle vector, for actuated joints.
    dof_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ChainTransform {
    base: String,
    camera: String,
    /// Segments below the upper frame, down to and including the lower frame, top-down.
    links: Vec<ChainLink>,
    /// True if the camera is below the base (camera mounted on the robot), false if the
    /// base is below the camera.
    camera_below_base: bool,
}

impl ChainTransform {
    /// Extract the chain between the configured frames. One frame must be an ancestor of
    /// the other (or both the same frame).
    ///
    /// # Errors
    /// `KinematicsError::NoChain` if a frame is not in the tree or the frames lie in
    /// different branches. `KinematicsError::ChainJointMissing` if an actuated joint on
    /// the chain has no index, meaning tree and index were built inconsistently.
    pub fn new(tree: &KinematicTree, index: &JointIndex, frames: &FrameConfig)
               -> Result<Self, KinematicsError> {
        let base = frames.base_frame.as_str();
        let camera = frames.camera_frame.as_str();
        let no_chain = |reason: String| KinematicsError::NoChain {
            base: base.to_string(),
            camera: camera.to_string(),
            reason,
        };

        for frame in [base, camera] {
            if !tree.contains(frame) {
                return Err(no_chain(format!("frame {} is not part of the kinematic tree", frame)));
            }
        }

        let from_camera = tree.path_to_root(camera)?;
        let from_base = tree.path_to_root(base)?;

        let (path, camera_below_base) = if let Some(k) = position_of(&from_camera, base) {
            (&from_camera[..k], true)
        } else if let Some(k) = position_of(&from_base, camera) {
            (&from_base[..k], false)
        } else {
            return Err(no_chain("the frames lie in different branches of the tree".into()));
        };

        let mut links = Vec::with_capacity(path.len());
        for segment in path.iter().rev() {
            let dof_index = match segment.actuated_joint() {
                Some(joint) => Some(index.index_of(&joint.name)
                    .ok_or_else(|| KinematicsError::ChainJointMissing(joint.name.clone()))?),
                None => None,
            };
            links.push(ChainLink { segment: (*segment).clone(), dof_index });
        }

        info!("Successfully created chain from {} to {}", camera, base);
        Ok(ChainTransform {
            base: base.to_string(),
            camera: camera.to_string(),
            links,
            camera_below_base,
        })
    }

    /// Pose of the base frame in the camera frame for the given joint angles.
    /// Identity if base and camera are the same frame.
    ///
    /// # Errors
    /// `KinematicsError::ChainJointMissing` if the angle vector has no entry for a joint of
    /// the chain (it was built for another index).
    pub fn evaluate(&self, angles: &[f64]) -> Result<Pose, KinematicsError> {
        let mut upper_to_lower = Pose::identity();
        for link in &self.links {
            let q = match link.dof_index {
                Some(i) => *angles.get(i).ok_or_else(|| KinematicsError::ChainJointMissing(
                    link.segment.joint.as_ref().map_or_else(|| link.segment.name.clone(),
                                                            |joint| joint.name.clone())))?,
                None => 0.0,
            };
            upper_to_lower *= link.segment.local_transform(q);
        }

        if self.camera_below_base {
            // upper_to_lower is the camera pose in the base frame.
            Ok(upper_to_lower.inverse())
        } else {
            Ok(upper_to_lower)
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn camera(&self) -> &str {
        &self.camera
    }

    /// Segment names along the chain from the camera towards the base, excluding the
    /// upper frame of the two.
    pub fn segments(&self) -> Vec<&str> {
        let names = self.links.iter().map(|link| link.segment.name.as_str());
        if self.camera_below_base {
            names.rev().collect()
        } else {
            names.collect()
        }
    }

    /// Actuated joints on the chain, top-down.
    pub fn joint_names(&self) -> Vec<&str> {
        self.links.iter()
            .filter(|link| link.dof_index.is_some())
            .filter_map(|link| link.segment.joint.as_ref().map(|joint| joint.name.as_str()))
            .collect()
    }
}

fn position_of(path: &[&Segment], name: &str) -> Option<usize> {
    path.iter().position(|segment| segment.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{JointData, JointLimits, LinkData, Origin, RobotDescription};
    use crate::utils::assert_pose_eq;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};
    use std::f64::consts::FRAC_PI_2;

    /// base -> pan (z, 1 m up) -> camera (fixed, 0.1 m forward), base -> wheel (x)
    fn head() -> (KinematicTree, JointIndex) {
        let description = RobotDescription::new("head")
            .with_link(LinkData::new("base"))
            .with_link(LinkData::new("pan_link"))
            .with_link(LinkData::new("camera"))
            .with_link(LinkData::new("wheel"))
            .with_joint(JointData::revolute("pan", "base", "pan_link", Origin::translation(0.0, 0.0, 1.0),
                                            [0.0, 0.0, 1.0], JointLimits::new(-3.0, 3.0)))
            .with_joint(JointData::fixed("mount", "pan_link", "camera", Origin::translation(0.1, 0.0, 0.0)))
            .with_joint(JointData::continuous("axle", "base", "wheel", Origin::default(), [1.0, 0.0, 0.0]));
        let tree = KinematicTree::new(&description).unwrap();
        let index = JointIndex::new(&tree);
        (tree, index)
    }

    #[test]
    fn test_same_frame_is_identity() {
        let (tree, index) = head();
        let chain = ChainTransform::new(&tree, &index, &FrameConfig::new("pan_link", "pan_link")).unwrap();
        assert_eq!(chain.evaluate(&[0.7, 0.2]).unwrap(), Pose::identity());
        assert!(chain.segments().is_empty());
    }

    #[test]
    fn test_camera_below_base() {
        let (tree, index) = head();
        let chain = ChainTransform::new(&tree, &index, &FrameConfig::new("base", "camera")).unwrap();
        assert_eq!(chain.segments(), vec!["camera", "pan_link"]);
        assert_eq!(chain.joint_names(), vec!["pan"]);

        let pan = index.index_of("pan").unwrap();
        let mut angles = index.zero_angles();
        angles[pan] = FRAC_PI_2;

        // Camera sits at (0, 0.1, 1) in the base frame, rotated 90 degrees about z.
        let camera_in_base = Pose::from_parts(Translation3::new(0.0, 0.1, 1.0),
                                              UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2));
        let base_in_camera = chain.evaluate(&angles).unwrap();
        assert_pose_eq(&base_in_camera, &camera_in_base.inverse(), 1e-12, 1e-12);
    }

    #[test]
    fn test_base_below_camera() {
        let (tree, index) = head();
        let chain = ChainTransform::new(&tree, &index, &FrameConfig::new("camera", "base")).unwrap();
        let angles = index.zero_angles();
        let base_in_camera = chain.evaluate(&angles).unwrap();
        assert_pose_eq(&base_in_camera, &Pose::translation(0.1, 0.0, 1.0), 1e-12, 1e-12);
    }

    #[test]
    fn test_different_branches() {
        let (tree, index) = head();
        let err = ChainTransform::new(&tree, &index, &FrameConfig::new("wheel", "camera")).unwrap_err();
        assert!(matches!(err, KinematicsError::NoChain { .. }), "{}", err);
    }

    #[test]
    fn test_unknown_frame() {
        let (tree, index) = head();
        let err = ChainTransform::new(&tree, &index, &FrameConfig::new("BASE", "XTION")).unwrap_err();
        assert!(matches!(err, KinematicsError::NoChain { .. }));
    }

    #[test]
    fn test_inconsistent_index() {
        let (tree, _) = head();
        let other = RobotDescription::new("other").with_link(LinkData::new("base"));
        let empty_index = JointIndex::new(&KinematicTree::new(&other).unwrap());
        let err = ChainTransform::new(&tree, &empty_index, &FrameConfig::new("base", "camera")).unwrap_err();
        assert_eq!(err, KinematicsError::ChainJointMissing("pan".into()));
    }

    #[test]
    fn test_short_angle_vector() {
        let (tree, index) = head();
        let chain = ChainTransform::new(&tree, &index, &FrameConfig::new("base", "camera")).unwrap();
        assert!(matches!(chain.evaluate(&[]), Err(KinematicsError::ChainJointMissing(_))));
    }
}
