//! Forward kinematics over the whole tree, producing camera-frame poses of every
//! mesh-bearing link.
//!
//! ```
//! use rs_robot_state::config::FrameConfig;
//! use rs_robot_state::description::{JointData, JointLimits, LinkData, Origin, RobotDescription};
//! use rs_robot_state::forward_kinematics::ForwardKinematicsEngine;
//!
//! let description = RobotDescription::new("pan_unit")
//!     .with_link(LinkData::new("base"))
//!     .with_link(LinkData::with_mesh("head", "meshes/head.stl"))
//!     .with_joint(JointData::revolute("pan", "base", "head", Origin::translation(0.0, 0.0, 0.5),
//!                                     [0.0, 0.0, 1.0], JointLimits::new(-3.14, 3.14)));
//!
//! let engine = ForwardKinematicsEngine::new(&description, &FrameConfig::new("base", "base"))
//!     .expect("valid robot");
//! let report = engine.compute([("pan", 0.3), ("not_a_joint", 1.0)]).expect("consistent model");
//!
//! assert!(report.poses.contains_key("head"));
//! assert_eq!(report.unknown_joints(), vec!["not_a_joint"]);
//! ```

use std::collections::HashMap;
use tracing::{debug, warn};
use crate::chain::ChainTransform;
use crate::config::FrameConfig;
use crate::description::RobotDescription;
use crate::joint_index::JointIndex;
use crate::kinematic_traits::{JointAngles, JointState, LinkPoseMap, Pose};
use crate::kinematics_error::{KinematicsError, StateWarning};
use crate::mesh_binding::LinkMeshBinding;
use crate::tree::KinematicTree;
use crate::utils::is_valid_pose;

/// Outcome of one forward kinematics computation: poses of all links that could be
/// solved, and the recoverable problems met on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseReport {
    /// Mesh-bearing link name to its pose in the camera frame.
    pub poses: LinkPoseMap,
    pub warnings: Vec<StateWarning>,
}

impl PoseReport {
    /// Joint names the caller supplied but the model does not have.
    pub fn unknown_joints(&self) -> Vec<&str> {
        self.warnings.iter()
            .filter_map(|warning| match warning {
                StateWarning::UnknownJoint(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Segments that could not be solved, with the reason.
    pub fn omitted_segments(&self) -> Vec<&KinematicsError> {
        self.warnings.iter()
            .filter_map(|warning| match warning {
                StateWarning::SegmentOmitted(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    /// True if every bound segment was solved.
    pub fn is_complete(&self) -> bool {
        self.omitted_segments().is_empty()
    }
}

/// Immutable robot model plus the forward kinematics over it. All computations work on
/// local buffers, so one engine can be shared between threads.
#[derive(Debug, Clone)]
pub struct ForwardKinematicsEngine {
    tree: KinematicTree,
    index: JointIndex,
    binding: LinkMeshBinding,
    chain: ChainTransform,
    /// For each segment in canonical order, the position of its joint angle (actuated joints only).
    dof_of_segment: Vec<Option<usize>>,
}

impl ForwardKinematicsEngine {
    /// Build tree, joint index, mesh binding and camera chain from the description.
    ///
    /// # Errors
    /// Any construction error: `MalformedTree`, `NoChain`, `NotFound` or `ChainJointMissing`.
    pub fn new(description: &RobotDescription, frames: &FrameConfig) -> Result<Self, KinematicsError> {
        let tree = KinematicTree::new(description)?;
        let index = JointIndex::new(&tree);
        let binding = LinkMeshBinding::new(description, &tree)?;
        let chain = ChainTransform::new(&tree, &index, frames)?;
        Ok(Self::from_parts(tree, index, binding, chain))
    }

    /// Assemble an engine from separately built parts. Parts that do not match (a binding
    /// naming segments the tree does not have, an index missing joints of the tree) are
    /// reported per segment by `compute`.
    pub fn from_parts(tree: KinematicTree, index: JointIndex, binding: LinkMeshBinding,
                      chain: ChainTransform) -> Self {
        let dof_of_segment = tree.segments()
            .map(|segment| segment.actuated_joint().and_then(|joint| index.index_of(&joint.name)))
            .collect();
        ForwardKinematicsEngine { tree, index, binding, chain, dof_of_segment }
    }

    pub fn tree(&self) -> &KinematicTree {
        &self.tree
    }

    pub fn index(&self) -> &JointIndex {
        &self.index
    }

    pub fn binding(&self) -> &LinkMeshBinding {
        &self.binding
    }

    pub fn chain(&self) -> &ChainTransform {
        &self.chain
    }

    pub fn dof(&self) -> usize {
        self.index.size()
    }

    /// Compute camera-frame poses of all mesh-bearing links from named joint angles.
    /// Joints not mentioned are at zero. Unknown names and unsolvable segments are
    /// reported in the returned `PoseReport`.
    ///
    /// # Errors
    /// `KinematicsError::ChainJointMissing` if the camera chain cannot be evaluated. This
    /// only happens if the engine was assembled from inconsistent parts.
    pub fn compute<N: AsRef<str>>(&self, named_angles: impl IntoIterator<Item = (N, f64)>)
                                  -> Result<PoseReport, KinematicsError> {
        let (angles, mut warnings) = self.index.build_angle_vector(named_angles);
        let mut report = self.compute_angles(&angles)?;
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        Ok(report)
    }

    pub fn compute_joint_state(&self, state: &JointState) -> Result<PoseReport, KinematicsError> {
        self.compute(state.pairs())
    }

    /// Same as `compute` but from the dense angle vector. Missing trailing entries are
    /// taken as zero, extra entries are ignored.
    pub fn compute_angles(&self, angles: &[f64]) -> Result<PoseReport, KinematicsError> {
        let angles = self.padded(angles);
        let base_in_camera = self.chain.evaluate(&angles)?;
        let root_relative = self.segment_poses(&angles);

        let mut report = PoseReport::default();
        let camera_from_root = self.pose_of(&root_relative, self.chain.base())
            .map(|root_to_base| base_in_camera * root_to_base.inverse());

        let mut solved: HashMap<&str, Pose> = HashMap::new();
        for segment in self.binding.segments() {
            let pose = camera_from_root.clone()
                .map_err(|err| solve_error(segment, &format!("no camera reference, {}", err)))
                .and_then(|camera_from_root| {
                    let pose = camera_from_root * self.pose_of(&root_relative, segment)?;
                    if is_valid_pose(&pose) {
                        Ok(pose)
                    } else {
                        Err(solve_error(segment, "camera frame pose is not finite"))
                    }
                });
            match pose {
                Ok(pose) => {
                    solved.insert(segment, pose);
                }
                Err(err) => {
                    warn!("Pose of segment {} omitted: {}", segment, err);
                    report.warnings.push(StateWarning::SegmentOmitted(err));
                }
            }
        }

        for link in self.binding.links() {
            if let Some(pose) = self.binding.segment_of(link).and_then(|segment| solved.get(segment)) {
                report.poses.insert(link.to_string(), *pose);
            }
        }

        debug!("Computed {} link poses, {} warnings", report.poses.len(), report.warnings.len());
        Ok(report)
    }

    /// Root-relative poses of all segments, in canonical order, computed in one top-down
    /// pass. Each entry is `Err` if the segment cannot be solved (its joint has no index,
    /// the pose is not finite, or the same holds for an ancestor).
    pub fn segment_poses(&self, angles: &[f64]) -> Vec<Result<Pose, KinematicsError>> {
        let mut poses: Vec<Result<Pose, KinematicsError>> = Vec::with_capacity(self.tree.len());

        for (i, segment) in self.tree.segments().enumerate() {
            let parent_pose = match self.tree.parent_position(i) {
                Some(parent) => match &poses[parent] {
                    Ok(pose) => Ok(*pose),
                    Err(_) => Err(solve_error(&segment.name, &format!(
                        "parent segment {} is not solved",
                        self.tree.segment_at(parent).name))),
                },
                None => Ok(Pose::identity()),
            };

            let q = match (segment.actuated_joint(), self.dof_of_segment[i]) {
                (Some(_), Some(index)) => Ok(angles.get(index).copied().unwrap_or(0.0)),
                (Some(joint), None) => Err(solve_error(&segment.name, &format!(
                    "joint {} has no DOF index", joint.name))),
                (None, _) => Ok(0.0),
            };

            let pose = parent_pose.and_then(|parent_pose| {
                let pose = parent_pose * segment.local_transform(q?);
                if is_valid_pose(&pose) {
                    Ok(pose)
                } else {
                    Err(solve_error(&segment.name, "pose is not finite"))
                }
            });
            poses.push(pose);
        }
        poses
    }

    fn pose_of(&self, poses: &[Result<Pose, KinematicsError>], segment: &str)
               -> Result<Pose, KinematicsError> {
        let position = self.tree.position(segment)
            .ok_or_else(|| solve_error(segment, "segment is not part of the kinematic tree"))?;
        poses[position].clone()
    }

    fn padded(&self, angles: &[f64]) -> JointAngles {
        let mut padded = self.index.zero_angles();
        for (slot, angle) in padded.iter_mut().zip(angles.iter()) {
            *slot = *angle;
        }
        padded
    }
}

fn solve_error(segment: &str, reason: &str) -> KinematicsError {
    KinematicsError::KinematicSolve {
        segment: segment.to_string(),
        reason: reason.to_string(),
    }
}
