//! Mapping between actuated joint names and their positions (DOF indices) in the dense
//! joint angle vector.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use crate::description::{JointLimits, JointType};
use crate::kinematic_traits::JointAngles;
use crate::kinematics_error::StateWarning;
use crate::tree::KinematicTree;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedJoint {
    pub name: String,
    pub joint_type: JointType,
    pub limits: JointLimits,
}

/// Actuated joints of a tree in DOF order. Index `i` is the position of the joint's angle
/// in every `JointAngles` vector built for this tree.
#[derive(Debug, Clone)]
pub struct JointIndex {
    joints: Vec<IndexedJoint>,
    by_name: HashMap<String, usize>,
}

impl JointIndex {
    /// Assign indices in the canonical segment order of the tree.
    pub fn new(tree: &KinematicTree) -> Self {
        let mut joints = Vec::with_capacity(tree.dof_count());
        let mut by_name = HashMap::with_capacity(tree.dof_count());

        for joint in tree.segments().filter_map(|segment| segment.actuated_joint()) {
            by_name.insert(joint.name.clone(), joints.len());
            joints.push(IndexedJoint {
                name: joint.name.clone(),
                joint_type: joint.joint_type,
                limits: joint.limits.unwrap_or_else(JointLimits::unbounded),
            });
        }

        JointIndex { joints, by_name }
    }

    pub fn index_of(&self, joint_name: &str) -> Option<usize> {
        self.by_name.get(joint_name).copied()
    }

    pub fn limits_of(&self, joint_name: &str) -> Option<(f64, f64)> {
        self.index_of(joint_name)
            .map(|i| (self.joints[i].limits.lower, self.joints[i].limits.upper))
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.joints.get(index).map(|joint| joint.name.as_str())
    }

    pub fn size(&self) -> usize {
        self.joints.len()
    }

    pub fn joints(&self) -> &[IndexedJoint] {
        &self.joints
    }

    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.joints.iter().map(|joint| joint.name.as_str())
    }

    /// Angle vector of the reference configuration (all joints at zero).
    pub fn zero_angles(&self) -> JointAngles {
        vec![0.0; self.size()]
    }

    /// Convert named angles into the dense vector. Joints not mentioned stay at zero, the
    /// previous call has no influence. Every distinct name this index does not know produces
    /// one `StateWarning::UnknownJoint`, however often it repeats, and is otherwise ignored.
    /// If a known name is repeated, the last value wins.
    pub fn build_angle_vector<N: AsRef<str>>(&self, named_angles: impl IntoIterator<Item = (N, f64)>)
                                             -> (JointAngles, Vec<StateWarning>) {
        let mut angles = self.zero_angles();
        let mut warnings = Vec::new();
        let mut reported = HashSet::new();

        for (i, (name, angle)) in named_angles.into_iter().enumerate() {
            let name = name.as_ref();
            match self.index_of(name) {
                Some(index) => {
                    angles[index] = angle;
                    let limits = &self.joints[index].limits;
                    if !limits.contains(angle) {
                        debug!("Joint {} at {} is outside its limits [{}, {}]",
                               name, angle, limits.lower, limits.upper);
                    }
                }
                None if reported.insert(name.to_string()) => {
                    warn!("No joint index for {} (entry {})", name, i);
                    warnings.push(StateWarning::UnknownJoint(name.to_string()));
                }
                None => {}
            }
        }

        (angles, warnings)
    }

    /// Names of the joints whose values in `angles` are outside their limits. Limits are
    /// descriptive: nothing in this crate clamps or rejects such values.
    pub fn outside_limits(&self, angles: &[f64]) -> Vec<&str> {
        self.joints.iter()
            .zip(angles.iter())
            .filter(|(joint, angle)| !joint.limits.contains(**angle))
            .map(|(joint, _)| joint.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{JointData, LinkData, Origin, RobotDescription};

    fn arm() -> KinematicTree {
        let description = RobotDescription::new("arm")
            .with_link(LinkData::new("base"))
            .with_link(LinkData::new("shoulder"))
            .with_link(LinkData::new("flange"))
            .with_link(LinkData::new("elbow"))
            .with_joint(JointData::revolute("j1", "base", "shoulder", Origin::default(),
                                            [0.0, 0.0, 1.0], JointLimits::new(-3.0, 3.0)))
            .with_joint(JointData::prismatic("j2", "shoulder", "elbow", Origin::default(),
                                             [1.0, 0.0, 0.0], JointLimits::new(0.0, 0.5)))
            .with_joint(JointData::fixed("j3", "elbow", "flange", Origin::default()));
        KinematicTree::new(&description).expect("valid tree")
    }

    #[test]
    fn test_indices() {
        let index = JointIndex::new(&arm());
        assert_eq!(index.size(), 2);
        assert_eq!(index.index_of("j1"), Some(0));
        assert_eq!(index.index_of("j2"), Some(1));
        assert_eq!(index.index_of("j3"), None, "fixed joints take no index");
        assert_eq!(index.name_of(1), Some("j2"));
        assert_eq!(index.limits_of("j2"), Some((0.0, 0.5)));
        assert_eq!(index.limits_of("j3"), None);
    }

    #[test]
    fn test_build_angle_vector() {
        let index = JointIndex::new(&arm());
        let (angles, warnings) = index.build_angle_vector([("j2", 0.25), ("wheel", 1.0)]);
        assert_eq!(angles, vec![0.0, 0.25]);
        assert_eq!(warnings, vec![StateWarning::UnknownJoint("wheel".into())]);

        let (angles, warnings) = index.build_angle_vector(Vec::<(String, f64)>::new());
        assert_eq!(angles, vec![0.0, 0.0]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_repeated_unknown_name_warns_once() {
        let index = JointIndex::new(&arm());
        let (angles, warnings) = index.build_angle_vector(
            [("ghost", 1.0), ("j1", 0.5), ("ghost", 2.0), ("j1", 0.7)]);
        assert_eq!(angles, vec![0.7, 0.0]);
        assert_eq!(warnings, vec![StateWarning::UnknownJoint("ghost".into())]);
    }

    #[test]
    fn test_limits_are_not_enforced() {
        let index = JointIndex::new(&arm());
        let (angles, _) = index.build_angle_vector([("j1", 4.0), ("j2", 0.1)]);
        assert_eq!(angles, vec![4.0, 0.1]);
        assert_eq!(index.outside_limits(&angles), vec!["j1"]);
    }
}
