//! The kinematic tree: rigid segments connected by joints, built once from a
//! `RobotDescription` and immutable afterwards.
//!
//! Every link of the description becomes a segment of the same name. The joint that has
//! the link as its child becomes the segment's joint, and the joint origin becomes the
//! fixed offset from the parent segment frame. Segments are stored in the canonical
//! traversal order: depth first, parent before children, siblings sorted by name. The
//! joint index and the forward kinematics rely on this order, and because it depends
//! only on names, the declaration order in the description does not matter.

use std::collections::{HashMap, HashSet};
use nalgebra::{Translation3, Unit, UnitQuaternion, Vector3};
use crate::description::{JointData, JointLimits, JointType, LinkData, RobotDescription};
use crate::kinematic_traits::Pose;
use crate::kinematics_error::KinematicsError;

/// Axis shorter than this is treated as not given at all.
const MIN_AXIS_NORM: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub joint_type: JointType,
    /// Unit motion axis in the joint frame.
    pub axis: Unit<Vector3<f64>>,
    /// Present for all joint types except Fixed.
    pub limits: Option<JointLimits>,
}

impl Joint {
    /// Motion of the joint for the given position: rotation about the axis for revolute and
    /// continuous joints, translation along it for prismatic, identity for fixed.
    pub fn transform(&self, q: f64) -> Pose {
        match self.joint_type {
            JointType::Revolute | JointType::Continuous => Pose::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&self.axis, q),
            ),
            JointType::Prismatic => Pose::from_parts(
                Translation3::from(self.axis.into_inner() * q),
                UnitQuaternion::identity(),
            ),
            JointType::Fixed => Pose::identity(),
        }
    }

    pub fn is_actuated(&self) -> bool {
        self.joint_type.is_actuated()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub name: String,
    /// The joint connecting this segment to its parent. The root has none.
    pub joint: Option<Joint>,
    /// Fixed transform from the parent segment frame to this segment's joint frame.
    pub offset: Pose,
    pub parent: Option<String>,
    /// Child segment names, sorted.
    pub children: Vec<String>,
}

impl Segment {
    /// Transform from the parent segment frame to this segment frame for the given joint
    /// position. The position is ignored if the segment has no actuated joint.
    pub fn local_transform(&self, q: f64) -> Pose {
        match &self.joint {
            Some(joint) => self.offset * joint.transform(q),
            None => self.offset,
        }
    }

    /// The actuated joint of this segment, if any.
    pub fn actuated_joint(&self) -> Option<&Joint> {
        self.joint.as_ref().filter(|joint| joint.is_actuated())
    }
}

#[derive(Debug, Clone)]
pub struct KinematicTree {
    /// Segments in canonical order, the root first.
    segments: Vec<Segment>,
    by_name: HashMap<String, usize>,
    dof: usize,
}

impl KinematicTree {
    /// Build the tree, validating the description.
    ///
    /// # Errors
    /// `KinematicsError::MalformedTree` if link or joint names repeat, a joint refers to a
    /// link that does not exist, a link has more than one parent, there is not exactly one
    /// root, some links are not reachable from the root, a revolute or prismatic joint has
    /// no limits, or a movable joint has no usable axis.
    pub fn new(description: &RobotDescription) -> Result<Self, KinematicsError> {
        let malformed = |msg: String| KinematicsError::MalformedTree(msg);

        let mut links: HashMap<&str, &LinkData> = HashMap::new();
        for link in &description.links {
            if links.insert(link.name.as_str(), link).is_some() {
                return Err(malformed(format!("link {} defined more than once", link.name)));
            }
        }

        let mut joint_names = HashSet::new();
        let mut parent_joint: HashMap<&str, &JointData> = HashMap::new();
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();

        for joint in &description.joints {
            if !joint_names.insert(joint.name.as_str()) {
                return Err(malformed(format!(
                    "joint {} defined more than once, its DOF slot would be assigned twice",
                    joint.name)));
            }
            for link in [&joint.parent, &joint.child] {
                if !links.contains_key(link.as_str()) {
                    return Err(malformed(format!(
                        "joint {} refers to link {} that is not defined", joint.name, link)));
                }
            }
            if joint.parent == joint.child {
                return Err(malformed(format!("joint {} connects link {} to itself",
                                             joint.name, joint.child)));
            }
            if let Some(other) = parent_joint.insert(joint.child.as_str(), joint) {
                return Err(malformed(format!("link {} is the child of both {} and {}",
                                             joint.child, other.name, joint.name)));
            }
            children.entry(joint.parent.as_str()).or_default().push(joint.child.as_str());
        }

        let roots: Vec<&str> = description.links.iter()
            .map(|link| link.name.as_str())
            .filter(|name| !parent_joint.contains_key(name))
            .collect();
        let root = match roots.as_slice() {
            [root] => *root,
            [] => return Err(malformed("no root link, the hierarchy is cyclic".into())),
            _ => return Err(malformed(format!("more than one root link: {}", roots.join(", ")))),
        };

        for list in children.values_mut() {
            list.sort_unstable();
        }

        let mut segments = Vec::with_capacity(description.links.len());
        let mut by_name = HashMap::with_capacity(description.links.len());
        let mut dof = 0;
        let mut stack = vec![root];

        while let Some(name) = stack.pop() {
            let (joint, offset) = match parent_joint.get(name) {
                Some(data) => (Some(Self::joint_from(data)?), data.origin.to_pose()),
                None => (None, Pose::identity()),
            };
            if joint.as_ref().is_some_and(Joint::is_actuated) {
                dof += 1;
            }
            let kids: Vec<&str> = children.get(name).cloned().unwrap_or_default();
            // Reversed so that the alphabetically first child is visited first.
            stack.extend(kids.iter().rev());

            by_name.insert(name.to_string(), segments.len());
            segments.push(Segment {
                name: name.to_string(),
                joint,
                offset,
                parent: parent_joint.get(name).map(|data| data.parent.clone()),
                children: kids.into_iter().map(String::from).collect(),
            });
        }

        if segments.len() != description.links.len() {
            let unreachable: Vec<&str> = description.links.iter()
                .map(|link| link.name.as_str())
                .filter(|name| !by_name.contains_key(*name))
                .collect();
            return Err(malformed(format!("links not reachable from root {}: {}",
                                         root, unreachable.join(", "))));
        }

        Ok(KinematicTree { segments, by_name, dof })
    }

    fn joint_from(data: &JointData) -> Result<Joint, KinematicsError> {
        let axis_vector = Vector3::new(data.axis[0], data.axis[1], data.axis[2]);
        let axis = if data.joint_type.is_actuated() {
            Unit::try_new(axis_vector, MIN_AXIS_NORM)
                .filter(|axis| axis.iter().all(|c| c.is_finite()))
                .ok_or_else(|| KinematicsError::MalformedTree(
                    format!("joint {} has no usable axis {:?}", data.name, data.axis)))?
        } else {
            Vector3::x_axis()
        };

        let limits = match data.joint_type {
            JointType::Fixed => None,
            JointType::Continuous => Some(data.limits.unwrap_or_else(JointLimits::unbounded)),
            JointType::Revolute | JointType::Prismatic => Some(data.limits.ok_or_else(||
                KinematicsError::MalformedTree(format!("joint {} has no limits", data.name)))?),
        };

        Ok(Joint {
            name: data.name.clone(),
            joint_type: data.joint_type,
            axis,
            limits,
        })
    }

    /// # Errors
    /// `KinematicsError::NotFound` if there is no such segment.
    pub fn segment_by_name(&self, name: &str) -> Result<&Segment, KinematicsError> {
        self.position(name)
            .map(|i| &self.segments[i])
            .ok_or_else(|| KinematicsError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn root(&self) -> &Segment {
        &self.segments[0]
    }

    /// Number of actuated (non-fixed) joints.
    pub fn dof_count(&self) -> usize {
        self.dof
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All segments in canonical order, parents before their children.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn parent_of(&self, name: &str) -> Option<&Segment> {
        let parent = self.segment_by_name(name).ok()?.parent.as_deref()?;
        self.segment_by_name(parent).ok()
    }

    /// Segments from the named one up to the root, both inclusive, innermost first.
    ///
    /// # Errors
    /// `KinematicsError::NotFound` if there is no such segment.
    pub fn path_to_root(&self, name: &str) -> Result<Vec<&Segment>, KinematicsError> {
        let mut path = vec![self.segment_by_name(name)?];
        while let Some(parent) = path.last().and_then(|s| s.parent.as_deref()) {
            path.push(self.segment_by_name(parent)?);
        }
        Ok(path)
    }

    /// Ancestors of the named segment, from its parent up to the root.
    ///
    /// # Errors
    /// `KinematicsError::NotFound` if there is no such segment.
    pub fn ancestors(&self, name: &str) -> Result<Vec<&Segment>, KinematicsError> {
        let mut path = self.path_to_root(name)?;
        path.remove(0);
        Ok(path)
    }

    /// Position of the segment in canonical order.
    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Position of the parent segment in canonical order, always smaller than `index`.
    pub(crate) fn parent_position(&self, index: usize) -> Option<usize> {
        self.segments[index].parent.as_deref().and_then(|parent| self.position(parent))
    }

    pub(crate) fn segment_at(&self, index: usize) -> &Segment {
        &self.segments[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{JointData, LinkData, Origin};
    use std::f64::consts::FRAC_PI_2;

    fn limits() -> JointLimits {
        JointLimits::new(-1.0, 1.0)
    }

    fn two_branches() -> RobotDescription {
        RobotDescription::new("robot")
            .with_link(LinkData::new("base"))
            .with_link(LinkData::new("right"))
            .with_link(LinkData::new("left"))
            .with_link(LinkData::new("left_tip"))
            .with_joint(JointData::revolute("right_joint", "base", "right",
                                            Origin::default(), [0.0, 0.0, 1.0], limits()))
            .with_joint(JointData::revolute("left_joint", "base", "left",
                                            Origin::default(), [0.0, 0.0, 1.0], limits()))
            .with_joint(JointData::fixed("left_tip_joint", "left", "left_tip",
                                         Origin::translation(0.1, 0.0, 0.0)))
    }

    #[test]
    fn test_canonical_order() {
        let tree = KinematicTree::new(&two_branches()).expect("valid tree");
        let names: Vec<&str> = tree.segments().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["base", "left", "left_tip", "right"]);
        assert_eq!(tree.root().name, "base");
        assert_eq!(tree.dof_count(), 2);
        assert_eq!(tree.root().children, vec!["left".to_string(), "right".to_string()]);
    }

    #[test]
    fn test_lookup() {
        let tree = KinematicTree::new(&two_branches()).unwrap();
        assert_eq!(tree.parent_of("left_tip").unwrap().name, "left");
        assert!(tree.parent_of("base").is_none());
        assert_eq!(tree.segment_by_name("nothing"),
                   Err(KinematicsError::NotFound("nothing".into())));

        let path: Vec<&str> = tree.path_to_root("left_tip").unwrap()
            .iter().map(|s| s.name.as_str()).collect();
        assert_eq!(path, vec!["left_tip", "left", "base"]);
        let ancestors: Vec<&str> = tree.ancestors("left_tip").unwrap()
            .iter().map(|s| s.name.as_str()).collect();
        assert_eq!(ancestors, vec!["left", "base"]);
        assert!(tree.ancestors("base").unwrap().is_empty());
    }

    #[test]
    fn test_two_roots() {
        let description = two_branches().with_link(LinkData::new("floating"));
        assert!(matches!(KinematicTree::new(&description), Err(KinematicsError::MalformedTree(_))));
    }

    #[test]
    fn test_cycle() {
        let description = two_branches()
            .with_link(LinkData::new("a"))
            .with_link(LinkData::new("b"))
            .with_joint(JointData::fixed("ab", "a", "b", Origin::default()))
            .with_joint(JointData::fixed("ba", "b", "a", Origin::default()));
        let err = KinematicTree::new(&description).unwrap_err();
        assert!(err.to_string().contains("not reachable"), "{}", err);
    }

    #[test]
    fn test_missing_link() {
        let description = two_branches()
            .with_joint(JointData::fixed("dangling", "left", "ghost", Origin::default()));
        assert!(matches!(KinematicTree::new(&description), Err(KinematicsError::MalformedTree(_))));
    }

    #[test]
    fn test_duplicate_joint_name() {
        let description = two_branches()
            .with_link(LinkData::new("extra"))
            .with_joint(JointData::revolute("left_joint", "right", "extra",
                                            Origin::default(), [0.0, 0.0, 1.0], limits()));
        let err = KinematicTree::new(&description).unwrap_err();
        assert!(err.to_string().contains("DOF slot"), "{}", err);
    }

    #[test]
    fn test_revolute_requires_limits() {
        let mut joint = JointData::revolute("j", "base", "extra",
                                            Origin::default(), [0.0, 0.0, 1.0], limits());
        joint.limits = None;
        let description = two_branches().with_link(LinkData::new("extra")).with_joint(joint);
        assert!(matches!(KinematicTree::new(&description), Err(KinematicsError::MalformedTree(_))));
    }

    #[test]
    fn test_zero_axis() {
        let description = two_branches()
            .with_link(LinkData::new("extra"))
            .with_joint(JointData::continuous("j", "base", "extra", Origin::default(), [0.0; 3]));
        assert!(matches!(KinematicTree::new(&description), Err(KinematicsError::MalformedTree(_))));
    }

    #[test]
    fn test_joint_transforms() {
        let tree = KinematicTree::new(&two_branches()).unwrap();
        let left = tree.segment_by_name("left").unwrap();
        let pose = left.local_transform(FRAC_PI_2);
        let x = pose.rotation * Vector3::x();
        assert!((x - Vector3::y()).norm() < 1e-12);

        let prismatic = Joint {
            name: "slide".into(),
            joint_type: JointType::Prismatic,
            axis: Unit::new_normalize(Vector3::new(0.0, 0.0, 2.0)),
            limits: Some(limits()),
        };
        assert_eq!(prismatic.transform(0.5).translation.vector, Vector3::new(0.0, 0.0, 0.5));

        let tip = tree.segment_by_name("left_tip").unwrap();
        assert!(tip.actuated_joint().is_none());
        assert_eq!(tip.local_transform(123.0).translation.vector, Vector3::new(0.1, 0.0, 0.0));
    }
}
