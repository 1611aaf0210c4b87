//! Keeps the most recent link poses of a robot between joint state updates.

use nalgebra::{UnitQuaternion, Vector3};
use crate::forward_kinematics::{ForwardKinematicsEngine, PoseReport};
use crate::kinematic_traits::{JointState, Pose};
use crate::kinematics_error::KinematicsError;

/// Stateful front of a `ForwardKinematicsEngine`. Each update recomputes everything from
/// the supplied angles alone; only the result is kept for later queries.
#[derive(Debug, Clone)]
pub struct PoseTracker {
    engine: ForwardKinematicsEngine,
    last: Option<PoseReport>,
}

impl PoseTracker {
    pub fn new(engine: ForwardKinematicsEngine) -> Self {
        PoseTracker { engine, last: None }
    }

    pub fn engine(&self) -> &ForwardKinematicsEngine {
        &self.engine
    }

    /// Recompute poses for the given joint angles and keep the result. If the computation
    /// fails, the previous result is dropped as well.
    pub fn update<N: AsRef<str>>(&mut self, named_angles: impl IntoIterator<Item = (N, f64)>)
                                 -> Result<&PoseReport, KinematicsError> {
        self.last = None;
        let report = self.engine.compute(named_angles)?;
        Ok(&*self.last.insert(report))
    }

    pub fn update_joint_state(&mut self, state: &JointState) -> Result<&PoseReport, KinematicsError> {
        self.update(state.pairs())
    }

    /// Result of the last successful update.
    pub fn last(&self) -> Option<&PoseReport> {
        self.last.as_ref()
    }

    pub fn link_pose(&self, link: &str) -> Option<&Pose> {
        self.last.as_ref()?.poses.get(link)
    }

    /// Position of the link in the camera frame.
    pub fn link_position(&self, link: &str) -> Option<Vector3<f64>> {
        self.link_pose(link).map(|pose| pose.translation.vector)
    }

    /// Orientation of the link in the camera frame.
    pub fn link_orientation(&self, link: &str) -> Option<UnitQuaternion<f64>> {
        self.link_pose(link).map(|pose| pose.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameConfig;
    use crate::description::{JointData, JointLimits, LinkData, Origin, RobotDescription};

    fn tracker() -> PoseTracker {
        let description = RobotDescription::new("slider")
            .with_link(LinkData::new("base"))
            .with_link(LinkData::with_mesh("carriage", "carriage.stl"))
            .with_joint(JointData::prismatic("slide", "base", "carriage", Origin::default(),
                                             [1.0, 0.0, 0.0], JointLimits::new(0.0, 1.0)));
        let engine = ForwardKinematicsEngine::new(&description, &FrameConfig::new("base", "base")).unwrap();
        PoseTracker::new(engine)
    }

    #[test]
    fn test_updates_do_not_carry_over() {
        let mut tracker = tracker();
        assert!(tracker.last().is_none());
        assert!(tracker.link_pose("carriage").is_none());

        tracker.update([("slide", 0.4)]).unwrap();
        assert_eq!(tracker.link_position("carriage"), Some(Vector3::new(0.4, 0.0, 0.0)));

        // The carriage returns to zero when the next update does not mention it.
        tracker.update_joint_state(&JointState::new([("other", 1.0)])).unwrap();
        assert_eq!(tracker.link_position("carriage"), Some(Vector3::zeros()));
        assert_eq!(tracker.last().unwrap().unknown_joints(), vec!["other"]);
        assert_eq!(tracker.link_orientation("carriage"), Some(UnitQuaternion::identity()));
    }
}
