//! Errors and warnings of the kinematic core

use std::fmt;

/// Failures of the kinematic core. `MalformedTree`, `NotFound` and `NoChain` are reported
/// while the model is being built; `ChainJointMissing` means the tree and the joint index
/// disagree (a construction bug). `KinematicSolve` concerns a single segment and is
/// normally carried as `StateWarning::SegmentOmitted` rather than returned.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    MalformedTree(String),
    NotFound(String),
    NoChain { base: String, camera: String, reason: String },
    ChainJointMissing(String),
    KinematicSolve { segment: String, reason: String },
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            KinematicsError::MalformedTree(ref msg) =>
                write!(f, "Malformed kinematic tree: {}", msg),
            KinematicsError::NotFound(ref name) =>
                write!(f, "Segment not found: {}", name),
            KinematicsError::NoChain { ref base, ref camera, ref reason } =>
                write!(f, "No chain from {} to {}: {}", camera, base, reason),
            KinematicsError::ChainJointMissing(ref joint) =>
                write!(f, "Joint {} of the camera chain has no DOF index", joint),
            KinematicsError::KinematicSolve { ref segment, ref reason } =>
                write!(f, "Cannot solve pose of segment {}: {}", segment, reason),
        }
    }
}

impl std::error::Error for KinematicsError {}

/// Recoverable problems of a single `compute` call. The call still returns its best
/// effort result, these are delivered alongside it.
#[derive(Debug, Clone, PartialEq)]
pub enum StateWarning {
    /// The caller supplied an angle for a joint this model does not have. The value was dropped.
    UnknownJoint(String),
    /// The pose of this segment could not be computed; links bound to it are missing from the result.
    SegmentOmitted(KinematicsError),
}

impl fmt::Display for StateWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StateWarning::UnknownJoint(name) => write!(f, "No joint index for {}", name),
            StateWarning::SegmentOmitted(err) => write!(f, "Omitted: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = KinematicsError::NoChain {
            base: "BASE".into(),
            camera: "XTION".into(),
            reason: "frames lie in different branches".into(),
        };
        assert_eq!(e.to_string(), "No chain from XTION to BASE: frames lie in different branches");

        let w = StateWarning::UnknownJoint("left_wheel".into());
        assert_eq!(w.to_string(), "No joint index for left_wheel");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_error_is_send_sync() {
        assert_send_sync::<KinematicsError>();
        assert_send_sync::<StateWarning>();
    }
}
