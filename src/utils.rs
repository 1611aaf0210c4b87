//! Helper functions

use nalgebra::{Isometry3, UnitQuaternion};

/// Checks if all components of the pose (translation and rotation quaternion) are finite.
pub fn is_valid_pose(pose: &Isometry3<f64>) -> bool {
    pose.translation.vector.iter().all(|v| v.is_finite())
        && pose.rotation.coords.iter().all(|v| v.is_finite())
}

/// Translation and rotation quaternion of the pose as a single line of text.
pub fn format_pose(isometry: &Isometry3<f64>) -> String {
    let translation = isometry.translation.vector;
    let rotation: UnitQuaternion<f64> = isometry.rotation;
    format!(
        "x: {:.5}, y: {:.5}, z: {:.5},  quat: {:.5},{:.5},{:.5},{:.5}",
        translation.x, translation.y, translation.z, rotation.i, rotation.j, rotation.k, rotation.w
    )
}

pub fn dump_pose(isometry: &Isometry3<f64>) {
    println!("{}", format_pose(isometry));
}

/// Allows to specify joint values in degrees (converts to radians)
pub fn as_radians<N>(degrees: impl IntoIterator<Item = (N, f64)>) -> Vec<(N, f64)> {
    degrees.into_iter()
        .map(|(name, value)| (name, value.to_radians()))
        .collect()
}

pub fn assert_pose_eq(ta: &Isometry3<f64>, tb: &Isometry3<f64>,
                      distance_tolerance: f64, angular_tolerance: f64) -> bool {
    fn bad(ta: &Isometry3<f64>, tb: &Isometry3<f64>) {
        dump_pose(ta);
        dump_pose(tb);
    }

    let translation_distance = (ta.translation.vector - tb.translation.vector).norm();
    let angular_distance = ta.rotation.angle_to(&tb.rotation);

    if translation_distance.abs() > distance_tolerance {
        bad(ta, tb);
        panic!("Poses have too different translations");
    }

    if angular_distance.abs() > angular_tolerance {
        bad(ta, tb);
        panic!("Poses have too different angles");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, Vector3};

    #[test]
    fn test_is_valid_with_all_finite() {
        let pose = Isometry3::from_parts(Translation3::new(1.0, -2.0, 0.5),
                                         UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.3));
        assert!(is_valid_pose(&pose));
    }

    #[test]
    fn test_is_valid_with_nan() {
        let pose = Isometry3::from_parts(Translation3::new(0.0, f64::NAN, 0.0),
                                         UnitQuaternion::identity());
        assert!(!is_valid_pose(&pose));
    }

    #[test]
    fn test_as_radians() {
        let converted = as_radians([("pan", 180.0), ("tilt", -90.0)]);
        assert_eq!(converted[0].0, "pan");
        assert!((converted[0].1 - std::f64::consts::PI).abs() < 1e-12);
        assert!((converted[1].1 + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_format_pose() {
        assert_eq!(format_pose(&Isometry3::identity()),
                   "x: 0.00000, y: 0.00000, z: 0.00000,  quat: 0.00000,0.00000,0.00000,1.00000");
    }
}
