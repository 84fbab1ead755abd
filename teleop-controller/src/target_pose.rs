use crate::pose_tracker::PoseDelta;
use nalgebra as na;

/// Advance the last valid end effector pose by the tracked controller delta
///
/// Translation is added in the arm base frame, rotation is applied on the left.
pub fn compose_target(
    ee_last_valid_pose: &na::Isometry3<f64>,
    delta: &PoseDelta,
) -> na::Isometry3<f64> {
    let translation = ee_last_valid_pose.translation.vector + delta.translation;
    let rotation = delta.rotation * ee_last_valid_pose.rotation;
    na::Isometry3::from_parts(translation.into(), rotation)
}
