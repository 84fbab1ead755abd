use nalgebra as na;

/// Controller motion between two accepted samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseDelta {
    pub translation: na::Vector3<f64>,
    pub rotation: na::UnitQuaternion<f64>,
}

impl PoseDelta {
    pub fn identity() -> PoseDelta {
        PoseDelta {
            translation: na::Vector3::zeros(),
            rotation: na::UnitQuaternion::identity(),
        }
    }
}

impl Default for PoseDelta {
    fn default() -> Self {
        PoseDelta::identity()
    }
}

/// Incremental controller motion relative to the frame captured at the last reset
#[derive(Debug, Clone)]
pub struct DeltaPoseTracker {
    initialized: bool,
    controller_last_pose: na::Isometry3<f64>,
    controller_frame_diff_rotation: na::UnitQuaternion<f64>,
}

impl Default for DeltaPoseTracker {
    fn default() -> Self {
        DeltaPoseTracker::new()
    }
}

impl DeltaPoseTracker {
    pub fn new() -> DeltaPoseTracker {
        DeltaPoseTracker {
            initialized: false,
            controller_last_pose: na::Isometry3::identity(),
            controller_frame_diff_rotation: na::UnitQuaternion::identity(),
        }
    }

    /// True until the first reset anchored the controller frame
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn controller_last_pose(&self) -> &na::Isometry3<f64> {
        &self.controller_last_pose
    }

    pub fn controller_frame_diff_rotation(&self) -> &na::UnitQuaternion<f64> {
        &self.controller_frame_diff_rotation
    }

    /// Re-anchor the tracking frame at the given controller pose
    pub fn reset(&mut self, controller_pose: &na::Isometry3<f64>) {
        self.controller_frame_diff_rotation = controller_pose.rotation;
        self.controller_last_pose = *controller_pose;
        self.initialized = true;
    }

    /// Motion since the previous sample
    ///
    /// A reset, explicit or because the tracker was never anchored, yields
    /// the identity delta. Translation is expressed through the rotation
    /// captured at the last reset while rotation is `current⁻¹ · previous`.
    /// The next delta is always computed from this sample.
    pub fn track(&mut self, controller_pose: &na::Isometry3<f64>, reset: bool) -> PoseDelta {
        if reset || !self.initialized {
            self.reset(controller_pose);
            return PoseDelta::identity();
        }
        let displacement =
            controller_pose.translation.vector - self.controller_last_pose.translation.vector;
        let delta = PoseDelta {
            translation: self.controller_frame_diff_rotation * displacement,
            rotation: controller_pose.rotation.inverse() * self.controller_last_pose.rotation,
        };
        self.controller_last_pose = *controller_pose;
        delta
    }
}
