use nalgebra as na;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BUTTON_COUNT: usize = 4;
pub const AXIS_COUNT: usize = 3;

/// Bit positions of the four reported buttons in the tracking runtime's masks
/// (application menu, grip, touchpad, trigger)
pub const BUTTON_BITS: [u32; BUTTON_COUNT] = [1, 2, 32, 33];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("orientation quaternion has zero length")]
    DegenerateOrientation,
    #[error("pose contains a non finite value")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    #[default]
    Released,
    Touched,
    Pressed,
}

impl ButtonState {
    /// Decode one button from the runtime's pressed/touched bit masks
    ///
    /// Pressed wins over touched.
    pub fn from_masks(pressed_mask: u64, touched_mask: u64, bit: u32) -> ButtonState {
        let mask = 1_u64 << bit;
        if pressed_mask & mask != 0 {
            ButtonState::Pressed
        } else if touched_mask & mask != 0 {
            ButtonState::Touched
        } else {
            ButtonState::Released
        }
    }

    pub fn is_pressed(self) -> bool {
        self == ButtonState::Pressed
    }
}

/// Pose as it travels on the wire
///
/// Orientation is a quaternion stored as `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirePose {
    pub position: [f64; 3],
    pub orientation: [f64; 4],
}

impl WirePose {
    pub fn identity() -> WirePose {
        WirePose {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Convert into a rigid transform, normalising the quaternion
    pub fn to_isometry(&self) -> Result<na::Isometry3<f64>, SampleError> {
        if self
            .position
            .iter()
            .chain(self.orientation.iter())
            .any(|value| !value.is_finite())
        {
            return Err(SampleError::NonFinite);
        }
        let [x, y, z, w] = self.orientation;
        let quaternion = na::Quaternion::new(w, x, y, z);
        let rotation = na::UnitQuaternion::try_new(quaternion, f64::EPSILON)
            .ok_or(SampleError::DegenerateOrientation)?;
        let [px, py, pz] = self.position;
        Ok(na::Isometry3::from_parts(na::Translation3::new(px, py, pz), rotation))
    }

    pub fn from_isometry(pose: &na::Isometry3<f64>) -> WirePose {
        let translation = pose.translation.vector;
        let quaternion = pose.rotation.quaternion();
        WirePose {
            position: [translation.x, translation.y, translation.z],
            orientation: [quaternion.i, quaternion.j, quaternion.k, quaternion.w],
        }
    }
}

/// Controller sample as it travels on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSample {
    pub id: u32,
    pub pose: WirePose,
    pub buttons: [ButtonState; BUTTON_COUNT],
    pub axes: [f64; AXIS_COUNT],
}

/// One tracked hand controller reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireSample", into = "WireSample")]
pub struct ControllerSample {
    pub id: u32,
    pub pose: na::Isometry3<f64>,
    pub buttons: [ButtonState; BUTTON_COUNT],
    pub axes: [f64; AXIS_COUNT],
}

impl ControllerSample {
    pub fn new(
        id: u32,
        pose: na::Isometry3<f64>,
        buttons: [ButtonState; BUTTON_COUNT],
        axes: [f64; AXIS_COUNT],
    ) -> ControllerSample {
        ControllerSample {
            id,
            pose,
            buttons,
            axes,
        }
    }

    pub fn from_wire(
        id: u32,
        pose: &WirePose,
        buttons: [ButtonState; BUTTON_COUNT],
        axes: [f64; AXIS_COUNT],
    ) -> Result<ControllerSample, SampleError> {
        Ok(ControllerSample::new(id, pose.to_isometry()?, buttons, axes))
    }

    /// Out of range indices read as released
    pub fn button(&self, index: usize) -> ButtonState {
        self.buttons.get(index).copied().unwrap_or_default()
    }

    /// Out of range indices read as zero
    pub fn axis(&self, index: usize) -> f64 {
        self.axes.get(index).copied().unwrap_or_default()
    }
}

impl TryFrom<WireSample> for ControllerSample {
    type Error = SampleError;

    fn try_from(wire: WireSample) -> Result<Self, Self::Error> {
        ControllerSample::from_wire(wire.id, &wire.pose, wire.buttons, wire.axes)
    }
}

impl From<ControllerSample> for WireSample {
    fn from(sample: ControllerSample) -> Self {
        WireSample {
            id: sample.id,
            pose: WirePose::from_isometry(&sample.pose),
            buttons: sample.buttons,
            axes: sample.axes,
        }
    }
}
