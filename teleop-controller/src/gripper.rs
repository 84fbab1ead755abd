use serde::{Deserialize, Serialize};

pub const GRIPPER_SPEED: f64 = 1.0;
pub const GRIPPER_FORCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub position: f64,
    pub speed: f64,
    pub force: f64,
}

impl ActuatorCommand {
    pub fn new(position: f64) -> ActuatorCommand {
        ActuatorCommand {
            position,
            speed: GRIPPER_SPEED,
            force: GRIPPER_FORCE,
        }
    }
}

/// Three finger gripper command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GripperCommand {
    pub scissor: ActuatorCommand,
    pub finger_a: ActuatorCommand,
    pub finger_b: ActuatorCommand,
    pub finger_c: ActuatorCommand,
}

impl GripperCommand {
    /// Drive the scissor and all fingers to the same position
    /// 0.0 is fully open
    /// 1.0 is fully closed
    pub fn from_closed_fraction(closed: f64) -> GripperCommand {
        let actuator = ActuatorCommand::new(clamp_fraction(closed));
        GripperCommand {
            scissor: actuator,
            finger_a: actuator,
            finger_b: actuator,
            finger_c: actuator,
        }
    }

    pub fn fingers(&self) -> [f64; 3] {
        [
            self.finger_a.position,
            self.finger_b.position,
            self.finger_c.position,
        ]
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.min(1.0).max(0.0)
}
