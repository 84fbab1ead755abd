use crate::joints::{joint_distance, JointVector};

/// Largest joint space step allowed in one command, radians
pub const DEFAULT_SAFETY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateVerdict {
    Accepted { distance: f64 },
    Rejected { distance: f64 },
}

impl GateVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateVerdict::Accepted { .. })
    }

    pub fn distance(&self) -> f64 {
        match self {
            GateVerdict::Accepted { distance } | GateVerdict::Rejected { distance } => *distance,
        }
    }
}

/// Rejects commands that would jump too far from the measured joint state
///
/// This catches solver discontinuities. It does not limit velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyGate {
    threshold: f64,
}

impl Default for SafetyGate {
    fn default() -> Self {
        SafetyGate::new(DEFAULT_SAFETY_THRESHOLD)
    }
}

impl SafetyGate {
    pub fn new(threshold: f64) -> SafetyGate {
        SafetyGate { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Strictly below the threshold passes, anything else including NaN fails
    pub fn check(&self, candidate: &JointVector, measured: &JointVector) -> GateVerdict {
        let distance = joint_distance(candidate, measured);
        if distance < self.threshold {
            GateVerdict::Accepted { distance }
        } else {
            GateVerdict::Rejected { distance }
        }
    }
}
