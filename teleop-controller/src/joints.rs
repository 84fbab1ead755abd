use nalgebra as na;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Number of joints on one arm
pub const JOINT_COUNT: usize = 7;

/// Joint configuration in radians, in the robot's joint order
pub type JointVector = na::SVector<f64, JOINT_COUNT>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JointStateError {
    #[error("expected {expected} joint values but got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },
}

type Result<T> = std::result::Result<T, JointStateError>;

/// Builds a joint vector from untyped values
///
/// Any length other than [`JOINT_COUNT`] is refused.
/// Values are never truncated or padded.
pub fn joint_vector_from_slice(values: &[f64]) -> Result<JointVector> {
    if values.len() != JOINT_COUNT {
        return Err(JointStateError::JointCountMismatch {
            expected: JOINT_COUNT,
            actual: values.len(),
        });
    }
    Ok(JointVector::from_column_slice(values))
}

/// Euclidean distance between two joint configurations
pub fn joint_distance(a: &JointVector, b: &JointVector) -> f64 {
    (a - b).norm()
}

/// Position command for every joint of one arm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointCommand {
    pub joint_position: JointVector,
}

impl JointCommand {
    pub fn new(joint_position: JointVector) -> JointCommand {
        JointCommand { joint_position }
    }

    pub fn as_slice(&self) -> &[f64] {
        self.joint_position.as_slice()
    }
}

/// Last joint state reported by the arm
///
/// Cloned handles share the same storage so feedback can be written from
/// another thread. Writes replace the whole vector under the lock and
/// readers take a full copy, so a reader never sees half of an update.
#[derive(Debug, Clone)]
pub struct MeasuredJointState {
    joints: Arc<Mutex<JointVector>>,
}

impl MeasuredJointState {
    pub fn new(initial: JointVector) -> MeasuredJointState {
        MeasuredJointState {
            joints: Arc::new(Mutex::new(initial)),
        }
    }

    /// Apply a feedback message
    ///
    /// On a length mismatch the stored state is left untouched.
    pub fn update(&self, values: &[f64]) -> Result<()> {
        let joints = joint_vector_from_slice(values)?;
        self.set(joints);
        Ok(())
    }

    pub fn set(&self, joints: JointVector) {
        *self.joints.lock() = joints;
    }

    pub fn snapshot(&self) -> JointVector {
        *self.joints.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn slice_of_seven_is_accepted() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let joints = joint_vector_from_slice(&values).unwrap();
        assert_relative_eq!(joints[6], 6.0);
    }

    #[test]
    fn short_slice_is_refused() {
        let error = joint_vector_from_slice(&[0.0; 6]).unwrap_err();
        assert_eq!(
            error,
            JointStateError::JointCountMismatch {
                expected: 7,
                actual: 6
            }
        );
    }

    #[test]
    fn long_slice_is_refused() {
        assert!(joint_vector_from_slice(&[0.0; 8]).is_err());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = JointVector::zeros();
        let b = JointVector::repeat(1.0);
        assert_relative_eq!(joint_distance(&a, &b), 7.0_f64.sqrt());
        assert_relative_eq!(joint_distance(&b, &a), 7.0_f64.sqrt());
    }

    #[test]
    fn measured_state_is_shared_between_handles() {
        let measured = MeasuredJointState::new(JointVector::zeros());
        let feedback = measured.clone();
        feedback.update(&[0.5; 7]).unwrap();
        assert_relative_eq!(measured.snapshot(), JointVector::repeat(0.5));
    }

    #[test]
    fn bad_feedback_keeps_previous_state() {
        let measured = MeasuredJointState::new(JointVector::repeat(0.25));
        assert!(measured.update(&[1.0; 3]).is_err());
        assert_relative_eq!(measured.snapshot(), JointVector::repeat(0.25));
    }

    #[test]
    fn snapshots_never_mix_two_writes() {
        let measured = MeasuredJointState::new(JointVector::zeros());
        let feedback = measured.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let writer_stop = Arc::clone(&stop);
        let writer = std::thread::spawn(move || {
            let mut step = 0_u32;
            loop {
                step += 1;
                feedback.set(JointVector::repeat(f64::from(step)));
                if writer_stop.load(Ordering::Relaxed) {
                    break;
                }
            }
        });
        for _ in 0..20_000 {
            let snapshot = measured.snapshot();
            // every element comes from the same write
            assert!(snapshot.iter().all(|value| *value == snapshot[0]));
        }
        stop.store(true, Ordering::Relaxed);
        writer.join().unwrap();
        let last = measured.snapshot();
        assert!(last[0] >= 1.0);
        assert!(last.iter().all(|value| *value == last[0]));
    }
}
