use crate::error::ReplayError;
use nalgebra as na;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use teleop_controller::{
    arm_config::TeleopConfig,
    arm_controller::{CycleOutcome, CycleOutput},
    ik::{IkSolver, SolveOptions},
    joints::{joint_vector_from_slice, JointVector},
    sample::ControllerSample,
    teleop_system::TeleopSystem,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredUpdate {
    pub arm: String,
    pub joints: Vec<f64>,
}

/// One line of a recorded session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionEvent {
    /// Tracking update plus the solver answers recorded for it, keyed by arm
    Tracking {
        samples: Vec<ControllerSample>,
        #[serde(default)]
        candidates: HashMap<String, Vec<Vec<f64>>>,
    },
    Measured {
        measured: MeasuredUpdate,
    },
}

/// Slot holding the recorded answer for the next solve of one arm
#[derive(Debug, Clone, Default)]
pub struct RecordedAnswer {
    candidates: Arc<Mutex<Option<Vec<JointVector>>>>,
}

impl RecordedAnswer {
    pub fn set(&self, candidates: Vec<JointVector>) {
        *self.candidates.lock() = Some(candidates);
    }

    pub fn clear(&self) {
        *self.candidates.lock() = None;
    }
}

/// Solver that answers from a recording instead of computing
///
/// Each recorded answer is used at most once, later solves get nothing.
pub struct RecordedSolver {
    answer: RecordedAnswer,
}

impl RecordedSolver {
    pub fn new(answer: RecordedAnswer) -> RecordedSolver {
        RecordedSolver { answer }
    }
}

impl IkSolver for RecordedSolver {
    fn solve(
        &mut self,
        _target: &na::Isometry3<f64>,
        _seed: &JointVector,
        _options: &SolveOptions,
    ) -> Vec<JointVector> {
        self.answer.candidates.lock().take().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub tracking_updates: usize,
    pub feedback_updates: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub no_solution: usize,
}

impl ReplayStats {
    fn record(&mut self, outputs: &[CycleOutput]) {
        self.tracking_updates += 1;
        for output in outputs {
            match output.outcome {
                CycleOutcome::Accepted { .. } => self.accepted += 1,
                CycleOutcome::Rejected { .. } => self.rejected += 1,
                CycleOutcome::NoSolution => self.no_solution += 1,
                CycleOutcome::NoController | CycleOutcome::Disengaged => (),
            }
        }
    }
}

/// Drives a teleop system from recorded events
pub struct Replay {
    system: TeleopSystem,
    answers: HashMap<String, RecordedAnswer>,
    stats: ReplayStats,
}

impl Replay {
    pub fn new(config: &TeleopConfig) -> Result<Replay, ReplayError> {
        let mut answers = HashMap::new();
        let system = TeleopSystem::new(config, |arm| {
            let answer = RecordedAnswer::default();
            answers.insert(arm.name.clone(), answer.clone());
            Box::new(RecordedSolver::new(answer))
        })?;
        Ok(Replay {
            system,
            answers,
            stats: ReplayStats::default(),
        })
    }

    pub fn system(&self) -> &TeleopSystem {
        &self.system
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Apply one event, returning the cycle of every arm for tracking updates
    pub fn apply(&mut self, event: SessionEvent) -> Result<Vec<CycleOutput>, ReplayError> {
        match event {
            SessionEvent::Tracking {
                samples,
                candidates,
            } => {
                // answers recorded for an earlier update must not leak into this one
                for answer in self.answers.values() {
                    answer.clear();
                }
                for (arm, recorded) in candidates {
                    let answer = self
                        .answers
                        .get(&arm)
                        .ok_or_else(|| ReplayError::UnknownArm(arm.clone()))?;
                    let joints = recorded
                        .iter()
                        .map(|candidate| joint_vector_from_slice(candidate))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|source| ReplayError::JointState {
                            arm: arm.clone(),
                            source,
                        })?;
                    answer.set(joints);
                }
                let outputs = self.system.process(&samples);
                self.stats.record(&outputs);
                Ok(outputs)
            }
            SessionEvent::Measured { measured } => {
                let arm = self
                    .system
                    .arm(&measured.arm)
                    .ok_or_else(|| ReplayError::UnknownArm(measured.arm.clone()))?;
                arm.update_measured_state(&measured.joints)
                    .map_err(|source| ReplayError::JointState {
                        arm: measured.arm.clone(),
                        source,
                    })?;
                debug!(arm = %measured.arm, "joint feedback applied");
                self.stats.feedback_updates += 1;
                Ok(vec![])
            }
        }
    }
}
