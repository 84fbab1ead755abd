use crate::arm_config::{ArmConfig, ArmRole, ButtonMap, ConfigError, TeleopConfig};
use crate::clutch::{ClutchStateMachine, ClutchTransition};
use crate::gripper::GripperCommand;
use crate::ik::{IkSolver, SolveOptions};
use crate::joints::{JointCommand, JointStateError, JointVector, MeasuredJointState};
use crate::pose_tracker::DeltaPoseTracker;
use crate::safety_gate::{GateVerdict, SafetyGate};
use crate::sample::ControllerSample;
use crate::solution_selector::select_nearest;
use crate::target_pose::compose_target;
use nalgebra as na;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happened to one arm during one cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// No sample carried this arm's controller id
    NoController,
    Disengaged,
    /// Solver returned no usable candidate
    NoSolution,
    Rejected { distance: f64 },
    Accepted { distance: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOutput {
    pub arm: String,
    pub outcome: CycleOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint_command: Option<JointCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gripper_command: Option<GripperCommand>,
}

impl CycleOutput {
    pub fn has_command(&self) -> bool {
        self.joint_command.is_some() || self.gripper_command.is_some()
    }
}

/// Persistent tracking state of one arm
#[derive(Debug)]
pub struct ArmState {
    clutch: ClutchStateMachine,
    tracker: DeltaPoseTracker,
    ee_last_valid_pose: na::Isometry3<f64>,
    joint_position_measured: MeasuredJointState,
}

impl ArmState {
    pub fn new(home_pose: na::Isometry3<f64>, home_joints: JointVector) -> ArmState {
        ArmState {
            clutch: ClutchStateMachine::new(),
            tracker: DeltaPoseTracker::new(),
            ee_last_valid_pose: home_pose,
            joint_position_measured: MeasuredJointState::new(home_joints),
        }
    }

    pub fn enabled(&self) -> bool {
        self.clutch.is_engaged()
    }

    pub fn initialized(&self) -> bool {
        self.tracker.initialized()
    }

    pub fn trackpad_was_pressed(&self) -> bool {
        self.clutch.button_was_pressed()
    }

    pub fn ee_last_valid_pose(&self) -> &na::Isometry3<f64> {
        &self.ee_last_valid_pose
    }

    pub fn controller_last_pose(&self) -> &na::Isometry3<f64> {
        self.tracker.controller_last_pose()
    }

    pub fn controller_frame_diff_rotation(&self) -> &na::UnitQuaternion<f64> {
        self.tracker.controller_frame_diff_rotation()
    }

    pub fn joint_position_measured(&self) -> JointVector {
        self.joint_position_measured.snapshot()
    }
}

/// Turns controller samples into joint and gripper commands for one arm
pub struct ArmController {
    name: String,
    role: ArmRole,
    controller_id: Option<u32>,
    buttons: ButtonMap,
    gripper_axis: usize,
    solve_options: SolveOptions,
    safety_gate: SafetyGate,
    solver: Box<dyn IkSolver>,
    state: ArmState,
    last_command: Option<JointCommand>,
}

impl ArmController {
    pub fn new(
        arm: &ArmConfig,
        config: &TeleopConfig,
        solver: Box<dyn IkSolver>,
    ) -> Result<ArmController, ConfigError> {
        let home_pose = arm
            .home_pose
            .to_isometry()
            .map_err(|source| ConfigError::InvalidHomePose {
                arm: arm.name.clone(),
                source,
            })?;
        Ok(ArmController {
            name: arm.name.clone(),
            role: arm.role,
            controller_id: arm.role.controller_id(&config.hands),
            buttons: config.buttons,
            gripper_axis: config.gripper_axis,
            solve_options: SolveOptions {
                discretization: config.discretization,
            },
            safety_gate: SafetyGate::new(config.safety_threshold),
            solver,
            state: ArmState::new(home_pose, arm.home_joints),
            last_command: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> ArmRole {
        self.role
    }

    pub fn state(&self) -> &ArmState {
        &self.state
    }

    /// Last joint command that passed the safety gate
    pub fn last_command(&self) -> Option<&JointCommand> {
        self.last_command.as_ref()
    }

    /// Handle for delivering joint feedback from another task
    pub fn measured_state(&self) -> MeasuredJointState {
        self.state.joint_position_measured.clone()
    }

    pub fn update_measured_state(&self, values: &[f64]) -> Result<(), JointStateError> {
        self.state.joint_position_measured.update(values)
    }

    /// Sample driving this arm out of one tracking update
    ///
    /// When several samples match, the last one wins.
    pub fn assigned_sample<'a>(
        &self,
        samples: &'a [ControllerSample],
    ) -> Option<&'a ControllerSample> {
        let controller_id = self.controller_id?;
        let mut count = 0;
        let mut last = None;
        for sample in samples.iter().filter(|sample| sample.id == controller_id) {
            count += 1;
            last = Some(sample);
        }
        if count > 1 {
            warn!(
                arm = %self.name,
                controller_id,
                count,
                "several samples for one controller, using the last"
            );
        }
        last
    }

    pub fn control(&mut self, samples: &[ControllerSample]) -> CycleOutput {
        match self.assigned_sample(samples) {
            Some(sample) => self.control_sample(sample),
            None => self.output(CycleOutcome::NoController, None, None),
        }
    }

    /// One control cycle for a sample that belongs to this arm
    pub fn control_sample(&mut self, sample: &ControllerSample) -> CycleOutput {
        let gripper_command = GripperCommand::from_closed_fraction(sample.axis(self.gripper_axis));

        let transition = self.state.clutch.update(sample.button(self.buttons.clutch));
        match transition {
            ClutchTransition::Engaged => info!(arm = %self.name, "tracking engaged"),
            ClutchTransition::Disengaged => info!(arm = %self.name, "tracking disengaged"),
            ClutchTransition::Unchanged => (),
        }
        if !self.state.clutch.is_engaged() {
            return self.output(CycleOutcome::Disengaged, None, Some(gripper_command));
        }

        // engaging re-anchors too, motion made while disengaged must not leak in
        let reset = transition == ClutchTransition::Engaged
            || sample.button(self.buttons.reset).is_pressed()
            || !self.state.tracker.initialized();
        if reset {
            debug!(arm = %self.name, "controller frame re-anchored");
        }
        let delta = self.state.tracker.track(&sample.pose, reset);
        let target = compose_target(&self.state.ee_last_valid_pose, &delta);

        let (outcome, joint_command) = self.solve_and_gate(&target);
        self.output(outcome, joint_command, Some(gripper_command))
    }

    /// Drive the arm toward an absolute end effector pose
    ///
    /// Uses the same solve, selection and gate as sample tracking.
    pub fn track_target(&mut self, target: &na::Isometry3<f64>) -> CycleOutput {
        let (outcome, joint_command) = self.solve_and_gate(target);
        self.output(outcome, joint_command, None)
    }

    fn solve_and_gate(
        &mut self,
        target: &na::Isometry3<f64>,
    ) -> (CycleOutcome, Option<JointCommand>) {
        // seed, selection and gate all use this one snapshot
        let measured = self.state.joint_position_measured.snapshot();
        let candidates = self.solver.solve(target, &measured, &self.solve_options);
        debug!(arm = %self.name, solutions = candidates.len(), "ik solve finished");

        let selection = match select_nearest(&candidates, &measured) {
            Some(selection) => selection,
            None => {
                debug!(arm = %self.name, "no ik solution, holding position");
                return (CycleOutcome::NoSolution, None);
            }
        };

        match self.safety_gate.check(&selection.joints, &measured) {
            GateVerdict::Accepted { distance } => {
                debug!(
                    arm = %self.name,
                    distance,
                    branch = selection.index,
                    "joint command accepted"
                );
                self.state.ee_last_valid_pose = *target;
                let command = JointCommand::new(selection.joints);
                self.last_command = Some(command.clone());
                (CycleOutcome::Accepted { distance }, Some(command))
            }
            GateVerdict::Rejected { distance } => {
                warn!(
                    arm = %self.name,
                    distance,
                    threshold = self.safety_gate.threshold(),
                    "joint space jump rejected"
                );
                (CycleOutcome::Rejected { distance }, None)
            }
        }
    }

    fn output(
        &self,
        outcome: CycleOutcome,
        joint_command: Option<JointCommand>,
        gripper_command: Option<GripperCommand>,
    ) -> CycleOutput {
        CycleOutput {
            arm: self.name.clone(),
            outcome,
            joint_command,
            gripper_command,
        }
    }
}
