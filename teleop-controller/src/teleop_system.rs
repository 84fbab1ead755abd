use crate::arm_config::{ArmConfig, ConfigError, TeleopConfig};
use crate::arm_controller::{ArmController, CycleOutput};
use crate::ik::IkSolver;
use crate::sample::ControllerSample;
use tracing::info;

/// Every configured arm, each with its own state and solver
pub struct TeleopSystem {
    arms: Vec<ArmController>,
}

impl TeleopSystem {
    /// Validates the configuration and builds one controller per arm
    ///
    /// `solver_for` is called once per arm. Returning independent solvers
    /// keeps the arms from sharing kinematic state.
    pub fn new<F>(config: &TeleopConfig, mut solver_for: F) -> Result<TeleopSystem, ConfigError>
    where
        F: FnMut(&ArmConfig) -> Box<dyn IkSolver>,
    {
        config.validate()?;
        let arms = config
            .arms
            .iter()
            .map(|arm| ArmController::new(arm, config, solver_for(arm)))
            .collect::<Result<Vec<_>, _>>()?;
        info!(arms = arms.len(), "teleop system ready");
        Ok(TeleopSystem { arms })
    }

    pub fn arms(&self) -> &[ArmController] {
        &self.arms
    }

    pub fn arm(&self, name: &str) -> Option<&ArmController> {
        self.arms.iter().find(|arm| arm.name() == name)
    }

    pub fn arm_mut(&mut self, name: &str) -> Option<&mut ArmController> {
        self.arms.iter_mut().find(|arm| arm.name() == name)
    }

    /// Run one tracking update through every arm, in configuration order
    pub fn process(&mut self, samples: &[ControllerSample]) -> Vec<CycleOutput> {
        self.arms
            .iter_mut()
            .map(|arm| arm.control(samples))
            .collect()
    }
}
