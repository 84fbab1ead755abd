use crate::ik::Discretization;
use crate::joints::JointVector;
use crate::safety_gate::DEFAULT_SAFETY_THRESHOLD;
use crate::sample::{SampleError, WirePose, AXIS_COUNT, BUTTON_COUNT};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error while accessing configuration")]
    IoError(#[from] std::io::Error),
    #[error("error while parsing json")]
    JsonError(#[from] serde_json::Error),
    #[error("error while parsing yaml")]
    YamlError(#[from] serde_yaml::Error),
    #[error("unsupported configuration file {0}")]
    UnsupportedFormat(String),
    #[error("home pose of arm {arm} is invalid")]
    InvalidHomePose {
        arm: String,
        #[source]
        source: SampleError,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Which hand drives an arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArmRole {
    #[default]
    Unassigned,
    Left,
    Right,
}

impl ArmRole {
    /// Controller id this role listens to
    pub fn controller_id(self, hands: &HandIds) -> Option<u32> {
        match self {
            ArmRole::Unassigned => None,
            ArmRole::Left => Some(hands.left),
            ArmRole::Right => Some(hands.right),
        }
    }
}

/// Controller ids reported by the tracking system for each hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandIds {
    pub left: u32,
    pub right: u32,
}

impl Default for HandIds {
    fn default() -> Self {
        HandIds { left: 1, right: 2 }
    }
}

/// Indices into the controller button array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonMap {
    /// toggles tracking
    pub clutch: usize,
    /// re-anchors the controller frame
    pub reset: usize,
}

impl Default for ButtonMap {
    fn default() -> Self {
        ButtonMap {
            clutch: 2,
            reset: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArmConfig {
    pub name: String,
    #[serde(default)]
    pub role: ArmRole,
    /// End effector pose in the arm base frame at startup
    pub home_pose: WirePose,
    /// Joint state assumed until the first feedback arrives
    #[serde(default = "default_home_joints")]
    pub home_joints: JointVector,
}

impl ArmConfig {
    pub fn new(name: &str, role: ArmRole) -> ArmConfig {
        ArmConfig {
            name: name.to_owned(),
            role,
            home_pose: WirePose::identity(),
            home_joints: JointVector::zeros(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TeleopConfig {
    #[serde(default)]
    pub hands: HandIds,
    #[serde(default)]
    pub buttons: ButtonMap,
    /// Axis that drives the gripper
    #[serde(default = "default_gripper_axis")]
    pub gripper_axis: usize,
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: f64,
    #[serde(default)]
    pub discretization: Discretization,
    pub arms: Vec<ArmConfig>,
}

fn default_home_joints() -> JointVector {
    JointVector::zeros()
}

fn default_gripper_axis() -> usize {
    2
}

fn default_safety_threshold() -> f64 {
    DEFAULT_SAFETY_THRESHOLD
}

impl Default for TeleopConfig {
    fn default() -> Self {
        TeleopConfig {
            hands: HandIds::default(),
            buttons: ButtonMap::default(),
            gripper_axis: default_gripper_axis(),
            safety_threshold: default_safety_threshold(),
            discretization: Discretization::default(),
            arms: vec![],
        }
    }
}

impl TeleopConfig {
    /// Dual arm configuration packaged with the library
    pub fn included() -> TeleopConfig {
        let json = include_str!("../config/teleop.json");
        TeleopConfig::parse_json(json).expect("included teleop config is valid json")
    }

    pub fn parse_json(text: &str) -> Result<TeleopConfig> {
        let config: TeleopConfig = serde_json::from_str(text)?;
        Ok(config)
    }

    pub fn parse_yaml(text: &str) -> Result<TeleopConfig> {
        let config: TeleopConfig = serde_yaml::from_str(text)?;
        Ok(config)
    }

    pub fn serialize_to_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    pub fn serialize_to_yaml(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(yaml)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.serialize_to_json()?)?;
        Ok(())
    }

    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.serialize_to_yaml()?)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<TeleopConfig> {
        let text = fs::read_to_string(path)?;
        TeleopConfig::parse_json(&text)
    }

    pub fn load_yaml(path: impl AsRef<Path>) -> Result<TeleopConfig> {
        let text = fs::read_to_string(path)?;
        TeleopConfig::parse_yaml(&text)
    }

    /// Load by file extension
    pub fn load(path: impl AsRef<Path>) -> Result<TeleopConfig> {
        let path = path.as_ref();
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("json") => TeleopConfig::load_json(path),
            Some("yaml") | Some("yml") => TeleopConfig::load_yaml(path),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn arm(&self, name: &str) -> Option<&ArmConfig> {
        self.arms.iter().find(|arm| arm.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.safety_threshold.is_finite() || self.safety_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "safety threshold must be positive, got {}",
                self.safety_threshold
            )));
        }
        if self.buttons.clutch >= BUTTON_COUNT || self.buttons.reset >= BUTTON_COUNT {
            return Err(ConfigError::Invalid(format!(
                "button indices must be below {}",
                BUTTON_COUNT
            )));
        }
        if self.buttons.clutch == self.buttons.reset {
            return Err(ConfigError::Invalid(
                "clutch and reset share a button".to_owned(),
            ));
        }
        if self.gripper_axis >= AXIS_COUNT {
            return Err(ConfigError::Invalid(format!(
                "gripper axis must be below {}",
                AXIS_COUNT
            )));
        }
        if self.hands.left == self.hands.right {
            return Err(ConfigError::Invalid(
                "left and right hand share a controller id".to_owned(),
            ));
        }
        let mut names = HashSet::new();
        let mut roles = HashSet::new();
        for arm in &self.arms {
            if !names.insert(arm.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "arm name {} is used twice",
                    arm.name
                )));
            }
            if arm.role != ArmRole::Unassigned && !roles.insert(arm.role) {
                return Err(ConfigError::Invalid(format!(
                    "role {:?} is assigned to more than one arm",
                    arm.role
                )));
            }
            arm.home_pose
                .to_isometry()
                .map_err(|source| ConfigError::InvalidHomePose {
                    arm: arm.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
