use teleop_controller::{arm_config::ConfigError, joints::JointStateError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("configuration error")]
    Config(#[from] ConfigError),
    #[error("malformed joint values for arm {arm}")]
    JointState {
        arm: String,
        #[source]
        source: JointStateError,
    },
    #[error("session refers to unknown arm {0}")]
    UnknownArm(String),
}
